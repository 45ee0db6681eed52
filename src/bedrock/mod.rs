pub mod image_client;

use crate::config::AwsConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_bedrockruntime::config::Credentials;

pub use image_client::{BedrockRuntime, ImageClient, InferenceBackend};

/// Process-wide AWS clients, built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AwsClients {
    pub bedrock: aws_sdk_bedrockruntime::Client,
    pub s3: aws_sdk_s3::Client,
}

impl AwsClients {
    pub async fn new(config: &AwsConfig) -> Self {
        let sdk_config = load_sdk_config(config).await;

        Self {
            bedrock: aws_sdk_bedrockruntime::Client::new(&sdk_config),
            s3: aws_sdk_s3::Client::new(&sdk_config),
        }
    }
}

/// Explicit credentials win; otherwise the default provider chain is used.
pub async fn load_sdk_config(config: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
        loader = loader.credentials_provider(Credentials::new(
            access_key,
            secret_key,
            None,
            None,
            "postergen-config",
        ));
    }

    loader.load().await
}
