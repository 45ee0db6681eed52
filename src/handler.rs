use crate::{
    bedrock::{AwsClients, ImageClient},
    config::Config,
    error::{PosterError, Result},
    logger,
    models::ResponseEnvelope,
    storage::Publisher,
};
use serde_json::Value;

/// Parses a raw trigger event, logging why it was rejected.
pub fn parse_event(raw: &str) -> Result<Value> {
    serde_json::from_str(raw)
        .map_err(|e| PosterError::SerializationError(format!("event is not valid JSON: {}", e)))
        .inspect_err(|e| log::error!("❌ {}", e))
}

/// Prompt in, pre-signed poster URL out.
#[derive(Clone)]
pub struct PosterHandler {
    generator: ImageClient,
    publisher: Publisher,
    extension: String,
}

impl PosterHandler {
    pub fn new(generator: ImageClient, publisher: Publisher, extension: impl Into<String>) -> Self {
        Self {
            generator,
            publisher,
            extension: extension.into(),
        }
    }

    pub fn from_clients(clients: AwsClients, config: &Config) -> Self {
        Self::new(
            ImageClient::from_client(clients.bedrock, config.generation.clone()),
            Publisher::from_client(clients.s3, &config.storage),
            config.storage.extension.clone(),
        )
    }

    /// Errors from either backend are returned as-is; they were logged where they happened.
    pub async fn handle(&self, event: &Value) -> Result<ResponseEnvelope> {
        let prompt = event
            .get("prompt")
            .and_then(Value::as_str)
            .ok_or_else(|| PosterError::MissingField("prompt".into()))?;

        let mut timer = logger::timer("poster request");
        log::info!("Received prompt: {}", prompt);

        let result = self.generate_and_publish(prompt).await;
        if result.is_err() {
            timer.mark_failed();
        }
        result
    }

    async fn generate_and_publish(&self, prompt: &str) -> Result<ResponseEnvelope> {
        let image = self.generator.generate(prompt).await?;
        let url = self.publisher.publish(image, &self.extension).await?;

        Ok(ResponseEnvelope::ok(url))
    }
}
