use crate::{
    config::GenerationConfig,
    error::{PosterError, Result},
    models::{StableDiffusionRequest, StableDiffusionResponse, TextPrompt},
};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::{error::ProvideErrorMetadata, primitives::Blob, Client};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

const BEDROCK_CONTENT_TYPE: &str = "application/json";

/// Raw model invocation: JSON body in, JSON body out.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>>;
}

#[derive(Clone)]
pub struct BedrockRuntime {
    client: Client,
}

impl BedrockRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InferenceBackend for BedrockRuntime {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let response = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type(BEDROCK_CONTENT_TYPE)
            .accept(BEDROCK_CONTENT_TYPE)
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| {
                log::debug!("Bedrock InvokeModel error details: {:?}", e);
                match e.as_service_error() {
                    Some(service_error) => PosterError::InferenceError(format!(
                        "Bedrock service error: {} - {}",
                        service_error.code().unwrap_or("unknown"),
                        service_error.message().unwrap_or("no message")
                    )),
                    None => PosterError::InferenceError(format!("AWS SDK error: {}", e)),
                }
            })?;

        Ok(response.body.into_inner())
    }
}

/// Turns a prompt into image bytes using one fixed request template.
#[derive(Clone)]
pub struct ImageClient {
    backend: Arc<dyn InferenceBackend>,
    config: GenerationConfig,
}

impl ImageClient {
    pub fn new(backend: Arc<dyn InferenceBackend>, config: GenerationConfig) -> Self {
        Self { backend, config }
    }

    pub fn from_client(client: Client, config: GenerationConfig) -> Self {
        Self::new(Arc::new(BedrockRuntime::new(client)), config)
    }

    pub fn build_request(&self, prompt: &str) -> StableDiffusionRequest {
        StableDiffusionRequest {
            text_prompts: vec![TextPrompt {
                text: prompt.to_string(),
            }],
            cfg_scale: self.config.cfg_scale,
            steps: self.config.steps,
            seed: self.config.seed,
        }
    }

    /// Generates one image. Failures are logged here before being returned.
    pub async fn generate(&self, prompt: &str) -> Result<Vec<u8>> {
        self.try_generate(prompt)
            .await
            .inspect_err(|e| log::error!("Error invoking Bedrock model: {}", e))
    }

    async fn try_generate(&self, prompt: &str) -> Result<Vec<u8>> {
        let request_json = serde_json::to_vec(&self.build_request(prompt))
            .map_err(|e| PosterError::SerializationError(e.to_string()))?;

        log::info!("Generating image with model: {}", self.config.model_id);

        let response_bytes = self
            .backend
            .invoke_model(&self.config.model_id, request_json)
            .await?;

        decode_first_artifact(&response_bytes)
    }
}

pub(crate) fn decode_first_artifact(response_bytes: &[u8]) -> Result<Vec<u8>> {
    let response: StableDiffusionResponse = serde_json::from_slice(response_bytes)
        .map_err(|e| PosterError::InferenceError(format!("malformed model response: {}", e)))?;

    if let Some(result) = &response.result {
        log::debug!("Model reported result: {}", result);
    }

    let artifact = response
        .artifacts
        .first()
        .ok_or_else(|| PosterError::InferenceError("No images generated".into()))?;

    if artifact.is_content_filtered() {
        log::warn!("Generated image was altered by the content filter");
    }

    let image = STANDARD
        .decode(artifact.base64.trim())
        .map_err(|e| PosterError::InferenceError(format!("invalid base64 artifact: {}", e)))?;

    if image.is_empty() {
        return Err(PosterError::InferenceError("artifact decoded to an empty image".into()));
    }

    Ok(image)
}
