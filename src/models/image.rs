use serde::{Deserialize, Serialize};

/// Request body of the Stability AI text-to-image models on Bedrock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StableDiffusionRequest {
    pub text_prompts: Vec<TextPrompt>,
    pub cfg_scale: u32,
    pub steps: u32,
    pub seed: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextPrompt {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StableDiffusionResponse {
    #[serde(default)]
    pub result: Option<String>,
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    pub base64: String,
    #[serde(rename = "finishReason", default)]
    pub finish_reason: Option<String>,
}

impl Artifact {
    pub fn is_content_filtered(&self) -> bool {
        self.finish_reason.as_deref() == Some("CONTENT_FILTERED")
    }
}
