use serde::{Deserialize, Serialize};

/// Envelope handed back to the trigger on success.
///
/// The body is always the structured `{"url": ...}` object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseEnvelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: ResponseBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseBody {
    pub url: String,
}

impl ResponseEnvelope {
    pub fn ok(url: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: ResponseBody { url: url.into() },
        }
    }
}
