//! In-process stand-ins for Bedrock and S3.

use crate::{
    bedrock::InferenceBackend,
    error::{PosterError, Result},
    storage::ObjectStore,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// PNG signature followed by an IHDR chunk header.
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
];

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 21, 10, 0, 0).unwrap()
}

pub fn artifact_response(image: &[u8]) -> Vec<u8> {
    json!({
        "result": "success",
        "artifacts": [{ "base64": STANDARD.encode(image), "seed": 0, "finishReason": "SUCCESS" }]
    })
    .to_string()
    .into_bytes()
}

pub struct FakeInference {
    reply: std::result::Result<Vec<u8>, String>,
    requests: Mutex<Vec<(String, Vec<u8>)>>,
}

impl FakeInference {
    pub fn replying(body: Vec<u8>) -> Self {
        Self {
            reply: Ok(body),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<(String, Vec<u8>)> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl InferenceBackend for FakeInference {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        self.requests
            .lock()
            .unwrap()
            .push((model_id.to_string(), body));
        self.reply
            .clone()
            .map_err(PosterError::InferenceError)
    }
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

pub struct MemoryStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    write_error: Option<String>,
    presign_calls: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            write_error: None,
            presign_calls: Mutex::new(0),
        }
    }

    pub fn failing_writes(message: &str) -> Self {
        Self {
            write_error: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn presign_calls(&self) -> usize {
        *self.presign_calls.lock().unwrap()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        if let Some(message) = &self.write_error {
            return Err(PosterError::StorageError(message.clone()));
        }
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String> {
        *self.presign_calls.lock().unwrap() += 1;
        Ok(format!(
            "https://{}.s3.amazonaws.com/{}?X-Amz-Algorithm=AWS4-HMAC-SHA256&X-Amz-Expires={}&X-Amz-Signature=fake",
            self.bucket(),
            key,
            expires_in.as_secs()
        ))
    }

    fn bucket(&self) -> &str {
        "movieposterdesign3467"
    }
}
