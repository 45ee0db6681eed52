use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `body` under `key`, replacing any object already stored there.
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;

    /// Returns a URL granting read access to `key` for `expires_in`.
    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String>;

    fn bucket(&self) -> &str;
}
