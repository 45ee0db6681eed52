pub mod s3;
pub mod traits;

use crate::{
    config::{is_valid_extension, StorageConfig},
    error::{PosterError, Result},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub use s3::S3ObjectStore;
pub use traits::ObjectStore;

pub const KEY_PREFIX: &str = "poster_";
const KEY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// `poster_<YYYY-MM-DD-HH-MM-SS>.<ext>`; calls within the same second collide.
pub fn object_key(at: DateTime<Utc>, extension: &str) -> String {
    format!(
        "{}{}.{}",
        KEY_PREFIX,
        at.format(KEY_TIMESTAMP_FORMAT),
        extension
    )
}

/// Same as [`object_key`] with a random suffix, so keys never collide.
pub fn unique_object_key(at: DateTime<Utc>, extension: &str) -> String {
    format!(
        "{}{}_{}.{}",
        KEY_PREFIX,
        at.format(KEY_TIMESTAMP_FORMAT),
        Uuid::new_v4().simple(),
        extension
    )
}

pub fn content_type_for(extension: &str) -> String {
    format!("image/{}", extension)
}

/// Stores images and hands out expiring read URLs for them.
#[derive(Clone)]
pub struct Publisher {
    store: Arc<dyn ObjectStore>,
    url_expiry: Duration,
    unique_keys: bool,
    clock: Clock,
}

impl Publisher {
    pub fn new(store: Arc<dyn ObjectStore>, config: &StorageConfig) -> Self {
        Self {
            store,
            url_expiry: Duration::from_secs(config.url_expiry_secs),
            unique_keys: config.unique_keys,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn from_client(client: aws_sdk_s3::Client, config: &StorageConfig) -> Self {
        Self::new(
            Arc::new(S3ObjectStore::new(client, config.bucket.clone())),
            config,
        )
    }

    /// Replaces the wall clock used for object keys.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn next_key(&self, extension: &str) -> String {
        let now = (self.clock)();
        if self.unique_keys {
            unique_object_key(now, extension)
        } else {
            object_key(now, extension)
        }
    }

    /// Writes the image and returns a pre-signed URL to it. Failures are logged here.
    pub async fn publish(&self, image: Vec<u8>, extension: &str) -> Result<String> {
        self.try_publish(image, extension)
            .await
            .inspect_err(|e| log::error!("Error uploading image to S3: {}", e))
    }

    async fn try_publish(&self, image: Vec<u8>, extension: &str) -> Result<String> {
        if image.is_empty() {
            return Err(PosterError::StorageError("refusing to store an empty image".into()));
        }
        if !is_valid_extension(extension) {
            return Err(PosterError::StorageError(format!(
                "invalid file extension '{}'",
                extension
            )));
        }

        let key = self.next_key(extension);
        let content_type = content_type_for(extension);

        log::info!(
            "Storing {} bytes as s3://{}/{}",
            image.len(),
            self.store.bucket(),
            key
        );
        self.store.put_object(&key, image, &content_type).await?;

        self.store.presign_get(&key, self.url_expiry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fixed_time, MemoryStore, PNG_BYTES};

    fn publisher(store: Arc<MemoryStore>) -> Publisher {
        Publisher::new(store, &StorageConfig::default()).with_clock(fixed_time)
    }

    #[test]
    fn test_key_format() {
        assert_eq!(object_key(fixed_time(), "png"), "poster_2024-04-21-10-00-00.png");
        assert_eq!(object_key(fixed_time(), "jpeg"), "poster_2024-04-21-10-00-00.jpeg");
    }

    #[test]
    fn test_same_second_keys_collide() {
        let store = Arc::new(MemoryStore::new());
        let publisher = publisher(store);
        assert_eq!(publisher.next_key("png"), publisher.next_key("png"));
    }

    #[test]
    fn test_unique_keys_do_not_collide() {
        let first = unique_object_key(fixed_time(), "png");
        let second = unique_object_key(fixed_time(), "png");

        assert_ne!(first, second);
        assert!(first.starts_with("poster_2024-04-21-10-00-00_"));
        assert!(first.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_publish_stores_and_signs() {
        let store = Arc::new(MemoryStore::new());
        let url = publisher(store.clone())
            .publish(PNG_BYTES.to_vec(), "png")
            .await
            .unwrap();

        assert!(url.contains("poster_2024-04-21-10-00-00.png"));
        assert!(url.contains("X-Amz-Expires=3600"));

        let object = store.get("poster_2024-04-21-10-00-00.png").unwrap();
        assert_eq!(object.content_type, "image/png");
        assert_eq!(object.body, PNG_BYTES);
    }

    #[tokio::test]
    async fn test_content_type_follows_extension() {
        let store = Arc::new(MemoryStore::new());
        publisher(store.clone())
            .publish(PNG_BYTES.to_vec(), "jpeg")
            .await
            .unwrap();

        let object = store.get("poster_2024-04-21-10-00-00.jpeg").unwrap();
        assert_eq!(object.content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_later_publish_in_same_second_overwrites() {
        let store = Arc::new(MemoryStore::new());
        let publisher = publisher(store.clone());
        publisher.publish(b"first".to_vec(), "png").await.unwrap();
        publisher.publish(b"second".to_vec(), "png").await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("poster_2024-04-21-10-00-00.png").unwrap().body, b"second");
    }

    #[tokio::test]
    async fn test_configured_expiry() {
        let store = Arc::new(MemoryStore::new());
        let config = StorageConfig::new().with_url_expiry(900);
        let url = Publisher::new(store, &config)
            .with_clock(fixed_time)
            .publish(PNG_BYTES.to_vec(), "png")
            .await
            .unwrap();

        assert!(url.contains("X-Amz-Expires=900"));
    }

    #[tokio::test]
    async fn test_rejects_bad_input_before_writing() {
        let store = Arc::new(MemoryStore::new());
        let publisher = publisher(store.clone());

        assert!(matches!(
            publisher.publish(Vec::new(), "png").await,
            Err(PosterError::StorageError(_))
        ));
        assert!(matches!(
            publisher.publish(PNG_BYTES.to_vec(), "png/../x").await,
            Err(PosterError::StorageError(_))
        ));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_is_storage_error() {
        let store = Arc::new(MemoryStore::failing_writes("AccessDenied"));
        let err = publisher(store.clone())
            .publish(PNG_BYTES.to_vec(), "png")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Storage error: AccessDenied");
        assert_eq!(store.presign_calls(), 0);
    }
}
