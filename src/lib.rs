pub mod bedrock;
pub mod config;
pub mod error;
pub mod handler;
pub mod logger;
pub mod models;
#[cfg(feature = "server")]
pub mod server;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_utils;

pub use bedrock::{AwsClients, BedrockRuntime, ImageClient, InferenceBackend};
pub use config::{AwsConfig, Config, GenerationConfig, StorageConfig};
pub use error::{PosterError, Result};
pub use handler::PosterHandler;
pub use models::*;
pub use storage::{ObjectStore, Publisher, S3ObjectStore};
