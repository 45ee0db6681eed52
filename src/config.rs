use crate::error::{PosterError, Result};
use std::env;
use std::str::FromStr;

pub const DEFAULT_MODEL_ID: &str = "stability.stable-diffusion-xl-v0";
pub const DEFAULT_BUCKET_NAME: &str = "movieposterdesign3467";
pub const DEFAULT_EXTENSION: &str = "png";
pub const DEFAULT_URL_EXPIRY_SECS: u64 = 3600;
pub const DEFAULT_PORT: u16 = 8080;

/// S3 refuses SigV4 presigned URLs that live longer than seven days.
const MAX_URL_EXPIRY_SECS: u64 = 604_800;

#[derive(Debug, Clone, Default)]
pub struct AwsConfig {
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl AwsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let region = lookup("AWS_REGION").or_else(|| lookup("AWS_DEFAULT_REGION"));
        let access_key = lookup("AWS_ACCESS_KEY_ID");
        let secret_key = lookup("AWS_SECRET_ACCESS_KEY");

        if access_key.is_some() != secret_key.is_some() {
            return Err(PosterError::ConfigError(
                "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together".into(),
            ));
        }

        Ok(AwsConfig {
            region,
            access_key,
            secret_key,
        })
    }
}

/// Parameters of the text-to-image request template.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub model_id: String,
    pub cfg_scale: u32,
    pub steps: u32,
    pub seed: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            model_id: DEFAULT_MODEL_ID.to_string(),
            cfg_scale: 10,
            steps: 30,
            seed: 0,
        }
    }
}

impl GenerationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_cfg_scale(mut self, cfg_scale: u32) -> Self {
        self.cfg_scale = cfg_scale;
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.model_id.trim().is_empty() {
            return Err(PosterError::ConfigError("MODEL_ID must not be empty".into()));
        }
        if self.cfg_scale > 35 {
            return Err(PosterError::ConfigError(format!(
                "CFG_SCALE must be within 0..=35, got {}",
                self.cfg_scale
            )));
        }
        if !(10..=150).contains(&self.steps) {
            return Err(PosterError::ConfigError(format!(
                "STEPS must be within 10..=150, got {}",
                self.steps
            )));
        }
        Ok(())
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(GenerationConfig {
            model_id: lookup("MODEL_ID").unwrap_or(defaults.model_id),
            cfg_scale: parse_var(lookup, "CFG_SCALE")?.unwrap_or(defaults.cfg_scale),
            steps: parse_var(lookup, "STEPS")?.unwrap_or(defaults.steps),
            seed: parse_var(lookup, "SEED")?.unwrap_or(defaults.seed),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    pub bucket: String,
    pub extension: String,
    pub url_expiry_secs: u64,
    pub unique_keys: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            bucket: DEFAULT_BUCKET_NAME.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            url_expiry_secs: DEFAULT_URL_EXPIRY_SECS,
            unique_keys: false,
        }
    }
}

impl StorageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_url_expiry(mut self, secs: u64) -> Self {
        self.url_expiry_secs = secs;
        self
    }

    pub fn with_unique_keys(mut self, enabled: bool) -> Self {
        self.unique_keys = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(PosterError::ConfigError("BUCKET_NAME must not be empty".into()));
        }
        if !is_valid_extension(&self.extension) {
            return Err(PosterError::ConfigError(format!(
                "IMAGE_EXTENSION must be ASCII alphanumeric, got '{}'",
                self.extension
            )));
        }
        if !(1..=MAX_URL_EXPIRY_SECS).contains(&self.url_expiry_secs) {
            return Err(PosterError::ConfigError(format!(
                "URL_EXPIRY_SECS must be within 1..={}, got {}",
                MAX_URL_EXPIRY_SECS, self.url_expiry_secs
            )));
        }
        Ok(())
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(StorageConfig {
            bucket: lookup("BUCKET_NAME").unwrap_or(defaults.bucket),
            extension: lookup("IMAGE_EXTENSION").unwrap_or(defaults.extension),
            url_expiry_secs: parse_var(lookup, "URL_EXPIRY_SECS")?
                .unwrap_or(defaults.url_expiry_secs),
            unique_keys: parse_var(lookup, "UNIQUE_KEYS")?.unwrap_or(defaults.unique_keys),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub port: Option<u16>,
    pub aws: AwsConfig,
    pub generation: GenerationConfig,
    pub storage: StorageConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_aws(mut self, config: AwsConfig) -> Self {
        self.aws = config;
        self
    }

    pub fn with_generation(mut self, config: GenerationConfig) -> Self {
        self.generation = config;
        self
    }

    pub fn with_storage(mut self, config: StorageConfig) -> Self {
        self.storage = config;
        self
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolves every setting through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let config = Config {
            port: parse_var(&lookup, "PORT")?,
            aws: AwsConfig::from_lookup(&lookup)?,
            generation: GenerationConfig::from_lookup(&lookup)?,
            storage: StorageConfig::from_lookup(&lookup)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.generation.validate()?;
        self.storage.validate()
    }
}

pub(crate) fn is_valid_extension(extension: &str) -> bool {
    !extension.is_empty() && extension.chars().all(|c| c.is_ascii_alphanumeric())
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                PosterError::ConfigError(format!("invalid value '{}' for {}: {}", raw, key, e))
            })
        })
        .transpose()
}
