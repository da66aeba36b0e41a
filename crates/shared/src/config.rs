//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Upload handling configuration.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Object storage connection parameters.
///
/// Loaded once at startup and handed to the storage factory by reference.
#[derive(Clone, Deserialize)]
pub struct StorageConfig {
    /// Backend discriminator (`"MinIO"` or `"Local"`).
    #[serde(default = "default_storage_kind")]
    pub kind: String,
    /// Object store endpoint as `host[:port]`, without scheme.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Access key.
    #[serde(default)]
    pub access_key: String,
    /// Secret key.
    #[serde(default)]
    pub secret_key: String,
    /// Target bucket.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Talk to the endpoint over TLS.
    #[serde(default)]
    pub use_ssl: bool,
    /// Signing region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Root directory for the local filesystem backend.
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl StorageConfig {
    /// URL scheme implied by the TLS flag.
    #[must_use]
    pub fn scheme(&self) -> &'static str {
        if self.use_ssl { "https" } else { "http" }
    }

    /// Endpoint with scheme, e.g. `http://localhost:9000`.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        format!("{}://{}", self.scheme(), self.endpoint)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: default_storage_kind(),
            endpoint: default_endpoint(),
            access_key: String::new(),
            secret_key: String::new(),
            bucket: default_bucket(),
            use_ssl: false,
            region: default_region(),
            root: default_root(),
        }
    }
}

// Credentials stay out of logs.
impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("kind", &self.kind)
            .field("endpoint", &self.endpoint)
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("use_ssl", &self.use_ssl)
            .field("region", &self.region)
            .field("root", &self.root)
            .finish()
    }
}

fn default_storage_kind() -> String {
    "MinIO".to_string()
}

fn default_endpoint() -> String {
    "localhost:9000".to_string()
}

fn default_bucket() -> String {
    "uploads".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from("./storage")
}

/// Upload handling configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadConfig {
    /// Directory for spooled upload parts. Falls back to the OS temp dir.
    #[serde(default)]
    pub spool_dir: Option<PathBuf>,
    /// Optional request body cap in bytes. Unlimited when unset.
    #[serde(default)]
    pub max_body_bytes: Option<usize>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default level for Stowage crates when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("STOWAGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
