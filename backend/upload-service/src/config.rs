/// Configuration management for upload-service
///
/// Loads configuration from environment variables with sensible defaults.
/// The resulting `Config` is built once at startup and handed to every
/// component by reference; nothing reads the environment after that.
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use video_core::constants::DEFAULT_MAX_BODY_BYTES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub downstream: DownstreamConfig,
    pub transcode: TranscodeConfig,
    pub lifecycle: LifecycleConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base used to build public playback links
    pub public_url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub max_body_bytes: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DownstreamConfig {
    /// Catalog (social) service base URL
    pub catalog_url: String,
    pub search_url: String,
    pub thumbnail_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TranscodeConfig {
    pub ffmpeg_path: String,
    /// 0 means unbounded
    pub max_concurrent: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LifecycleConfig {
    pub port_release_timeout_ms: u64,
    pub port_poll_interval_ms: u64,
    pub reclaim_port: bool,
    pub shutdown_grace_secs: u64,
}

impl DownstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TranscodeConfig {
    pub fn concurrency_limit(&self) -> Option<usize> {
        (self.max_concurrent > 0).then_some(self.max_concurrent)
    }
}

impl LifecycleConfig {
    pub fn port_release_timeout(&self) -> Duration {
        Duration::from_millis(self.port_release_timeout_ms)
    }

    pub fn port_poll_interval(&self) -> Duration {
        Duration::from_millis(self.port_poll_interval_ms)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        Ok(Config {
            app: AppConfig {
                host: env.string("UPLOAD_SERVICE_HOST", "0.0.0.0"),
                port: env.parse("UPLOAD_SERVICE_PORT", 3001)?,
                public_url: env.string("PUBLIC_URL", "http://localhost:3001"),
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&env.string("CORS_ALLOW_ORIGINS", "*")),
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from(env.string("UPLOAD_DIR", "./uploads")),
                max_body_bytes: env.parse("UPLOAD_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            },
            downstream: DownstreamConfig {
                catalog_url: trim_base(env.string("SOCIAL_SERVICE_URL", "http://localhost:3002")),
                search_url: trim_base(env.string("SEARCH_SERVICE_URL", "http://localhost:8080")),
                thumbnail_base_url: env
                    .string("THUMBNAIL_BASE_URL", "https://picsum.photos/seed"),
                timeout_secs: env.parse("DOWNSTREAM_TIMEOUT_SECS", 30)?,
            },
            transcode: TranscodeConfig {
                ffmpeg_path: env.string("FFMPEG_PATH", "ffmpeg"),
                max_concurrent: env.parse("MAX_CONCURRENT_TRANSCODES", 0)?,
            },
            lifecycle: LifecycleConfig {
                port_release_timeout_ms: env.parse("PORT_RELEASE_TIMEOUT_MS", 3000)?,
                port_poll_interval_ms: env.parse("PORT_POLL_INTERVAL_MS", 300)?,
                reclaim_port: env.parse("PORT_RECLAIM", true)?,
                shutdown_grace_secs: env.parse("SHUTDOWN_GRACE_SECS", 30)?,
            },
        })
    }
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, key: &'static str, fallback: &str) -> String {
        match (self.lookup)(key) {
            Some(value) => value,
            None => {
                tracing::info!("{} not set, defaulting to {}", key, fallback);
                fallback.to_string()
            }
        }
    }

    fn parse<T>(&self, key: &'static str, fallback: T) -> Result<T, ConfigError>
    where
        T: FromStr + std::fmt::Display,
        T::Err: std::fmt::Display,
    {
        match (self.lookup)(key) {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
            None => {
                tracing::info!("{} not set, defaulting to {}", key, fallback);
                Ok(fallback)
            }
        }
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
