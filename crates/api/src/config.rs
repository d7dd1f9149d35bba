use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Invalid or missing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, coloured output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Where uploaded images are written and how they are addressed.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory on disk (default: `./uploads`).
    pub dir: PathBuf,
    /// Base URL prepended to `/uploads/<name>` in responses.
    pub public_base_url: String,
    /// Per-file size limit in bytes.
    pub max_bytes: u64,
}

/// Optional text-generation endpoint.
#[derive(Debug, Clone)]
pub struct CopywriterConfig {
    pub url: String,
    pub api_key: Option<String>,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    pub uploads: UploadConfig,
    /// Nominatim-compatible search endpoint. Unset disables geocoding.
    pub geocoder_url: Option<String>,
    /// Unset disables description generation.
    pub copywriter: Option<CopywriterConfig>,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `UPLOAD_DIR`           | `./uploads`                |
    /// | `PUBLIC_BASE_URL`      | `http://localhost:{PORT}`  |
    /// | `MAX_UPLOAD_BYTES`     | `10485760`                 |
    /// | `GEOCODER_URL`         | unset (disabled)           |
    /// | `COPYWRITER_URL`       | unset (disabled)           |
    /// | `COPYWRITER_API_KEY`   | unset                      |
    /// | `LOG_FORMAT`           | `pretty`                   |
    ///
    /// JWT variables are documented on [`JwtConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_var("PORT", 3000)?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_var("REQUEST_TIMEOUT_SECS", 30)?;

        let uploads = UploadConfig {
            dir: PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".into())),
            public_base_url: optional_var("PUBLIC_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{port}")),
            max_bytes: parse_var(
                "MAX_UPLOAD_BYTES",
                estate_core::upload::DEFAULT_MAX_UPLOAD_BYTES,
            )?,
        };

        let copywriter = optional_var("COPYWRITER_URL").map(|url| CopywriterConfig {
            url,
            api_key: optional_var("COPYWRITER_API_KEY"),
        });

        let log_format = match optional_var("LOG_FORMAT") {
            None => LogFormat::default(),
            Some(value) => value.parse().map_err(|()| ConfigError::Invalid {
                var: "LOG_FORMAT",
                value,
            })?,
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env()?,
            uploads,
            geocoder_url: optional_var("GEOCODER_URL"),
            copywriter,
            log_format,
        })
    }
}

/// Read a variable, treating empty values as unset.
pub(crate) fn optional_var(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a variable, falling back to `default` when unset.
pub(crate) fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(var) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
