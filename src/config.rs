// src/config.rs
use crate::errors::CarspotError;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Which remote endpoint the detect action calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectEndpoint {
    /// `POST /api/predict`, multipart field `file`.
    Predict,
    /// `POST /api/detect`, multipart field `image`.
    Detect,
}

impl DetectEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            DetectEndpoint::Predict => "/api/predict",
            DetectEndpoint::Detect => "/api/detect",
        }
    }

    pub fn field_name(self) -> &'static str {
        match self {
            DetectEndpoint::Predict => "file",
            DetectEndpoint::Detect => "image",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub admin_password: String,
    pub detect_endpoint: DetectEndpoint,
    pub seed_history: bool,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            detect_endpoint: DetectEndpoint::Predict,
            seed_history: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, CarspotError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CarspotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(bind) = lookup("CARSPOT_BIND") {
            config.bind = bind;
        }

        if let Some(url) = lookup("CARSPOT_API_BASE_URL") {
            let url = url.trim_end_matches('/').to_string();
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CarspotError::Config(format!(
                    "CARSPOT_API_BASE_URL must be an http(s) URL, got {url}"
                )));
            }
            config.api_base_url = url;
        }

        if let Some(secs) = lookup("CARSPOT_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                CarspotError::Config(format!("CARSPOT_REQUEST_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            if secs == 0 {
                return Err(CarspotError::Config(
                    "CARSPOT_REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
                ));
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(password) = lookup("CARSPOT_ADMIN_PASSWORD") {
            config.admin_password = password;
        }

        if let Some(endpoint) = lookup("CARSPOT_DETECT_ENDPOINT") {
            config.detect_endpoint = match endpoint.to_ascii_lowercase().as_str() {
                "predict" => DetectEndpoint::Predict,
                "detect" => DetectEndpoint::Detect,
                other => {
                    return Err(CarspotError::Config(format!(
                        "CARSPOT_DETECT_ENDPOINT must be 'predict' or 'detect', got {other}"
                    )));
                }
            };
        }

        if let Some(seed) = lookup("CARSPOT_SEED_HISTORY") {
            config.seed_history = match seed.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(CarspotError::Config(format!(
                        "CARSPOT_SEED_HISTORY must be a boolean, got {other}"
                    )));
                }
            };
        }

        if let Some(bytes) = lookup("CARSPOT_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = bytes.parse().map_err(|_| {
                CarspotError::Config(format!("CARSPOT_MAX_UPLOAD_BYTES is not a number: {bytes}"))
            })?;
            if config.max_upload_bytes == 0 {
                return Err(CarspotError::Config(
                    "CARSPOT_MAX_UPLOAD_BYTES must be greater than zero".to_string(),
                ));
            }
        }

        Ok(config)
    }
}
