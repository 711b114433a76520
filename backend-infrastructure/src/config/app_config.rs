use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use crate::config::validate_log_format;
use backend_domain::RuntimeConfig;

const SESSION_SECRET_MIN_LEN: usize = 16;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    /// JSON snapshot file; empty keeps everything in memory.
    pub data_path: String,
    pub operators_path: String,
    /// Random per process when unset, which invalidates sessions on restart.
    pub session_secret: Option<String>,
    pub session_ttl_minutes: u64,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub broadcast_buffer: usize,
    pub keepalive_seconds: u64,
    pub draw_retry_limit: u32,
    pub min_reversal_reason_len: usize,
    pub log_dir: Option<String>,
    pub log_format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3300".to_string(),
            data_path: "./data/checkin.json".to_string(),
            operators_path: "./operators.yaml".to_string(),
            session_secret: None,
            session_ttl_minutes: 720,
            max_body_bytes: 2 * 1024 * 1024,
            request_timeout_seconds: 15,
            broadcast_buffer: 256,
            keepalive_seconds: 15,
            draw_retry_limit: 8,
            min_reversal_reason_len: 5,
            log_dir: None,
            log_format: "text".to_string(),
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("CHECKIN_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str::<AppConfig>(&content)?
        } else {
            warn!(path = %path, "config file not found, using defaults");
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.session_secret = self
            .session_secret
            .take()
            .map(|secret| secret.trim().to_string())
            .filter(|secret| !secret.is_empty());
        self.log_dir = self
            .log_dir
            .take()
            .map(|dir| dir.trim().to_string())
            .filter(|dir| !dir.is_empty());
        self.data_path = self.data_path.trim().to_string();
        self.operators_path = self.operators_path.trim().to_string();
        self.log_format = self.log_format.trim().to_lowercase();
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.data_path = resolve_path(base, &self.data_path);
        self.operators_path = resolve_path(base, &self.operators_path);
        if let Some(dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base, dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }
        if self.broadcast_buffer == 0 {
            return Err(anyhow!("broadcast_buffer must be greater than 0"));
        }
        if self.keepalive_seconds == 0 {
            return Err(anyhow!("keepalive_seconds must be greater than 0"));
        }
        if self.session_ttl_minutes == 0 {
            return Err(anyhow!("session_ttl_minutes must be greater than 0"));
        }
        if let Some(secret) = &self.session_secret {
            if secret.len() < SESSION_SECRET_MIN_LEN {
                return Err(anyhow!(
                    "session_secret must be at least {} characters",
                    SESSION_SECRET_MIN_LEN
                ));
            }
        }
        validate_log_format(&self.log_format)?;
        Ok(())
    }

    pub fn snapshot_path(&self) -> Option<&str> {
        Some(self.data_path.as_str()).filter(|path| !path.is_empty())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        let session_secret = self.session_secret.clone().unwrap_or_else(|| {
            warn!("session_secret not set, sessions will not survive a restart");
            random_secret()
        });
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            session_secret,
            session_ttl_minutes: self.session_ttl_minutes,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            broadcast_buffer: self.broadcast_buffer,
            keepalive_seconds: self.keepalive_seconds,
            draw_retry_limit: self.draw_retry_limit,
            min_reversal_reason_len: self.min_reversal_reason_len,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("CHECKIN_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("CHECKIN_DATA_PATH") {
            self.data_path = value;
        }
        if let Ok(value) = env::var("CHECKIN_OPERATORS_PATH") {
            self.operators_path = value;
        }
        if let Ok(value) = env::var("CHECKIN_SESSION_SECRET") {
            self.session_secret = Some(value);
        }
        if let Ok(value) = env::var("CHECKIN_SESSION_TTL_MINUTES") {
            self.session_ttl_minutes = value.parse().unwrap_or(self.session_ttl_minutes);
        }
        if let Ok(value) = env::var("CHECKIN_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("CHECKIN_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("CHECKIN_BROADCAST_BUFFER") {
            self.broadcast_buffer = value.parse().unwrap_or(self.broadcast_buffer);
        }
        if let Ok(value) = env::var("CHECKIN_KEEPALIVE_SECONDS") {
            self.keepalive_seconds = value.parse().unwrap_or(self.keepalive_seconds);
        }
        if let Ok(value) = env::var("CHECKIN_DRAW_RETRY_LIMIT") {
            self.draw_retry_limit = value.parse().unwrap_or(self.draw_retry_limit);
        }
        if let Ok(value) = env::var("CHECKIN_MIN_REVERSAL_REASON_LEN") {
            self.min_reversal_reason_len = value.parse().unwrap_or(self.min_reversal_reason_len);
        }
        if let Ok(value) = env::var("CHECKIN_LOG_DIR") {
            self.log_dir = Some(value);
        }
        if let Ok(value) = env::var("CHECKIN_LOG_FORMAT") {
            self.log_format = value;
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}
