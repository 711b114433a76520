// Runtime configuration handed to the application layer

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub session_secret: String,
    pub session_ttl_minutes: u64,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub broadcast_buffer: usize,
    pub keepalive_seconds: u64,
    pub draw_retry_limit: u32,
    pub min_reversal_reason_len: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3300".to_string(),
            session_secret: String::new(),
            session_ttl_minutes: 720,
            max_body_bytes: 2 * 1024 * 1024,
            request_timeout_seconds: 15,
            broadcast_buffer: 256,
            keepalive_seconds: 15,
            draw_retry_limit: 8,
            min_reversal_reason_len: 5,
        }
    }
}
