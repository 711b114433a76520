use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use backend_domain::RealtimeMessage;

const COUNTER_HEADER: &str = "x-counter-name";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("stream error: {0}")]
    Stream(String),
    #[error("connection closed by peer")]
    Closed,
}

/// Opens push connections. Each call yields a fresh connection.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Connection>, TransportError>;
}

#[async_trait]
pub trait Connection: Send {
    /// Waits for the next relayed message. Any error ends the connection.
    async fn recv(&mut self) -> Result<RealtimeMessage, TransportError>;
}

/// Connects to the server's `/api/ws` relay.
#[derive(Debug, Clone)]
pub struct WsTransport {
    url: String,
    token: Option<String>,
    counter_name: Option<String>,
}

impl WsTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
            counter_name: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_counter(mut self, counter_name: impl Into<String>) -> Self {
        self.counter_name = Some(counter_name.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn header_value(value: &str) -> Result<HeaderValue, TransportError> {
    HeaderValue::from_str(value).map_err(|err| TransportError::Connect(err.to_string()))
}

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self) -> Result<Box<dyn Connection>, TransportError> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|err| TransportError::Connect(err.to_string()))?;
        if let Some(token) = self.token.as_deref().filter(|raw| !raw.trim().is_empty()) {
            request
                .headers_mut()
                .insert(AUTHORIZATION, header_value(&format!("Bearer {}", token.trim()))?);
        }
        if let Some(counter) = self.counter_name.as_deref().filter(|raw| !raw.trim().is_empty()) {
            request
                .headers_mut()
                .insert(COUNTER_HEADER, header_value(counter.trim())?);
        }
        let (socket, _) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;
        debug!(url = %self.url, "realtime socket opened");
        Ok(Box::new(WsConnection { socket }))
    }
}

struct WsConnection {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connection for WsConnection {
    async fn recv(&mut self) -> Result<RealtimeMessage, TransportError> {
        while let Some(next) = self.socket.next().await {
            match next {
                Ok(Message::Text(text)) => match serde_json::from_str::<RealtimeMessage>(&text) {
                    Ok(message) => return Ok(message),
                    Err(err) => warn!("skipping unreadable realtime frame: {}", err),
                },
                Ok(Message::Ping(bytes)) => {
                    self.socket
                        .send(Message::Pong(bytes))
                        .await
                        .map_err(|err| TransportError::Stream(err.to_string()))?;
                }
                Ok(Message::Close(frame)) => {
                    debug!("realtime socket closed by peer: {:?}", frame);
                    return Err(TransportError::Closed);
                }
                Ok(_) => {}
                Err(err) => return Err(TransportError::Stream(err.to_string())),
            }
        }
        Err(TransportError::Closed)
    }
}
