//! Streaming HTTP implementation of the realtime transport.
//!
//! The backend exposes the event channel as a long-lived HTTP response
//! carrying newline-delimited JSON. Each line is one [`WireEvent`]; the
//! response ending (for any reason) is the signal that the connection
//! dropped and the router should reconnect.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use momentum_core::realtime::ports::RealtimeTransport;
use momentum_core::WireEvent;
use momentum_domain::{MomentumError, Result};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::errors::InfraError;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Configuration for the streaming transport.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Base URL for the backend.
    pub base_url: String,
    /// Path of the streaming endpoint.
    pub stream_path: String,
    /// Timeout for establishing the connection. The response body itself
    /// has no deadline; it is expected to stay open.
    pub connect_timeout: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            stream_path: "/users/moment-requests/stream".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Realtime transport reading newline-delimited JSON from a streaming
/// HTTP response.
pub struct HttpStreamTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpStreamTransport {
    pub fn new(config: StreamConfig) -> Result<Self> {
        // No total timeout here: the stream stays open indefinitely.
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .no_proxy()
            .build()
            .map_err(|err| {
                let infra: InfraError = err.into();
                MomentumError::from(infra)
            })?;
        let url =
            format!("{}{}", config.base_url.trim_end_matches('/'), config.stream_path);
        Ok(Self { client, url })
    }
}

#[async_trait]
impl RealtimeTransport for HttpStreamTransport {
    async fn connect(&self, bearer_token: &str) -> Result<mpsc::Receiver<WireEvent>> {
        let response = self
            .client
            .get(&self.url)
            .header("Authorization", format!("Bearer {bearer_token}"))
            .send()
            .await
            .map_err(|e| MomentumError::Transport(format!("stream connect failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MomentumError::Transport(format!(
                "stream endpoint returned {status}"
            )));
        }

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        tokio::spawn(pump_lines(response, tx));
        Ok(rx)
    }
}

/// Read the response body and forward one decoded event per line.
/// Dropping `tx` at the end closes the channel, which the router reads
/// as a dropped connection.
async fn pump_lines(response: reqwest::Response, tx: mpsc::Sender<WireEvent>) {
    let mut body = response.bytes_stream();
    let mut buffer = Vec::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                debug!(error = %e, "event stream ended with an error");
                return;
            }
        };
        buffer.extend_from_slice(&chunk);

        while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<WireEvent>(line) {
                Ok(event) => {
                    if tx.send(event).await.is_err() {
                        // Receiver side went away; stop reading.
                        return;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "dropping undecodable stream line");
                }
            }
        }
    }
    debug!("event stream closed by the server");
}
