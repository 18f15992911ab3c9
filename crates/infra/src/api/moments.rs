//! HTTP implementation of the moment-requests port.
//!
//! Talks to the backend REST API and maps transport-level outcomes into
//! domain errors. Server-side conditions the client has to recognize
//! ("calendar not found", "already granted") arrive as message text in
//! error bodies, so classification is by substring.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use momentum_core::realtime::ports::{CredentialProvider, MomentRequestApi};
use momentum_domain::{MeetingRequest, MomentumError, PendingDraft, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::http::HttpClient;

/// Configuration for the moments API adapter.
#[derive(Debug, Clone)]
pub struct MomentsApiConfig {
    /// Base URL for the backend (e.g. "https://api.example.com/v1").
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Total attempts per request (initial try + retries).
    pub max_attempts: usize,
}

impl Default for MomentsApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout: Duration::from_secs(30),
            max_attempts: 3,
        }
    }
}

/// REST client for meeting-request operations.
pub struct MomentsApiClient {
    http: HttpClient,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

#[derive(Deserialize)]
struct RequestListEnvelope {
    requests: Vec<MeetingRequest>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequestBody<'a> {
    receiver_id: &'a str,
    start_time: String,
    end_time: String,
    title: &'a str,
    description: Option<&'a str>,
    meeting_type: &'a str,
}

#[derive(Serialize)]
struct RespondBody {
    approved: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VisibilityBody<'a> {
    user_id: &'a str,
}

impl MomentsApiClient {
    pub fn new(
        config: MomentsApiConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .max_attempts(config.max_attempts)
            .build()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url, credentials })
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self
            .credentials
            .bearer_token()
            .ok_or_else(|| MomentumError::Auth("no session token available".to_string()))?;
        let url = format!("{}{}", self.base_url, path);
        Ok(self
            .http
            .request(method, url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json"))
    }

    async fn fetch_list(&self, path: &str) -> Result<Vec<MeetingRequest>> {
        let response = self.http.send(self.authed(Method::GET, path)?).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }
        let envelope: RequestListEnvelope = response
            .json()
            .await
            .map_err(|e| MomentumError::Internal(format!("failed to decode {path}: {e}")))?;
        Ok(envelope.requests)
    }
}

#[async_trait]
impl MomentRequestApi for MomentsApiClient {
    /// Fetch the authoritative snapshot: received and sent requests,
    /// merged and de-duplicated by id.
    #[instrument(skip(self))]
    async fn fetch_requests(&self) -> Result<Vec<MeetingRequest>> {
        let received = self.fetch_list("/users/moment-requests/received").await?;
        let sent = self.fetch_list("/users/moment-requests/sent").await?;

        let mut merged = received;
        for request in sent {
            if !merged.iter().any(|r| r.id == request.id) {
                merged.push(request);
            }
        }
        debug!(count = merged.len(), "fetched meeting requests");
        Ok(merged)
    }

    #[instrument(skip(self, draft), fields(receiver = %draft.receiver_id))]
    async fn create_request(&self, draft: &PendingDraft) -> Result<MeetingRequest> {
        let interval = draft.interval()?;
        let body = CreateRequestBody {
            receiver_id: &draft.receiver_id,
            start_time: interval.start.to_rfc3339(),
            end_time: interval.end.to_rfc3339(),
            title: &draft.title,
            description: draft.notes.as_deref(),
            meeting_type: &draft.meeting_type,
        };

        let builder = self.authed(Method::POST, "/users/moment-requests")?.json(&body);
        let response = self.http.send(builder).await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &text));
        }
        response
            .json()
            .await
            .map_err(|e| MomentumError::Internal(format!("failed to decode created request: {e}")))
    }

    #[instrument(skip(self))]
    async fn respond(&self, id: &str, approved: bool) -> Result<()> {
        let path = format!("/users/moment-requests/{id}/respond");
        let builder = self.authed(Method::POST, &path)?.json(&RespondBody { approved });
        let response = self.http.send(builder).await?;
        expect_success(response).await
    }

    #[instrument(skip(self))]
    async fn cancel(&self, id: &str) -> Result<()> {
        let path = format!("/users/moment-requests/{id}");
        let response = self.http.send(self.authed(Method::DELETE, &path)?).await?;
        expect_success(response).await
    }

    /// Grant the given user visibility into our calendar. The backend
    /// reports an already-existing grant as an error; that outcome is
    /// success from the client's point of view.
    #[instrument(skip(self))]
    async fn grant_visibility(&self, user_id: &str) -> Result<()> {
        let builder =
            self.authed(Method::POST, "/users/visibility")?.json(&VisibilityBody { user_id });
        let response = self.http.send(builder).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if body.to_lowercase().contains("already granted") {
            debug!(user_id, "visibility already granted");
            return Ok(());
        }
        Err(classify_failure(status, &body))
    }
}

async fn expect_success(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    warn!(%status, "request rejected by backend");
    Err(classify_failure(status, &body))
}

/// Map an unsuccessful response into a domain error. Message-text
/// conditions take priority over status codes because the backend is
/// not consistent about which status carries them.
fn classify_failure(status: StatusCode, body: &str) -> MomentumError {
    let lower = body.to_lowercase();
    if lower.contains("calendar not found") {
        return MomentumError::CalendarNotFound(body.to_string());
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        MomentumError::Auth(body.to_string())
    } else if status == StatusCode::NOT_FOUND {
        MomentumError::NotFound(body.to_string())
    } else if status == StatusCode::CONFLICT {
        MomentumError::Conflict(body.to_string())
    } else if status.is_client_error() {
        MomentumError::InvalidInput(body.to_string())
    } else {
        MomentumError::Network(format!("backend returned {status}: {body}"))
    }
}
