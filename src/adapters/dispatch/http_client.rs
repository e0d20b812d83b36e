//! HTTP dispatch client. Implements DispatchPort with one JSON POST per send.
//!
//! Any non-2xx reply, or a reply without `success: true`, becomes
//! `DispatchOutcome::Rejected` carrying the server's `error` text verbatim.

use crate::domain::{DispatchOutcome, DomainError, EmailDispatchRequest};
use crate::ports::DispatchPort;
use serde::Deserialize;
use tracing::{debug, warn};

pub struct HttpDispatchClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDispatchClient {
    /// `endpoint` is the full URL of the dispatch route, e.g. "http://127.0.0.1:3000/api/send-email".
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

/// Union of the success and error bodies; missing fields default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DispatchReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    file_size: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn outcome_from_reply(status_ok: bool, reply: DispatchReply) -> DispatchOutcome {
    if status_ok && reply.success {
        DispatchOutcome::Sent {
            message_id: reply.message_id.unwrap_or_default(),
            file_name: reply.file_name.unwrap_or_default(),
            file_size: reply.file_size.unwrap_or_default(),
        }
    } else {
        // Empty error text is replaced by the session's fallback message.
        DispatchOutcome::Rejected {
            error: reply.error.unwrap_or_default(),
        }
    }
}

#[async_trait::async_trait]
impl DispatchPort for HttpDispatchClient {
    async fn dispatch(
        &self,
        request: &EmailDispatchRequest,
    ) -> Result<DispatchOutcome, DomainError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| DomainError::Dispatch(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let reply: DispatchReply = response
            .json()
            .await
            .map_err(|e| DomainError::Dispatch(format!("unreadable reply ({}): {}", status, e)))?;

        if status.is_success() {
            debug!(%status, "dispatch reply received");
        } else {
            warn!(%status, error = ?reply.error, "dispatch server returned error");
        }
        Ok(outcome_from_reply(status.is_success(), reply))
    }
}
