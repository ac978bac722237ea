//! HTTP client for the remote ticket authority.

use crate::config::VerifyConfig;
use crate::error::{Error, Result};
use crate::verify::classify::{classify, OutcomeCategory};
use crate::verify::{TicketAuthority, VerificationOutcome};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

/// Verifies payloads with a single HTTP GET per accepted scan.
///
/// The payload is treated as an opaque URL. The client never retries: one
/// call per acceptance, so the operator gets deterministic one-shot feedback
/// per physical scan. A bounded request timeout keeps the session from
/// sitting in `Processing` indefinitely.
pub struct VerificationClient {
    client: reqwest::Client,
}

impl VerificationClient {
    /// Create a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to initialize.
    pub fn new(config: &VerifyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

/// Extract the remote status text from a response body.
///
/// The `message` key takes precedence over `status`; both must be JSON
/// strings. Anything else reads as an empty status, which classifies as
/// `NotFound`.
fn status_text(body: &Value) -> &str {
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| body.get("status").and_then(Value::as_str))
        .unwrap_or("")
}

#[async_trait]
impl TicketAuthority for VerificationClient {
    async fn verify(&self, payload: &str) -> VerificationOutcome {
        debug!("Opening verification call");

        let response = match self.client.get(payload).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Verification request failed: {e}");
                return VerificationOutcome::bare(OutcomeCategory::VerificationError);
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Verification endpoint returned {status}");
            return VerificationOutcome::bare(OutcomeCategory::VerificationError);
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Verification response was not valid JSON: {e}");
                return VerificationOutcome::bare(OutcomeCategory::VerificationError);
            }
        };

        let category = classify(status_text(&body));
        debug!("Remote status classified as {category:?}");

        VerificationOutcome {
            category,
            raw_details: Some(body),
        }
    }
}
