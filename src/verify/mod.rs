//! Ticket verification subsystem.
//!
//! Accepted scan payloads are opaque URLs pointing at the remote ticket
//! authority. One verification call is made per accepted payload and every
//! possible result, including transport failure, is absorbed into one of the
//! fixed outcome categories.
//!
//! # Architecture
//!
//! ```text
//! accepted payload (URL)
//!        │
//!        ▼
//! ┌─────────────────────┐
//! │ Single HTTP GET     │
//! └─────────┬───────────┘
//!           │
//!    ┌──────┴────────┐
//!    │               │
//! TRANSPORT OK   TRANSPORT FAIL
//!    │               │
//!    ▼               ▼
//! Parse JSON    VerificationError
//!    │
//!    ├── malformed ──────> VerificationError
//!    │
//!    ▼
//! Status text ("message" over "status")
//!    │
//!    ▼
//! Classifier ──> Confirmed | Cancelled | PrepaidEarly
//!                | AlreadyUsed | NotFound
//! ```

mod classify;
mod client;

pub use classify::{classify, OutcomeCategory, Tone};
pub use client::VerificationClient;

use async_trait::async_trait;

/// Result of one verification attempt.
#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    /// The classified outcome.
    pub category: OutcomeCategory,
    /// The parsed response body, when one was structurally valid JSON.
    pub raw_details: Option<serde_json::Value>,
}

impl VerificationOutcome {
    /// Outcome with no response body, used for transport-level failures.
    #[must_use]
    pub fn bare(category: OutcomeCategory) -> Self {
        Self {
            category,
            raw_details: None,
        }
    }
}

/// A remote authority that can verify a scanned payload.
///
/// Implementations must absorb every failure into an outcome: the scan
/// session renders exactly one category per attempt and never sees a
/// transport error directly.
#[async_trait]
pub trait TicketAuthority: Send + Sync {
    /// Verify one accepted payload, making exactly one remote call.
    async fn verify(&self, payload: &str) -> VerificationOutcome;
}
