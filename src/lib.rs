//! At-the-door ticket verification engine.
//!
//! scangate consumes QR decode events from an external scan source, debounces
//! repeated scans of the same code, verifies each accepted payload against a
//! remote ticket authority over HTTP, classifies the response into a closed
//! outcome vocabulary, and drives a three-mode scan session that the operator
//! resumes explicitly after every result.
//!
//! # Architecture
//!
//! ```text
//! decode feed ──> duplicate suppressor ──> verification client ──> classifier
//!                        │                        │                    │
//!                        └────────── scan session state machine <─────┘
//!                                         │
//!                            operator retry resumes scanning
//! ```
//!
//! The session is single-threaded-cooperative: decode events and operator
//! actions are serialized through one input channel and processed to
//! completion one at a time. The verification call is the only suspension
//! point, so at most one call is ever in flight.
//!
//! # Example
//!
//! ```rust,ignore
//! use scangate::{ScannerConfig, SessionBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = SessionBuilder::new(ScannerConfig::default()).build()?;
//!
//!     // Wire the camera callback to the session.
//!     let handle = session.handle();
//!     // on each frame: handle.decode(decoded_text, decode_error);
//!     // on the operator's retry button: handle.retry();
//!
//!     // Render events on the host surface.
//!     let mut events = session.subscribe_events();
//!
//!     session.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dedup;
pub mod error;
pub mod event;
pub mod feed;
pub mod session;
pub mod verify;

pub use config::{ScannerConfig, VerifyConfig};
pub use error::{Error, Result};
pub use event::{SessionEvent, SessionEventsChannel, SessionEventsSender};
pub use session::{RunningSession, ScanMode, SessionBuilder, SessionHandle, SessionStats};
pub use verify::{
    classify, OutcomeCategory, TicketAuthority, Tone, VerificationClient, VerificationOutcome,
};
