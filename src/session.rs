//! Scan session state machine.
//!
//! One session spans the lifetime of an open scanning surface. Decode events
//! and operator actions are serialized through a single input channel and
//! processed to completion one at a time; the verification call is the only
//! suspension point, so at most one call is in flight by construction.
//!
//! The transition logic itself lives in [`SessionCore`], a pure function of
//! `(state, event)`, independent of the channels that drive it.

use crate::config::ScannerConfig;
use crate::dedup::RecentScanGuard;
use crate::error::Result;
use crate::event::{create_event_channel, SessionEvent, SessionEventsChannel, SessionEventsSender};
use crate::verify::{TicketAuthority, Tone, VerificationClient, VerificationOutcome};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Current mode of a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Watching the decode feed for the next code.
    Scanning,
    /// A verification call is in flight.
    Processing,
    /// An outcome is on screen, waiting for the operator to resume.
    ResultShown,
}

impl ScanMode {
    /// Short label for presentation surfaces.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Scanning => "Scanning",
            Self::Processing => "Processing",
            Self::ResultShown => "Result",
        }
    }

    /// Visual tone of the mode itself; the outcome carries its own tone once
    /// a result is shown.
    #[must_use]
    pub fn tone(self) -> Tone {
        match self {
            Self::Scanning | Self::ResultShown => Tone::Neutral,
            Self::Processing => Tone::Busy,
        }
    }
}

/// Inputs accepted by a running session.
#[derive(Debug)]
enum SessionInput {
    /// One decode attempt from the scan source.
    Decode {
        text: Option<String>,
        error: Option<String>,
    },
    /// Operator pressed retry.
    Retry,
    /// Host surface is closing.
    Close,
}

/// What the transition core wants done after a decode event.
#[derive(Debug, PartialEq, Eq)]
enum Action {
    /// No transition; empty frame, or the mode is not `Scanning`.
    Ignored,
    /// Repeated payload inside the debounce window.
    Suppressed,
    /// Open a verification call for this payload.
    Verify(String),
}

/// Pure transition logic for one scan session.
///
/// Exclusively owns the mode, the last outcome, and the single retained
/// dedup entry. Constructed fresh per session; nothing outlives the host
/// surface.
#[derive(Debug)]
struct SessionCore {
    mode: ScanMode,
    last_outcome: Option<VerificationOutcome>,
    guard: RecentScanGuard,
}

impl SessionCore {
    fn new() -> Self {
        Self {
            mode: ScanMode::Scanning,
            last_outcome: None,
            guard: RecentScanGuard::new(),
        }
    }

    /// Decode events only act while `Scanning`; empty payloads never
    /// transition.
    fn on_decode(&mut self, text: Option<&str>, now: Instant) -> Action {
        if self.mode != ScanMode::Scanning {
            return Action::Ignored;
        }

        let Some(payload) = text.filter(|t| !t.is_empty()) else {
            return Action::Ignored;
        };

        if !self.guard.should_accept(payload, now) {
            return Action::Suppressed;
        }

        self.mode = ScanMode::Processing;
        Action::Verify(payload.to_owned())
    }

    /// A verification resolved, with any outcome.
    fn on_outcome(&mut self, outcome: VerificationOutcome) {
        self.mode = ScanMode::ResultShown;
        self.last_outcome = Some(outcome);
    }

    /// Operator retry: valid in any mode, clears the outcome but keeps the
    /// retained dedup entry so an immediate re-scan of the same code stays
    /// suppressed.
    fn on_retry(&mut self) {
        self.mode = ScanMode::Scanning;
        self.last_outcome = None;
    }
}

/// Counters for one scan session.
#[derive(Debug, Default, Clone)]
pub struct SessionStats {
    /// Decode attempts received, including empty frames.
    pub frames: u64,
    /// Decode attempts that carried a source error.
    pub decode_failures: u64,
    /// Payloads accepted for verification.
    pub accepted: u64,
    /// Repeated payloads suppressed inside the debounce window.
    pub suppressed: u64,
    /// Operator retry actions.
    pub retries: u64,
    /// Frames dropped because the input channel was full.
    pub dropped: u64,
}

/// Producer-side handle for feeding a running session.
///
/// Clone freely. Decode delivery uses `try_send` and drops the frame when the
/// channel is full: the source outpaces the session by design, and a stale
/// frame has no value once the mode has left `Scanning`.
#[derive(Clone)]
pub struct SessionHandle {
    input_tx: mpsc::Sender<SessionInput>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    stats: Arc<Mutex<SessionStats>>,
}

impl SessionHandle {
    /// Deliver one decode attempt from the scan source.
    ///
    /// Mirrors the decode callback shape: `text` when a code was read,
    /// `error` when the source failed on this frame, neither when the frame
    /// held no code.
    pub fn decode(&self, text: Option<String>, error: Option<String>) {
        if self
            .input_tx
            .try_send(SessionInput::Decode { text, error })
            .is_err()
        {
            self.stats.lock().dropped += 1;
            debug!("Input channel full, dropping decode frame");
        }
    }

    /// Trigger the operator retry action.
    pub fn retry(&self) {
        if self.input_tx.try_send(SessionInput::Retry).is_err() {
            warn!("Input channel full, retry dropped");
        }
    }

    /// Close the session, as when the host surface closes.
    pub fn close(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Snapshot of the session counters.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.stats.lock().clone()
    }
}

/// Builder for constructing a scan session.
pub struct SessionBuilder {
    config: ScannerConfig,
    authority: Option<Arc<dyn TicketAuthority>>,
}

impl SessionBuilder {
    /// Create a new session builder with the given configuration.
    #[must_use]
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            config,
            authority: None,
        }
    }

    /// Replace the default HTTP authority, e.g. with a scripted one in tests.
    #[must_use]
    pub fn with_authority(mut self, authority: Arc<dyn TicketAuthority>) -> Self {
        self.authority = Some(authority);
        self
    }

    /// Build the session runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP verification client fails to initialize.
    pub fn build(self) -> Result<RunningSession> {
        let authority: Arc<dyn TicketAuthority> = match self.authority {
            Some(authority) => authority,
            None => Arc::new(VerificationClient::new(&self.config.verify)?),
        };

        let (input_tx, input_rx) = mpsc::channel(self.config.input_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (events_tx, events_rx) = create_event_channel();

        info!(
            "Scan session ready (verify timeout: {}s)",
            self.config.verify.timeout_secs
        );

        Ok(RunningSession {
            core: SessionCore::new(),
            authority,
            input_tx,
            input_rx,
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
            events_tx,
            events_rx: Some(events_rx),
            stats: Arc::new(Mutex::new(SessionStats::default())),
        })
    }
}

/// A running scan session.
pub struct RunningSession {
    core: SessionCore,
    authority: Arc<dyn TicketAuthority>,
    input_tx: mpsc::Sender<SessionInput>,
    input_rx: mpsc::Receiver<SessionInput>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
    events_tx: SessionEventsSender,
    events_rx: Option<SessionEventsChannel>,
    stats: Arc<Mutex<SessionStats>>,
}

impl RunningSession {
    /// Handle for feeding decode events and operator actions.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            input_tx: self.input_tx.clone(),
            shutdown_tx: Arc::clone(&self.shutdown_tx),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Get the primary event receiver.
    ///
    /// Note: Can only be called once. Subsequent calls return None.
    pub fn events(&mut self) -> Option<SessionEventsChannel> {
        self.events_rx.take()
    }

    /// Subscribe to session events.
    #[must_use]
    pub fn subscribe_events(&self) -> SessionEventsChannel {
        self.events_tx.subscribe()
    }

    /// Current session mode.
    #[must_use]
    pub fn mode(&self) -> ScanMode {
        self.core.mode
    }

    /// Outcome of the most recent verification, if a result is on screen.
    #[must_use]
    pub fn last_outcome(&self) -> Option<&VerificationOutcome> {
        self.core.last_outcome.as_ref()
    }

    /// Snapshot of the session counters.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.stats.lock().clone()
    }

    /// Request the session to shut down.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Run the session until the host closes it.
    ///
    /// Inputs are processed to completion one at a time; the verification
    /// call is awaited inline, so no decode event can open a second call
    /// while one is in flight. Decode events queued during a verification are
    /// observed afterwards, find the mode is no longer `Scanning`, and are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the session encounters a fatal error; every
    /// verification failure is absorbed into an outcome instead.
    pub async fn run(&mut self) -> Result<()> {
        info!("Scan session started");
        let _ = self.events_tx.send(SessionEvent::Started);

        loop {
            tokio::select! {
                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("Shutdown requested");
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Ctrl-C received, closing scan session");
                    break;
                }
                input = self.input_rx.recv() => {
                    match input {
                        Some(SessionInput::Close) => {
                            info!("Host surface closed");
                            break;
                        }
                        Some(input) => self.handle_input(input).await,
                        None => {
                            debug!("All input handles dropped");
                            break;
                        }
                    }
                }
            }
        }

        let _ = self.events_tx.send(SessionEvent::ShuttingDown);
        let stats = self.stats();
        info!(
            "Scan session closed ({} accepted, {} suppressed, {} decode failures)",
            stats.accepted, stats.suppressed, stats.decode_failures
        );
        Ok(())
    }

    async fn handle_input(&mut self, input: SessionInput) {
        match input {
            SessionInput::Decode { text, error } => {
                self.stats.lock().frames += 1;

                if let Some(message) = error {
                    // Stream-level errors never block later frames.
                    warn!("Decode error from scan source: {message}");
                    self.stats.lock().decode_failures += 1;
                    let _ = self.events_tx.send(SessionEvent::DecodeFailed { message });
                }

                match self.core.on_decode(text.as_deref(), Instant::now()) {
                    Action::Verify(payload) => self.verify_accepted(payload).await,
                    Action::Suppressed => {
                        self.stats.lock().suppressed += 1;
                        if let Some(payload) = text {
                            let _ = self.events_tx.send(SessionEvent::ScanSuppressed { payload });
                        }
                    }
                    Action::Ignored => {}
                }
            }
            SessionInput::Retry => {
                info!("Operator retry, resuming scanning");
                self.stats.lock().retries += 1;
                self.core.on_retry();
                let _ = self.events_tx.send(SessionEvent::ModeChanged {
                    mode: ScanMode::Scanning,
                });
            }
            SessionInput::Close => {}
        }
    }

    async fn verify_accepted(&mut self, payload: String) {
        self.stats.lock().accepted += 1;
        info!("Scan accepted, verifying");
        let _ = self.events_tx.send(SessionEvent::ScanAccepted {
            payload: payload.clone(),
        });
        let _ = self.events_tx.send(SessionEvent::ModeChanged {
            mode: ScanMode::Processing,
        });

        let outcome = self.authority.verify(&payload).await;
        info!("Verification resolved: {:?}", outcome.category);

        let category = outcome.category;
        self.core.on_outcome(outcome);
        let _ = self.events_tx.send(SessionEvent::OutcomeReady { category });
        let _ = self.events_tx.send(SessionEvent::ModeChanged {
            mode: ScanMode::ResultShown,
        });
    }
}
