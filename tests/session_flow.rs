//! End-to-end scan session scenarios driven through the public API.
//!
//! A scripted authority stands in for the remote verification endpoint so
//! the tests control every outcome and can observe how many calls are open
//! at once.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use async_trait::async_trait;
use scangate::{
    OutcomeCategory, ScanMode, ScannerConfig, SessionBuilder, SessionEvent, SessionHandle,
    SessionEventsChannel, TicketAuthority, VerificationOutcome,
};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Stand-in for the remote authority: pops scripted outcomes in order and
/// tracks how many calls are open concurrently.
struct ScriptedAuthority {
    outcomes: Mutex<VecDeque<VerificationOutcome>>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedAuthority {
    fn new(outcomes: Vec<VerificationOutcome>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TicketAuthority for ScriptedAuthority {
    async fn verify(&self, _payload: &str) -> VerificationOutcome {
        let open = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(open, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| VerificationOutcome::bare(OutcomeCategory::NotFound));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

fn confirmed() -> VerificationOutcome {
    VerificationOutcome {
        category: OutcomeCategory::Confirmed,
        raw_details: Some(json!({"message": "Confirmado"})),
    }
}

/// Build a session over the scripted authority, take the event receiver and
/// spawn the run loop.
fn start(
    authority: Arc<ScriptedAuthority>,
) -> (
    SessionHandle,
    SessionEventsChannel,
    JoinHandle<scangate::Result<()>>,
) {
    let mut session = SessionBuilder::new(ScannerConfig::default())
        .with_authority(authority)
        .build()
        .expect("session builds");

    let handle = session.handle();
    let events = session.events().expect("primary event receiver");
    let join = tokio::spawn(async move { session.run().await });
    (handle, events, join)
}

async fn next_event(events: &mut SessionEventsChannel) -> SessionEvent {
    timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("event within deadline")
        .expect("event channel open")
}

/// Wait until the session has fully processed `frames` decode inputs.
async fn settle(handle: &SessionHandle, frames: u64) {
    for _ in 0..200 {
        if handle.stats().frames >= frames {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("session did not process {frames} frames in time");
}

#[tokio::test]
async fn confirmed_scan_walks_the_full_event_sequence() {
    let authority = ScriptedAuthority::new(vec![confirmed()], Duration::from_millis(10));
    let (handle, mut events, join) = start(Arc::clone(&authority));

    assert!(matches!(next_event(&mut events).await, SessionEvent::Started));

    handle.decode(Some("https://x/y".to_owned()), None);

    match next_event(&mut events).await {
        SessionEvent::ScanAccepted { payload } => assert_eq!(payload, "https://x/y"),
        other => panic!("expected ScanAccepted, got {other:?}"),
    }
    assert!(matches!(
        next_event(&mut events).await,
        SessionEvent::ModeChanged { mode: ScanMode::Processing }
    ));
    match next_event(&mut events).await {
        SessionEvent::OutcomeReady { category } => {
            assert_eq!(category, OutcomeCategory::Confirmed);
        }
        other => panic!("expected OutcomeReady, got {other:?}"),
    }
    assert!(matches!(
        next_event(&mut events).await,
        SessionEvent::ModeChanged { mode: ScanMode::ResultShown }
    ));

    handle.close();
    join.await.expect("join").expect("clean shutdown");
}

#[tokio::test]
async fn repeat_decode_while_result_shown_is_ignored() {
    let authority = ScriptedAuthority::new(vec![confirmed()], Duration::from_millis(10));
    let (handle, mut events, join) = start(authority);

    handle.decode(Some("https://x/y".to_owned()), None);
    settle(&handle, 1).await;

    // Drain the first scan's events.
    loop {
        if matches!(
            next_event(&mut events).await,
            SessionEvent::ModeChanged { mode: ScanMode::ResultShown }
        ) {
            break;
        }
    }

    // Same payload again, still inside the window: the mode is ResultShown,
    // so the event is dropped without touching the suppressor.
    handle.decode(Some("https://x/y".to_owned()), None);
    settle(&handle, 2).await;

    let stats = handle.stats();
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.suppressed, 0);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    handle.close();
    join.await.expect("join").expect("clean shutdown");
}

#[tokio::test]
async fn window_survives_retry_and_suppresses_the_same_code() {
    let authority = ScriptedAuthority::new(vec![confirmed()], Duration::from_millis(10));
    let (handle, mut events, join) = start(authority);

    handle.decode(Some("https://x/y".to_owned()), None);
    settle(&handle, 1).await;

    handle.retry();

    // Back in Scanning, the same code now reaches the suppressor and is
    // debounced rather than re-verified.
    handle.decode(Some("https://x/y".to_owned()), None);
    settle(&handle, 2).await;

    let stats = handle.stats();
    assert_eq!(stats.retries, 1);
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.suppressed, 1);

    let mut saw_suppressed = false;
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::ScanSuppressed { payload } = event {
            assert_eq!(payload, "https://x/y");
            saw_suppressed = true;
        }
    }
    assert!(saw_suppressed, "expected a ScanSuppressed event");

    handle.close();
    join.await.expect("join").expect("clean shutdown");
}

#[tokio::test]
async fn transport_failure_surfaces_like_any_outcome_and_retry_recovers() {
    let authority = ScriptedAuthority::new(
        vec![VerificationOutcome::bare(OutcomeCategory::VerificationError)],
        Duration::from_millis(10),
    );
    let (handle, mut events, join) = start(authority);

    handle.decode(Some("https://x/y".to_owned()), None);

    loop {
        match next_event(&mut events).await {
            SessionEvent::OutcomeReady { category } => {
                assert_eq!(category, OutcomeCategory::VerificationError);
                break;
            }
            SessionEvent::ShuttingDown => panic!("session closed before outcome"),
            _ => {}
        }
    }

    handle.retry();
    loop {
        match next_event(&mut events).await {
            SessionEvent::ModeChanged { mode: ScanMode::Scanning } => break,
            SessionEvent::ModeChanged { mode: ScanMode::ResultShown } => {}
            other => panic!("expected return to Scanning, got {other:?}"),
        }
    }

    handle.close();
    join.await.expect("join").expect("clean shutdown");
}

#[tokio::test]
async fn no_input_sequence_opens_two_verifications_at_once() {
    let authority = ScriptedAuthority::new(
        vec![confirmed(), confirmed(), confirmed()],
        Duration::from_millis(50),
    );
    let (handle, mut events, join) = start(Arc::clone(&authority));

    // Burst: three distinct codes with retries queued between them. All of
    // this sits in the input channel while the first verification is open.
    handle.decode(Some("https://x/1".to_owned()), None);
    handle.retry();
    handle.decode(Some("https://x/2".to_owned()), None);
    handle.retry();
    handle.decode(Some("https://x/3".to_owned()), None);

    let mut outcomes = 0;
    while outcomes < 3 {
        if matches!(next_event(&mut events).await, SessionEvent::OutcomeReady { .. }) {
            outcomes += 1;
        }
    }

    assert_eq!(authority.max_in_flight(), 1);
    assert_eq!(handle.stats().accepted, 3);

    handle.close();
    join.await.expect("join").expect("clean shutdown");
}

#[tokio::test]
async fn decode_errors_are_reported_and_do_not_block_scanning() {
    let authority = ScriptedAuthority::new(vec![confirmed()], Duration::from_millis(10));
    let (handle, mut events, join) = start(authority);

    handle.decode(None, Some("camera fault".to_owned()));

    loop {
        match next_event(&mut events).await {
            SessionEvent::DecodeFailed { message } => {
                assert_eq!(message, "camera fault");
                break;
            }
            SessionEvent::Started => {}
            other => panic!("expected DecodeFailed, got {other:?}"),
        }
    }

    // The stream error changed nothing; the next real code verifies.
    handle.decode(Some("https://x/y".to_owned()), None);
    loop {
        match next_event(&mut events).await {
            SessionEvent::OutcomeReady { category } => {
                assert_eq!(category, OutcomeCategory::Confirmed);
                break;
            }
            _ => {}
        }
    }

    assert_eq!(handle.stats().decode_failures, 1);

    handle.close();
    join.await.expect("join").expect("clean shutdown");
}

#[tokio::test]
async fn empty_frames_cause_no_events() {
    let authority = ScriptedAuthority::new(vec![], Duration::from_millis(1));
    let (handle, mut events, join) = start(authority);

    assert!(matches!(next_event(&mut events).await, SessionEvent::Started));

    handle.decode(None, None);
    handle.decode(Some(String::new()), None);
    settle(&handle, 2).await;

    let stats = handle.stats();
    assert_eq!(stats.frames, 2);
    assert_eq!(stats.accepted, 0);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    handle.close();
    join.await.expect("join").expect("clean shutdown");
}

#[tokio::test]
async fn keyboard_wedge_feed_drives_decode_and_retry() {
    use scangate::feed::KeyboardWedgeFeed;
    use tokio::io::BufReader;

    let authority = ScriptedAuthority::new(
        vec![confirmed(), confirmed()],
        Duration::from_millis(10),
    );
    let (handle, mut events, join) = start(Arc::clone(&authority));

    // Two scans separated by a bare Enter (the operator resuming).
    let input: &[u8] = b"https://x/1\n\nhttps://x/2\n";
    let feed = KeyboardWedgeFeed::new(handle.clone());
    feed.pump(BufReader::new(input)).await.expect("feed pumps");

    let mut outcomes = 0;
    while outcomes < 2 {
        if matches!(next_event(&mut events).await, SessionEvent::OutcomeReady { .. }) {
            outcomes += 1;
        }
    }

    let stats = handle.stats();
    assert_eq!(stats.accepted, 2);
    assert_eq!(stats.retries, 1);
    assert_eq!(authority.max_in_flight(), 1);

    handle.close();
    join.await.expect("join").expect("clean shutdown");
}
