//! Duplicate scan suppression.
//!
//! A physical ticket held in front of the camera decodes on many consecutive
//! frames. The guard retains the most recently accepted payload and rejects
//! re-occurrences of it inside a fixed window, so one hold of a badge maps to
//! one verification.

use std::time::{Duration, Instant};
use tracing::debug;

/// How long a repeated identical payload is ignored after being accepted.
///
/// Covers re-exposure of the same physical badge or ticket to the camera
/// during a single hold.
pub const SUPPRESSION_WINDOW: Duration = Duration::from_secs(15);

/// The single retained scan entry.
#[derive(Debug, Clone)]
struct DedupEntry {
    payload: String,
    seen_at: Instant,
}

/// Debounces repeated scans of the same code.
///
/// Exactly one entry is retained: the most recently accepted payload. A
/// different payload is always accepted immediately and replaces the entry;
/// there is no global rate limit, only per-payload debounce.
#[derive(Debug, Default)]
pub struct RecentScanGuard {
    retained: Option<DedupEntry>,
}

impl RecentScanGuard {
    /// Create a guard with no retained entry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether this occurrence of `payload` should be processed.
    ///
    /// Rejects only when `payload` equals the retained payload and `now` is
    /// still inside [`SUPPRESSION_WINDOW`]. Accepting overwrites the retained
    /// entry with `(payload, now)`.
    pub fn should_accept(&mut self, payload: &str, now: Instant) -> bool {
        if let Some(entry) = &self.retained {
            if entry.payload == payload
                && now.saturating_duration_since(entry.seen_at) < SUPPRESSION_WINDOW
            {
                debug!("Repeated scan suppressed inside debounce window");
                return false;
            }
        }

        self.retained = Some(DedupEntry {
            payload: payload.to_owned(),
            seen_at: now,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn same_payload_inside_window_is_rejected() {
        let mut guard = RecentScanGuard::new();
        let t0 = Instant::now();

        assert!(guard.should_accept("https://x/y", t0));
        assert!(!guard.should_accept("https://x/y", t0 + Duration::from_millis(5000)));
        assert!(!guard.should_accept("https://x/y", t0 + Duration::from_millis(14_999)));
    }

    #[test]
    fn same_payload_after_window_is_accepted() {
        let mut guard = RecentScanGuard::new();
        let t0 = Instant::now();

        assert!(guard.should_accept("https://x/y", t0));
        // The window is strict: exactly 15s is outside it.
        assert!(guard.should_accept("https://x/y", t0 + SUPPRESSION_WINDOW));
    }

    #[test]
    fn acceptance_restarts_the_window() {
        let mut guard = RecentScanGuard::new();
        let t0 = Instant::now();

        assert!(guard.should_accept("https://x/y", t0));
        let t1 = t0 + SUPPRESSION_WINDOW;
        assert!(guard.should_accept("https://x/y", t1));
        // Re-accepted at t1, so t1 + 5s is inside the new window.
        assert!(!guard.should_accept("https://x/y", t1 + Duration::from_secs(5)));
    }

    #[test]
    fn different_payload_is_accepted_immediately() {
        let mut guard = RecentScanGuard::new();
        let t0 = Instant::now();

        assert!(guard.should_accept("https://x/y", t0));
        assert!(guard.should_accept("https://x/z", t0));
    }

    #[test]
    fn replacement_forgets_the_previous_payload() {
        let mut guard = RecentScanGuard::new();
        let t0 = Instant::now();

        assert!(guard.should_accept("https://x/y", t0));
        assert!(guard.should_accept("https://x/z", t0 + Duration::from_secs(1)));
        // Only one entry is retained, so the first payload is accepted again
        // even though its original window has not elapsed.
        assert!(guard.should_accept("https://x/y", t0 + Duration::from_secs(2)));
    }

    proptest! {
        #[test]
        fn distinct_payloads_always_accepted(
            a in "[a-z]{1,12}",
            b in "[a-z]{1,12}",
            offset_ms in 0u64..60_000,
        ) {
            prop_assume!(a != b);
            let mut guard = RecentScanGuard::new();
            let t0 = Instant::now();
            prop_assert!(guard.should_accept(&a, t0));
            prop_assert!(guard.should_accept(&b, t0 + Duration::from_millis(offset_ms)));
        }

        #[test]
        fn same_payload_rejected_for_any_gap_inside_window(
            payload in "[a-z0-9:/.]{1,32}",
            gap_ms in 0u64..15_000,
        ) {
            let mut guard = RecentScanGuard::new();
            let t0 = Instant::now();
            prop_assert!(guard.should_accept(&payload, t0));
            prop_assert!(!guard.should_accept(&payload, t0 + Duration::from_millis(gap_ms)));
        }
    }
}
