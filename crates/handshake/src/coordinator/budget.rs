use std::time::{Duration, Instant};

/// Timeout applied when the session configuration carries no usable value.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Smallest budget [`TimeBudget::consume`] ever reports.
///
/// An exhausted budget clamps to this floor instead of reaching zero so the
/// driver can always schedule one more bounded wait; deciding to give up is
/// the driver's call, not the budget's.
pub const HANDSHAKE_GRACE_FLOOR: Duration = Duration::from_millis(10);

/// Checkpoint-and-subtract accounting for the handshake time budget.
///
/// Every consultation measures the wall-clock time elapsed since the previous
/// checkpoint and charges it against the stored budget, so the budget shrinks
/// across however many discrete network operations the handshake performs
/// without the driver tracking an absolute deadline. Re-basing the checkpoint
/// without charging (see [`TimeBudget::rebase`]) exempts an interval from the
/// accounting.
///
/// The clock reading is taken by the caller so unit tests stay exact.
#[derive(Debug)]
pub(super) struct TimeBudget {
    remaining: Duration,
    last_checkpoint: Option<Instant>,
}

impl TimeBudget {
    pub(super) const fn new() -> Self {
        Self {
            remaining: DEFAULT_HANDSHAKE_TIMEOUT,
            last_checkpoint: None,
        }
    }

    /// Rebinds the budget from a configured millisecond value.
    ///
    /// A missing or non-positive value falls back to the default. The
    /// checkpoint is left untouched.
    pub(super) fn rebind_millis(&mut self, configured: Option<i64>) {
        self.remaining = configured
            .filter(|millis| *millis > 0)
            .map_or(DEFAULT_HANDSHAKE_TIMEOUT, |millis| {
                Duration::from_millis(millis as u64)
            });
    }

    /// Charges the time elapsed since the previous checkpoint and returns the
    /// remaining budget, always greater than zero.
    ///
    /// The first consultation charges nothing. An exhausted budget clamps to
    /// [`HANDSHAKE_GRACE_FLOOR`]; the clamped value is persisted, so repeated
    /// exhausted consultations keep reporting the floor.
    pub(super) fn consume(&mut self, now: Instant) -> Duration {
        if let Some(last) = self.last_checkpoint {
            let elapsed = now.duration_since(last);
            self.remaining = if elapsed < self.remaining {
                self.remaining - elapsed
            } else {
                HANDSHAKE_GRACE_FLOOR
            };
        }
        self.last_checkpoint = Some(now);
        self.remaining
    }

    /// Moves the checkpoint to `now` without charging the elapsed interval.
    pub(super) fn rebase(&mut self, now: Instant) {
        self.last_checkpoint = Some(now);
    }

    pub(super) const fn remaining(&self) -> Duration {
        self.remaining
    }
}
