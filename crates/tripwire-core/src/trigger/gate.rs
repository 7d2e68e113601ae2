//! IntervalGate - cooldown primitive used to rate-limit polling.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Reports whether at least `interval` has passed since the last reset.
///
/// A gate that was never reset is open. After `reset(t0)` it is closed for
/// every `t < t0 + interval` and open from `t0 + interval` on. A `now`
/// earlier than the last reset (clock moved backwards) counts as closed.
#[derive(Debug, Clone)]
pub struct IntervalGate {
    interval: Duration,
    last_reset: Option<DateTime<Utc>>,
}

impl IntervalGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_reset: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_reset(&self) -> Option<DateTime<Utc>> {
        self.last_reset
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let Some(reset_at) = self.last_reset else {
            return true;
        };
        // A negative delta fails to_std(), which keeps the gate closed.
        match now.signed_duration_since(reset_at).to_std() {
            Ok(elapsed) => elapsed >= self.interval,
            Err(_) => false,
        }
    }

    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.last_reset = Some(now);
    }

    /// When the gate next opens. `None` means it is open now (never reset).
    ///
    /// An interval too large to represent saturates to
    /// `DateTime::<Utc>::MAX_UTC`, which `is_open` also never reaches.
    pub fn next_open(&self) -> Option<DateTime<Utc>> {
        let reset_at = self.last_reset?;
        let opens_at = chrono::Duration::from_std(self.interval)
            .ok()
            .and_then(|interval| reset_at.checked_add_signed(interval))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Some(opens_at)
    }
}
