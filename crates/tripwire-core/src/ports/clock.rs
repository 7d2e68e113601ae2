//! Clock port - source of the current time
//!
//! Triggers take `now` as an argument; the host reads it from a `Clock` so
//! tests can drive time explicitly.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Move time forward and return the new instant. `None` when the result
    /// would leave chrono's range; the clock is then left unchanged.
    pub fn advance(&self, by: chrono::Duration) -> Option<DateTime<Utc>> {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        let next = guard.checked_add_signed(by)?;
        *guard = next;
        Some(next)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_moves_only_when_told() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(chrono::Duration::seconds(30));
        assert_eq!(clock.now(), start + chrono::Duration::seconds(30));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn advancing_past_the_calendar_leaves_the_clock_unchanged() {
        let clock = FixedClock::new(DateTime::<Utc>::MAX_UTC - chrono::Duration::seconds(10));
        let before = clock.now();

        assert_eq!(clock.advance(chrono::Duration::seconds(30)), None);
        assert_eq!(clock.now(), before);
        assert_eq!(
            clock.advance(chrono::Duration::seconds(10)),
            Some(DateTime::<Utc>::MAX_UTC)
        );
    }
}
