//! Single-slot debouncer with switch-to-latest semantics.

use std::time::{Duration, Instant};

use tracing::trace;

/// Holds at most one pending value.
///
/// Pushing a new value replaces the pending one and restarts the quiet
/// period. Every push bumps a generation counter so callers can tell
/// which request finally fired.
#[derive(Debug)]
pub struct Debouncer<T> {
    slot: Option<Pending<T>>,
    generation: u64,
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    deadline: Instant,
    generation: u64,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self {
            slot: None,
            generation: 0,
        }
    }
}

impl<T> Debouncer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `value` to fire `delay` after `now`, dropping any pending value.
    pub fn push(&mut self, value: T, delay: Duration, now: Instant) -> u64 {
        self.generation += 1;
        if let Some(previous) = &self.slot {
            trace!(
                superseded = previous.generation,
                generation = self.generation,
                "debounced value superseded"
            );
        }
        self.slot = Some(Pending {
            value,
            deadline: now + delay,
            generation: self.generation,
        });
        self.generation
    }

    /// Take the pending value if its quiet period has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.slot {
            Some(pending) if pending.deadline <= now => self.slot.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Drop the pending value.
    pub fn cancel(&mut self) -> Option<T> {
        self.slot.take().map(|pending| pending.value)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.slot.as_ref().map(|pending| pending.deadline)
    }

    /// Generation of the most recent push.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(400);

    #[test]
    fn burst_keeps_only_latest() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new();
        for (i, value) in ["a", "ab", "abc", "abcd", "abcde"].into_iter().enumerate() {
            debouncer.push(value, QUIET, start + Duration::from_millis(50 * i as u64));
        }
        assert_eq!(debouncer.generation(), 5);

        // Quiet period counts from the last push at +200ms.
        assert_eq!(debouncer.take_due(start + Duration::from_millis(500)), None);
        assert_eq!(
            debouncer.take_due(start + Duration::from_millis(600)),
            Some("abcde")
        );
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn cancel_clears_deadline() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new();
        debouncer.push(1, QUIET, now);
        assert_eq!(debouncer.deadline(), Some(now + QUIET));
        assert_eq!(debouncer.cancel(), Some(1));
        assert_eq!(debouncer.deadline(), None);
    }
}
