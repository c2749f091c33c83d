//! Injected one-shot timer interface and a virtual-time implementation.

use log::debug;

/// Identity of one armed timer. Handles are never reused by a queue.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// One-shot timer service driven by its owner.
///
/// The queue only records deadlines. Whoever drives it hands each due handle
/// back to the player, which is the single callback for every timer it arms.
pub trait TimerQueue {
    fn now_ms(&self) -> u64;

    /// Arms a timer due `delay_ms` from now.
    fn arm(&mut self, delay_ms: u64) -> TimerHandle;

    /// Returns `false` when the handle already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;
}

/// Timer queue over a clock that only moves when told to.
///
/// Used directly by tests, and by hosts that translate wall-clock time into
/// `set_now` calls.
#[derive(Clone, Debug, Default)]
pub struct ManualTimer {
    now_ms: u64,
    next_handle: u64,
    pending: Vec<(TimerHandle, u64)>,
}

impl ManualTimer {
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    pub const fn starting_at(now_ms: u64) -> Self {
        Self {
            now_ms,
            next_handle: 0,
            pending: Vec::new(),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Earliest deadline among armed timers.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.iter().map(|(_, due)| *due).min()
    }

    /// Moves the clock forward. Earlier instants are ignored.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Removes and returns the earliest timer that is due at the current
    /// instant. Ties fire in arming order.
    pub fn pop_due(&mut self) -> Option<TimerHandle> {
        let now_ms = self.now_ms;
        let (position, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (_, due))| *due <= now_ms)
            .min_by_key(|(_, (handle, due))| (*due, *handle))?;
        Some(self.pending.remove(position).0)
    }
}

impl TimerQueue for ManualTimer {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn arm(&mut self, delay_ms: u64) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        let due = self.now_ms.saturating_add(delay_ms);
        self.pending.push((handle, due));
        debug!("timer: arm handle={} due_ms={}", handle.0, due);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(pending, _)| *pending != handle);
        let cancelled = self.pending.len() != before;
        if cancelled {
            debug!("timer: cancel handle={}", handle.0);
        }
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut timer = ManualTimer::new();
        let late = timer.arm(200);
        let early = timer.arm(100);

        timer.set_now(150);
        assert_eq!(timer.pop_due(), Some(early));
        assert_eq!(timer.pop_due(), None);

        timer.set_now(200);
        assert_eq!(timer.pop_due(), Some(late));
        assert_eq!(timer.pending_count(), 0);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timer = ManualTimer::new();
        let handle = timer.arm(10);
        assert!(timer.cancel(handle));
        assert!(!timer.cancel(handle));

        timer.set_now(1_000);
        assert_eq!(timer.pop_due(), None);
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut timer = ManualTimer::starting_at(500);
        timer.set_now(100);
        assert_eq!(timer.now_ms(), 500);

        let handle = timer.arm(0);
        assert_eq!(timer.next_due_ms(), Some(500));
        assert_eq!(timer.pop_due(), Some(handle));
    }

    #[test]
    fn handles_are_unique() {
        let mut timer = ManualTimer::new();
        let first = timer.arm(5);
        timer.cancel(first);
        let second = timer.arm(5);
        assert_ne!(first, second);
    }
}
