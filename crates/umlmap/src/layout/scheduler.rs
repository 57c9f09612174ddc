//! Frame cadence and input debouncing.
//!
//! Both types are driven by caller-supplied instants, so the owner decides
//! where time comes from.

use std::time::{Duration, Instant};

/// Ticks a frame loop may run at once after a stall.
const MAX_CATCH_UP: u32 = 4;

/// Converts wall-clock time into simulation ticks at a fixed cadence.
///
/// # Examples
///
/// ```
/// # use std::time::{Duration, Instant};
/// # use umlmap::layout::FrameScheduler;
/// let mut frames = FrameScheduler::new(Duration::from_millis(16));
/// let start = Instant::now();
/// assert_eq!(frames.due_ticks(start), 1);
/// assert_eq!(frames.due_ticks(start + Duration::from_millis(5)), 0);
/// assert_eq!(frames.due_ticks(start + Duration::from_millis(40)), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Duration,
    next: Option<Instant>,
}

impl FrameScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: None,
        }
    }

    /// Returns how many ticks are due at `now` and advances the schedule.
    ///
    /// The first call always yields one tick. After a long stall at most a
    /// handful of ticks are reported and the schedule restarts from `now`.
    pub fn due_ticks(&mut self, now: Instant) -> u32 {
        if self.interval.is_zero() {
            return 1;
        }
        let Some(next) = self.next else {
            self.next = Some(now + self.interval);
            return 1;
        };
        if now < next {
            return 0;
        }
        let behind = now.duration_since(next).as_nanos() / self.interval.as_nanos();
        let due = u32::try_from(behind).unwrap_or(u32::MAX).saturating_add(1);
        if due > MAX_CATCH_UP {
            self.next = Some(now + self.interval);
            MAX_CATCH_UP
        } else {
            self.next = Some(next + self.interval * due);
            due
        }
    }

    /// Forgets the schedule; the next call to [`due_ticks`](Self::due_ticks) yields one tick.
    pub fn reset(&mut self) {
        self.next = None;
    }
}

/// Coalesces a burst of triggers into a single firing after a quiet period.
///
/// # Examples
///
/// ```
/// # use std::time::{Duration, Instant};
/// # use umlmap::layout::Debouncer;
/// let mut debouncer = Debouncer::new(Duration::from_millis(100));
/// let start = Instant::now();
/// debouncer.trigger(start);
/// debouncer.trigger(start + Duration::from_millis(60));
/// assert!(!debouncer.poll(start + Duration::from_millis(120)));
/// assert!(debouncer.poll(start + Duration::from_millis(160)));
/// assert!(!debouncer.poll(start + Duration::from_millis(400)));
/// ```
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Records a trigger, pushing the deadline back.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns `true` exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drops a pending trigger.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn test_steady_cadence() {
        let mut frames = FrameScheduler::new(FRAME);
        let start = Instant::now();

        assert_eq!(frames.due_ticks(start), 1);
        assert_eq!(frames.due_ticks(start + FRAME), 1);
        assert_eq!(frames.due_ticks(start + FRAME + Duration::from_millis(3)), 0);
        assert_eq!(frames.due_ticks(start + FRAME * 2), 1);
    }

    #[test]
    fn test_stall_is_capped() {
        let mut frames = FrameScheduler::new(FRAME);
        let start = Instant::now();
        frames.due_ticks(start);

        let later = start + Duration::from_secs(2);
        assert_eq!(frames.due_ticks(later), MAX_CATCH_UP);
        assert_eq!(frames.due_ticks(later + FRAME), 1);

        frames.reset();
        assert_eq!(frames.due_ticks(later), 1);
    }

    #[test]
    fn test_debounce_coalesces_rapid_toggles() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let start = Instant::now();

        let mut fired = 0;
        for ms in (0..=90).step_by(10) {
            let now = start + Duration::from_millis(ms);
            debouncer.trigger(now);
            fired += usize::from(debouncer.poll(now));
        }
        assert_eq!(fired, 0);
        assert!(debouncer.is_pending());

        assert!(!debouncer.poll(start + Duration::from_millis(189)));
        assert!(debouncer.poll(start + Duration::from_millis(190)));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_cancel() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let start = Instant::now();
        debouncer.trigger(start);
        debouncer.cancel();
        assert!(!debouncer.poll(start + Duration::from_secs(1)));
    }
}
