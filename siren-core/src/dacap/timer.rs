//! Timer bookkeeping for the handshake engine.
//!
//! The engine never sleeps on its own. It asks its host to arm wakeups and
//! tags each request with a generation number; a wakeup whose generation no
//! longer matches was superseded by a later arm or cancel and is ignored.

/// Which of the engine's two timers a wakeup belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Drives state timeouts, and backoff when freezing is enabled.
    Protocol,
    /// Dedicated backoff countdown when freezing is disabled. Keeps running
    /// while the node serves an incoming handshake.
    Backoff,
}

impl std::fmt::Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerKind::Protocol => write!(f, "protocol"),
            TimerKind::Backoff => write!(f, "backoff"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TimerState {
    Idle,
    Armed { deadline: f64 },
    Frozen { remaining: f64 },
}

/// One timer. Arming returns the generation the host must echo back with
/// the wakeup.
#[derive(Debug, Clone)]
pub struct Timer {
    state: TimerState,
    generation: u64,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            generation: 0,
        }
    }

    /// Arms the timer for `deadline`, superseding any earlier arm.
    pub fn arm(&mut self, deadline: f64) -> u64 {
        self.generation += 1;
        self.state = TimerState::Armed { deadline };
        self.generation
    }

    /// Cancels without firing. Any in-flight wakeup goes stale.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.state = TimerState::Idle;
    }

    /// Stops the countdown and remembers how much was left. A timer frozen
    /// at or past its deadline keeps zero remaining and fires as soon as it
    /// is resumed.
    pub fn freeze(&mut self, now: f64) {
        if let TimerState::Armed { deadline } = self.state {
            self.generation += 1;
            self.state = TimerState::Frozen {
                remaining: (deadline - now).max(0.0),
            };
        }
    }

    /// Restarts a frozen countdown from `now`, returning the new generation
    /// and deadline to arm. `None` if the timer is not frozen.
    pub fn resume(&mut self, now: f64) -> Option<(u64, f64)> {
        match self.state {
            TimerState::Frozen { remaining } => {
                self.generation += 1;
                let deadline = now + remaining;
                self.state = TimerState::Armed { deadline };
                Some((self.generation, deadline))
            }
            _ => None,
        }
    }

    /// True when a countdown is underway or suspended.
    pub fn is_pending(&self) -> bool {
        !matches!(self.state, TimerState::Idle)
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self.state, TimerState::Frozen { .. })
    }

    /// Consumes a wakeup. Returns false for stale generations, which must
    /// be dropped by the caller.
    pub fn fire(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        match self.state {
            TimerState::Armed { .. } => {
                self.state = TimerState::Idle;
                true
            }
            _ => false,
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_generation_is_rejected() {
        let mut timer = Timer::new();
        let first = timer.arm(5.0);
        let second = timer.arm(9.0);
        assert!(!timer.fire(first));
        assert!(timer.is_pending());
        assert!(timer.fire(second));
        assert!(!timer.is_pending());
    }

    #[test]
    fn cancel_invalidates_wakeup() {
        let mut timer = Timer::new();
        let generation = timer.arm(5.0);
        timer.cancel();
        assert!(!timer.fire(generation));
    }

    #[test]
    fn freeze_then_resume_keeps_the_residual() {
        let mut timer = Timer::new();
        let generation = timer.arm(10.0);
        timer.freeze(4.0);
        assert!(timer.is_frozen());
        assert!(!timer.fire(generation));
        let (generation, deadline) = timer.resume(20.0).unwrap();
        assert_eq!(deadline, 26.0);
        assert!(timer.fire(generation));
    }

    #[test]
    fn freeze_past_deadline_resumes_immediately() {
        let mut timer = Timer::new();
        timer.arm(10.0);
        timer.freeze(12.5);
        let (_, deadline) = timer.resume(30.0).unwrap();
        assert_eq!(deadline, 30.0);
    }

    #[test]
    fn resume_without_freeze_is_a_no_op() {
        let mut timer = Timer::new();
        timer.arm(10.0);
        assert!(timer.resume(3.0).is_none());
    }
}
