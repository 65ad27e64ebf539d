use std::time::{Duration, Instant};

/// Tracks a wall-clock budget shared across several sequential I/O steps
/// (connect, handshake, write, read) so the overall probe respects one
/// timeout rather than each step getting a fresh one.
pub struct TimeBudget {
    deadline: Instant,
}

impl TimeBudget {
    pub fn new(total: Duration) -> Self {
        TimeBudget {
            deadline: Instant::now() + total,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining().is_zero()
    }
}
