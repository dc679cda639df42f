use std::time::{Duration, Instant};

/// Keeps track of how long a phase of the run took (only used in verbose mode).
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Create a new `Timer` starting now.
    pub fn now() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Restart the timer.
    pub fn reset(&mut self) {
        self.start = Instant::now();
    }

    /// Time since the timer was created or last reset.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Print `"<phase> took <elapsed>"` to stderr.
    pub fn print_elapsed(&self, phase: &str) {
        eprintln!("{} took {:?}", phase, self.elapsed());
    }
}
