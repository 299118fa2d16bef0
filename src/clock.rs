//! Calendar collaborator for recency checks.

use chrono::Datelike;

pub trait Clock: Send + Sync {
    fn current_year(&self) -> i32;
}

/// Reads the UTC wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_year(&self) -> i32 {
        chrono::Utc::now().year()
    }
}

/// Pinned year, for reproducible scoring and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i32);

impl Clock for FixedClock {
    fn current_year(&self) -> i32 {
        self.0
    }
}
