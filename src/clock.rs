//! Time source for the health endpoint
//!
//! The start instant is captured once and handed to the dispatcher, so
//! uptime never reads ambient process state and tests can pin the clock.

use chrono::{DateTime, SecondsFormat, Utc};
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    /// Wall-clock time at the moment of the call
    fn now(&self) -> DateTime<Utc>;

    /// Monotonic time elapsed since the clock was started
    fn uptime(&self) -> Duration;
}

/// Clock backed by the system time and a monotonic start instant
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-01-01T00:00:00.000Z`
pub fn iso_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
