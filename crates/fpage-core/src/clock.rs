#![forbid(unsafe_code)]

//! Monotonic clocks.
//!
//! The runtime never reads the system time directly. It asks a
//! [`MonotonicClock`] for "now", which lets a host drive time explicitly
//! ([`DeterministicClock`]) or follow the wall clock ([`WallClock`],
//! backed by `web-time` so it also works on `wasm32-unknown-unknown`).

use std::time::Duration;

/// Source of monotonic time since some fixed origin.
pub trait MonotonicClock {
    /// Elapsed time since the clock's origin.
    fn now_mono(&self) -> Duration;
}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

impl MonotonicClock for DeterministicClock {
    fn now_mono(&self) -> Duration {
        self.now
    }
}

/// Wall-clock time measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    origin: web_time::Instant,
}

impl WallClock {
    /// Start measuring from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: web_time::Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for WallClock {
    fn now_mono(&self) -> Duration {
        self.origin.elapsed()
    }
}
