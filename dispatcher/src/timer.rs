// dispatcher/src/timer.rs

use std::thread;
use std::time::Duration;

/// Lets simulated time pass.
///
/// The dispatcher loop calls `sleep` once per decision step with the
/// quantum that elapsed; it is the only suspension point of the simulation.
pub trait Clock {
    fn sleep(&mut self, ticks: u64);
}

/// Sleeps for real, `tick` per simulated tick.
#[derive(Debug, Clone, Copy)]
pub struct SleepClock {
    tick: Duration,
}

impl SleepClock {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }
}

impl Clock for SleepClock {
    fn sleep(&mut self, ticks: u64) {
        let ticks = u32::try_from(ticks).unwrap_or(u32::MAX);
        thread::sleep(self.tick.saturating_mul(ticks));
    }
}

/// Never blocks, only counts the ticks it was asked to sleep.
#[derive(Debug, Default, Clone, Copy)]
pub struct VirtualClock {
    elapsed: u64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }
}

impl Clock for VirtualClock {
    fn sleep(&mut self, ticks: u64) {
        self.elapsed += ticks;
    }
}
