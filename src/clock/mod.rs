//! Caller-owned simulated time with an adjustable rate

use crate::time::Time;

/// Simulated seconds per wall-clock second at startup
pub const REAL_TIME: f64 = 1.0;

/// Simulated instant advanced by wall-clock ticks
#[derive(Debug, Clone, Copy)]
pub struct SimulationClock {
    current: Time,
    rate: f64,
}

impl SimulationClock {
    pub fn new(start: Time) -> Self {
        Self {
            current: start,
            rate: REAL_TIME,
        }
    }

    /// A clock starting at the present instant
    pub fn starting_now() -> Self {
        Self::new(Time::now())
    }

    pub fn current(&self) -> Time {
        self.current
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Advance by `wall_seconds` of real time scaled by the rate
    pub fn advance(&mut self, wall_seconds: f64) -> Time {
        self.current = self.current.add_seconds(self.rate * wall_seconds);
        self.current
    }

    pub fn double_rate(&mut self) {
        self.rate *= 2.0;
    }

    pub fn halve_rate(&mut self) {
        self.rate *= 0.5;
    }

    /// Freeze simulated time
    pub fn stop(&mut self) {
        self.rate = 0.0;
    }

    pub fn real_time(&mut self) {
        self.rate = REAL_TIME;
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    /// Jump to the present instant, keeping the rate
    pub fn reset_to_now(&mut self) {
        self.current = Time::now();
    }

    /// Jump to a given instant, keeping the rate
    pub fn set(&mut self, time: Time) {
        self.current = time;
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::starting_now()
    }
}
