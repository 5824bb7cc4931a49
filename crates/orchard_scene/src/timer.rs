//! Repeating spawn schedule driven by host time

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleState {
    /// Waiting for the object prototype
    Disarmed,
    Armed,
    /// Cancelled for good by teardown
    Cancelled,
}

/// Fires once per `interval` of ticked time while armed
#[derive(Debug, Clone)]
pub struct SpawnSchedule {
    interval: Duration,
    elapsed: Duration,
    state: ScheduleState,
}

impl SpawnSchedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            state: ScheduleState::Disarmed,
        }
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == ScheduleState::Armed
    }

    /// Start counting from zero. A cancelled schedule stays cancelled.
    pub fn arm(&mut self) {
        if self.state != ScheduleState::Cancelled {
            self.state = ScheduleState::Armed;
            self.elapsed = Duration::ZERO;
        }
    }

    pub fn cancel(&mut self) {
        self.state = ScheduleState::Cancelled;
        self.elapsed = Duration::ZERO;
    }

    /// Advance by `delta` and return how many intervals completed
    pub fn tick(&mut self, delta: Duration) -> u32 {
        if self.state != ScheduleState::Armed || self.interval.is_zero() {
            return 0;
        }

        self.elapsed += delta;
        let mut fired = 0;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            fired += 1;
        }
        fired
    }
}
