//! Display countdown. Purely cosmetic and independent of the round phase.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TimerState {
    pub seconds: u32,
    /// Value restored by [`TimerState::reset`].
    pub initial_seconds: u32,
    pub running: bool,
}

impl TimerState {
    pub fn set_seconds(&mut self, seconds: u32) {
        self.seconds = seconds;
        self.initial_seconds = seconds;
        self.running = false;
    }

    pub fn start(&mut self) {
        self.running = self.seconds > 0;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.seconds = self.initial_seconds;
        self.running = false;
    }

    /// Counts down one second. Returns `false` if the timer was idle.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.seconds = self.seconds.saturating_sub(1);
        if self.seconds == 0 {
            self.running = false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_stops_at_zero() {
        let mut timer = TimerState::default();
        timer.set_seconds(2);
        timer.start();

        assert!(timer.tick());
        assert_eq!(timer.seconds, 1);
        assert!(timer.tick());
        assert_eq!(timer.seconds, 0);
        assert!(!timer.running);
        assert!(!timer.tick());
    }

    #[test]
    fn test_stopped_timer_ignores_ticks() {
        let mut timer = TimerState::default();
        timer.set_seconds(30);
        assert!(!timer.tick());
        assert_eq!(timer.seconds, 30);
    }

    #[test]
    fn test_reset_restores_initial_value() {
        let mut timer = TimerState::default();
        timer.set_seconds(10);
        timer.start();
        timer.tick();
        timer.tick();
        timer.reset();
        assert_eq!(timer.seconds, 10);
        assert!(!timer.running);
    }

    #[test]
    fn test_cannot_start_empty_timer() {
        let mut timer = TimerState::default();
        timer.start();
        assert!(!timer.running);
    }
}
