//! Navigation and sleep state.
//!
//! Pure state machine: callers pass in the current time and act on the
//! returned [`Transition`] (backlight changes, debounce delays).

use statpanel_hw::Zone;
use std::time::{Duration, Instant};

/// What changed as a result of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    /// Left sleep; the touch that woke the panel is not a navigation.
    Woke,
    Navigated { from: usize, to: usize },
    FellAsleep,
}

#[derive(Debug, Clone)]
pub struct ApplicationState {
    screen_index: usize,
    screen_count: usize,
    asleep: bool,
    last_activity: Instant,
    timeout: Option<Duration>,
}

impl ApplicationState {
    /// Starts awake on the first screen.
    pub fn new(screen_count: usize, timeout: Option<Duration>, now: Instant) -> Self {
        Self {
            screen_index: 0,
            screen_count,
            asleep: false,
            last_activity: now,
            timeout,
        }
    }

    pub fn screen_index(&self) -> usize {
        self.screen_index
    }

    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    /// Handles a touch in `zone`.
    pub fn on_touch(&mut self, zone: Zone, now: Instant) -> Transition {
        self.last_activity = now;

        if self.asleep {
            self.asleep = false;
            return Transition::Woke;
        }

        if self.screen_count == 0 {
            return Transition::None;
        }

        let from = self.screen_index;
        let to = match zone {
            Zone::Left => (from + self.screen_count - 1) % self.screen_count,
            Zone::Right => (from + 1) % self.screen_count,
            Zone::Center => return Transition::None,
        };
        self.screen_index = to;
        Transition::Navigated { from, to }
    }

    /// Checks the inactivity timeout when no touch arrived.
    pub fn on_idle(&mut self, now: Instant) -> Transition {
        let Some(timeout) = self.timeout else {
            return Transition::None;
        };
        if !self.asleep && now.saturating_duration_since(self.last_activity) > timeout {
            self.asleep = true;
            return Transition::FellAsleep;
        }
        Transition::None
    }
}
