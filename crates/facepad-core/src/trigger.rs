//! Debounced threshold trigger
//!
//! A raised eyebrow is held for several ticks, so a plain threshold test
//! would reset the game over and over. The debouncer fires once per raise:
//! it needs `hold_ticks` consecutive samples at or above the threshold, then
//! disarms until the value falls below `threshold - hysteresis`, and never
//! fires twice within `cooldown`.

use crate::settings::Settings;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Debouncer {
    threshold: f32,
    hysteresis: f32,
    hold_ticks: u32,
    cooldown: Duration,
    armed: bool,
    above: u32,
    last_fired: Option<Duration>,
}

impl Debouncer {
    pub fn new(threshold: f32, hysteresis: f32, hold_ticks: u32, cooldown: Duration) -> Self {
        Self {
            threshold,
            hysteresis,
            hold_ticks: hold_ticks.max(1),
            cooldown,
            armed: true,
            above: 0,
            last_fired: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.brow_threshold,
            settings.brow_hysteresis,
            settings.hold_ticks,
            settings.cooldown(),
        )
    }

    /// Feed one sample taken at `now`; returns true when the trigger fires
    pub fn update(&mut self, value: f32, now: Duration) -> bool {
        if value < self.release_level() {
            self.armed = true;
        }

        if value < self.threshold {
            self.above = 0;
            return false;
        }

        self.above = self.above.saturating_add(1);
        if !self.armed || self.above < self.hold_ticks || self.cooling_down(now) {
            return false;
        }

        self.armed = false;
        self.last_fired = Some(now);
        true
    }

    /// No sample this tick. The hold count restarts, the armed state is kept.
    pub fn miss(&mut self) {
        self.above = 0;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn last_fired(&self) -> Option<Duration> {
        self.last_fired
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    fn release_level(&self) -> f32 {
        self.threshold - self.hysteresis
    }

    fn cooling_down(&self, now: Duration) -> bool {
        match self.last_fired {
            Some(at) => now.saturating_sub(at) < self.cooldown,
            None => false,
        }
    }
}
