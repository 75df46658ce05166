// Time-windowed score multiplier

use super::damage::ComboBoost;

pub const BASE_MULTIPLIER: f32 = 1.0;
pub const MAX_MULTIPLIER: f32 = 3.0;
/// Ticks a boost stays alive without another scoring hit (1s at 60Hz)
pub const COMBO_WINDOW: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboState {
    Idle,
    Active,
}

#[derive(Debug, Clone)]
pub struct ComboConfig {
    /// Ticks a boost stays alive
    pub window: u32,
    pub max_multiplier: f32,
    /// Pin the multiplier at 1.0
    pub locked: bool,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            window: COMBO_WINDOW,
            max_multiplier: MAX_MULTIPLIER,
            locked: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComboTracker {
    multiplier: f32,
    timer: u32,
    window: u32,
    max: f32,
    locked: bool,
}

impl Default for ComboTracker {
    fn default() -> Self {
        Self::from_config(&ComboConfig::default())
    }
}

impl ComboTracker {
    pub fn new(window: u32) -> Self {
        Self::from_config(&ComboConfig {
            window,
            ..ComboConfig::default()
        })
    }

    pub fn from_config(config: &ComboConfig) -> Self {
        let max = if config.max_multiplier.is_finite() {
            config.max_multiplier.clamp(BASE_MULTIPLIER, MAX_MULTIPLIER)
        } else {
            MAX_MULTIPLIER
        };
        Self {
            multiplier: BASE_MULTIPLIER,
            timer: 0,
            window: config.window.max(1),
            max,
            locked: config.locked,
        }
    }

    /// Tracker pinned at the base multiplier; boosts are ignored
    pub fn locked() -> Self {
        Self::from_config(&ComboConfig {
            locked: true,
            ..ComboConfig::default()
        })
    }

    /// Count down one tick, dropping back to Idle when the window runs out
    pub fn tick(&mut self) {
        if self.timer > 0 {
            self.timer -= 1;
            if self.timer == 0 {
                self.multiplier = BASE_MULTIPLIER;
            }
        }
    }

    pub fn boost(&mut self, boost: ComboBoost) {
        if self.locked {
            return;
        }
        self.multiplier = (self.multiplier + boost.increment()).min(self.max);
        self.timer = self.window;
    }

    /// Raw score scaled by the current multiplier
    pub fn scale(&self, raw: f32) -> f32 {
        raw * self.multiplier
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    pub fn remaining_ticks(&self) -> u32 {
        self.timer
    }

    pub fn state(&self) -> ComboState {
        if self.timer > 0 && self.multiplier > BASE_MULTIPLIER {
            ComboState::Active
        } else {
            ComboState::Idle
        }
    }

    pub fn reset(&mut self) {
        self.multiplier = BASE_MULTIPLIER;
        self.timer = 0;
    }
}
