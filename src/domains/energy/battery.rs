use serde::{Deserialize, Serialize};

/// Charge level, always within `0..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryState {
    level: u32,
    max: u32,
}

impl BatteryState {
    pub fn full(max: u32) -> Self {
        Self { level: max, max }
    }

    pub fn new(level: u32, max: u32) -> Self {
        Self { level: level.min(max), max }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_depleted(&self) -> bool {
        self.level == 0
    }

    /// Spend `cost`; bottoms out at zero.
    pub fn drain(&mut self, cost: u32) {
        self.level = self.level.saturating_sub(cost);
    }

    /// Add `amount`; tops out at `max`.
    pub fn charge(&mut self, amount: u32) {
        self.level = self.level.saturating_add(amount).min(self.max);
    }

    /// Adopt a level measured by the host.
    pub fn sync(&mut self, measured: u32) {
        self.level = measured.min(self.max);
    }
}
