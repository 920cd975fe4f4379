//! Speed model: travel speed derived from payload size.

/// Speed of a package carrying a 16-byte payload.
pub const DEFAULT_SPEED: u32 = 11;

/// Reference payload size at which a package moves at base speed.
const REFERENCE_SIZE: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedModel {
    base_speed: u32,
}

impl SpeedModel {
    pub fn new(base_speed: u32) -> Self {
        Self { base_speed }
    }

    pub fn base_speed(&self) -> u32 {
        self.base_speed
    }

    /// `round(base * 16 / size)`, never below 1. Size 0 counts as 1.
    pub fn speed_for(&self, size_bytes: u32) -> u32 {
        let size = size_bytes.max(1) as f64;
        let raw = (self.base_speed as f64 * REFERENCE_SIZE as f64 / size).round();
        (raw as u32).max(1)
    }
}

impl Default for SpeedModel {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED)
    }
}
