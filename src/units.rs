use serde::{Deserialize, Serialize};

/// Number of EMU (English Metric Units) in one point
pub const EMU_PER_POINT: f64 = 12700.0;

/// Convert points to EMU
pub fn points_to_emu(points: f64) -> f64 {
    points * EMU_PER_POINT
}

/// Convert EMU to points
pub fn emu_to_points(emu: f64) -> f64 {
    emu / EMU_PER_POINT
}

/// Length unit tag as used by the editing API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Unit {
    #[serde(alias = "POINT")]
    Pt,
    Emu,
}

/// A magnitude with its unit, serialized as `{magnitude, unit}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    #[serde(default)]
    pub magnitude: f64,
    #[serde(default = "default_unit")]
    pub unit: Unit,
}

fn default_unit() -> Unit {
    Unit::Emu
}

impl Length {
    pub fn points(magnitude: f64) -> Self {
        Self { magnitude, unit: Unit::Pt }
    }

    pub fn emu(magnitude: f64) -> Self {
        Self { magnitude, unit: Unit::Emu }
    }

    /// Magnitude expressed in EMU
    pub fn to_emu(&self) -> f64 {
        match self.unit {
            Unit::Emu => self.magnitude,
            Unit::Pt => points_to_emu(self.magnitude),
        }
    }

    /// Magnitude expressed in points
    pub fn to_points(&self) -> f64 {
        match self.unit {
            Unit::Emu => emu_to_points(self.magnitude),
            Unit::Pt => self.magnitude,
        }
    }

    /// Same length re-expressed in EMU
    pub fn in_emu(&self) -> Self {
        Self::emu(self.to_emu())
    }
}
