//! Ideal-gas relations: Boyle (isothermal) and Charles (isobaric).
use serde::{Deserialize, Serialize};

use super::PhysicsModel;
use crate::constants::{
    BOYLE_PRESSURE0, BOYLE_VOLUME0, CHARLES_TEMPERATURE0, CHARLES_VOLUME0, TEMPERATURE_DEFAULT,
    TEMPERATURE_MAX, TEMPERATURE_MIN, VOLUME_DEFAULT, VOLUME_MAX, VOLUME_MIN,
};
use crate::controls::{ControlId, ControlPanel};
use crate::numbers::finite_or;

/// Snapshot of the gas sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasState {
    /// atm
    pub pressure: f64,
    pub volume: f64,
    /// K
    pub temperature: f64,
}

/// `P = P0·V0 / V` at constant temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoyleLaw {
    pub pressure0: f64,
    pub volume0: f64,
}

impl Default for BoyleLaw {
    fn default() -> Self {
        Self {
            pressure0: BOYLE_PRESSURE0,
            volume0: BOYLE_VOLUME0,
        }
    }
}

impl BoyleLaw {
    /// Conserved `P·V` product.
    #[must_use]
    pub fn constant(&self) -> f64 {
        self.pressure0 * self.volume0
    }

    #[must_use]
    pub fn pressure_at(&self, volume: f64) -> f64 {
        let volume = finite_or(volume, VOLUME_DEFAULT).clamp(VOLUME_MIN, VOLUME_MAX);
        finite_or(self.constant() / volume, self.pressure0)
    }
}

impl PhysicsModel for BoyleLaw {
    type Output = GasState;

    fn evaluate(&self, controls: &ControlPanel) -> GasState {
        let volume = finite_or(controls.get_or(ControlId::Volume, VOLUME_DEFAULT), VOLUME_DEFAULT)
            .clamp(VOLUME_MIN, VOLUME_MAX);
        GasState {
            pressure: self.pressure_at(volume),
            volume,
            temperature: TEMPERATURE_DEFAULT,
        }
    }
}

/// `V = V0 · T / T0` at constant pressure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharlesLaw {
    pub volume0: f64,
    pub temperature0: f64,
}

impl Default for CharlesLaw {
    fn default() -> Self {
        Self {
            volume0: CHARLES_VOLUME0,
            temperature0: CHARLES_TEMPERATURE0,
        }
    }
}

impl CharlesLaw {
    #[must_use]
    pub fn volume_at(&self, temperature: f64) -> f64 {
        let temperature =
            finite_or(temperature, TEMPERATURE_DEFAULT).clamp(TEMPERATURE_MIN, TEMPERATURE_MAX);
        finite_or(self.volume0 * temperature / self.temperature0, self.volume0)
    }
}

impl PhysicsModel for CharlesLaw {
    type Output = GasState;

    fn evaluate(&self, controls: &ControlPanel) -> GasState {
        let temperature = finite_or(
            controls.get_or(ControlId::Temperature, TEMPERATURE_DEFAULT),
            TEMPERATURE_DEFAULT,
        )
        .clamp(TEMPERATURE_MIN, TEMPERATURE_MAX);
        GasState {
            pressure: BOYLE_PRESSURE0,
            volume: self.volume_at(temperature),
            temperature,
        }
    }
}
