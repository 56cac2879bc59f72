//! Chladni plate mode selection and a simplified nodal-line layout.
//!
//! The layout is a visual approximation: `m` evenly spaced vertical lines and
//! `n` evenly spaced horizontal lines, not the true plate eigenfunction.
use serde::{Deserialize, Serialize};

use super::PhysicsModel;
use crate::constants::{
    CHLADNI_BUCKETS, CHLADNI_TOP_MODE, FREQUENCY_DEFAULT, FREQUENCY_MAX, FREQUENCY_MIN,
    PLATE_SIZE_DEFAULT, PLATE_SIZE_MAX, PLATE_SIZE_MIN,
};
use crate::controls::{ControlId, ControlPanel};
use crate::numbers::finite_or;

/// Nodal-line positions on the unit plate, each in `(0, 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NodalLines {
    pub vertical: Vec<f64>,
    pub horizontal: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChladniReading {
    /// Frequency the plate actually responds to, after size scaling.
    pub effective_frequency: f64,
    pub mode_m: u8,
    pub mode_n: u8,
    pub nodal_lines: NodalLines,
}

/// Bucket a drive frequency (Hz) into its `(m, n)` mode pair.
#[must_use]
pub fn mode_for_frequency(frequency: f64) -> (u8, u8) {
    let frequency = finite_or(frequency, FREQUENCY_MIN);
    CHLADNI_BUCKETS
        .iter()
        .find(|(upper, _)| frequency < *upper)
        .map_or(CHLADNI_TOP_MODE, |(_, mode)| *mode)
}

fn spaced(count: u8) -> Vec<f64> {
    let slots = f64::from(count) + 1.0;
    (1..=count).map(|i| f64::from(i) / slots).collect()
}

#[must_use]
pub fn nodal_lines(mode_m: u8, mode_n: u8) -> NodalLines {
    NodalLines {
        vertical: spaced(mode_m),
        horizontal: spaced(mode_n),
    }
}

fn reading(effective_frequency: f64) -> ChladniReading {
    let (mode_m, mode_n) = mode_for_frequency(effective_frequency);
    ChladniReading {
        effective_frequency,
        mode_m,
        mode_n,
        nodal_lines: nodal_lines(mode_m, mode_n),
    }
}

fn drive_frequency(controls: &ControlPanel) -> f64 {
    finite_or(
        controls.get_or(ControlId::Frequency, FREQUENCY_DEFAULT),
        FREQUENCY_DEFAULT,
    )
    .clamp(FREQUENCY_MIN, FREQUENCY_MAX)
}

/// Square plate of fixed size driven at the frequency slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChladniPlate;

impl PhysicsModel for ChladniPlate {
    type Output = ChladniReading;

    fn evaluate(&self, controls: &ControlPanel) -> ChladniReading {
        reading(drive_frequency(controls))
    }
}

/// Plate whose size also varies. Mode frequencies scale with `1 / L²`, so a
/// fixed drive on a larger plate excites a higher mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScaledChladniPlate;

impl PhysicsModel for ScaledChladniPlate {
    type Output = ChladniReading;

    fn evaluate(&self, controls: &ControlPanel) -> ChladniReading {
        let size = finite_or(
            controls.get_or(ControlId::PlateSize, PLATE_SIZE_DEFAULT),
            PLATE_SIZE_DEFAULT,
        )
        .clamp(PLATE_SIZE_MIN, PLATE_SIZE_MAX);
        reading(drive_frequency(controls) * size * size)
    }
}
