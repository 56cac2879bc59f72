//! Closed-form physics models that back the exploration screens.
//!
//! Every model is a pure function of a [`ControlPanel`]: the same panel always
//! yields the same reading, out-of-domain values are clamped or wrapped first,
//! and no NaN/inf ever reaches the renderer.

pub mod chladni;
pub mod gas;
pub mod retro;
pub mod solar;

use serde::{Deserialize, Serialize};

use crate::controls::ControlPanel;
use crate::phase::Phase;

pub use chladni::{ChladniPlate, ChladniReading, NodalLines, ScaledChladniPlate};
pub use gas::{BoyleLaw, CharlesLaw, GasState};
pub use retro::{CornerReflector, RetroReading, TunableCorner};
pub use solar::{EclipseModel, SolarPanelModel, SolarReading};

/// Uniform contract for a derived-value mapping.
pub trait PhysicsModel {
    type Output;

    fn evaluate(&self, controls: &ControlPanel) -> Self::Output;
}

/// Which pair of models a game uses for `play` and `twist_play`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    GasLaws,
    SatelliteSolar,
    Chladni,
    Retroreflection,
}

/// Output of whichever model is active on the current exploration screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum DerivedPhysics {
    Gas(GasState),
    Solar(SolarReading),
    Chladni(ChladniReading),
    Retro(RetroReading),
}

impl ModelKind {
    /// Evaluate the model for `phase`, or `None` outside `play`/`twist_play`.
    #[must_use]
    pub fn evaluate(self, phase: Phase, controls: &ControlPanel) -> Option<DerivedPhysics> {
        let twist = match phase {
            Phase::Play => false,
            Phase::TwistPlay => true,
            _ => return None,
        };
        let derived = match (self, twist) {
            (Self::GasLaws, false) => DerivedPhysics::Gas(BoyleLaw::default().evaluate(controls)),
            (Self::GasLaws, true) => DerivedPhysics::Gas(CharlesLaw::default().evaluate(controls)),
            (Self::SatelliteSolar, false) => {
                DerivedPhysics::Solar(SolarPanelModel::default().evaluate(controls))
            }
            (Self::SatelliteSolar, true) => {
                DerivedPhysics::Solar(EclipseModel::default().evaluate(controls))
            }
            (Self::Chladni, false) => DerivedPhysics::Chladni(ChladniPlate.evaluate(controls)),
            (Self::Chladni, true) => {
                DerivedPhysics::Chladni(ScaledChladniPlate.evaluate(controls))
            }
            (Self::Retroreflection, false) => {
                DerivedPhysics::Retro(CornerReflector.evaluate(controls))
            }
            (Self::Retroreflection, true) => {
                DerivedPhysics::Retro(TunableCorner.evaluate(controls))
            }
        };
        Some(derived)
    }
}
