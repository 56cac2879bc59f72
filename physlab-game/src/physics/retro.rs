//! Two-mirror corner reflector in the plane.
//!
//! Two reflections off mirrors meeting at corner angle `α` rotate a ray by
//! `2α`. At 90° the ray comes back antiparallel to the way it arrived.
use serde::{Deserialize, Serialize};

use super::PhysicsModel;
use crate::constants::{
    CORNER_ACCEPTANCE, CORNER_ANGLE_DEFAULT, CORNER_ANGLE_MAX, CORNER_ANGLE_MIN,
    INCIDENCE_DEFAULT, INCIDENCE_MAX, INCIDENCE_MIN, RETRO_TOLERANCE,
};
use crate::controls::{ControlId, ControlPanel};
use crate::numbers::{angular_difference, finite_or, wrap_degrees};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetroReading {
    /// Direction of the incoming ray, degrees from the reflector axis.
    pub incidence_angle: f64,
    pub corner_angle: f64,
    /// Heading of the outgoing ray in `[0, 360)`, same frame as the incoming heading.
    pub outgoing_heading: f64,
    /// Degrees between the outgoing ray and the direct path back to the source.
    pub return_error: f64,
    /// Share of the beam that hits both mirrors, percent.
    pub returned_percent: f64,
    pub returns_to_source: bool,
}

/// Angle by which the outgoing ray misses the source, `|2α − 180|`.
#[must_use]
pub fn return_error(corner_angle: f64) -> f64 {
    let corner = finite_or(corner_angle, CORNER_ANGLE_DEFAULT);
    angular_difference(2.0 * corner, 180.0)
}

/// Aperture share that sees both mirrors of a right-angle corner: `1 − tan|θ|`.
#[must_use]
pub fn returned_fraction(incidence_angle: f64) -> f64 {
    let theta = finite_or(incidence_angle, CORNER_ACCEPTANCE).abs();
    if theta >= CORNER_ACCEPTANCE {
        return 0.0;
    }
    (1.0 - theta.to_radians().tan()).clamp(0.0, 1.0) * 100.0
}

fn reading(incidence: f64, corner: f64) -> RetroReading {
    // Incoming heading points from the source toward the reflector.
    let incoming_heading = wrap_degrees(180.0 + incidence);
    let outgoing_heading = wrap_degrees(incoming_heading + 2.0 * corner);
    let error = return_error(corner);
    let returned = returned_fraction(incidence);
    RetroReading {
        incidence_angle: incidence,
        corner_angle: corner,
        outgoing_heading,
        return_error: error,
        returned_percent: returned,
        returns_to_source: error <= RETRO_TOLERANCE && returned > 0.0,
    }
}

fn incidence(controls: &ControlPanel) -> f64 {
    finite_or(
        controls.get_or(ControlId::IncidenceAngle, INCIDENCE_DEFAULT),
        INCIDENCE_DEFAULT,
    )
    .clamp(INCIDENCE_MIN, INCIDENCE_MAX)
}

/// Play screen: a perfect 90° corner lit from a varying direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CornerReflector;

impl PhysicsModel for CornerReflector {
    type Output = RetroReading;

    fn evaluate(&self, controls: &ControlPanel) -> RetroReading {
        reading(incidence(controls), CORNER_ANGLE_DEFAULT)
    }
}

/// Twist screen: the corner angle itself is adjustable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TunableCorner;

impl PhysicsModel for TunableCorner {
    type Output = RetroReading;

    fn evaluate(&self, controls: &ControlPanel) -> RetroReading {
        let corner = finite_or(
            controls.get_or(ControlId::CornerAngle, CORNER_ANGLE_DEFAULT),
            CORNER_ANGLE_DEFAULT,
        )
        .clamp(CORNER_ANGLE_MIN, CORNER_ANGLE_MAX);
        reading(incidence(controls), corner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::ControlSpec;

    #[test]
    fn right_angle_corner_sends_light_home() {
        assert!(return_error(90.0).abs() < 1e-9);
        assert!((return_error(100.0) - 20.0).abs() < 1e-9);
        assert!((return_error(80.0) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn outgoing_heading_is_antiparallel_at_ninety() {
        for incidence in [-40.0, -10.0, 0.0, 25.0] {
            let r = reading(incidence, 90.0);
            let back_to_source = wrap_degrees(incidence);
            assert!(angular_difference(r.outgoing_heading, back_to_source) < 1e-9);
        }
    }

    #[test]
    fn acceptance_falls_off_with_angle() {
        assert!((returned_fraction(0.0) - 100.0).abs() < 1e-9);
        assert!(returned_fraction(30.0) < returned_fraction(10.0));
        assert!((returned_fraction(-30.0) - returned_fraction(30.0)).abs() < 1e-12);
        assert!(returned_fraction(45.0).abs() < f64::EPSILON);
        assert!(returned_fraction(60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tunable_corner_misses_when_detuned() {
        let mut panel = ControlPanel::from_specs(&[
            ControlSpec::new(ControlId::IncidenceAngle, -60.0, 60.0, 0.0),
            ControlSpec::new(ControlId::CornerAngle, 60.0, 120.0, 90.0),
        ]);
        assert!(TunableCorner.evaluate(&panel).returns_to_source);
        panel.set(ControlId::CornerAngle, 95.0);
        let detuned = TunableCorner.evaluate(&panel);
        assert!(!detuned.returns_to_source);
        assert!((detuned.return_error - 10.0).abs() < 1e-9);
        panel.set(ControlId::CornerAngle, 90.0);
        panel.set(ControlId::IncidenceAngle, 50.0);
        assert!(!TunableCorner.evaluate(&panel).returns_to_source);
    }
}
