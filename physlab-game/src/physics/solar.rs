//! Solar-array power on an orbiting satellite: cosine law plus eclipse.
use serde::{Deserialize, Serialize};

use super::PhysicsModel;
use crate::constants::{
    BETA_ANGLE_DEFAULT, BETA_ANGLE_MAX, BETA_ANGLE_MIN, FULL_POWER_PERCENT, MAX_ECLIPSE_ARC,
    ORBIT_POSITION_DEFAULT, PANEL_ANGLE_DEFAULT, PANEL_ANGLE_MAX, PANEL_ANGLE_MIN, SUN_DIRECTION,
};
use crate::controls::{ControlId, ControlPanel};
use crate::numbers::{angular_difference, finite_or, wrap_degrees};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarReading {
    /// Degrees in `[0, 90]`.
    pub incidence_angle: f64,
    pub power_percent: f64,
    pub in_eclipse: bool,
    /// Degrees of orbit spent in shadow.
    pub eclipse_duration: f64,
}

/// Angle between sunlight and the panel normal, clamped to `[0, 90]`.
///
/// The panel normal points along `orbit_position + panel_angle`; anything past
/// 90° faces away from the sun and is reported as 90°.
#[must_use]
pub fn incidence_angle(panel_angle: f64, orbit_position: f64, sun_direction: f64) -> f64 {
    let normal = finite_or(orbit_position, 0.0) + finite_or(panel_angle, 0.0);
    angular_difference(normal, finite_or(sun_direction, 0.0)).clamp(0.0, 90.0)
}

/// `max(0, cos θ) · 100`.
#[must_use]
pub fn cosine_power(incidence_degrees: f64) -> f64 {
    let theta = finite_or(incidence_degrees, 90.0).abs().min(90.0);
    let power = theta.to_radians().cos().max(0.0) * FULL_POWER_PERCENT;
    // cos(90°) is ~6e-17 in floating point
    if power < 1e-9 { 0.0 } else { power }
}

/// Degrees of orbit in shadow for a given beta angle.
#[must_use]
pub fn eclipse_duration(beta_angle: f64) -> f64 {
    let beta = finite_or(beta_angle, BETA_ANGLE_MAX).clamp(BETA_ANGLE_MIN, BETA_ANGLE_MAX);
    ((90.0 - beta) / 90.0).max(0.0) * MAX_ECLIPSE_ARC
}

/// Whether the satellite sits within the shadow arc centred on the antisolar point.
#[must_use]
pub fn in_eclipse(orbit_position: f64, sun_direction: f64, beta_angle: f64) -> bool {
    let half_arc = eclipse_duration(beta_angle) / 2.0;
    if half_arc <= 0.0 {
        return false;
    }
    let antisolar = wrap_degrees(finite_or(sun_direction, 0.0) + 180.0);
    angular_difference(wrap_degrees(finite_or(orbit_position, 0.0)), antisolar) <= half_arc
}

fn reading(incidence: f64, beta_angle: f64, orbit_position: f64) -> SolarReading {
    let eclipsed = in_eclipse(orbit_position, SUN_DIRECTION, beta_angle);
    SolarReading {
        incidence_angle: incidence,
        power_percent: if eclipsed { 0.0 } else { cosine_power(incidence) },
        in_eclipse: eclipsed,
        eclipse_duration: eclipse_duration(beta_angle),
    }
}

/// Play screen: tilt the panel while the satellite moves around its orbit.
///
/// The orbit here has a high beta angle, so it never enters shadow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPanelModel {
    pub beta_angle: f64,
}

impl Default for SolarPanelModel {
    fn default() -> Self {
        Self {
            beta_angle: BETA_ANGLE_MAX,
        }
    }
}

impl PhysicsModel for SolarPanelModel {
    type Output = SolarReading;

    fn evaluate(&self, controls: &ControlPanel) -> SolarReading {
        let panel = finite_or(
            controls.get_or(ControlId::PanelAngle, PANEL_ANGLE_DEFAULT),
            PANEL_ANGLE_DEFAULT,
        )
        .clamp(PANEL_ANGLE_MIN, PANEL_ANGLE_MAX);
        let orbit = wrap_degrees(controls.get_or(ControlId::OrbitPosition, ORBIT_POSITION_DEFAULT));
        let incidence = incidence_angle(panel, orbit, SUN_DIRECTION);
        reading(incidence, self.beta_angle, orbit)
    }
}

/// Twist screen: the panel tracks the sun, the beta angle decides the shadow.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EclipseModel;

impl PhysicsModel for EclipseModel {
    type Output = SolarReading;

    fn evaluate(&self, controls: &ControlPanel) -> SolarReading {
        let beta = finite_or(
            controls.get_or(ControlId::BetaAngle, BETA_ANGLE_DEFAULT),
            BETA_ANGLE_DEFAULT,
        )
        .clamp(BETA_ANGLE_MIN, BETA_ANGLE_MAX);
        let orbit = wrap_degrees(controls.get_or(ControlId::OrbitPosition, ORBIT_POSITION_DEFAULT));
        reading(0.0, beta, orbit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::ControlSpec;

    #[test]
    fn cosine_law_boundaries() {
        assert!((cosine_power(0.0) - 100.0).abs() < 1e-9);
        assert!(cosine_power(90.0).abs() < f64::EPSILON);
        assert!((cosine_power(60.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_law_is_non_increasing() {
        let mut previous = cosine_power(0.0);
        for step in 1..=180 {
            let angle = f64::from(step) * 0.5;
            let power = cosine_power(angle);
            assert!(power <= previous + 1e-12, "angle {angle}");
            assert!((cosine_power(-angle) - power).abs() < 1e-12);
            previous = power;
        }
    }

    #[test]
    fn incidence_wraps_and_clamps() {
        assert!((incidence_angle(30.0, 0.0, 0.0) - 30.0).abs() < 1e-9);
        assert!((incidence_angle(-20.0, 350.0, 0.0) - 30.0).abs() < 1e-9);
        assert!((incidence_angle(0.0, 180.0, 0.0) - 90.0).abs() < 1e-9);
        assert!((incidence_angle(0.0, 100.0, 0.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn eclipse_window_shrinks_with_beta() {
        assert!((eclipse_duration(0.0) - 60.0).abs() < 1e-9);
        assert!((eclipse_duration(45.0) - 30.0).abs() < 1e-9);
        assert!(eclipse_duration(90.0).abs() < 1e-9);
        assert!(in_eclipse(180.0, 0.0, 0.0));
        assert!(in_eclipse(209.0, 0.0, 0.0));
        assert!(!in_eclipse(211.0, 0.0, 0.0));
        assert!(in_eclipse(-170.0, 0.0, 0.0));
        assert!(!in_eclipse(180.0, 0.0, 90.0));
    }

    #[test]
    fn eclipse_overrides_power() {
        let mut panel = ControlPanel::from_specs(&[
            ControlSpec::new(ControlId::BetaAngle, 0.0, 90.0, 0.0),
            ControlSpec::full_circle(ControlId::OrbitPosition, 0.0),
        ]);
        for orbit in [170.0, 180.0, 195.0] {
            panel.set(ControlId::OrbitPosition, orbit);
            let reading = EclipseModel.evaluate(&panel);
            assert!(reading.in_eclipse);
            assert!(reading.power_percent.abs() < f64::EPSILON);
        }
        panel.set(ControlId::OrbitPosition, 90.0);
        let lit = EclipseModel.evaluate(&panel);
        assert!(!lit.in_eclipse);
        assert!((lit.power_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn play_model_never_eclipses() {
        let mut panel = ControlPanel::from_specs(&[
            ControlSpec::new(ControlId::PanelAngle, -90.0, 90.0, 0.0),
            ControlSpec::full_circle(ControlId::OrbitPosition, 0.0),
        ]);
        panel.set(ControlId::OrbitPosition, 180.0);
        let reading = SolarPanelModel::default().evaluate(&panel);
        assert!(!reading.in_eclipse);
        assert!(reading.power_percent.abs() < f64::EPSILON);
        panel.set(ControlId::OrbitPosition, 30.0);
        panel.set(ControlId::PanelAngle, -30.0);
        let aligned = SolarPanelModel::default().evaluate(&panel);
        assert!((aligned.power_percent - 100.0).abs() < 1e-9);
    }
}
