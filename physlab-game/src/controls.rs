//! Slider state owned by the exploration screens.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::numbers::wrap_degrees;

/// Identifier for a learner-adjustable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlId {
    Volume,
    Temperature,
    PanelAngle,
    OrbitPosition,
    BetaAngle,
    Frequency,
    PlateSize,
    IncidenceAngle,
    CornerAngle,
}

impl ControlId {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Temperature => "temperature",
            Self::PanelAngle => "panel_angle",
            Self::OrbitPosition => "orbit_position",
            Self::BetaAngle => "beta_angle",
            Self::Frequency => "frequency",
            Self::PlateSize => "plate_size",
            Self::IncidenceAngle => "incidence_angle",
            Self::CornerAngle => "corner_angle",
        }
    }
}

/// Declared domain and default for one control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlSpec {
    pub id: ControlId,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    /// Angular controls wrap instead of clamping. Only valid on `[0, 360)`.
    #[serde(default)]
    pub wraps: bool,
}

impl ControlSpec {
    #[must_use]
    pub const fn new(id: ControlId, min: f64, max: f64, default: f64) -> Self {
        Self {
            id,
            min,
            max,
            default,
            wraps: false,
        }
    }

    #[must_use]
    pub const fn full_circle(id: ControlId, default: f64) -> Self {
        Self {
            id,
            min: 0.0,
            max: 360.0,
            default,
            wraps: true,
        }
    }

    /// Bring `value` into the declared domain.
    #[must_use]
    pub fn constrain(&self, value: f64) -> f64 {
        if self.wraps {
            return wrap_degrees(value);
        }
        let (lo, hi) = (self.min.min(self.max), self.min.max(self.max));
        if lo.is_nan() || hi.is_nan() {
            return value;
        }
        value.clamp(lo, hi)
    }

    /// Whether a wrapping control declares exactly the full circle.
    #[must_use]
    pub fn is_full_circle(&self) -> bool {
        self.min.abs() < f64::EPSILON && (self.max - 360.0).abs() < f64::EPSILON
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        if self.wraps {
            (self.min..self.max).contains(&value)
        } else {
            (self.min..=self.max).contains(&value)
        }
    }
}

/// Current values for the controls of one exploration phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPanel {
    slots: SmallVec<[(ControlSpec, f64); 2]>,
}

impl ControlPanel {
    /// Panel with every control at its default.
    #[must_use]
    pub fn from_specs(specs: &[ControlSpec]) -> Self {
        Self {
            slots: specs
                .iter()
                .map(|spec| (*spec, spec.constrain(spec.default)))
                .collect(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            slots: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn get(&self, id: ControlId) -> Option<f64> {
        self.slots
            .iter()
            .find(|(spec, _)| spec.id == id)
            .map(|(_, value)| *value)
    }

    /// Value of `id`, or the fallback when this panel lacks the control.
    #[must_use]
    pub fn get_or(&self, id: ControlId, fallback: f64) -> f64 {
        self.get(id).unwrap_or(fallback)
    }

    #[must_use]
    pub fn spec(&self, id: ControlId) -> Option<&ControlSpec> {
        self.slots
            .iter()
            .find(|(spec, _)| spec.id == id)
            .map(|(spec, _)| spec)
    }

    /// Set a control, constraining it to its domain. Returns the stored value,
    /// or `None` when the control is absent or the input is not finite.
    pub fn set(&mut self, id: ControlId, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let (spec, slot) = self.slots.iter_mut().find(|(spec, _)| spec.id == id)?;
        *slot = spec.constrain(value);
        Some(*slot)
    }

    pub fn reset(&mut self) {
        for (spec, value) in &mut self.slots {
            *value = spec.constrain(spec.default);
        }
    }

    /// Whether any control differs from its default.
    #[must_use]
    pub fn moved_from_default(&self) -> bool {
        self.slots
            .iter()
            .any(|(spec, value)| (*value - spec.constrain(spec.default)).abs() > f64::EPSILON)
    }

    pub fn values(&self) -> impl Iterator<Item = (ControlId, f64)> + '_ {
        self.slots.iter().map(|(spec, value)| (spec.id, *value))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> ControlPanel {
        ControlPanel::from_specs(&[
            ControlSpec::new(ControlId::Volume, 25.0, 200.0, 100.0),
            ControlSpec::full_circle(ControlId::OrbitPosition, 0.0),
        ])
    }

    #[test]
    fn set_clamps_and_wraps() {
        let mut panel = panel();
        assert_eq!(panel.set(ControlId::Volume, 500.0), Some(200.0));
        assert_eq!(panel.set(ControlId::Volume, 10.0), Some(25.0));
        assert_eq!(panel.set(ControlId::OrbitPosition, -30.0), Some(330.0));
        assert_eq!(panel.set(ControlId::OrbitPosition, 360.0), Some(0.0));
        let values: Vec<(ControlId, f64)> = panel.values().collect();
        assert_eq!(
            values,
            [(ControlId::Volume, 25.0), (ControlId::OrbitPosition, 0.0)]
        );
    }

    #[test]
    fn set_rejects_unknown_and_non_finite() {
        let mut panel = panel();
        assert_eq!(panel.set(ControlId::Frequency, 300.0), None);
        assert_eq!(panel.set(ControlId::Volume, f64::NAN), None);
        assert_eq!(panel.get(ControlId::Volume), Some(100.0));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut panel = panel();
        assert!(!panel.moved_from_default());
        panel.set(ControlId::Volume, 50.0);
        assert!(panel.moved_from_default());
        panel.reset();
        assert!(!panel.moved_from_default());
        assert_eq!(panel.get(ControlId::Volume), Some(100.0));
    }

    #[test]
    fn spec_contains_respects_wrapping() {
        let orbit = ControlSpec::full_circle(ControlId::OrbitPosition, 0.0);
        assert!(orbit.contains(0.0));
        assert!(!orbit.contains(360.0));
        assert!(orbit.is_full_circle());
        let volume = ControlSpec::new(ControlId::Volume, 25.0, 200.0, 100.0);
        assert!(volume.contains(200.0));
    }

    #[test]
    fn panel_exposes_declared_specs() {
        let panel = panel();
        let orbit = panel.spec(ControlId::OrbitPosition).unwrap();
        assert!(orbit.wraps);
        assert_eq!((orbit.min, orbit.max), (0.0, 360.0));
        assert_eq!(panel.spec(ControlId::Volume).map(|s| s.max), Some(200.0));
        assert!(panel.spec(ControlId::Frequency).is_none());
    }
}
