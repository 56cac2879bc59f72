//! Per-game configuration: controls, gate strictness, answer keys, pass rule.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::controls::{ControlId, ControlSpec};
use crate::flow::GateRule;
use crate::phase::Phase;
use crate::physics::ModelKind;
use crate::prediction::PredictionPrompt;
use crate::quiz::PassThreshold;

/// Everything that distinguishes one game from another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Stable identifier, e.g. `gas-laws`.
    pub game_type: String,
    pub title: String,
    pub model: ModelKind,
    pub play_controls: Vec<ControlSpec>,
    pub twist_controls: Vec<ControlSpec>,
    #[serde(default)]
    pub play_gate: GateRule,
    #[serde(default)]
    pub twist_play_gate: GateRule,
    pub prediction: PredictionPrompt,
    pub twist_prediction: PredictionPrompt,
    /// Identifiers of the real-world applications on the transfer screen.
    pub transfer_apps: Vec<String>,
    pub pass_threshold: PassThreshold,
}

/// Errors raised when game configuration invariants are violated.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("game type must not be empty")]
    EmptyGameType,
    #[error("{phase} has no controls")]
    NoControls { phase: Phase },
    #[error("{phase} declares {control:?} twice")]
    DuplicateControl { phase: Phase, control: ControlId },
    #[error("{control:?} range invalid (min {min:.2} >= max {max:.2})")]
    InvertedRange { control: ControlId, min: f64, max: f64 },
    #[error("{control:?} wraps but declares {min:.2}..{max:.2} instead of 0..360")]
    PartialWrap { control: ControlId, min: f64, max: f64 },
    #[error("{control:?} default {default:.2} outside {min:.2}..={max:.2}")]
    DefaultOutOfRange {
        control: ControlId,
        min: f64,
        max: f64,
        default: f64,
    },
    #[error("{phase} prediction marks '{correct}' correct but offers no such option")]
    PredictionKey { phase: Phase, correct: String },
    #[error("transfer screen needs at least one application")]
    NoTransferApps,
    #[error("pass threshold of {0}% exceeds 100%")]
    PercentOver100(u8),
    #[error("pass threshold of {required} correct exceeds the {questions} available questions")]
    ThresholdExceedsBank { required: usize, questions: usize },
    #[error("invalid config json: {0}")]
    Json(String),
}

fn validate_controls(phase: Phase, specs: &[ControlSpec]) -> Result<(), ConfigError> {
    if specs.is_empty() {
        return Err(ConfigError::NoControls { phase });
    }
    for (idx, spec) in specs.iter().enumerate() {
        if specs[..idx].iter().any(|other| other.id == spec.id) {
            return Err(ConfigError::DuplicateControl {
                phase,
                control: spec.id,
            });
        }
        if spec.min.is_nan() || spec.max.is_nan() || spec.min >= spec.max {
            return Err(ConfigError::InvertedRange {
                control: spec.id,
                min: spec.min,
                max: spec.max,
            });
        }
        if spec.wraps && !spec.is_full_circle() {
            return Err(ConfigError::PartialWrap {
                control: spec.id,
                min: spec.min,
                max: spec.max,
            });
        }
        if !spec.contains(spec.default) {
            return Err(ConfigError::DefaultOutOfRange {
                control: spec.id,
                min: spec.min,
                max: spec.max,
                default: spec.default,
            });
        }
    }
    Ok(())
}

fn validate_prediction(phase: Phase, prompt: &PredictionPrompt) -> Result<(), ConfigError> {
    if prompt.has_option(&prompt.correct) {
        Ok(())
    } else {
        Err(ConfigError::PredictionKey {
            phase,
            correct: prompt.correct.clone(),
        })
    }
}

impl GameConfig {
    /// Parse and validate a config from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails [`GameConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Json(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns the first invariant violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game_type.trim().is_empty() {
            return Err(ConfigError::EmptyGameType);
        }
        validate_controls(Phase::Play, &self.play_controls)?;
        validate_controls(Phase::TwistPlay, &self.twist_controls)?;
        validate_prediction(Phase::Predict, &self.prediction)?;
        validate_prediction(Phase::TwistPredict, &self.twist_prediction)?;
        if self.transfer_apps.is_empty() {
            return Err(ConfigError::NoTransferApps);
        }
        if let PassThreshold::Percent(pct) = self.pass_threshold
            && pct > 100
        {
            return Err(ConfigError::PercentOver100(pct));
        }
        Ok(())
    }

    /// Check the pass rule against a bank of `questions`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bank is too small to ever pass.
    pub fn validate_for_bank(&self, questions: usize) -> Result<(), ConfigError> {
        let required = self.pass_threshold.required(questions);
        if required > questions {
            return Err(ConfigError::ThresholdExceedsBank {
                required,
                questions,
            });
        }
        Ok(())
    }

    /// Controls declared for `phase`; empty outside the exploration phases.
    #[must_use]
    pub fn controls_for(&self, phase: Phase) -> &[ControlSpec] {
        match phase {
            Phase::Play => &self.play_controls,
            Phase::TwistPlay => &self.twist_controls,
            _ => &[],
        }
    }

    #[must_use]
    pub fn prediction_for(&self, phase: Phase) -> Option<&PredictionPrompt> {
        match phase {
            Phase::Predict => Some(&self.prediction),
            Phase::TwistPredict => Some(&self.twist_prediction),
            _ => None,
        }
    }

    #[must_use]
    pub fn gate_rule_for(&self, phase: Phase) -> GateRule {
        match phase {
            Phase::Play => self.play_gate,
            Phase::TwistPlay => self.twist_play_gate,
            _ => GateRule::Open,
        }
    }
}
