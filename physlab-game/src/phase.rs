//! The fixed ten-step lesson flow shared by every game.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One screen in the lesson flow.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Hook,
    Predict,
    Play,
    Review,
    TwistPredict,
    TwistPlay,
    TwistReview,
    Transfer,
    Test,
    Mastery,
}

/// Canonical phase order. Identical for all games.
pub const PHASE_ORDER: [Phase; 10] = [
    Phase::Hook,
    Phase::Predict,
    Phase::Play,
    Phase::Review,
    Phase::TwistPredict,
    Phase::TwistPlay,
    Phase::TwistReview,
    Phase::Transfer,
    Phase::Test,
    Phase::Mastery,
];

/// Raised by [`Phase::from_str`] for ids outside the lesson flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown phase '{0}'")]
pub struct UnknownPhase(pub String);

impl Phase {
    /// Position in [`PHASE_ORDER`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        PHASE_ORDER.get(index).copied()
    }

    /// Following phase, `None` once mastery is reached.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    #[must_use]
    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Parse a host-supplied phase id such as `"twist_play"`. Only exact ids match.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        PHASE_ORDER
            .iter()
            .copied()
            .find(|phase| phase.as_str() == raw)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hook => "hook",
            Self::Predict => "predict",
            Self::Play => "play",
            Self::Review => "review",
            Self::TwistPredict => "twist_predict",
            Self::TwistPlay => "twist_play",
            Self::TwistReview => "twist_review",
            Self::Transfer => "transfer",
            Self::Test => "test",
            Self::Mastery => "mastery",
        }
    }

    /// Short human label for navigation dots and reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hook => "Hook",
            Self::Predict => "Predict",
            Self::Play => "Experiment",
            Self::Review => "Understanding",
            Self::TwistPredict => "New Variable",
            Self::TwistPlay => "Twist Experiment",
            Self::TwistReview => "Deep Insight",
            Self::Transfer => "Real World",
            Self::Test => "Knowledge Test",
            Self::Mastery => "Mastery",
        }
    }

    /// Phases that own a control panel.
    #[must_use]
    pub const fn is_exploration(self) -> bool {
        matches!(self, Self::Play | Self::TwistPlay)
    }

    /// Phases that ask the learner for a prediction.
    #[must_use]
    pub const fn is_prediction(self) -> bool {
        matches!(self, Self::Predict | Self::TwistPredict)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Mastery)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownPhase(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_matches_indices() {
        assert_eq!(PHASE_ORDER.len(), 10);
        for (idx, phase) in PHASE_ORDER.iter().enumerate() {
            assert_eq!(phase.index(), idx);
            assert_eq!(Phase::from_index(idx), Some(*phase));
        }
        assert_eq!(Phase::from_index(10), None);
    }

    #[test]
    fn next_and_previous_stop_at_the_ends() {
        assert_eq!(Phase::Hook.previous(), None);
        assert_eq!(Phase::Hook.next(), Some(Phase::Predict));
        assert_eq!(Phase::Test.next(), Some(Phase::Mastery));
        assert_eq!(Phase::Mastery.next(), None);
    }

    #[test]
    fn parse_accepts_wire_ids_only() {
        assert_eq!(Phase::parse("twist_play"), Some(Phase::TwistPlay));
        assert_eq!(Phase::parse(" mastery "), None);
        assert_eq!(Phase::parse("mastery\n"), None);
        assert_eq!(Phase::parse("TwistPlay"), None);
        assert_eq!(
            "not_a_phase".parse::<Phase>(),
            Err(UnknownPhase("not_a_phase".to_string()))
        );
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Phase::TwistReview).unwrap();
        assert_eq!(json, "\"twist_review\"");
        for phase in PHASE_ORDER {
            assert_eq!(phase.to_string(), phase.as_str());
            let restored: Phase = serde_json::from_str(&format!("\"{phase}\"")).unwrap();
            assert_eq!(restored, phase);
        }
    }
}
