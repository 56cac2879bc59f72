//! Phase state machine and forward-progress gates.
//!
//! Refused moves are values, not errors: the host decides whether to disable
//! a button or show a message.
use serde::{Deserialize, Serialize};

use crate::phase::{PHASE_ORDER, Phase};

/// How strict an exploration screen is before "Next" unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateRule {
    #[default]
    Open,
    RequireMovedFromDefault,
}

/// Facts about the session that gates are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateInputs {
    pub prediction_made: bool,
    pub twist_prediction_made: bool,
    /// Whether the active panel has moved off its defaults.
    pub controls_moved: bool,
    pub play_gate: GateRule,
    pub twist_play_gate: GateRule,
    pub transfer_visited: usize,
    pub transfer_total: usize,
    pub quiz_submitted: bool,
    pub quiz_score: usize,
    pub quiz_required: usize,
    pub quiz_passed: bool,
}

/// What is still missing before the learner may leave a phase forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GateBlocker {
    PredictionMissing,
    ControlsUntouched,
    TransferIncomplete { visited: usize, total: usize },
    QuizNotSubmitted,
    QuizNotPassed { score: usize, required: usize },
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateStatus {
    pub phase: Phase,
    pub satisfied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocker: Option<GateBlocker>,
}

fn exploration_blocker(rule: GateRule, inputs: &GateInputs) -> Option<GateBlocker> {
    match rule {
        GateRule::Open => None,
        GateRule::RequireMovedFromDefault if inputs.controls_moved => None,
        GateRule::RequireMovedFromDefault => Some(GateBlocker::ControlsUntouched),
    }
}

/// Evaluate the forward gate of `phase`.
#[must_use]
pub fn gate_status(phase: Phase, inputs: &GateInputs) -> GateStatus {
    let blocker = match phase {
        Phase::Hook | Phase::Review | Phase::TwistReview => None,
        Phase::Predict => (!inputs.prediction_made).then_some(GateBlocker::PredictionMissing),
        Phase::TwistPredict => {
            (!inputs.twist_prediction_made).then_some(GateBlocker::PredictionMissing)
        }
        Phase::Play => exploration_blocker(inputs.play_gate, inputs),
        Phase::TwistPlay => exploration_blocker(inputs.twist_play_gate, inputs),
        Phase::Transfer => (inputs.transfer_visited < inputs.transfer_total).then_some(
            GateBlocker::TransferIncomplete {
                visited: inputs.transfer_visited,
                total: inputs.transfer_total,
            },
        ),
        Phase::Test if !inputs.quiz_submitted => Some(GateBlocker::QuizNotSubmitted),
        Phase::Test => (!inputs.quiz_passed).then_some(GateBlocker::QuizNotPassed {
            score: inputs.quiz_score,
            required: inputs.quiz_required,
        }),
        Phase::Mastery => Some(GateBlocker::Terminal),
    };
    GateStatus {
        phase,
        satisfied: blocker.is_none(),
        blocker,
    }
}

#[must_use]
pub fn is_gate_satisfied(phase: Phase, inputs: &GateInputs) -> bool {
    gate_status(phase, inputs).satisfied
}

/// Why a navigation request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Refusal {
    /// The frontier phase's gate is not yet satisfied.
    GateClosed { phase: Phase, blocker: Option<GateBlocker> },
    /// Target lies more than one step past the furthest unlocked phase, or the
    /// learner is not standing on the frontier.
    BeyondFrontier { target: Phase, frontier: Phase },
    /// Mastery has no forward transition.
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved { from: Phase, to: Phase },
    Unchanged,
    Refused(Refusal),
}

impl Navigation {
    #[must_use]
    pub const fn moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Current phase plus the furthest phase ever unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMachine {
    current: Phase,
    furthest_unlocked: usize,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::initialize(None)
    }
}

impl PhaseMachine {
    /// Start at a host-supplied phase when it is valid, otherwise at `hook`.
    #[must_use]
    pub fn initialize(hint: Option<&str>) -> Self {
        let start = match hint {
            Some(raw) => Phase::parse(raw).unwrap_or_else(|| {
                log::debug!("ignoring unknown phase hint '{raw}'");
                Phase::Hook
            }),
            None => Phase::Hook,
        };
        Self {
            current: start,
            furthest_unlocked: start.index(),
        }
    }

    #[must_use]
    pub const fn current(&self) -> Phase {
        self.current
    }

    #[must_use]
    pub const fn furthest_unlocked(&self) -> usize {
        self.furthest_unlocked
    }

    #[must_use]
    pub fn frontier(&self) -> Phase {
        Phase::from_index(self.furthest_unlocked).unwrap_or(Phase::Mastery)
    }

    /// Whether a move to `target` would be accepted given the frontier gate.
    #[must_use]
    pub fn check(&self, target: Phase, frontier_gate: &GateStatus) -> Result<(), Refusal> {
        let index = target.index();
        if index <= self.furthest_unlocked {
            return Ok(());
        }
        let frontier = self.frontier();
        if frontier.is_terminal() {
            return Err(Refusal::Terminal);
        }
        if index != self.furthest_unlocked + 1 || self.current != frontier {
            return Err(Refusal::BeyondFrontier { target, frontier });
        }
        if !frontier_gate.satisfied {
            return Err(Refusal::GateClosed {
                phase: frontier,
                blocker: frontier_gate.blocker,
            });
        }
        Ok(())
    }

    /// Move to `target` if allowed. `frontier_gate` is the gate status of the
    /// furthest unlocked phase.
    pub fn go_to(&mut self, target: Phase, frontier_gate: &GateStatus) -> Navigation {
        if target == self.current {
            return Navigation::Unchanged;
        }
        if let Err(refusal) = self.check(target, frontier_gate) {
            log::debug!("refused move {} -> {target}: {refusal:?}", self.current);
            return Navigation::Refused(refusal);
        }
        let from = self.current;
        self.current = target;
        self.furthest_unlocked = self.furthest_unlocked.max(target.index());
        Navigation::Moved { from, to: target }
    }

    /// Phases a navigation dot may jump to right now.
    #[must_use]
    pub fn reachable(&self, frontier_gate: &GateStatus) -> Vec<Phase> {
        PHASE_ORDER
            .iter()
            .copied()
            .filter(|phase| self.check(*phase, frontier_gate).is_ok())
            .collect()
    }
}
