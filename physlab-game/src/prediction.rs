use serde::{Deserialize, Serialize};

use crate::phase::Phase;

/// Static answer key for a predict or twist-predict screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionPrompt {
    pub options: Vec<String>,
    pub correct: String,
}

impl PredictionPrompt {
    #[must_use]
    pub fn new(options: &[&str], correct: &str) -> Self {
        Self {
            options: options.iter().map(|option| (*option).to_string()).collect(),
            correct: correct.to_string(),
        }
    }

    #[must_use]
    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|option| option == option_id)
    }
}

/// The learner's locked-in choice, judged the moment it is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub phase: Phase,
    pub selected: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionOutcome {
    Recorded(PredictionRecord),
    AlreadyMade(PredictionRecord),
    UnknownOption,
    /// The current phase does not take a prediction.
    NotAvailable,
}

impl PredictionOutcome {
    #[must_use]
    pub const fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded(_))
    }
}

/// Judge `option_id` against the prompt; `None` when the id is not an option.
#[must_use]
pub fn judge(phase: Phase, prompt: &PredictionPrompt, option_id: &str) -> Option<PredictionRecord> {
    if !prompt.has_option(option_id) {
        return None;
    }
    Some(PredictionRecord {
        phase,
        selected: option_id.to_string(),
        correct: prompt.correct == option_id,
    })
}
