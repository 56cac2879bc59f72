//! Knowledge-test question banks, answer tracking, and scoring.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::numbers::{ceil_f64_to_usize, percent_of, usize_to_f64};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(default)]
    pub scenario: String,
    pub prompt: String,
    pub options: Vec<QuizOption>,
    /// Id of the correct option.
    pub correct: String,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    #[must_use]
    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|option| option.id == option_id)
    }
}

/// Ordered question list for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QuizBank {
    pub questions: Vec<QuizQuestion>,
}

/// Raised when quiz content is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("quiz bank has no questions")]
    EmptyBank,
    #[error("question {index} has no options")]
    NoOptions { index: usize },
    #[error("question {index} marks '{correct}' correct but has no such option")]
    MissingCorrectOption { index: usize, correct: String },
    #[error("question {index} repeats option id '{option}'")]
    DuplicateOption { index: usize, option: String },
    #[error("invalid quiz json: {0}")]
    Json(String),
}

impl QuizBank {
    #[must_use]
    pub fn from_questions(questions: Vec<QuizQuestion>) -> Self {
        Self { questions }
    }

    /// Parse and validate a bank from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the bank fails [`QuizBank::validate`].
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let bank: Self =
            serde_json::from_str(json).map_err(|err| ContentError::Json(err.to_string()))?;
        bank.validate()?;
        Ok(bank)
    }

    /// # Errors
    ///
    /// Returns the first structural problem found in the bank.
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.questions.is_empty() {
            return Err(ContentError::EmptyBank);
        }
        for (index, question) in self.questions.iter().enumerate() {
            if question.options.is_empty() {
                return Err(ContentError::NoOptions { index });
            }
            let mut seen = HashSet::new();
            for option in &question.options {
                if !seen.insert(option.id.as_str()) {
                    return Err(ContentError::DuplicateOption {
                        index,
                        option: option.id.clone(),
                    });
                }
            }
            if !question.has_option(&question.correct) {
                return Err(ContentError::MissingCorrectOption {
                    index,
                    correct: question.correct.clone(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Per-game pass rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PassThreshold {
    Percent(u8),
    MinCorrect(usize),
}

impl PassThreshold {
    /// Minimum number of correct answers out of `total`.
    #[must_use]
    pub fn required(self, total: usize) -> usize {
        match self {
            Self::Percent(pct) => ceil_f64_to_usize(usize_to_f64(total) * f64::from(pct) / 100.0),
            Self::MinCorrect(count) => count,
        }
    }

    #[must_use]
    pub fn is_met(self, score: usize, total: usize) -> bool {
        match self {
            Self::Percent(pct) => percent_of(score, total) >= f64::from(pct) - 1e-9,
            Self::MinCorrect(count) => score >= count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    pub required: usize,
    pub passed: bool,
    /// Correctness of each answer, in question order.
    pub per_question: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Scored(QuizResult),
    Refused { unanswered: usize },
    AlreadySubmitted,
    /// The test screen is not open.
    NotAvailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizAction {
    Selected,
    Locked,
    NoSuchQuestion,
    UnknownOption,
    /// The test screen is not open.
    NotAvailable,
}

/// Answers and submission state for one attempt at the bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizState {
    bank: QuizBank,
    answers: Vec<Option<String>>,
    current: usize,
    result: Option<QuizResult>,
}

impl QuizState {
    #[must_use]
    pub fn new(bank: QuizBank) -> Self {
        let answers = vec![None; bank.len()];
        Self {
            bank,
            answers,
            current: 0,
            result: None,
        }
    }

    pub fn select_answer(&mut self, question: usize, option_id: &str) -> QuizAction {
        if self.result.is_some() {
            return QuizAction::Locked;
        }
        let Some(entry) = self.bank.questions.get(question) else {
            return QuizAction::NoSuchQuestion;
        };
        if !entry.has_option(option_id) {
            return QuizAction::UnknownOption;
        }
        self.answers[question] = Some(option_id.to_string());
        QuizAction::Selected
    }

    /// Score the attempt once every question has an answer.
    pub fn submit(&mut self, threshold: PassThreshold) -> SubmitOutcome {
        if self.result.is_some() {
            return SubmitOutcome::AlreadySubmitted;
        }
        let unanswered = self.unanswered_count();
        if unanswered > 0 {
            return SubmitOutcome::Refused { unanswered };
        }
        let per_question: Vec<bool> = self
            .bank
            .questions
            .iter()
            .zip(&self.answers)
            .map(|(question, answer)| answer.as_deref() == Some(question.correct.as_str()))
            .collect();
        let score = per_question.iter().filter(|correct| **correct).count();
        let total = self.bank.len();
        let passed = threshold.is_met(score, total);
        let result = QuizResult {
            score,
            total,
            required: threshold.required(total),
            passed,
            per_question,
        };
        self.result = Some(result.clone());
        SubmitOutcome::Scored(result)
    }

    /// Clear answers for another attempt, back to the state `new` builds.
    pub fn reset(&mut self) {
        self.answers = vec![None; self.bank.len()];
        self.current = 0;
        self.result = None;
    }

    pub fn go_to_question(&mut self, question: usize) -> bool {
        if question < self.bank.len() {
            self.current = question;
            true
        } else {
            false
        }
    }

    pub fn next_question(&mut self) -> bool {
        self.go_to_question(self.current + 1)
    }

    pub fn previous_question(&mut self) -> bool {
        self.current
            .checked_sub(1)
            .is_some_and(|question| self.go_to_question(question))
    }

    #[must_use]
    pub fn all_answered(&self) -> bool {
        self.answers.iter().all(Option::is_some)
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.answers.iter().filter(|answer| answer.is_none()).count()
    }

    #[must_use]
    pub fn answer(&self, question: usize) -> Option<&str> {
        self.answers.get(question).and_then(Option::as_deref)
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.bank.questions.get(self.current)
    }

    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        self.result.is_some()
    }

    /// Score of the submitted attempt; `None` before submission.
    #[must_use]
    pub fn score(&self) -> Option<usize> {
        self.result.as_ref().map(|result| result.score)
    }

    #[must_use]
    pub const fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.result.as_ref().is_some_and(|result| result.passed)
    }

    #[must_use]
    pub const fn bank(&self) -> &QuizBank {
        &self.bank
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bank.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bank.is_empty()
    }
}
