use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

use physlab_game::{ControlSpec, PredictionPrompt, QuizQuestion};

/// How a simulated learner behaves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearnerProfile {
    /// Probability of picking the right prediction or quiz answer.
    pub accuracy: f64,
    /// Quiz attempts answered entirely wrong before answering normally.
    pub deliberate_failures: u32,
    pub max_attempts: u32,
    pub hint_rate: f64,
    /// Press "Next" before acting, to check that gates hold.
    pub probe_gates: bool,
    /// Random slider positions tried per exploration screen.
    pub slider_samples: usize,
}

impl LearnerProfile {
    #[must_use]
    pub const fn attentive() -> Self {
        Self {
            accuracy: 1.0,
            deliberate_failures: 0,
            max_attempts: 3,
            hint_rate: 0.0,
            probe_gates: false,
            slider_samples: 1,
        }
    }

    #[must_use]
    pub fn seeded(accuracy: f64) -> Self {
        Self {
            accuracy: accuracy.clamp(0.0, 1.0),
            max_attempts: 12,
            hint_rate: 0.1,
            slider_samples: 3,
            ..Self::attentive()
        }
    }

    #[must_use]
    pub const fn struggling(failures: u32) -> Self {
        Self {
            deliberate_failures: failures,
            max_attempts: failures + 1,
            ..Self::attentive()
        }
    }

    #[must_use]
    pub const fn prober() -> Self {
        Self {
            probe_gates: true,
            ..Self::attentive()
        }
    }

    #[must_use]
    pub const fn sweeper(samples: usize) -> Self {
        Self {
            slider_samples: samples,
            ..Self::attentive()
        }
    }
}

/// Random choices for one playthrough.
pub struct Learner {
    profile: LearnerProfile,
    rng: ChaCha20Rng,
}

impl Learner {
    pub const fn new(profile: LearnerProfile, rng: ChaCha20Rng) -> Self {
        Self { profile, rng }
    }

    pub const fn profile(&self) -> &LearnerProfile {
        &self.profile
    }

    fn answers_correctly(&mut self) -> bool {
        self.rng.gen_bool(self.profile.accuracy)
    }

    pub fn wants_hint(&mut self) -> bool {
        self.profile.hint_rate > 0.0 && self.rng.gen_bool(self.profile.hint_rate.min(1.0))
    }

    pub fn predict(&mut self, prompt: &PredictionPrompt) -> String {
        if self.answers_correctly() {
            return prompt.correct.clone();
        }
        let wrong: Vec<&String> = prompt
            .options
            .iter()
            .filter(|option| **option != prompt.correct)
            .collect();
        wrong
            .choose(&mut self.rng)
            .map_or_else(|| prompt.correct.clone(), |option| (*option).clone())
    }

    /// Pick an answer; `fail` forces a wrong one when the question has one.
    pub fn answer(&mut self, question: &QuizQuestion, fail: bool) -> String {
        if !fail && self.answers_correctly() {
            return question.correct.clone();
        }
        let wrong: Vec<&str> = question
            .options
            .iter()
            .map(|option| option.id.as_str())
            .filter(|id| *id != question.correct)
            .collect();
        wrong
            .choose(&mut self.rng)
            .map_or_else(|| question.correct.clone(), |id| (*id).to_string())
    }

    pub fn slider_value(&mut self, spec: &ControlSpec) -> f64 {
        self.rng.gen_range(spec.min..=spec.max)
    }

    pub fn visit_order(&mut self, total: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..total).collect();
        order.shuffle(&mut self.rng);
        order
    }
}
