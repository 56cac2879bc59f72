use std::sync::Arc;

use anyhow::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use physlab_game::{
    DerivedPhysics, EventType, GameEngine, GameEvent, GameSession, Navigation, Phase,
    RecordingSink, Refusal, SubmitOutcome,
};

use crate::logic::assets::TesterAssets;
use crate::logic::learner::{Learner, LearnerProfile};

/// Upper bound on "Next" presses before a run is declared stuck.
const MAX_STEPS: usize = 64;

pub struct SimulationPlan {
    pub phase_hint: Option<String>,
    pub learner: LearnerProfile,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(learner: LearnerProfile) -> Self {
        Self {
            phase_hint: None,
            learner,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_phase_hint(mut self, hint: impl Into<String>) -> Self {
        self.phase_hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

impl std::fmt::Debug for SimulationPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationPlan")
            .field("phase_hint", &self.phase_hint)
            .field("learner", &self.learner)
            .field("expectations", &self.expectations.len())
            .finish()
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Complete record of a simulated playthrough.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub game_type: String,
    pub seed: u64,
    pub start_phase: Phase,
    pub final_phase: Phase,
    pub furthest_unlocked: usize,
    pub steps: usize,
    /// Refused moves, keyed by the phase the learner stood on.
    pub refusals: Vec<(Phase, Refusal)>,
    pub physics: Vec<DerivedPhysics>,
    pub quiz_attempts: u32,
    pub final_score: Option<usize>,
    pub hints: u32,
    pub events: Vec<GameEvent>,
    /// Why the run stopped short of mastery, if it did.
    pub halted: Option<String>,
}

impl SimulationSummary {
    #[must_use]
    pub fn count(&self, event_type: EventType) -> usize {
        self.events
            .iter()
            .filter(|event| event.event_type == event_type)
            .count()
    }

    #[must_use]
    pub fn reached_mastery(&self) -> bool {
        self.final_phase == Phase::Mastery
    }
}

/// Headless deterministic runner for the core game logic.
#[derive(Clone)]
pub struct GameTester {
    verbose: bool,
    engine: Arc<GameEngine<TesterAssets>>,
}

impl GameTester {
    pub fn new(assets: TesterAssets, verbose: bool) -> Self {
        Self {
            verbose,
            engine: Arc::new(GameEngine::new(assets)),
        }
    }

    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Play `game_type` from mount to mastery (or until stuck).
    pub fn run_plan(
        &self,
        game_type: &str,
        plan: &SimulationPlan,
        seed: u64,
    ) -> Result<SimulationSummary> {
        let sink = RecordingSink::new();
        let mut session = self.engine.create_session(
            game_type,
            plan.phase_hint.as_deref(),
            Some(Box::new(sink.clone())),
        )?;
        let mut learner = Learner::new(plan.learner, ChaCha20Rng::seed_from_u64(seed));
        let mut run = RunState::new(session.phase());

        if self.verbose {
            println!(
                "🎮 Starting {game_type} | seed:{seed} start:{} accuracy:{:.2}",
                run.start_phase,
                plan.learner.accuracy
            );
        }

        while session.phase() != Phase::Mastery && run.halted.is_none() {
            if run.steps >= MAX_STEPS {
                run.halted = Some(format!("no progress after {MAX_STEPS} steps"));
                break;
            }
            run.steps += 1;
            let phase = session.phase();
            if learner.profile().probe_gates
                && !session.gate_status().satisfied
                && let Navigation::Refused(refusal) = session.next_phase()
            {
                run.refusals.push((phase, refusal));
            }
            if learner.wants_hint() {
                session.request_hint();
            }
            act(&mut session, &mut learner, &mut run);
            if run.halted.is_some() {
                break;
            }
            match session.next_phase() {
                Navigation::Moved { .. } | Navigation::Unchanged => {}
                Navigation::Refused(refusal) => {
                    run.refusals.push((phase, refusal));
                    run.halted = Some(format!("stuck on {phase}: {refusal:?}"));
                }
            }
        }

        let snapshot = session.snapshot();
        Ok(SimulationSummary {
            game_type: game_type.to_string(),
            seed,
            start_phase: run.start_phase,
            final_phase: snapshot.phase,
            furthest_unlocked: session.furthest_unlocked(),
            steps: run.steps,
            refusals: run.refusals,
            physics: run.physics,
            quiz_attempts: snapshot.quiz_attempts,
            final_score: snapshot.quiz_score,
            hints: snapshot.hints_used,
            events: sink.events(),
            halted: run.halted,
        })
    }
}

struct RunState {
    start_phase: Phase,
    steps: usize,
    refusals: Vec<(Phase, Refusal)>,
    physics: Vec<DerivedPhysics>,
    halted: Option<String>,
}

impl RunState {
    const fn new(start_phase: Phase) -> Self {
        Self {
            start_phase,
            steps: 0,
            refusals: Vec::new(),
            physics: Vec::new(),
            halted: None,
        }
    }
}

fn act(session: &mut GameSession, learner: &mut Learner, run: &mut RunState) {
    let phase = session.phase();
    match phase {
        Phase::Predict | Phase::TwistPredict => {
            if let Some(prompt) = session.config().prediction_for(phase).cloned() {
                let choice = learner.predict(&prompt);
                session.make_prediction(&choice);
            }
        }
        Phase::Play | Phase::TwistPlay => explore(session, learner, run),
        Phase::Transfer => {
            for app in learner.visit_order(session.transfer().total()) {
                session.visit_transfer_app(app);
            }
        }
        Phase::Test => take_test(session, learner, run),
        Phase::Hook | Phase::Review | Phase::TwistReview | Phase::Mastery => {}
    }
}

fn explore(session: &mut GameSession, learner: &mut Learner, run: &mut RunState) {
    let specs = session.config().controls_for(session.phase()).to_vec();
    if let Some(reading) = session.derived_physics() {
        run.physics.push(reading);
    }
    for _ in 0..learner.profile().slider_samples {
        for spec in &specs {
            let value = learner.slider_value(spec);
            session.set_control(spec.id, value);
            if let Some(reading) = session.derived_physics() {
                run.physics.push(reading);
            }
        }
    }
    // Leave the panel off its defaults so strict gates open.
    if !session.controls().moved_from_default()
        && let Some(spec) = specs.first()
    {
        session.set_control(spec.id, spec.min + (spec.max - spec.min) * 0.75);
    }
}

fn take_test(session: &mut GameSession, learner: &mut Learner, run: &mut RunState) {
    let max_attempts = learner.profile().max_attempts.max(1);
    while !session.quiz().passed() {
        let attempt = session.quiz_attempts();
        if attempt >= max_attempts {
            run.halted = Some(format!("quiz not passed after {attempt} attempts"));
            return;
        }
        if session.quiz().is_submitted() {
            session.reset_quiz();
        }
        let fail = attempt < learner.profile().deliberate_failures;
        let questions = session.quiz().bank().questions.clone();
        for (idx, question) in questions.iter().enumerate() {
            let choice = learner.answer(question, fail);
            session.select_answer(idx, &choice);
        }
        match session.submit_quiz() {
            SubmitOutcome::Scored(result) => {
                log::debug!(
                    "attempt {} scored {}/{}",
                    attempt + 1,
                    result.score,
                    result.total
                );
            }
            other => {
                run.halted = Some(format!("submission failed: {other:?}"));
                return;
            }
        }
    }
}
