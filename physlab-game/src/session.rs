//! One learner's run through a game, from mount to unmount.
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::config::{ConfigError, GameConfig};
use crate::constants::STRUGGLE_AFTER_FAILED_ATTEMPTS;
use crate::controls::{ControlId, ControlPanel};
use crate::flow::{GateInputs, GateStatus, Navigation, PhaseMachine, Refusal, gate_status};
use crate::numbers::percent_of;
use crate::phase::Phase;
use crate::physics::DerivedPhysics;
use crate::prediction::{PredictionOutcome, PredictionRecord, judge};
use crate::quiz::{ContentError, QuizAction, QuizBank, QuizState, SubmitOutcome};
use crate::telemetry::{EventType, TelemetryEmitter, TelemetrySink};
use crate::transfer::{TransferProgress, TransferVisit};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Content(#[from] ContentError),
}

/// Serializable summary of where a session stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub game_type: String,
    pub phase: Phase,
    pub furthest_unlocked: Phase,
    pub prediction_correct: Option<bool>,
    pub twist_prediction_correct: Option<bool>,
    pub transfer_visited: usize,
    pub transfer_total: usize,
    pub quiz_score: Option<usize>,
    pub quiz_attempts: u32,
    pub hints_used: u32,
}

#[derive(Debug)]
pub struct GameSession {
    config: GameConfig,
    machine: PhaseMachine,
    controls: ControlPanel,
    prediction: Option<PredictionRecord>,
    twist_prediction: Option<PredictionRecord>,
    transfer: TransferProgress,
    quiz: QuizState,
    telemetry: TelemetryEmitter,
    hints_used: u32,
    quiz_attempts: u32,
    failed_quiz_attempts: u32,
    mastery_announced: bool,
}

impl GameSession {
    /// Mount a game. `phase_hint` deep-links when it names a valid phase.
    ///
    /// # Errors
    ///
    /// Returns an error if the config or quiz bank is invalid, or the pass rule
    /// cannot be met with the bank supplied.
    pub fn new(
        config: GameConfig,
        bank: QuizBank,
        phase_hint: Option<&str>,
        sink: Option<Box<dyn TelemetrySink>>,
    ) -> Result<Self, SessionError> {
        let emitter = TelemetryEmitter::new(config.game_type.clone(), config.title.clone(), sink);
        Self::with_emitter(config, bank, phase_hint, emitter)
    }

    /// Like [`GameSession::new`] with a caller-built emitter.
    ///
    /// # Errors
    ///
    /// See [`GameSession::new`].
    pub fn with_emitter(
        config: GameConfig,
        bank: QuizBank,
        phase_hint: Option<&str>,
        telemetry: TelemetryEmitter,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        bank.validate()?;
        config.validate_for_bank(bank.len())?;

        let machine = PhaseMachine::initialize(phase_hint);
        let controls = ControlPanel::from_specs(config.controls_for(machine.current()));
        let transfer = TransferProgress::new(config.transfer_apps.len());
        let mut session = Self {
            config,
            machine,
            controls,
            prediction: None,
            twist_prediction: None,
            transfer,
            quiz: QuizState::new(bank),
            telemetry,
            hints_used: 0,
            quiz_attempts: 0,
            failed_quiz_attempts: 0,
            mastery_announced: false,
        };
        let start = session.machine.current();
        log::debug!("{}: session started at {start}", session.config.game_type);
        session.telemetry.emit(
            EventType::GameStarted,
            json!({
                "phase": start,
                "deepLinked": start != Phase::Hook,
                "questions": session.quiz.len(),
            }),
        );
        Ok(session)
    }

    fn gate_inputs(&self) -> GateInputs {
        let result = self.quiz.result();
        GateInputs {
            prediction_made: self.prediction.is_some(),
            twist_prediction_made: self.twist_prediction.is_some(),
            controls_moved: self.controls.moved_from_default(),
            play_gate: self.config.play_gate,
            twist_play_gate: self.config.twist_play_gate,
            transfer_visited: self.transfer.visited_count(),
            transfer_total: self.transfer.total(),
            quiz_submitted: result.is_some(),
            quiz_score: result.map_or(0, |r| r.score),
            quiz_required: self.config.pass_threshold.required(self.quiz.len()),
            quiz_passed: self.quiz.passed(),
        }
    }

    /// Gate of the phase the learner is on.
    #[must_use]
    pub fn gate_status(&self) -> GateStatus {
        self.gate_status_for(self.machine.current())
    }

    #[must_use]
    pub fn gate_status_for(&self, phase: Phase) -> GateStatus {
        gate_status(phase, &self.gate_inputs())
    }

    fn frontier_gate(&self) -> GateStatus {
        self.gate_status_for(self.machine.frontier())
    }

    pub fn go_to_phase(&mut self, target: Phase) -> Navigation {
        let frontier_gate = self.frontier_gate();
        let navigation = self.machine.go_to(target, &frontier_gate);
        if let Navigation::Moved { from, to } = navigation {
            self.enter_phase(from, to);
        }
        navigation
    }

    pub fn next_phase(&mut self) -> Navigation {
        match self.machine.current().next() {
            Some(next) => self.go_to_phase(next),
            None => Navigation::Refused(Refusal::Terminal),
        }
    }

    pub fn previous_phase(&mut self) -> Navigation {
        match self.machine.current().previous() {
            Some(previous) => self.go_to_phase(previous),
            None => Navigation::Unchanged,
        }
    }

    fn enter_phase(&mut self, from: Phase, to: Phase) {
        // Exploration screens always start from their declared defaults.
        self.controls = ControlPanel::from_specs(self.config.controls_for(to));
        log::debug!("{}: {from} -> {to}", self.config.game_type);
        self.telemetry.emit(
            EventType::PhaseChanged,
            json!({
                "from": from,
                "to": to,
                "label": to.label(),
                "furthestUnlocked": self.machine.frontier(),
            }),
        );
        if to == Phase::Mastery && !self.mastery_announced {
            self.mastery_announced = true;
            self.telemetry.emit(
                EventType::AchievementUnlocked,
                json!({
                    "achievement": "mastery",
                    "score": self.quiz.score(),
                    "attempts": self.quiz_attempts,
                }),
            );
        }
    }

    /// Lock in a prediction on the predict or twist-predict screen.
    pub fn make_prediction(&mut self, option_id: &str) -> PredictionOutcome {
        let phase = self.machine.current();
        let Some(prompt) = self.config.prediction_for(phase) else {
            return PredictionOutcome::NotAvailable;
        };
        let slot = if phase == Phase::Predict {
            &self.prediction
        } else {
            &self.twist_prediction
        };
        if let Some(existing) = slot {
            return PredictionOutcome::AlreadyMade(existing.clone());
        }
        let Some(record) = judge(phase, prompt, option_id) else {
            return PredictionOutcome::UnknownOption;
        };
        let correct_answer = prompt.correct.clone();
        log::debug!(
            "{}: {phase} prediction '{option_id}' (correct: {})",
            self.config.game_type,
            record.correct
        );
        self.telemetry.emit(
            EventType::PredictionMade,
            json!({
                "phase": phase,
                "prediction": option_id,
                "correctAnswer": correct_answer,
                "isCorrect": record.correct,
            }),
        );
        if phase == Phase::Predict {
            self.prediction = Some(record.clone());
        } else {
            self.twist_prediction = Some(record.clone());
        }
        PredictionOutcome::Recorded(record)
    }

    /// Move a slider on the active exploration screen. Returns the stored,
    /// domain-constrained value, or `None` when the control is unavailable.
    pub fn set_control(&mut self, id: ControlId, value: f64) -> Option<f64> {
        let phase = self.machine.current();
        if !phase.is_exploration() {
            log::debug!("{}: ignoring {id:?} outside exploration", self.config.game_type);
            return None;
        }
        let before = self.controls.get(id)?;
        let stored = self.controls.set(id, value)?;
        if (stored - before).abs() > f64::EPSILON {
            self.telemetry.emit(
                EventType::SliderChanged,
                json!({
                    "phase": phase,
                    "control": id.as_str(),
                    "value": stored,
                    "previous": before,
                }),
            );
        }
        Some(stored)
    }

    /// Reading of the active model, recomputed from the current controls.
    #[must_use]
    pub fn derived_physics(&self) -> Option<DerivedPhysics> {
        self.config
            .model
            .evaluate(self.machine.current(), &self.controls)
    }

    pub fn visit_transfer_app(&mut self, app: usize) -> TransferVisit {
        if self.machine.current() != Phase::Transfer {
            return TransferVisit::NotAvailable;
        }
        let visit = self.transfer.visit(app);
        if let TransferVisit::New { visited, total } = visit {
            self.telemetry.emit(
                EventType::SelectionMade,
                json!({
                    "phase": Phase::Transfer,
                    "app": app,
                    "appId": self.config.transfer_apps.get(app),
                    "visited": visited,
                    "total": total,
                }),
            );
            if visited == total {
                log::debug!("{}: all transfer apps visited", self.config.game_type);
                self.telemetry.emit(
                    EventType::AchievementUnlocked,
                    json!({ "achievement": "transfer_complete", "total": total }),
                );
            }
        }
        visit
    }

    pub fn select_answer(&mut self, question: usize, option_id: &str) -> QuizAction {
        if self.machine.current() != Phase::Test {
            return QuizAction::NotAvailable;
        }
        let action = self.quiz.select_answer(question, option_id);
        if action == QuizAction::Selected {
            self.telemetry.emit(
                EventType::SelectionMade,
                json!({ "phase": Phase::Test, "question": question, "option": option_id }),
            );
        }
        action
    }

    /// Navigate the question cursor. Returns false when out of range or off the test screen.
    pub fn go_to_question(&mut self, question: usize) -> bool {
        self.machine.current() == Phase::Test && self.quiz.go_to_question(question)
    }

    /// Score the test. A failed attempt stays locked on the test screen until
    /// the host calls [`GameSession::reset_quiz`] to start a retry.
    pub fn submit_quiz(&mut self) -> SubmitOutcome {
        if self.machine.current() != Phase::Test {
            return SubmitOutcome::NotAvailable;
        }
        let outcome = self.quiz.submit(self.config.pass_threshold);
        let SubmitOutcome::Scored(result) = &outcome else {
            log::debug!("{}: submission refused: {outcome:?}", self.config.game_type);
            return outcome;
        };
        self.quiz_attempts = self.quiz_attempts.saturating_add(1);
        if !result.passed {
            self.failed_quiz_attempts = self.failed_quiz_attempts.saturating_add(1);
        }
        for (question, correct) in result.per_question.iter().enumerate() {
            let event = if *correct {
                EventType::CorrectAnswer
            } else {
                EventType::IncorrectAnswer
            };
            self.telemetry.emit(
                event,
                json!({
                    "question": question,
                    "selected": self.quiz.answer(question),
                }),
            );
        }
        let percent = percent_of(result.score, result.total);
        self.telemetry.emit(
            EventType::AnswerSubmitted,
            json!({
                "score": result.score,
                "total": result.total,
                "required": result.required,
                "percent": percent,
                "passed": result.passed,
                "attempt": self.quiz_attempts,
            }),
        );
        if result.passed {
            self.telemetry.emit(
                EventType::GameCompleted,
                json!({ "score": result.score, "total": result.total, "percent": percent }),
            );
        } else if self.failed_quiz_attempts >= STRUGGLE_AFTER_FAILED_ATTEMPTS {
            self.telemetry.emit(
                EventType::StruggleDetected,
                json!({
                    "phase": Phase::Test,
                    "failedAttempts": self.failed_quiz_attempts,
                    "score": result.score,
                }),
            );
        }
        log::debug!(
            "{}: scored {}/{} (passed: {})",
            self.config.game_type,
            result.score,
            result.total,
            result.passed
        );
        outcome
    }

    /// Clear the quiz for a retry. Only available on the test screen.
    /// Attempt counts are kept by the session and survive the reset.
    pub fn reset_quiz(&mut self) -> bool {
        if self.machine.current() != Phase::Test {
            return false;
        }
        self.quiz.reset();
        true
    }

    pub fn request_hint(&mut self) {
        self.hints_used = self.hints_used.saturating_add(1);
        self.telemetry.emit(
            EventType::HintRequested,
            json!({ "phase": self.machine.current(), "hintsUsed": self.hints_used }),
        );
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.machine.current()
    }

    #[must_use]
    pub const fn furthest_unlocked(&self) -> usize {
        self.machine.furthest_unlocked()
    }

    /// Whether "Next" is enabled on the current screen.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.machine
            .current()
            .next()
            .is_some_and(|next| self.machine.check(next, &self.frontier_gate()).is_ok())
    }

    /// Phases a navigation dot may jump to right now.
    #[must_use]
    pub fn reachable_phases(&self) -> Vec<Phase> {
        self.machine.reachable(&self.frontier_gate())
    }

    #[must_use]
    pub const fn controls(&self) -> &ControlPanel {
        &self.controls
    }

    #[must_use]
    pub fn prediction(&self, phase: Phase) -> Option<&PredictionRecord> {
        match phase {
            Phase::Predict => self.prediction.as_ref(),
            Phase::TwistPredict => self.twist_prediction.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub const fn transfer(&self) -> &TransferProgress {
        &self.transfer
    }

    #[must_use]
    pub const fn quiz(&self) -> &QuizState {
        &self.quiz
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Scored test submissions so far.
    #[must_use]
    pub const fn quiz_attempts(&self) -> u32 {
        self.quiz_attempts
    }

    #[must_use]
    pub const fn failed_quiz_attempts(&self) -> u32 {
        self.failed_quiz_attempts
    }

    #[must_use]
    pub const fn hints_used(&self) -> u32 {
        self.hints_used
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            game_type: self.config.game_type.clone(),
            phase: self.machine.current(),
            furthest_unlocked: self.machine.frontier(),
            prediction_correct: self.prediction.as_ref().map(|p| p.correct),
            twist_prediction_correct: self.twist_prediction.as_ref().map(|p| p.correct),
            transfer_visited: self.transfer.visited_count(),
            transfer_total: self.transfer.total(),
            quiz_score: self.quiz.score(),
            quiz_attempts: self.quiz_attempts,
            hints_used: self.hints_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::flow::GateBlocker;
    use crate::quiz::{QuizOption, QuizQuestion};
    use crate::telemetry::RecordingSink;

    fn bank(count: usize) -> QuizBank {
        QuizBank::from_questions(
            (0..count)
                .map(|i| QuizQuestion {
                    scenario: String::new(),
                    prompt: format!("Q{i}"),
                    options: ["a", "b"]
                        .iter()
                        .map(|id| QuizOption {
                            id: (*id).to_string(),
                            text: (*id).to_string(),
                        })
                        .collect(),
                    correct: "a".to_string(),
                    explanation: String::new(),
                })
                .collect(),
        )
    }

    fn session(config: GameConfig, hint: Option<&str>) -> (GameSession, RecordingSink) {
        let sink = RecordingSink::new();
        let session =
            GameSession::new(config, bank(10), hint, Some(Box::new(sink.clone()))).unwrap();
        (session, sink)
    }

    #[test]
    fn start_emits_game_started() {
        let (session, sink) = session(catalog::gas_laws(), None);
        assert_eq!(session.phase(), Phase::Hook);
        assert_eq!(sink.count(EventType::GameStarted), 1);
        assert!(session.derived_physics().is_none());
    }

    #[test]
    fn predict_gate_requires_prediction() {
        let (mut session, sink) = session(catalog::gas_laws(), None);
        assert!(session.next_phase().moved());
        assert!(!session.can_advance());
        assert_eq!(
            session.gate_status().blocker,
            Some(GateBlocker::PredictionMissing)
        );
        assert!(matches!(session.next_phase(), Navigation::Refused(_)));
        assert_eq!(session.make_prediction("bogus"), PredictionOutcome::UnknownOption);
        assert!(session.make_prediction("pressure_halves").is_recorded());
        assert!(matches!(
            session.make_prediction("pressure_doubles"),
            PredictionOutcome::AlreadyMade(_)
        ));
        assert_eq!(session.prediction(Phase::Predict).map(|p| p.correct), Some(false));
        assert!(session.next_phase().moved());
        assert_eq!(sink.count(EventType::PredictionMade), 1);
        assert_eq!(sink.count(EventType::PhaseChanged), 2);
    }

    #[test]
    fn controls_reset_on_every_entry() {
        let (mut session, _sink) = session(catalog::gas_laws(), Some("play"));
        assert_eq!(session.set_control(ControlId::Volume, 50.0), Some(50.0));
        let Some(DerivedPhysics::Gas(state)) = session.derived_physics() else {
            panic!("expected gas reading");
        };
        assert!((state.pressure - 2.0).abs() < 1e-9);
        assert!(session.previous_phase().moved());
        assert_eq!(session.set_control(ControlId::Volume, 60.0), None);
        assert!(session.next_phase().moved());
        assert_eq!(session.controls().get(ControlId::Volume), Some(100.0));
    }

    #[test]
    fn strict_play_gate_requires_movement() {
        let (mut session, _sink) = session(catalog::satellite_solar(), Some("play"));
        assert_eq!(
            session.gate_status().blocker,
            Some(GateBlocker::ControlsUntouched)
        );
        assert!(!session.can_advance());
        session.set_control(ControlId::PanelAngle, 30.0);
        assert!(session.can_advance());
        assert!(session.next_phase().moved());
    }

    #[test]
    fn actions_are_scoped_to_their_screen() {
        let (mut session, _sink) = session(catalog::chladni(), None);
        assert_eq!(session.make_prediction("more_lines"), PredictionOutcome::NotAvailable);
        assert_eq!(session.visit_transfer_app(0), TransferVisit::NotAvailable);
        assert_eq!(session.select_answer(0, "a"), QuizAction::NotAvailable);
        assert_eq!(session.submit_quiz(), SubmitOutcome::NotAvailable);
        assert!(!session.reset_quiz());
        assert!(!session.go_to_question(1));
    }

    #[test]
    fn failing_twice_reports_struggle_then_retry_passes() {
        let (mut session, sink) = session(catalog::chladni(), Some("test"));
        for attempt in 0..2 {
            for q in 0..10 {
                session.select_answer(q, if q < 7 { "a" } else { "b" });
            }
            let SubmitOutcome::Scored(result) = session.submit_quiz() else {
                panic!("attempt {attempt} should score");
            };
            assert_eq!(result.score, 7);
            assert!(!result.passed);
            assert!(matches!(
                session.next_phase(),
                Navigation::Refused(Refusal::GateClosed { .. })
            ));
            assert_eq!(session.submit_quiz(), SubmitOutcome::AlreadySubmitted);
            assert_eq!(session.select_answer(0, "b"), QuizAction::Locked);
            assert!(session.reset_quiz());
            assert!(!session.quiz().is_submitted());
        }
        assert_eq!(session.quiz_attempts(), 2);
        assert_eq!(session.failed_quiz_attempts(), 2);
        assert_eq!(sink.count(EventType::StruggleDetected), 1);
        for q in 0..10 {
            session.select_answer(q, "a");
        }
        assert!(matches!(session.submit_quiz(), SubmitOutcome::Scored(r) if r.passed));
        assert!(session.next_phase().moved());
        assert_eq!(session.phase(), Phase::Mastery);
        assert_eq!(sink.count(EventType::GameCompleted), 1);
        assert_eq!(sink.count(EventType::AchievementUnlocked), 1);
        assert_eq!(sink.count(EventType::CorrectAnswer), 7 + 7 + 10);
        assert_eq!(session.snapshot().quiz_attempts, 3);
    }

    #[test]
    fn transfer_completion_unlocks_test() {
        let (mut session, sink) = session(catalog::retroreflection(), Some("transfer"));
        for app in 0..3 {
            session.visit_transfer_app(app);
        }
        assert!(!session.can_advance());
        session.visit_transfer_app(3);
        assert!(session.can_advance());
        assert_eq!(sink.count(EventType::AchievementUnlocked), 1);
        assert_eq!(session.snapshot().transfer_visited, 4);
    }

    #[test]
    fn invalid_bank_is_rejected() {
        let err = GameSession::new(catalog::satellite_solar(), bank(5), None, None).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Config(ConfigError::ThresholdExceedsBank { .. })
        ));
        let err = GameSession::new(catalog::gas_laws(), QuizBank::default(), None, None)
            .unwrap_err();
        assert!(matches!(err, SessionError::Content(ContentError::EmptyBank)));

        let mut config = catalog::gas_laws();
        config.play_controls[0].wraps = true;
        let err = GameSession::new(config, bank(10), Some("play"), None).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Config(ConfigError::PartialWrap { .. })
        ));
    }

    #[test]
    fn hints_are_counted() {
        let (mut session, sink) = session(catalog::gas_laws(), None);
        session.request_hint();
        session.request_hint();
        assert_eq!(session.hints_used(), 2);
        assert_eq!(sink.count(EventType::HintRequested), 2);
    }
}
