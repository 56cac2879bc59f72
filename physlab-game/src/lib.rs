//! PhysLab Game Engine
//!
//! Platform-agnostic core for the PhysLab physics mini-games: the ten-phase
//! learning flow, forward gates, physics models, quiz scoring and telemetry.
//! Rendering and input handling live with the host.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod controls;
pub mod flow;
pub mod numbers;
pub mod phase;
pub mod physics;
pub mod prediction;
pub mod quiz;
pub mod session;
pub mod telemetry;
pub mod transfer;

// Re-export commonly used types
pub use config::{ConfigError, GameConfig};
pub use controls::{ControlId, ControlPanel, ControlSpec};
pub use flow::{
    GateBlocker, GateInputs, GateRule, GateStatus, Navigation, PhaseMachine, Refusal, gate_status,
    is_gate_satisfied,
};
pub use phase::{PHASE_ORDER, Phase, UnknownPhase};
pub use physics::{DerivedPhysics, ModelKind, PhysicsModel};
pub use prediction::{PredictionOutcome, PredictionPrompt, PredictionRecord};
pub use quiz::{
    ContentError, PassThreshold, QuizAction, QuizBank, QuizOption, QuizQuestion, QuizResult,
    QuizState, SubmitOutcome,
};
pub use session::{GameSession, SessionError, SessionSnapshot};
pub use telemetry::{
    EventType, GameEvent, RecordingSink, TelemetryEmitter, TelemetrySink, wall_clock_millis,
};
pub use transfer::{TransferProgress, TransferVisit};

use anyhow::Context;

/// Trait for abstracting content loading operations
/// Platform-specific implementations should provide this
pub trait ContentLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the quiz bank for a game
    ///
    /// # Errors
    ///
    /// Returns an error if the bank cannot be loaded or parsed.
    fn load_quiz_bank(&self, game_type: &str) -> Result<QuizBank, Self::Error>;

    /// Load configuration data by name
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Creates game sessions from built-in or loaded content
pub struct GameEngine<L>
where
    L: ContentLoader,
{
    loader: L,
}

impl<L> GameEngine<L>
where
    L: ContentLoader,
{
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    pub const fn loader(&self) -> &L {
        &self.loader
    }

    /// Resolve a game config: built-in catalog first, then the loader.
    ///
    /// # Errors
    ///
    /// Returns an error if the game is unknown to both.
    pub fn config_for(&self, game_type: &str) -> anyhow::Result<GameConfig> {
        if let Some(config) = catalog::find(game_type) {
            return Ok(config);
        }
        let config: GameConfig = self
            .loader
            .load_config(game_type)
            .with_context(|| format!("no config for game '{game_type}'"))?;
        config.validate()?;
        Ok(config)
    }

    /// Mount a session for `game_type`, optionally deep-linked to `phase_hint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config or quiz bank cannot be loaded, or the
    /// session rejects them.
    pub fn create_session(
        &self,
        game_type: &str,
        phase_hint: Option<&str>,
        sink: Option<Box<dyn TelemetrySink>>,
    ) -> anyhow::Result<GameSession> {
        let config = self.config_for(game_type)?;
        let bank = self
            .loader
            .load_quiz_bank(game_type)
            .with_context(|| format!("loading quiz bank for '{game_type}'"))?;
        let session = GameSession::new(config, bank, phase_hint, sink)
            .with_context(|| format!("starting '{game_type}'"))?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;
    use std::collections::HashMap;

    #[derive(Debug, thiserror::Error)]
    #[error("fixture missing: {0}")]
    struct Missing(String);

    #[derive(Default)]
    struct FixtureLoader {
        configs: HashMap<String, String>,
        questions: usize,
    }

    impl ContentLoader for FixtureLoader {
        type Error = Missing;

        fn load_quiz_bank(&self, game_type: &str) -> Result<QuizBank, Self::Error> {
            if self.questions == 0 {
                return Err(Missing(game_type.to_string()));
            }
            let questions = (0..self.questions)
                .map(|i| QuizQuestion {
                    scenario: String::new(),
                    prompt: format!("question {i}"),
                    options: vec![
                        QuizOption {
                            id: "yes".to_string(),
                            text: "Yes".to_string(),
                        },
                        QuizOption {
                            id: "no".to_string(),
                            text: "No".to_string(),
                        },
                    ],
                    correct: "yes".to_string(),
                    explanation: String::new(),
                })
                .collect();
            Ok(QuizBank::from_questions(questions))
        }

        fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
        where
            T: DeserializeOwned,
        {
            let raw = self
                .configs
                .get(config_name)
                .ok_or_else(|| Missing(config_name.to_string()))?;
            serde_json::from_str(raw).map_err(|err| Missing(err.to_string()))
        }
    }

    #[test]
    fn engine_creates_builtin_sessions() {
        let engine = GameEngine::new(FixtureLoader {
            questions: 10,
            ..FixtureLoader::default()
        });
        for config in catalog::builtin_games() {
            let session = engine
                .create_session(&config.game_type, Some("review"), None)
                .unwrap();
            assert_eq!(session.phase(), Phase::Review);
            assert_eq!(session.quiz().len(), 10);
        }
    }

    #[test]
    fn engine_falls_back_to_loaded_configs() {
        let mut custom = catalog::gas_laws();
        custom.game_type = "ideal-gas".to_string();
        let mut configs = HashMap::new();
        configs.insert(
            "ideal-gas".to_string(),
            serde_json::to_string(&custom).unwrap(),
        );
        let engine = GameEngine::new(FixtureLoader {
            configs,
            questions: 4,
        });
        let session = engine.create_session("ideal-gas", None, None).unwrap();
        assert_eq!(session.config().model, ModelKind::GasLaws);
        assert!(engine.create_session("pendulum", None, None).is_err());
    }

    #[test]
    fn engine_surfaces_content_errors() {
        let engine = GameEngine::new(FixtureLoader::default());
        let err = engine
            .create_session(catalog::GAS_LAWS, None, None)
            .unwrap_err();
        assert!(format!("{err:#}").contains("loading quiz bank"));

        let engine = GameEngine::new(FixtureLoader {
            questions: 5,
            ..FixtureLoader::default()
        });
        let err = engine
            .create_session(catalog::CHLADNI, None, None)
            .unwrap_err();
        assert!(format!("{err:#}").contains("exceeds"));
    }
}
