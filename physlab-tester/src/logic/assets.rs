use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use physlab_game::catalog;
use physlab_game::{ContentError, ContentLoader, QuizBank, QuizOption, QuizQuestion};
use thiserror::Error;

const SYNTHETIC_QUESTIONS: usize = 10;
const SYNTHETIC_OPTIONS: [&str; 4] = ["a", "b", "c", "d"];

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("no quiz bank for '{0}'")]
    MissingBank(String),
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}: {message}")]
    Parse { path: String, message: String },
}

/// Quiz banks and configs the tester plays with.
#[derive(Debug, Clone)]
pub struct TesterAssets {
    content_dir: PathBuf,
    banks: HashMap<String, QuizBank>,
}

impl TesterAssets {
    /// Load banks for every built-in game from the shared content directory.
    pub fn load_default() -> Self {
        Self::load_from(&Self::content_root())
    }

    pub fn load_from(dir: &Path) -> Self {
        let banks = catalog::builtin_games()
            .into_iter()
            .map(|config| {
                let bank = Self::load_bank_file(dir, &config.game_type).unwrap_or_else(|err| {
                    log::warn!("{err}; using a synthetic bank");
                    synthetic_bank(&config.title)
                });
                (config.game_type, bank)
            })
            .collect();
        Self {
            content_dir: dir.to_path_buf(),
            banks,
        }
    }

    fn content_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("content")
    }

    fn load_bank_file(dir: &Path, game_type: &str) -> Result<QuizBank, AssetError> {
        let path = dir.join(format!("{game_type}.json"));
        let json = fs::read_to_string(&path).map_err(|source| AssetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        QuizBank::from_json(&json).map_err(|err: ContentError| AssetError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }
}

impl ContentLoader for TesterAssets {
    type Error = AssetError;

    fn load_quiz_bank(&self, game_type: &str) -> Result<QuizBank, Self::Error> {
        if let Some(bank) = self.banks.get(game_type) {
            return Ok(bank.clone());
        }
        if !self.content_dir.join(format!("{game_type}.json")).exists() {
            return Err(AssetError::MissingBank(game_type.to_string()));
        }
        Self::load_bank_file(&self.content_dir, game_type)
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let path = self.content_dir.join(format!("{config_name}.config.json"));
        let json = fs::read_to_string(&path).map_err(|source| AssetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|err| AssetError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }
}

/// Placeholder bank with a rotating answer key, used when no content file exists.
#[must_use]
pub fn synthetic_bank(title: &str) -> QuizBank {
    let questions = (0..SYNTHETIC_QUESTIONS)
        .map(|idx| QuizQuestion {
            scenario: format!("{title} scenario {}", idx + 1),
            prompt: format!("{title} check {}", idx + 1),
            options: SYNTHETIC_OPTIONS
                .iter()
                .map(|id| QuizOption {
                    id: (*id).to_string(),
                    text: format!("Option {}", id.to_uppercase()),
                })
                .collect(),
            correct: SYNTHETIC_OPTIONS[idx % SYNTHETIC_OPTIONS.len()].to_string(),
            explanation: String::new(),
        })
        .collect();
    QuizBank::from_questions(questions)
}
