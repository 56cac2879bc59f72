//! Built-in game definitions.
//!
//! The four games share the same flow; the differences between them are spelled
//! out here rather than buried in per-game code.
use crate::config::GameConfig;
use crate::constants::{
    BETA_ANGLE_DEFAULT, BETA_ANGLE_MAX, BETA_ANGLE_MIN, CORNER_ANGLE_DEFAULT, CORNER_ANGLE_MAX,
    CORNER_ANGLE_MIN, FREQUENCY_DEFAULT, FREQUENCY_MAX, FREQUENCY_MIN, INCIDENCE_DEFAULT,
    INCIDENCE_MAX, INCIDENCE_MIN, ORBIT_POSITION_DEFAULT, PANEL_ANGLE_DEFAULT, PANEL_ANGLE_MAX,
    PANEL_ANGLE_MIN, PLATE_SIZE_DEFAULT, PLATE_SIZE_MAX, PLATE_SIZE_MIN, TEMPERATURE_DEFAULT,
    TEMPERATURE_MAX, TEMPERATURE_MIN, TWIST_FREQUENCY_DEFAULT, VOLUME_DEFAULT, VOLUME_MAX,
    VOLUME_MIN,
};
use crate::controls::{ControlId, ControlSpec};
use crate::flow::GateRule;
use crate::physics::ModelKind;
use crate::prediction::PredictionPrompt;
use crate::quiz::PassThreshold;

pub const GAS_LAWS: &str = "gas-laws";
pub const RETROREFLECTION: &str = "retroreflection";
pub const SATELLITE_SOLAR: &str = "satellite-solar";
pub const CHLADNI: &str = "chladni-patterns";

fn apps(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| (*id).to_string()).collect()
}

#[must_use]
pub fn gas_laws() -> GameConfig {
    GameConfig {
        game_type: GAS_LAWS.to_string(),
        title: "Gas Laws".to_string(),
        model: ModelKind::GasLaws,
        play_controls: vec![ControlSpec::new(
            ControlId::Volume,
            VOLUME_MIN,
            VOLUME_MAX,
            VOLUME_DEFAULT,
        )],
        twist_controls: vec![ControlSpec::new(
            ControlId::Temperature,
            TEMPERATURE_MIN,
            TEMPERATURE_MAX,
            TEMPERATURE_DEFAULT,
        )],
        play_gate: GateRule::Open,
        twist_play_gate: GateRule::Open,
        prediction: PredictionPrompt::new(
            &[
                "pressure_doubles",
                "pressure_halves",
                "pressure_unchanged",
                "pressure_quadruples",
            ],
            "pressure_doubles",
        ),
        twist_prediction: PredictionPrompt::new(
            &["volume_increases", "volume_decreases", "volume_unchanged"],
            "volume_increases",
        ),
        transfer_apps: apps(&[
            "scuba-diving",
            "hot-air-balloons",
            "car-engines",
            "weather-balloons",
        ]),
        pass_threshold: PassThreshold::Percent(70),
    }
}

#[must_use]
pub fn retroreflection() -> GameConfig {
    GameConfig {
        game_type: RETROREFLECTION.to_string(),
        title: "Retroreflection".to_string(),
        model: ModelKind::Retroreflection,
        play_controls: vec![ControlSpec::new(
            ControlId::IncidenceAngle,
            INCIDENCE_MIN,
            INCIDENCE_MAX,
            INCIDENCE_DEFAULT,
        )],
        twist_controls: vec![
            ControlSpec::new(
                ControlId::IncidenceAngle,
                INCIDENCE_MIN,
                INCIDENCE_MAX,
                INCIDENCE_DEFAULT,
            ),
            ControlSpec::new(
                ControlId::CornerAngle,
                CORNER_ANGLE_MIN,
                CORNER_ANGLE_MAX,
                CORNER_ANGLE_DEFAULT,
            ),
        ],
        play_gate: GateRule::RequireMovedFromDefault,
        twist_play_gate: GateRule::Open,
        prediction: PredictionPrompt::new(
            &["returns_to_source", "reflects_away", "scatters_evenly"],
            "returns_to_source",
        ),
        twist_prediction: PredictionPrompt::new(
            &[
                "still_returns",
                "misses_by_twice_the_error",
                "misses_by_the_error",
            ],
            "misses_by_twice_the_error",
        ),
        transfer_apps: apps(&[
            "road-signs",
            "bicycle-reflectors",
            "lunar-laser-ranging",
            "safety-vests",
        ]),
        pass_threshold: PassThreshold::Percent(70),
    }
}

#[must_use]
pub fn satellite_solar() -> GameConfig {
    GameConfig {
        game_type: SATELLITE_SOLAR.to_string(),
        title: "Satellite Solar Angles".to_string(),
        model: ModelKind::SatelliteSolar,
        play_controls: vec![
            ControlSpec::new(
                ControlId::PanelAngle,
                PANEL_ANGLE_MIN,
                PANEL_ANGLE_MAX,
                PANEL_ANGLE_DEFAULT,
            ),
            ControlSpec::full_circle(ControlId::OrbitPosition, ORBIT_POSITION_DEFAULT),
        ],
        twist_controls: vec![
            ControlSpec::new(
                ControlId::BetaAngle,
                BETA_ANGLE_MIN,
                BETA_ANGLE_MAX,
                BETA_ANGLE_DEFAULT,
            ),
            ControlSpec::full_circle(ControlId::OrbitPosition, ORBIT_POSITION_DEFAULT),
        ],
        play_gate: GateRule::RequireMovedFromDefault,
        twist_play_gate: GateRule::RequireMovedFromDefault,
        prediction: PredictionPrompt::new(
            &["cosine_falloff", "linear_falloff", "no_change", "drops_to_zero"],
            "cosine_falloff",
        ),
        twist_prediction: PredictionPrompt::new(
            &["longer_eclipse", "shorter_eclipse", "no_eclipse_change"],
            "shorter_eclipse",
        ),
        transfer_apps: apps(&[
            "iss-arrays",
            "geostationary-satellites",
            "mars-rovers",
            "rooftop-trackers",
        ]),
        pass_threshold: PassThreshold::MinCorrect(8),
    }
}

#[must_use]
pub fn chladni() -> GameConfig {
    GameConfig {
        game_type: CHLADNI.to_string(),
        title: "Chladni Patterns".to_string(),
        model: ModelKind::Chladni,
        play_controls: vec![ControlSpec::new(
            ControlId::Frequency,
            FREQUENCY_MIN,
            FREQUENCY_MAX,
            FREQUENCY_DEFAULT,
        )],
        twist_controls: vec![
            ControlSpec::new(
                ControlId::Frequency,
                FREQUENCY_MIN,
                FREQUENCY_MAX,
                TWIST_FREQUENCY_DEFAULT,
            ),
            ControlSpec::new(
                ControlId::PlateSize,
                PLATE_SIZE_MIN,
                PLATE_SIZE_MAX,
                PLATE_SIZE_DEFAULT,
            ),
        ],
        play_gate: GateRule::Open,
        twist_play_gate: GateRule::Open,
        prediction: PredictionPrompt::new(
            &["more_lines", "fewer_lines", "same_lines"],
            "more_lines",
        ),
        twist_prediction: PredictionPrompt::new(
            &["higher_mode", "lower_mode", "same_mode"],
            "higher_mode",
        ),
        transfer_apps: apps(&[
            "guitar-bodies",
            "speaker-design",
            "violin-making",
            "earthquake-engineering",
        ]),
        pass_threshold: PassThreshold::MinCorrect(8),
    }
}

/// All built-in games, in menu order.
#[must_use]
pub fn builtin_games() -> Vec<GameConfig> {
    vec![gas_laws(), retroreflection(), satellite_solar(), chladni()]
}

/// Look up a built-in game by its stable identifier.
#[must_use]
pub fn find(game_type: &str) -> Option<GameConfig> {
    builtin_games()
        .into_iter()
        .find(|config| config.game_type == game_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_TRANSFER_APPS;

    #[test]
    fn catalog_lists_four_distinct_games() {
        let games = builtin_games();
        assert_eq!(games.len(), 4);
        for (idx, game) in games.iter().enumerate() {
            assert!(games[..idx].iter().all(|other| other.game_type != game.game_type));
            assert_eq!(game.transfer_apps.len(), DEFAULT_TRANSFER_APPS);
        }
    }

    #[test]
    fn find_by_game_type() {
        assert_eq!(find(CHLADNI).map(|c| c.model), Some(ModelKind::Chladni));
        assert!(find("pendulum").is_none());
    }
}
