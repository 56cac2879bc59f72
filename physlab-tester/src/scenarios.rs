use anyhow::{Result, ensure};

use physlab_game::catalog;
use physlab_game::constants::MAX_ECLIPSE_ARC;
use physlab_game::{DerivedPhysics, EventType, GateRule, Phase, Refusal};

use crate::logic::{LearnerProfile, SimulationPlan, SimulationSummary};

/// Random slider positions per control in the physics sweep.
const SWEEP_SAMPLES: usize = 24;

#[derive(Debug)]
pub struct TestScenario {
    pub name: String,
    pub description: &'static str,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(name: impl Into<String>, description: &'static str, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            description,
            plan,
        }
    }
}

/// Knobs the CLI passes through to scenario construction.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioOptions {
    pub accuracy: f64,
}

const SCENARIOS: [(&str, &str); 7] = [
    (
        "walkthrough",
        "Attentive learner plays every phase and masters the game on the first attempt",
    ),
    (
        "seeded-learner",
        "Seeded learner with configurable accuracy, hints and quiz retries",
    ),
    (
        "struggling-learner",
        "Learner fails the test twice, gets flagged as struggling, then passes",
    ),
    (
        "gate-probes",
        "Learner presses Next before acting on every gated screen",
    ),
    (
        "deep-link",
        "Session mounted directly on the transfer screen",
    ),
    (
        "invalid-deep-link",
        "Unknown phase hint falls back to the hook screen",
    ),
    (
        "physics-sweep",
        "Random slider sweep keeps every derived value in range",
    ),
];

pub fn list_scenarios() -> &'static [(&'static str, &'static str)] {
    &SCENARIOS
}

pub fn scenario_keys() -> Vec<String> {
    SCENARIOS.iter().map(|(key, _)| (*key).to_string()).collect()
}

fn describe(key: &str) -> &'static str {
    SCENARIOS
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map_or("", |(_, description)| description)
}

pub fn get_scenario(key: &str, options: &ScenarioOptions) -> Option<TestScenario> {
    let key = key.trim().to_lowercase();
    let plan = match key.as_str() {
        "walkthrough" => base_plan(LearnerProfile::attentive())
            .with_expectation(single_attempt)
            .with_expectation(every_screen_visited),
        "seeded-learner" => base_plan(LearnerProfile::seeded(options.accuracy))
            .with_expectation(predictions_recorded),
        "struggling-learner" => {
            base_plan(LearnerProfile::struggling(2)).with_expectation(struggle_reported)
        }
        "gate-probes" => {
            base_plan(LearnerProfile::prober()).with_expectation(gates_hold_until_satisfied)
        }
        "deep-link" => base_plan(LearnerProfile::attentive())
            .with_phase_hint(Phase::Transfer.as_str())
            .with_expectation(deep_link_start),
        "invalid-deep-link" => base_plan(LearnerProfile::attentive())
            .with_phase_hint("warp_zone")
            .with_expectation(invalid_link_start),
        "physics-sweep" => base_plan(LearnerProfile::sweeper(SWEEP_SAMPLES))
            .with_expectation(physics_in_range),
        _ => return None,
    };
    let name = key.clone();
    Some(TestScenario::new(name, describe(&key), plan))
}

fn base_plan(learner: LearnerProfile) -> SimulationPlan {
    SimulationPlan::new(learner)
        .with_expectation(reaches_mastery)
        .with_expectation(forward_moves_are_single_steps)
        .with_expectation(telemetry_is_consistent)
}

fn reaches_mastery(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.reached_mastery(),
        "stopped at {} ({})",
        summary.final_phase,
        summary.halted.as_deref().unwrap_or("no reason recorded")
    );
    ensure!(
        summary.furthest_unlocked == Phase::Mastery.index(),
        "mastery reached but furthest unlocked is {}",
        summary.furthest_unlocked
    );
    Ok(())
}

fn event_phase(value: &serde_json::Value) -> Option<Phase> {
    value.as_str().and_then(Phase::parse)
}

fn forward_moves_are_single_steps(summary: &SimulationSummary) -> Result<()> {
    let mut furthest = summary.start_phase.index();
    for event in &summary.events {
        if event.event_type != EventType::PhaseChanged {
            continue;
        }
        let (Some(from), Some(to)) = (
            event_phase(&event.details["from"]),
            event_phase(&event.details["to"]),
        ) else {
            anyhow::bail!("phase_changed without phases: {}", event.details);
        };
        ensure!(
            to.index() <= furthest + 1,
            "jumped from {from} to {to} past frontier index {furthest}"
        );
        furthest = furthest.max(to.index());
        let reported = event_phase(&event.details["furthestUnlocked"]).map(Phase::index);
        ensure!(
            reported == Some(furthest),
            "furthest unlocked reported as {reported:?}, expected {furthest}"
        );
    }
    Ok(())
}

fn telemetry_is_consistent(summary: &SimulationSummary) -> Result<()> {
    let first = summary.events.first().map(|event| event.event_type);
    ensure!(
        first == Some(EventType::GameStarted),
        "first event was {first:?}"
    );
    ensure!(summary.count(EventType::GameStarted) == 1, "game_started repeated");
    ensure!(
        summary
            .events
            .iter()
            .all(|event| event.game_type == summary.game_type),
        "event tagged with the wrong game"
    );
    ensure!(
        summary
            .events
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp),
        "timestamps went backwards"
    );
    let submitted = summary.count(EventType::AnswerSubmitted);
    ensure!(
        u32::try_from(submitted).ok() == Some(summary.quiz_attempts),
        "{submitted} answer_submitted events for {} attempts",
        summary.quiz_attempts
    );
    let per_question =
        summary.count(EventType::CorrectAnswer) + summary.count(EventType::IncorrectAnswer);
    ensure!(
        submitted == 0 || per_question % submitted == 0,
        "{per_question} per-question events do not split across {submitted} submissions"
    );
    let completed = summary.count(EventType::GameCompleted);
    ensure!(
        completed == usize::from(summary.reached_mastery()),
        "{completed} game_completed events"
    );
    for unused in [
        EventType::ScreenChange,
        EventType::ButtonClicked,
        EventType::ValueChanged,
        EventType::TimerExpired,
    ] {
        ensure!(summary.count(unused) == 0, "core emitted {unused:?}");
    }
    Ok(())
}

fn single_attempt(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.quiz_attempts == 1,
        "took {} attempts",
        summary.quiz_attempts
    );
    ensure!(
        summary.refusals.is_empty(),
        "refused {} moves",
        summary.refusals.len()
    );
    Ok(())
}

fn every_screen_visited(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.count(EventType::PhaseChanged) == Phase::Mastery.index(),
        "{} phase changes for a full run",
        summary.count(EventType::PhaseChanged)
    );
    // transfer complete + mastery
    ensure!(
        summary.count(EventType::AchievementUnlocked) == 2,
        "{} achievements",
        summary.count(EventType::AchievementUnlocked)
    );
    Ok(())
}

fn predictions_recorded(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.count(EventType::PredictionMade) == 2,
        "{} predictions",
        summary.count(EventType::PredictionMade)
    );
    ensure!(
        summary.count(EventType::HintRequested) == usize::try_from(summary.hints)?,
        "hint count mismatch"
    );
    Ok(())
}

fn struggle_reported(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.quiz_attempts == 3,
        "expected 3 attempts, saw {}",
        summary.quiz_attempts
    );
    ensure!(
        summary.count(EventType::StruggleDetected) == 1,
        "struggle_detected fired {} times",
        summary.count(EventType::StruggleDetected)
    );
    Ok(())
}

fn gates_hold_until_satisfied(summary: &SimulationSummary) -> Result<()> {
    let config = catalog::find(&summary.game_type)
        .ok_or_else(|| anyhow::anyhow!("unknown game {}", summary.game_type))?;
    let mut expected = vec![Phase::Predict, Phase::TwistPredict, Phase::Transfer, Phase::Test];
    if config.play_gate == GateRule::RequireMovedFromDefault {
        expected.push(Phase::Play);
    }
    if config.twist_play_gate == GateRule::RequireMovedFromDefault {
        expected.push(Phase::TwistPlay);
    }
    for phase in &expected {
        ensure!(
            summary
                .refusals
                .iter()
                .any(|(at, refusal)| at == phase && matches!(refusal, Refusal::GateClosed { .. })),
            "gate on {phase} never refused a premature Next"
        );
    }
    ensure!(
        summary.refusals.len() == expected.len(),
        "{} refusals, expected {}",
        summary.refusals.len(),
        expected.len()
    );
    Ok(())
}

fn deep_link_start(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.start_phase == Phase::Transfer, "started at {}", summary.start_phase);
    ensure!(
        summary.count(EventType::PhaseChanged) == 2,
        "{} phase changes after deep link",
        summary.count(EventType::PhaseChanged)
    );
    let started = &summary.events[0].details;
    ensure!(started["deepLinked"] == true, "game_started not marked deep-linked");
    Ok(())
}

fn invalid_link_start(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.start_phase == Phase::Hook, "started at {}", summary.start_phase);
    let started = &summary.events[0].details;
    ensure!(started["phase"] == "hook", "game_started phase {}", started["phase"]);
    ensure!(started["deepLinked"] == false, "hook start marked as deep link");
    Ok(())
}

fn check_reading(reading: &DerivedPhysics) -> Result<()> {
    match reading {
        DerivedPhysics::Gas(gas) => {
            ensure!(
                gas.pressure.is_finite() && gas.pressure > 0.0,
                "pressure {}",
                gas.pressure
            );
            ensure!(gas.volume > 0.0 && gas.temperature > 0.0, "gas state {gas:?}");
        }
        DerivedPhysics::Solar(solar) => {
            ensure!(
                (0.0..=100.0).contains(&solar.power_percent),
                "power {}",
                solar.power_percent
            );
            ensure!(
                (0.0..=90.0).contains(&solar.incidence_angle),
                "incidence {}",
                solar.incidence_angle
            );
            ensure!(
                (0.0..=MAX_ECLIPSE_ARC).contains(&solar.eclipse_duration),
                "eclipse arc {}",
                solar.eclipse_duration
            );
            ensure!(
                !solar.in_eclipse || solar.power_percent == 0.0,
                "power generated in shadow"
            );
        }
        DerivedPhysics::Chladni(plate) => {
            ensure!(plate.mode_m >= 1 && plate.mode_n >= 1, "mode {plate:?}");
            ensure!(
                plate.nodal_lines.vertical.len() == usize::from(plate.mode_m)
                    && plate.nodal_lines.horizontal.len() == usize::from(plate.mode_n),
                "nodal line count does not match mode"
            );
            ensure!(
                plate
                    .nodal_lines
                    .vertical
                    .iter()
                    .chain(&plate.nodal_lines.horizontal)
                    .all(|pos| *pos > 0.0 && *pos < 1.0),
                "nodal line off the plate"
            );
        }
        DerivedPhysics::Retro(retro) => {
            ensure!(
                (0.0..=100.0).contains(&retro.returned_percent),
                "returned {}",
                retro.returned_percent
            );
            ensure!(
                (0.0..=180.0).contains(&retro.return_error),
                "return error {}",
                retro.return_error
            );
            ensure!(
                (0.0..360.0).contains(&retro.outgoing_heading),
                "heading {}",
                retro.outgoing_heading
            );
        }
    }
    Ok(())
}

fn physics_in_range(summary: &SimulationSummary) -> Result<()> {
    ensure!(!summary.physics.is_empty(), "no physics readings recorded");
    for reading in &summary.physics {
        check_reading(reading)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPTIONS: ScenarioOptions = ScenarioOptions { accuracy: 0.9 };

    #[test]
    fn every_listed_scenario_resolves() {
        for key in scenario_keys() {
            let scenario = get_scenario(&key, &OPTIONS).unwrap();
            assert_eq!(scenario.name, key);
            assert!(!scenario.description.is_empty());
            assert!(scenario.plan.expectations.len() >= 4);
        }
        assert!(get_scenario("smoke", &OPTIONS).is_none());
        assert!(get_scenario(" Walkthrough ", &OPTIONS).is_some());
    }

    #[test]
    fn out_of_range_readings_are_flagged() {
        let bad = DerivedPhysics::Solar(physlab_game::physics::SolarReading {
            incidence_angle: 10.0,
            power_percent: 120.0,
            in_eclipse: false,
            eclipse_duration: 0.0,
        });
        assert!(check_reading(&bad).is_err());
    }
}
