use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::game_tester::{GameTester, SimulationPlan, SimulationSummary};
use crate::scenarios::TestScenario;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub game_type: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester {
    tester: GameTester,
}

impl LogicTester {
    pub const fn new(tester: GameTester) -> Self {
        Self { tester }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        games: &[String],
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for game_type in games {
            for &seed in seeds {
                if self.tester.verbose() {
                    println!(
                        "🧪 Testing scenario: {} (game: {} seed: {})",
                        scenario.name.bright_white(),
                        game_type,
                        seed
                    );
                }
                results.push(self.run_single_scenario(scenario, game_type, seed, iterations));
            }
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        game_type: &str,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let (successes, failures, performance_data) =
            self.run_simulation_iterations(&scenario.plan, game_type, seed, iterations);

        let avg_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            game_type: game_type.to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration: avg_duration,
            performance_data,
        }
    }

    fn run_simulation_iterations(
        &self,
        plan: &SimulationPlan,
        game_type: &str,
        seed: u64,
        iterations: usize,
    ) -> (usize, Vec<String>, Vec<Duration>) {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let outcome = self
                .tester
                .run_plan(game_type, plan, iteration_seed)
                .and_then(|summary| evaluate_expectations(plan, &summary).map(|()| summary));

            match outcome {
                Ok(summary) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    if self.tester.verbose() {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) {}",
                            i + 1,
                            iterations,
                            describe(&summary)
                        );
                    }
                }
                Err(err) => {
                    let message = format!(
                        "Iteration {} (game {game_type}, seed {iteration_seed}): {err:#}",
                        i + 1
                    );
                    if self.tester.verbose() {
                        println!("  ❌ {}", message.clone().red());
                    }
                    failures.push(message);
                }
            }
        }

        (successes, failures, performance_data)
    }
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> anyhow::Result<()> {
    for expectation in &plan.expectations {
        expectation
            .evaluate(summary)
            .map_err(|err| err.context(describe(summary)))?;
    }
    Ok(())
}

fn describe(summary: &SimulationSummary) -> String {
    format!(
        "{} seed {} start {} final {} steps {} attempts {} score {} refusals {} events {}",
        summary.game_type,
        summary.seed,
        summary.start_phase,
        summary.final_phase,
        summary.steps,
        summary.quiz_attempts,
        summary
            .final_score
            .map_or_else(|| "-".to_string(), |score| score.to_string()),
        summary.refusals.len(),
        summary.events.len()
    )
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::assets::TesterAssets;
    use crate::logic::learner::LearnerProfile;
    use physlab_game::catalog;

    fn runner() -> LogicTester {
        LogicTester::new(GameTester::new(TesterAssets::load_default(), false))
    }

    #[test]
    fn passing_plan_counts_every_iteration() {
        let scenario = TestScenario::new(
            "walk",
            "",
            SimulationPlan::new(LearnerProfile::attentive()),
        );
        let results = runner().run_scenario(
            &scenario,
            &[catalog::GAS_LAWS.to_string(), catalog::CHLADNI.to_string()],
            &[1, 2],
            2,
        );
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.passed && r.successful_iterations == 2));
    }

    #[test]
    fn failing_expectation_is_reported() {
        let plan = SimulationPlan::new(LearnerProfile::attentive())
            .with_expectation(|_: &SimulationSummary| -> anyhow::Result<()> {
                anyhow::bail!("always wrong")
            });
        let scenario = TestScenario::new("broken", "", plan);
        let results = runner().run_scenario(&scenario, &[catalog::GAS_LAWS.to_string()], &[7], 1);
        assert!(!results[0].passed);
        assert!(results[0].failures[0].contains("always wrong"));
    }

    #[test]
    fn result_serializes_durations_as_millis() {
        let result = ScenarioResult {
            scenario_name: "walk".to_string(),
            game_type: catalog::GAS_LAWS.to_string(),
            seed: 1,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12)],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["average_duration"], 12);
        assert_eq!(value["performance_data"][0], 12);
    }
}
