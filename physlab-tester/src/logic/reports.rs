use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;
use physlab_game::numbers::percent_of;

fn tally(results: &[ScenarioResult]) -> (usize, usize, f64) {
    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    (total, passed, percent_of(passed, total))
}

/// Per-game pass counts, in game order.
fn by_game(results: &[ScenarioResult]) -> BTreeMap<&str, (usize, usize)> {
    let mut games: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for result in results {
        let entry = games.entry(result.game_type.as_str()).or_default();
        entry.0 += 1;
        if result.passed {
            entry.1 += 1;
        }
    }
    games
}

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Logic Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    let (total_tests, passed_tests, success_rate) = tally(results);
    let failed_tests = total_tests - passed_tests;

    writeln!(out, "Total scenarios: {total_tests}")?;
    writeln!(out, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(out, "Failed: {}", failed_tests.to_string().red())?;
    writeln!(out, "Success rate: {success_rate:.1}%")?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };

        writeln!(
            out,
            "{} {} [{} seed {}]",
            status,
            result.scenario_name.bold(),
            result.game_type,
            result.seed
        )?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    writeln!(out, "{}", "🎯 Per-Game Summary".bright_yellow().bold())?;
    writeln!(out, "{}", "===================".yellow())?;
    for (game, (runs, passed)) in by_game(results) {
        writeln!(out, "{game:20} {passed}/{runs} passed")?;
    }

    if let (Some(fastest), Some(slowest)) = (
        results.iter().min_by_key(|r| r.average_duration),
        results.iter().max_by_key(|r| r.average_duration),
    ) {
        writeln!(out)?;
        writeln!(
            out,
            "Fastest: {} / {} ({:?})",
            fastest.scenario_name.green(),
            fastest.game_type,
            fastest.average_duration
        )?;
        writeln!(
            out,
            "Slowest: {} / {} ({:?})",
            slowest.scenario_name.yellow(),
            slowest.game_type,
            slowest.average_duration
        )?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(out, "# PhysLab Logic Test Results\n")?;

    let (total_tests, passed_tests, success_rate) = tally(results);

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total scenarios**: {total_tests}")?;
    writeln!(out, "- **Passed**: {passed_tests}")?;
    writeln!(out, "- **Failed**: {}", total_tests - passed_tests)?;
    writeln!(out, "- **Success rate**: {success_rate:.1}%\n")?;

    writeln!(out, "| Game | Passed | Runs |")?;
    writeln!(out, "|---|---|---|")?;
    for (game, (runs, passed)) in by_game(results) {
        writeln!(out, "| {game} | {passed} | {runs} |")?;
    }
    writeln!(out)?;

    writeln!(out, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };

        writeln!(
            out,
            "### {} {} ({}, seed {})\n",
            status, result.scenario_name, result.game_type, result.seed
        )?;
        writeln!(
            out,
            "- **Iterations**: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "- **Average time**: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
