mod logic;
mod scenarios;
mod util;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{GameTester, LogicTester, ScenarioResult, TesterAssets};
use physlab_game::catalog;
use scenarios::{ScenarioOptions, get_scenario, list_scenarios, scenario_keys};
use util::{parse_seeds, split_csv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "physlab-tester", version)]
#[command(about = "Headless QA for PhysLab mini-games - simulated learners drive every phase")]
struct Args {
    /// Games to run (comma-separated game types, or "all")
    #[arg(long, default_value = "all")]
    games: String,

    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "walkthrough")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated, decimal or 0x-prefixed hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario, game and seed
    #[arg(long, default_value_t = 5)]
    iterations: usize,

    /// Answer accuracy of the seeded learner (0.0 to 1.0)
    #[arg(long, default_value_t = 0.85)]
    accuracy: f64,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory holding `<game-type>.json` quiz banks
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let games = expand_games(&args.games);
    let scenario_names = expand_scenarios(&args.scenarios);
    let seeds = parse_seeds(&split_csv(&args.seeds))?;
    if !(0.0..=1.0).contains(&args.accuracy) {
        bail!("accuracy must be between 0.0 and 1.0, got {}", args.accuracy);
    }

    let assets = args
        .content_dir
        .as_deref()
        .map_or_else(TesterAssets::load_default, TesterAssets::load_from);
    let game_tester = GameTester::new(assets, args.verbose);
    let options = ScenarioOptions {
        accuracy: args.accuracy,
    };

    let all_results =
        run_logic_scenarios(&args, &scenario_names, &games, &seeds, &game_tester, &options);

    write_reports(&args, &all_results, start_time)?;

    if all_results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:20} - {description}")?;
    }
    writeln!(output_target.writer(), "Available games:")?;
    for config in catalog::builtin_games() {
        writeln!(output_target.writer(), "  {:20} - {}", config.game_type, config.title)?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🔬 PhysLab Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn expand_games(games_arg: &str) -> Vec<String> {
    let requested = split_csv(games_arg);
    if requested.is_empty() || requested.iter().any(|g| g == "all") {
        return catalog::builtin_games()
            .into_iter()
            .map(|config| config.game_type)
            .collect();
    }
    for game in &requested {
        if catalog::find(game).is_none() {
            log::warn!("{game} is not a built-in game; it must have a config in the content dir");
        }
    }
    requested
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.contains(&"all".to_string()) {
        scenarios.retain(|s| s != "all");
        scenarios.extend(scenario_keys());
    }
    scenarios
}

fn run_logic_scenarios(
    args: &Args,
    scenario_names: &[String],
    games: &[String],
    seeds: &[u64],
    game_tester: &GameTester,
    options: &ScenarioOptions,
) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let logic_tester = LogicTester::new(game_tester.clone());
    let mut results = Vec::new();

    for scenario_name in scenario_names {
        if let Some(scenario) = get_scenario(scenario_name, options) {
            if args.verbose {
                println!("▶ {} - {}", scenario.name.bold(), scenario.description);
            }
            results.extend(logic_tester.run_scenario(&scenario, games, seeds, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }

    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    if output_target.is_file() {
        colored::control::set_override(false);
    }

    match args.report {
        ReportFormat::Json => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        ReportFormat::Markdown => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# PhysLab Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        ReportFormat::Console => {
            if results.is_empty() {
                writeln!(&mut output_target, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    const fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            games: "all".to_string(),
            scenarios: "walkthrough".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 1,
            accuracy: 0.85,
            report: ReportFormat::Json,
            output: None,
            content_dir: None,
            verbose: false,
        }
    }

    #[test]
    fn all_expands_to_every_scenario() {
        let expanded = expand_scenarios("all");
        assert_eq!(expanded.len(), list_scenarios().len());
        assert!(expanded.contains(&"physics-sweep".to_string()));
        assert_eq!(expand_scenarios("deep-link"), vec!["deep-link"]);
    }

    #[test]
    fn all_expands_to_every_builtin_game() {
        assert_eq!(expand_games("all").len(), 4);
        assert_eq!(
            expand_games("gas-laws, chladni-patterns"),
            vec!["gas-laws", "chladni-patterns"]
        );
    }

    #[test]
    fn logic_run_covers_games_and_seeds() {
        let args = base_args();
        let tester = GameTester::new(TesterAssets::load_default(), false);
        let games = expand_games(&args.games);
        let results = run_logic_scenarios(
            &args,
            &["walkthrough".to_string(), "nope".to_string()],
            &games,
            &[1, 2],
            &tester,
            &ScenarioOptions { accuracy: 1.0 },
        );
        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|r| r.passed), "{results:#?}");
    }

    #[test]
    fn reports_write_to_file() {
        let path = std::env::temp_dir().join(format!(
            "physlab-report-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let mut args = base_args();
        args.report = ReportFormat::Markdown;
        args.output = Some(path.clone());
        write_reports(&args, &[], Instant::now()).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("No scenarios executed"));
    }
}
