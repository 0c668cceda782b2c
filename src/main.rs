use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{error, info, warn};

use baryogen::analysis::{expected_asymmetry, Analyzer, AsymmetryReport};
use baryogen::config::SimulationConfig;
use baryogen::execution::ExecutorKind;
use baryogen::quantum::{DecayOperator, TrialOutcomeSet};
use baryogen::simulation::{epsilon_grid, sweep, Simulation, SimulationReport};
use baryogen::Result;

#[derive(Debug, Parser)]
#[command(name = "baryogen", version, about = "X boson decay and baryon asymmetry simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simulate the decay for one CP-violation parameter
    Run {
        #[command(flatten)]
        run: RunArgs,
        /// Exit non-zero on conservation violations or out-of-tolerance asymmetry
        #[arg(long)]
        strict: bool,
    },
    /// Simulate a range of CP-violation parameters in parallel
    Sweep {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
        start: f64,
        #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
        stop: f64,
        #[arg(long, default_value_t = 11)]
        steps: usize,
    },
    /// Analyze a Qiskit-style counts file, e.g. {"01010": 559, "10100": 441}
    Analyze {
        counts: PathBuf,
        /// Expected asymmetry to compare against
        #[arg(long, allow_negative_numbers = true)]
        epsilon: Option<f64>,
        #[arg(long)]
        tolerance: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Print the initializer + decay circuit and its branch probabilities
    Circuit {
        #[arg(long, default_value_t = baryogen::config::DEFAULT_EPSILON, allow_negative_numbers = true)]
        epsilon: f64,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// JSON configuration file; BARYOGEN_* variables and flags override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(short, long, allow_negative_numbers = true)]
    epsilon: Option<f64>,
    #[arg(short = 'n', long)]
    shots: Option<u64>,
    #[arg(long, value_enum)]
    executor: Option<ExecutorKind>,
    #[arg(long)]
    workers: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    tolerance: Option<f64>,
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn resolve(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)?,
            None => SimulationConfig::default(),
        };
        config.apply_env()?;
        if let Some(v) = self.epsilon {
            config.epsilon = v;
        }
        if let Some(v) = self.shots {
            config.shots = v;
        }
        if let Some(v) = self.executor {
            config.executor = v;
        }
        if let Some(v) = self.workers {
            config.workers = v;
        }
        if let Some(v) = self.seed {
            config.seed = Some(v);
        }
        if let Some(v) = self.tolerance {
            config.tolerance = v;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let env = Env::default().filter_or("RUST_LOG", "info");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_secs()
        .try_init();

    let cli = Cli::parse();
    match execute(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when a strict check failed
fn execute(command: Command) -> Result<bool> {
    match command {
        Command::Run { run, strict } => {
            let config = run.resolve()?;
            info!("running with {:?}", config);
            let report = Simulation::from_config(&config)?.run()?;
            if run.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_simulation(&report);
            }
            if strict {
                if let Err(e) = report.result.require_conservation() {
                    warn!("{}", e);
                    return Ok(false);
                }
                return Ok(report.within_tolerance);
            }
            Ok(true)
        }
        Command::Sweep { run, start, stop, steps } => {
            let config = run.resolve()?;
            let epsilons = epsilon_grid(start, stop, steps)?;
            let reports = sweep(&config, &epsilons)?;
            if run.json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                println!("{:>8} {:>10} {:>10} {:>10} {:>10}", "epsilon", "N_q", "N_qbar", "asymmetry", "std.err");
                for r in &reports {
                    println!(
                        "{:>8.3} {:>10} {:>10} {:>10.4} {:>10.4}{}",
                        r.epsilon,
                        r.result.n_q,
                        r.result.n_qbar,
                        r.result.asymmetry,
                        r.result.standard_error,
                        if r.result.conserves() { "" } else { "  violations!" }
                    );
                }
            }
            Ok(true)
        }
        Command::Analyze { counts, epsilon, tolerance, json } => {
            let outcomes = TrialOutcomeSet::load_json(&counts)?;
            let report = Analyzer::analyze(&outcomes)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_asymmetry(&report);
            }
            if let Some(eps) = epsilon {
                DecayOperator::new(eps)?;
                let tolerance = tolerance.unwrap_or(baryogen::config::DEFAULT_TOLERANCE);
                let expected = expected_asymmetry(eps);
                let ok = report.within_tolerance(expected, tolerance);
                println!(
                    "expected {:.4}, deviation {:.4}, tolerance {}: {}",
                    expected,
                    report.deviation_from(expected),
                    tolerance,
                    if ok { "ok" } else { "FAILED" }
                );
                return Ok(ok && report.conserves());
            }
            Ok(report.conserves())
        }
        Command::Circuit { epsilon, json } => {
            let operator = DecayOperator::new(epsilon)?;
            let program = operator.program()?;
            let branches = operator.channel_operation()?;
            if json {
                let out = serde_json::json!({ "circuit": program, "branches": branches });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print!("{}", program);
                println!("// branches");
                for outcome in &branches.outcomes {
                    println!("//   {:<10} {} p={:.6}", outcome.label, outcome.value, outcome.probability);
                }
            }
            Ok(true)
        }
    }
}

fn print_simulation(report: &SimulationReport) {
    println!("X boson decay, epsilon = {} ({} shots, {} executor)", report.epsilon, report.shots, report.executor);
    print_asymmetry(&report.result);
    println!(
        "expected asymmetry {:.4}, tolerance {}: {}",
        report.expected_asymmetry,
        report.tolerance,
        if report.within_tolerance { "ok" } else { "out of tolerance" }
    );
}

fn print_asymmetry(report: &AsymmetryReport) {
    println!("  quark + lepton:         {}", report.n_q);
    println!("  antiquark + antilepton: {}", report.n_qbar);
    println!(
        "  baryon asymmetry:       {:.4} +/- {:.4}",
        report.asymmetry, report.standard_error
    );
    if report.conserves() {
        println!("  conservation:           ok");
    } else {
        println!("  conservation:           VIOLATED");
        for v in &report.violations {
            let rules: Vec<String> = v.rules.iter().map(ToString::to_string).collect();
            println!("    {} x{}: {}", v.configuration, v.count, rules.join(", "));
        }
    }
}
