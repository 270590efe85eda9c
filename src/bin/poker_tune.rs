use clap::Parser;
use log::info;
use poker_tuner::config::{Method, TuningConfig};
use poker_tuner::optimizer::{AnnealingPreset, CancelToken, JsonLinesSink, LogSink, Tee};
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "poker-tune")]
#[command(about = "Tune equity-policy thresholds by simulated play", version)]
struct Cli {
    /// JSON run configuration; defaults apply to anything it omits
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Search method: hill-climb or anneal (overrides config)
    #[arg(short, long)]
    method: Option<Method>,
    /// Annealing preset, e.g. aggression-threshold-2 or bluff-probability (overrides config)
    #[arg(long)]
    preset: Option<AnnealingPreset>,
    /// Number of iterations (overrides config)
    #[arg(short, long)]
    iterations: Option<u32>,
    /// RNG seed (overrides config)
    #[arg(long)]
    seed: Option<u64>,
    /// JSON-lines iteration log (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut cfg = match &cli.config {
        Some(path) => TuningConfig::load(path)?,
        None => TuningConfig::default(),
    };
    if let Some(method) = cli.method {
        cfg = cfg.with_method(method);
    }
    if let Some(preset) = cli.preset {
        cfg.preset = preset;
    }
    if let Some(iterations) = cli.iterations {
        cfg = cfg.with_iterations(iterations);
    }
    if let Some(seed) = cli.seed {
        cfg = cfg.with_seed(seed);
    }
    if let Some(output) = cli.output {
        cfg = cfg.with_output(output);
    }

    info!(
        "method {}, {} games per opponent, roster {:?}",
        cfg.method,
        cfg.games_per_opponent(),
        cfg.roster()
    );
    let mut rng = cfg.rng();
    let mut log_sink = LogSink;
    let outcome = match &cfg.output {
        Some(path) => {
            let mut file = JsonLinesSink::new(BufWriter::new(File::create(path)?));
            cfg.run(&mut rng, &mut Tee(&mut log_sink, &mut file), CancelToken::new())?
        }
        None => cfg.run(&mut rng, &mut log_sink, CancelToken::new())?,
    };
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
