use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;

use nscat_config::UserDefinitionStore;
use nscat_core::{NscatError, NscatResult};
use nscat_engine::{build_job, job_registry, run_job, setup_context, CancelToken};

#[derive(Parser)]
#[command(name = "nscat", version, about = "Post-hoc analysis of MD trajectories")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a job described by a JSON or YAML input file.
    Run {
        /// Input file with fields "job" and "parameters".
        #[arg(short, long)]
        input: PathBuf,
    },
    /// List the registered jobs.
    Jobs,
    /// Describe a job's settings.
    Info { job: String },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("NSCAT_LOG")
                .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> NscatResult<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run { input } => {
            let (job_name, parameters) = load_input(&input)?;
            let mut job = build_job(&job_name).ok_or_else(|| {
                NscatError::InputData(format!(
                    "unknown job '{job_name}'; run `nscat jobs` for the list"
                ))
            })?;
            let definitions = UserDefinitionStore::open_default();
            let ctx = setup_context().with_definitions(&definitions);
            let outcome = run_job(job.as_mut(), &parameters, &ctx, &CancelToken::new())?;
            for file in &outcome.files {
                println!("{}", file.display());
            }
            Ok(())
        }
        Command::Jobs => {
            for entry in job_registry() {
                println!("{:24} {:16} {}", entry.name, entry.category, entry.label);
            }
            Ok(())
        }
        Command::Info { job } => {
            let job = build_job(&job).ok_or_else(|| {
                NscatError::InputData(format!("unknown job '{job}'; run `nscat jobs` for the list"))
            })?;
            println!(
                "{} ({}, {}, applies to {})",
                job.name(),
                job.label(),
                job.category(),
                job.ancestor()
            );
            for entry in job.settings().entries() {
                println!("  {:24} {}", entry.name, entry.kind.name());
                if !entry.options.is_null() {
                    println!("  {:24} options: {}", "", entry.options);
                }
            }
            Ok(())
        }
    }
}

fn load_input(path: &PathBuf) -> NscatResult<(String, Value)> {
    let content = fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    let doc: Value = if ext == "yaml" || ext == "yml" {
        serde_yaml::from_str(&content)
            .map_err(|e| NscatError::Parse(format!("yaml parse error: {e}")))?
    } else {
        serde_json::from_str(&content)
            .map_err(|e| NscatError::Parse(format!("json parse error: {e}")))?
    };
    let job = doc
        .get("job")
        .and_then(|j| j.as_str())
        .ok_or_else(|| NscatError::InputData("input file needs a 'job' field".to_string()))?
        .to_string();
    let parameters = doc.get("parameters").cloned().unwrap_or(Value::Null);
    Ok((job, parameters))
}
