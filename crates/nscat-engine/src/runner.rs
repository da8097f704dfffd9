//! Drives a job through its lifecycle: configuration, initialize, step
//! fan-out under the selected running mode, serialized reduction and
//! finalize.
//!
//! Workers share nothing but the job's read-only state and their private
//! `FrameReader`; the driver owns `OutputData` exclusively and combines
//! payloads in arrival order. A cooperative cancel token stops dispatch
//! between steps; a failing step cancels the remainder and `finalize`
//! runs only when every step succeeded.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use nscat_config::kinds::RunMode;
use nscat_config::{Configuration, SetupContext};
use nscat_core::{NscatError, NscatResult};

use crate::formats::format_names;
use crate::job::{Job, StepPayload};
use crate::output::{OutputData, OutputInfo};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct JobOutcome {
    pub output: OutputData,
    pub files: Vec<PathBuf>,
    pub n_steps: usize,
    pub cancelled: bool,
}

/// A setup context carrying the engine's registered output formats.
pub fn setup_context() -> SetupContext<'static> {
    SetupContext::new().with_formats(format_names())
}

/// Run `job` against raw parameters. Configuration failures surface as an
/// aggregated input-data error before any phase runs; phase failures are
/// tagged with the phase name and step index.
pub fn run_job(
    job: &mut dyn Job,
    raw: &Value,
    ctx: &SetupContext,
    cancel: &CancelToken,
) -> NscatResult<JobOutcome> {
    let config = job.settings().configure(raw, ctx)?;
    if !config.is_valid() {
        return Err(NscatError::InputData(format!(
            "invalid parameters for job '{}':\n{}",
            job.name(),
            config.report()
        )));
    }
    info!(job = job.name(), "configured");

    let mut output = OutputData::new();
    let n_steps = job
        .initialize(&config, &mut output)
        .map_err(|e| NscatError::runtime("initialize", None, e.to_string()))?;
    info!(job = job.name(), n_steps, "initialized");

    let mode = match config
        .names()
        .any(|name| name == "running_mode")
        .then(|| config.running_mode("running_mode"))
    {
        Some(Ok(running_mode)) => running_mode.mode,
        Some(Err(e)) => return Err(e),
        None => RunMode::Monoprocessor,
    };

    let cancelled = match mode {
        RunMode::Monoprocessor => run_steps_mono(job, &config, n_steps, cancel, &mut output)?,
        RunMode::Multiprocessor(slots) => {
            run_steps_multi(job, &config, n_steps, slots, cancel, &mut output)?
        }
    };

    if cancelled {
        warn!(job = job.name(), "cancelled, skipping finalize");
        return Ok(JobOutcome {
            output,
            files: Vec::new(),
            n_steps,
            cancelled: true,
        });
    }

    job.finalize(&config, &mut output)
        .map_err(|e| NscatError::runtime("finalize", None, e.to_string()))?;

    let files = write_output(job, &config, raw, &output)?;
    info!(job = job.name(), "finished");
    Ok(JobOutcome {
        output,
        files,
        n_steps,
        cancelled: false,
    })
}

fn run_steps_mono(
    job: &mut dyn Job,
    config: &Configuration,
    n_steps: usize,
    cancel: &CancelToken,
    output: &mut OutputData,
) -> NscatResult<bool> {
    let trajectory = config.trajectory_instance("trajectory")?;
    let mut reader = trajectory.reader()?;
    for step in 0..n_steps {
        if cancel.is_cancelled() {
            return Ok(true);
        }
        let payload = job
            .run_step(config, &mut reader, step)
            .map_err(|e| NscatError::runtime("run_step", Some(step), e.to_string()))?;
        job.combine(step, payload, output)
            .map_err(|e| NscatError::runtime("combine", Some(step), e.to_string()))?;
    }
    Ok(false)
}

fn run_steps_multi(
    job: &mut dyn Job,
    config: &Configuration,
    n_steps: usize,
    slots: usize,
    cancel: &CancelToken,
    output: &mut OutputData,
) -> NscatResult<bool> {
    let trajectory = config.trajectory_instance("trajectory")?.clone();
    let next_step = AtomicUsize::new(0);
    let mut arrivals: Vec<(usize, StepPayload)> = Vec::with_capacity(n_steps);
    let mut first_error: Option<(usize, NscatError)> = None;

    {
        let job_view: &dyn Job = job;
        let (tx, rx) = mpsc::channel::<(usize, NscatResult<StepPayload>)>();
        std::thread::scope(|scope| -> NscatResult<()> {
            for _ in 0..slots.max(1) {
                let tx = tx.clone();
                let trajectory = &trajectory;
                let next_step = &next_step;
                let cancel = cancel.clone();
                scope.spawn(move || {
                    // Each worker owns an independent trajectory handle.
                    let mut reader = match trajectory.reader() {
                        Ok(reader) => reader,
                        Err(e) => {
                            let step = next_step.fetch_add(1, Ordering::SeqCst);
                            let _ = tx.send((step, Err(e)));
                            return;
                        }
                    };
                    loop {
                        if cancel.is_cancelled() {
                            break;
                        }
                        let step = next_step.fetch_add(1, Ordering::SeqCst);
                        if step >= n_steps {
                            break;
                        }
                        let result = job_view.run_step(config, &mut reader, step);
                        if tx.send((step, result)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(tx);
            for (step, result) in rx {
                match result {
                    Ok(payload) => arrivals.push((step, payload)),
                    Err(e) => {
                        // First failing step wins; stop dispatching and
                        // let the workers drain.
                        if first_error.is_none() {
                            first_error = Some((step, e));
                            cancel.cancel();
                        }
                    }
                }
            }
            Ok(())
        })?;
    }

    if let Some((step, e)) = first_error {
        return Err(NscatError::runtime("run_step", Some(step), e.to_string()));
    }
    if cancel.is_cancelled() {
        return Ok(true);
    }
    // Reduction happens strictly on the driver, in arrival order.
    for (step, payload) in arrivals {
        job.combine(step, payload, output)
            .map_err(|e| NscatError::runtime("combine", Some(step), e.to_string()))?;
    }
    Ok(false)
}

fn write_output(
    job: &dyn Job,
    config: &Configuration,
    raw: &Value,
    output: &OutputData,
) -> NscatResult<Vec<PathBuf>> {
    if output.is_empty() || !config.names().any(|name| name == "output_files") {
        return Ok(Vec::new());
    }
    let output_files = config.output_files("output_files")?;
    let info = OutputInfo {
        job: job.name().to_string(),
        label: job.label().to_string(),
        parameters: raw.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    let mut files = output.write(&output_files.root, &output_files.formats, &info)?;
    if output_files.write_logs {
        let log_path = output_files.root.with_extension("log");
        let log = format!(
            "job: {} ({})\nwritten: {}\nparameters: {}\n\n{}\n",
            info.job,
            info.label,
            info.timestamp,
            info.parameters,
            config.information()
        );
        std::fs::write(&log_path, log)?;
        files.push(log_path);
    }
    Ok(files)
}
