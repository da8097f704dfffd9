//! Mean square displacement per selection group, FFT-accelerated, with
//! element-weighted total.

use indexmap::IndexMap;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use serde_json::{json, Value};

use nscat_config::{Configuration, ConfiguratorKind, Settings};
use nscat_core::{NscatResult, ELEMENTS};
use nscat_traj::FrameReader;

use crate::job::{Job, StepPayload};
use crate::output::OutputData;
use crate::weights::weight_by_elements;

/// One step per selection group: the group's (mass-weighted centroid)
/// trajectory is read, optionally projected, and its MSD accumulated per
/// group label. Finalize averages per label and composes the weighted
/// total.
#[derive(Default)]
pub struct MeanSquareDisplacement {
    labels: Vec<String>,
    n_frames: usize,
    acc: IndexMap<String, Vec<f64>>,
    counts: IndexMap<String, usize>,
}

impl MeanSquareDisplacement {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Job for MeanSquareDisplacement {
    fn name(&self) -> &'static str {
        "msd"
    }

    fn label(&self) -> &'static str {
        "Mean Square Displacement"
    }

    fn category(&self) -> &'static str {
        "dynamics"
    }

    fn settings(&self) -> Settings {
        Settings::new()
            .with("trajectory", ConfiguratorKind::Trajectory, Value::Null)
            .with("frames", ConfiguratorKind::Frames, Value::Null)
            .with("atom_selection", ConfiguratorKind::AtomSelection, Value::Null)
            .with("grouping_level", ConfiguratorKind::GroupingLevel, Value::Null)
            .with("projection", ConfiguratorKind::Projection, Value::Null)
            .with("weights", ConfiguratorKind::Weights, json!({"default": "equal"}))
            .with("output_files", ConfiguratorKind::OutputFiles, Value::Null)
            .with("running_mode", ConfiguratorKind::RunningMode, Value::Null)
    }

    fn initialize(
        &mut self,
        config: &Configuration,
        output: &mut OutputData,
    ) -> NscatResult<usize> {
        let frames = config.frames("frames")?;
        let selection = config.atom_selection("atom_selection")?;
        if selection.selection_length == 0 {
            return Err(nscat_core::NscatError::InputData(
                "empty atom selection".to_string(),
            ));
        }

        self.n_frames = frames.n_frames;
        self.labels = (0..selection.n_groups())
            .map(|g| selection.group_label(g).to_string())
            .collect();
        self.acc.clear();
        self.counts.clear();

        output.add_line("time", frames.time.clone(), "index", "ps")?;
        for label in &selection.unique_names {
            output.add_zeros_line(&format!("msd_{label}"), frames.n_frames, "time", "ang2")?;
        }
        output.add_zeros_line("msd_total", frames.n_frames, "time", "ang2")?;
        output.set_main_result("msd_total")?;
        Ok(selection.n_groups())
    }

    fn run_step(
        &self,
        config: &Configuration,
        reader: &mut FrameReader,
        step: usize,
    ) -> NscatResult<StepPayload> {
        let frames = config.frames("frames")?;
        let selection = config.atom_selection("atom_selection")?;
        let projection = config.projection("projection")?;

        let series = reader.read_particle_trajectory(
            &selection.indexes[step],
            frames.first,
            frames.last,
            frames.step,
            "coordinates",
            Some(&selection.masses[step]),
        )?;
        let series = projection.projector.project(&series);
        Ok(StepPayload::Series(msd_series(&series)))
    }

    fn combine(
        &mut self,
        step: usize,
        payload: StepPayload,
        _output: &mut OutputData,
    ) -> NscatResult<()> {
        let series = payload.into_series()?;
        let label = self.labels[step].clone();
        let entry = self
            .acc
            .entry(label.clone())
            .or_insert_with(|| vec![0.0; self.n_frames]);
        for (acc, x) in entry.iter_mut().zip(series.iter()) {
            *acc += x;
        }
        *self.counts.entry(label).or_insert(0) += 1;
        Ok(())
    }

    fn finalize(&mut self, config: &Configuration, output: &mut OutputData) -> NscatResult<()> {
        let selection = config.atom_selection("atom_selection")?;
        let weights = config.weights("weights")?;
        let per_label = weights.get_weights(selection, &ELEMENTS);

        let mut means: IndexMap<String, Vec<f64>> = IndexMap::new();
        for (label, sum) in &self.acc {
            let count = self.counts.get(label).copied().unwrap_or(1) as f64;
            let mean: Vec<f64> = sum.iter().map(|x| x / count).collect();
            let data = output.data_mut(&format!("msd_{label}"))?;
            for (i, x) in mean.iter().enumerate() {
                data[[i]] = *x;
            }
            means.insert(label.clone(), mean);
        }

        let total = weight_by_elements(&means, &self.counts, &per_label);
        let data = output.data_mut("msd_total")?;
        for (i, x) in total.iter().enumerate() {
            data[[i]] = *x;
        }
        Ok(())
    }
}

/// MSD of one 3d series for lags `0..n`, via the cumulative-sum plus
/// FFT-autocorrelation identity (per component, then summed).
pub(crate) fn msd_series(series: &[[f64; 3]]) -> Vec<f64> {
    let n = series.len();
    let mut msd = vec![0.0; n];
    if n < 2 {
        return msd;
    }
    for component in 0..3 {
        let values: Vec<f64> = series.iter().map(|r| r[component]).collect();
        let mut r2 = vec![0.0; n + 1];
        for i in 0..n {
            r2[i + 1] = r2[i] + values[i] * values[i];
        }
        let ac = autocorr_real(&values);
        for lag in 1..n {
            let count = (n - lag) as f64;
            let sum1 = r2[n - lag];
            let sum2 = r2[n] - r2[lag];
            msd[lag] += (sum1 + sum2 - 2.0 * ac[lag]) / count;
        }
    }
    msd
}

fn autocorr_real(series: &[f64]) -> Vec<f64> {
    let n = series.len();
    let size = (n * 2).next_power_of_two();
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(size);
    let ifft = planner.plan_fft_inverse(size);
    let mut buf = vec![Complex { re: 0.0, im: 0.0 }; size];
    for (slot, &x) in buf.iter_mut().zip(series.iter()) {
        slot.re = x;
    }
    fft.process(&mut buf);
    for v in &mut buf {
        let re = v.re;
        let im = v.im;
        v.re = re * re + im * im;
        v.im = 0.0;
    }
    ifft.process(&mut buf);
    let scale = 1.0 / size as f64;
    (0..n).map(|i| buf[i].re * scale).collect()
}
