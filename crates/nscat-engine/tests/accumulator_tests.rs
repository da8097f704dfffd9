mod common;

use common::{ctx_with, drifting};
use nscat_config::{Configuration, ConfiguratorKind, Settings};
use nscat_core::NscatResult;
use nscat_engine::jobs::MeanSquareDisplacement;
use nscat_engine::{run_job, CancelToken, Job, OutputData, StepPayload};
use nscat_traj::FrameReader;
use serde_json::{json, Value};

/// Minimal accumulating job: every step adds its payload into one slot.
struct SummingJob {
    n_steps: usize,
}

impl Job for SummingJob {
    fn name(&self) -> &'static str {
        "summing_test"
    }

    fn label(&self) -> &'static str {
        "Summing Test"
    }

    fn category(&self) -> &'static str {
        "test"
    }

    fn settings(&self) -> Settings {
        Settings::new()
            .with("trajectory", ConfiguratorKind::Trajectory, Value::Null)
            .with("running_mode", ConfiguratorKind::RunningMode, Value::Null)
    }

    fn initialize(
        &mut self,
        _config: &Configuration,
        output: &mut OutputData,
    ) -> NscatResult<usize> {
        output.add_zeros_line("sum", 1, "index", "au")?;
        Ok(self.n_steps)
    }

    fn run_step(
        &self,
        _config: &Configuration,
        _reader: &mut FrameReader,
        step: usize,
    ) -> NscatResult<StepPayload> {
        Ok(StepPayload::Scalar((step + 1) as f64))
    }

    fn combine(
        &mut self,
        _step: usize,
        payload: StepPayload,
        output: &mut OutputData,
    ) -> NscatResult<()> {
        let series = payload.into_series()?;
        output.data_mut("sum")?[[0]] += series[0];
        Ok(())
    }

    fn finalize(&mut self, _config: &Configuration, _output: &mut OutputData) -> NscatResult<()> {
        Ok(())
    }
}

#[test]
fn accumulation_is_independent_of_combine_order() {
    // Drive combine directly under several completion orders.
    let orders: Vec<Vec<usize>> = vec![
        (0..8).collect(),
        (0..8).rev().collect(),
        vec![3, 0, 7, 1, 6, 2, 5, 4],
    ];
    let expected: f64 = (1..=8).map(|x| x as f64).sum();
    for order in orders {
        let mut job = SummingJob { n_steps: 8 };
        let mut output = OutputData::new();
        output.add_zeros_line("sum", 1, "index", "au").unwrap();
        for &step in &order {
            job.combine(
                step,
                StepPayload::Scalar((step + 1) as f64),
                &mut output,
            )
            .unwrap();
        }
        assert_eq!(output.get("sum").unwrap().data[[0]], expected, "{order:?}");
    }
}

#[test]
fn parallel_fan_out_accumulates_the_full_sum() {
    let ctx = ctx_with("t", drifting(2, 4, 0.0));
    for running_mode in [json!("monoprocessor"), json!(["multiprocessor", 1])] {
        let mut job = SummingJob { n_steps: 40 };
        let outcome = run_job(
            &mut job,
            &json!({"trajectory": "mem:t", "running_mode": running_mode}),
            &ctx,
            &CancelToken::new(),
        )
        .unwrap();
        let expected: f64 = (1..=40).map(|x| x as f64).sum();
        assert_eq!(outcome.output.get("sum").unwrap().data[[0]], expected);
    }
}

#[test]
fn msd_of_uniform_drift_is_quadratic() {
    let velocity = 0.5;
    let ctx = ctx_with("drift", drifting(3, 32, velocity));
    let mut job = MeanSquareDisplacement::new();
    let outcome = run_job(
        &mut job,
        &json!({
            "trajectory": "mem:drift",
            "frames": "all",
            "atom_selection": {"all": true},
            "weights": "equal"
        }),
        &ctx,
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!(outcome.n_steps, 3);

    let msd = &outcome.output.get("msd_total").unwrap().data;
    for lag in 0..8 {
        let expected = (velocity * lag as f64).powi(2);
        assert!(
            (msd[[lag]] - expected).abs() < 1e-6 * expected.max(1.0),
            "lag {lag}: {} vs {expected}",
            msd[[lag]]
        );
    }
    // Identical atoms: the per-element curve equals the total.
    let per_h = &outcome.output.get("msd_H").unwrap().data;
    for lag in 0..32 {
        assert!((per_h[[lag]] - msd[[lag]]).abs() < 1e-9);
    }
}

#[test]
fn msd_projection_drops_orthogonal_motion() {
    let velocity = 0.5;
    let ctx = ctx_with("drift", drifting(2, 16, velocity));
    // Drift is along x; projecting on z leaves nothing.
    let mut job = MeanSquareDisplacement::new();
    let outcome = run_job(
        &mut job,
        &json!({
            "trajectory": "mem:drift",
            "frames": "all",
            "atom_selection": {"all": true},
            "projection": ["axial", [0, 0, 1]],
            "weights": "equal"
        }),
        &ctx,
        &CancelToken::new(),
    )
    .unwrap();
    let msd = &outcome.output.get("msd_total").unwrap().data;
    for lag in 0..16 {
        assert!(msd[[lag]].abs() < 1e-9);
    }
}
