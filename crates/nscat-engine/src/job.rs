//! The job contract: schema, initialize, indexable step function,
//! driver-side reduction, finalize.

use ndarray::ArrayD;

use nscat_config::{Configuration, Settings};
use nscat_core::{NscatResult, UnitCell};
use nscat_traj::FrameReader;

use crate::output::OutputData;

/// Per-step result shipped from workers to the driver. Variants are
/// arrays or scalars so payloads stay cheap to move between threads.
#[derive(Debug, Clone)]
pub enum StepPayload {
    Empty,
    Scalar(f64),
    Series(Vec<f64>),
    Points(Vec<[f64; 3]>),
    Array(ArrayD<f64>),
    Frame(Box<FramePayload>),
}

/// A produced frame, used by trajectory-writing jobs.
#[derive(Debug, Clone)]
pub struct FramePayload {
    pub coords: Vec<[f64; 3]>,
    pub cell: UnitCell,
    pub time: f64,
    pub velocities: Option<Vec<[f64; 3]>>,
}

/// A unit of analysis.
///
/// The engine drives: `settings` -> configuration -> `initialize` (fixes
/// the number of steps and allocates output variables) -> `run_step(i)`
/// fan-out -> serialized `combine` on the driver -> `finalize`.
///
/// `run_step` is read-only with respect to the trajectory; the engine
/// hands every worker its own `FrameReader`, opened from the trajectory
/// configured under the conventional parameter name "trajectory".
/// Completion order is arbitrary, so `combine` must be commutative for
/// accumulating variables and idempotent per step index.
pub trait Job: Send + Sync {
    fn name(&self) -> &'static str;
    fn label(&self) -> &'static str;
    fn category(&self) -> &'static str;

    /// Kind of input object the job applies to; discovery metadata for
    /// front ends grouping jobs by what they consume.
    fn ancestor(&self) -> &'static str {
        "trajectory"
    }

    /// Ordered parameter schema.
    fn settings(&self) -> Settings;

    /// Allocate output variables and return the number of steps.
    fn initialize(&mut self, config: &Configuration, output: &mut OutputData)
        -> NscatResult<usize>;

    fn run_step(
        &self,
        config: &Configuration,
        reader: &mut FrameReader,
        step: usize,
    ) -> NscatResult<StepPayload>;

    fn combine(
        &mut self,
        step: usize,
        payload: StepPayload,
        output: &mut OutputData,
    ) -> NscatResult<()>;

    fn finalize(&mut self, config: &Configuration, output: &mut OutputData) -> NscatResult<()>;
}

impl StepPayload {
    pub fn into_series(self) -> NscatResult<Vec<f64>> {
        match self {
            StepPayload::Series(values) => Ok(values),
            StepPayload::Scalar(x) => Ok(vec![x]),
            other => Err(nscat_core::NscatError::Schema(format!(
                "expected a series payload, got {}",
                other.kind_name()
            ))),
        }
    }

    pub fn into_points(self) -> NscatResult<Vec<[f64; 3]>> {
        match self {
            StepPayload::Points(points) => Ok(points),
            other => Err(nscat_core::NscatError::Schema(format!(
                "expected a points payload, got {}",
                other.kind_name()
            ))),
        }
    }

    pub fn into_frame(self) -> NscatResult<FramePayload> {
        match self {
            StepPayload::Frame(frame) => Ok(*frame),
            other => Err(nscat_core::NscatError::Schema(format!(
                "expected a frame payload, got {}",
                other.kind_name()
            ))),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            StepPayload::Empty => "empty",
            StepPayload::Scalar(_) => "scalar",
            StepPayload::Series(_) => "series",
            StepPayload::Points(_) => "points",
            StepPayload::Array(_) => "array",
            StepPayload::Frame(_) => "frame",
        }
    }
}
