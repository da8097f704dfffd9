#![forbid(unsafe_code)]

pub mod formats;
pub mod job;
pub mod jobs;
pub mod output;
pub mod registry;
pub mod runner;
pub mod weights;

pub use job::{FramePayload, Job, StepPayload};
pub use output::{OutputData, OutputInfo, OutputVariable, PlotKind};
pub use registry::{build_job, job_registry, JobEntry};
pub use runner::{run_job, setup_context, CancelToken, JobOutcome};
pub use weights::weight_by_elements;
