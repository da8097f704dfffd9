use thiserror::Error;

#[derive(Debug, Error)]
pub enum NscatError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("input data error: {0}")]
    InputData(String),
    #[error("schema error: {0}")]
    Schema(String),
    #[error("{phase} failed: {message}")]
    Runtime {
        phase: &'static str,
        step: Option<usize>,
        message: String,
    },
    #[error("unsupported: {0}")]
    Unsupported(String),
}

pub type NscatResult<T> = Result<T, NscatError>;

impl NscatError {
    /// Tag an error with the job phase it occurred in, keeping the step
    /// index when the phase is indexable.
    pub fn runtime(phase: &'static str, step: Option<usize>, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = match step {
            Some(i) => format!("step {i}: {message}"),
            None => message,
        };
        NscatError::Runtime {
            phase,
            step,
            message,
        }
    }

    pub fn step(&self) -> Option<usize> {
        match self {
            NscatError::Runtime { step, .. } => *step,
            _ => None,
        }
    }
}
