//! Concrete analysis jobs seeding the framework.

pub mod center_of_mass;
pub mod cropped;
pub mod density;
pub mod msd;
pub mod unfolded;

pub use center_of_mass::CenterOfMass;
pub use cropped::CroppedTrajectory;
pub use density::Density;
pub use msd::MeanSquareDisplacement;
pub use unfolded::UnfoldedTrajectory;

use std::collections::BTreeMap;

use nscat_core::{NscatError, NscatResult};
use nscat_traj::{FrameView, TrajectoryWriter};

use crate::job::FramePayload;

/// Reorders frames arriving in arbitrary completion order before handing
/// them to a trajectory writer, which is strictly sequential. Re-delivery
/// of an already written step is ignored, keeping combine idempotent.
pub(crate) struct OrderedFrameWriter {
    writer: Option<TrajectoryWriter>,
    pending: BTreeMap<usize, FramePayload>,
    next: usize,
}

impl OrderedFrameWriter {
    pub fn new(writer: TrajectoryWriter) -> Self {
        Self {
            writer: Some(writer),
            pending: BTreeMap::new(),
            next: 0,
        }
    }

    pub fn push(&mut self, step: usize, frame: FramePayload) -> NscatResult<()> {
        if step < self.next {
            return Ok(());
        }
        self.pending.insert(step, frame);
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| NscatError::Schema("frame writer already closed".to_string()))?;
        while let Some(frame) = self.pending.remove(&self.next) {
            let view = FrameView {
                time: frame.time,
                unit_cell: frame.cell,
                coords: frame.coords,
                velocities: frame.velocities,
            };
            writer.dump_configuration(&view, frame.time)?;
            self.next += 1;
        }
        Ok(())
    }

    pub fn close(&mut self) -> NscatResult<()> {
        if !self.pending.is_empty() {
            return Err(NscatError::Schema(format!(
                "{} frames still pending at close",
                self.pending.len()
            )));
        }
        match self.writer.take() {
            Some(writer) => writer.close(),
            None => Ok(()),
        }
    }
}
