//! Copy a subset of atoms over a subset of frames into a new trajectory.

use serde_json::Value;

use nscat_config::{Configuration, ConfiguratorKind, Settings};
use nscat_core::{NscatError, NscatResult};
use nscat_traj::{FrameReader, TrajectoryWriter};

use crate::job::{FramePayload, Job, StepPayload};
use crate::jobs::OrderedFrameWriter;
use crate::output::OutputData;

/// One step per selected frame; the subset extraction happens in the
/// worker so only the kept atoms travel back to the driver.
#[derive(Default)]
pub struct CroppedTrajectory {
    subset: Vec<u32>,
    sink: Option<OrderedFrameWriter>,
}

impl CroppedTrajectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn sink_mut(&mut self) -> NscatResult<&mut OrderedFrameWriter> {
        self.sink
            .as_mut()
            .ok_or_else(|| NscatError::Schema("job not initialized".to_string()))
    }
}

impl Job for CroppedTrajectory {
    fn name(&self) -> &'static str {
        "cropped_trajectory"
    }

    fn label(&self) -> &'static str {
        "Cropped Trajectory"
    }

    fn category(&self) -> &'static str {
        "trajectory"
    }

    fn settings(&self) -> Settings {
        Settings::new()
            .with("trajectory", ConfiguratorKind::Trajectory, Value::Null)
            .with("frames", ConfiguratorKind::Frames, Value::Null)
            .with("atom_selection", ConfiguratorKind::AtomSelection, Value::Null)
            .with(
                "output_trajectory",
                ConfiguratorKind::OutputTrajectory,
                Value::Null,
            )
            .with("running_mode", ConfiguratorKind::RunningMode, Value::Null)
    }

    fn initialize(
        &mut self,
        config: &Configuration,
        _output: &mut OutputData,
    ) -> NscatResult<usize> {
        let trajectory = config.trajectory_instance("trajectory")?;
        let frames = config.frames("frames")?;
        let selection = config.atom_selection("atom_selection")?;
        let destination = config.output_trajectory("output_trajectory")?;

        self.subset = selection.flatten_indexes.clone();
        if self.subset.is_empty() {
            return Err(NscatError::InputData("empty atom selection".to_string()));
        }
        let sub_system = trajectory.chemical_system().subset(&self.subset)?;
        let writer = TrajectoryWriter::create(
            &destination.file,
            &sub_system,
            frames.n_frames,
            None,
            destination.dtype,
            destination.compression,
        )?;
        self.sink = Some(OrderedFrameWriter::new(writer));
        Ok(frames.n_frames)
    }

    fn run_step(
        &self,
        config: &Configuration,
        reader: &mut FrameReader,
        step: usize,
    ) -> NscatResult<StepPayload> {
        let frames = config.frames("frames")?;
        let frame = reader.frame(frames.value[step])?;
        let coords = self
            .subset
            .iter()
            .map(|&i| frame.coords[i as usize])
            .collect();
        let velocities = frame
            .velocities
            .as_ref()
            .map(|v| self.subset.iter().map(|&i| v[i as usize]).collect());
        Ok(StepPayload::Frame(Box::new(FramePayload {
            coords,
            cell: frame.unit_cell,
            time: frame.time,
            velocities,
        })))
    }

    fn combine(
        &mut self,
        step: usize,
        payload: StepPayload,
        _output: &mut OutputData,
    ) -> NscatResult<()> {
        let frame = payload.into_frame()?;
        self.sink_mut()?.push(step, frame)
    }

    fn finalize(&mut self, _config: &Configuration, _output: &mut OutputData) -> NscatResult<()> {
        self.sink_mut()?.close()
    }
}
