//! Unfold molecules across periodic boundaries so every bonded pair ends
//! up contiguous, writing the result as a new trajectory.

use std::collections::VecDeque;

use serde_json::Value;

use nscat_config::{Configuration, ConfiguratorKind, Settings};
use nscat_core::{ChemicalSystem, NscatError, NscatResult, UnitCell};
use nscat_traj::{FrameReader, TrajectoryWriter};

use crate::job::{FramePayload, Job, StepPayload};
use crate::jobs::OrderedFrameWriter;
use crate::output::OutputData;

/// One step per selected frame. Each molecule is traversed breadth-first
/// over its bond graph from its first atom, placing every bonded
/// neighbour at the minimum-image position relative to its parent; an
/// already contiguous molecule is left untouched, which makes the job
/// idempotent.
#[derive(Default)]
pub struct UnfoldedTrajectory {
    sink: Option<OrderedFrameWriter>,
}

impl UnfoldedTrajectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn sink_mut(&mut self) -> NscatResult<&mut OrderedFrameWriter> {
        self.sink
            .as_mut()
            .ok_or_else(|| NscatError::Schema("job not initialized".to_string()))
    }
}

/// Iterative BFS over the bond graph, one queue per molecule. O(N) memory
/// and no recursion regardless of molecule topology.
pub(crate) fn unfold_frame(
    system: &ChemicalSystem,
    cell: &UnitCell,
    coords: &[[f64; 3]],
) -> Vec<[f64; 3]> {
    let n = coords.len();
    let mut unfolded = coords.to_vec();
    if cell.is_identity() {
        return unfolded;
    }
    let mut visited = vec![false; n];
    let mut queue = VecDeque::new();
    for start in 0..n {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        queue.push_back(start);
        while let Some(parent) = queue.pop_front() {
            let p = unfolded[parent];
            for &child in system.neighbors(parent) {
                let child = child as usize;
                if visited[child] {
                    continue;
                }
                visited[child] = true;
                let r = unfolded[child];
                let dr = cell.minimum_image([r[0] - p[0], r[1] - p[1], r[2] - p[2]]);
                unfolded[child] = [p[0] + dr[0], p[1] + dr[1], p[2] + dr[2]];
                queue.push_back(child);
            }
        }
    }
    unfolded
}

impl Job for UnfoldedTrajectory {
    fn name(&self) -> &'static str {
        "unfolded_trajectory"
    }

    fn label(&self) -> &'static str {
        "Unfolded Trajectory"
    }

    fn category(&self) -> &'static str {
        "trajectory"
    }

    fn settings(&self) -> Settings {
        Settings::new()
            .with("trajectory", ConfiguratorKind::Trajectory, Value::Null)
            .with("frames", ConfiguratorKind::Frames, Value::Null)
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
        let destination = config.output_trajectory("output_trajectory")?;
        let writer = TrajectoryWriter::create(
            &destination.file,
            trajectory.chemical_system(),
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
        let coords = unfold_frame(reader.chemical_system(), &frame.unit_cell, &frame.coords);
        Ok(StepPayload::Frame(Box::new(FramePayload {
            coords,
            cell: frame.unit_cell,
            time: frame.time,
            velocities: frame.velocities,
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
