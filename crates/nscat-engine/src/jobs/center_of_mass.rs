//! Weighted centre of the selection per frame, minimum-image aware.

use serde_json::{json, Value};

use nscat_config::{Configuration, ConfiguratorKind, Settings};
use nscat_core::{NscatResult, ELEMENTS};
use nscat_traj::FrameReader;

use crate::job::{Job, StepPayload};
use crate::output::OutputData;

/// One step per selected frame. Atoms are made contiguous with respect to
/// the first selected atom through minimum-image displacements before the
/// weighted centroid is taken, so a molecule split across the boundary
/// still yields a physical centre.
#[derive(Debug, Default)]
pub struct CenterOfMass {
    atom_indices: Vec<u32>,
    atom_weights: Vec<f64>,
}

impl CenterOfMass {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Job for CenterOfMass {
    fn name(&self) -> &'static str {
        "com"
    }

    fn label(&self) -> &'static str {
        "Center Of Mass"
    }

    fn category(&self) -> &'static str {
        "structure"
    }

    fn settings(&self) -> Settings {
        Settings::new()
            .with("trajectory", ConfiguratorKind::Trajectory, Value::Null)
            .with("frames", ConfiguratorKind::Frames, Value::Null)
            .with("atom_selection", ConfiguratorKind::AtomSelection, Value::Null)
            .with(
                "weights",
                ConfiguratorKind::Weights,
                json!({"default": "atomic_weight"}),
            )
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
        let weights = config.weights("weights")?;
        if selection.selection_length == 0 {
            return Err(nscat_core::NscatError::InputData(
                "empty atom selection".to_string(),
            ));
        }
        let per_label = weights.get_weights(selection, &ELEMENTS);

        self.atom_indices.clear();
        self.atom_weights.clear();
        for (g, group) in selection.indexes.iter().enumerate() {
            let weight = per_label
                .get(selection.group_label(g))
                .copied()
                .unwrap_or(0.0);
            for &atom in group {
                self.atom_indices.push(atom);
                self.atom_weights.push(weight);
            }
        }

        let n = frames.n_frames;
        output.add_line("time", frames.time.clone(), "index", "ps")?;
        output.add_zeros_surface("com", n, 3, "time", "ang")?;
        output.set_main_result("com")?;
        Ok(n)
    }

    fn run_step(
        &self,
        config: &Configuration,
        reader: &mut FrameReader,
        step: usize,
    ) -> NscatResult<StepPayload> {
        let frames = config.frames("frames")?;
        let frame = reader.frame(frames.value[step])?;
        let cell = frame.unit_cell;

        let reference = frame.coords[self.atom_indices[0] as usize];
        let mut acc = [0.0f64; 3];
        let mut weight_sum = 0.0;
        for (&atom, &weight) in self.atom_indices.iter().zip(&self.atom_weights) {
            let r = frame.coords[atom as usize];
            let dr = cell.minimum_image([
                r[0] - reference[0],
                r[1] - reference[1],
                r[2] - reference[2],
            ]);
            acc[0] += weight * (reference[0] + dr[0]);
            acc[1] += weight * (reference[1] + dr[1]);
            acc[2] += weight * (reference[2] + dr[2]);
            weight_sum += weight;
        }
        if weight_sum == 0.0 {
            return Err(nscat_core::NscatError::InputData(
                "selection weights sum to zero".to_string(),
            ));
        }
        Ok(StepPayload::Points(vec![[
            acc[0] / weight_sum,
            acc[1] / weight_sum,
            acc[2] / weight_sum,
        ]]))
    }

    fn combine(
        &mut self,
        step: usize,
        payload: StepPayload,
        output: &mut OutputData,
    ) -> NscatResult<()> {
        let points = payload.into_points()?;
        let com = output.data_mut("com")?;
        for d in 0..3 {
            com[[step, d]] = points[0][d];
        }
        Ok(())
    }

    fn finalize(&mut self, _config: &Configuration, _output: &mut OutputData) -> NscatResult<()> {
        Ok(())
    }
}
