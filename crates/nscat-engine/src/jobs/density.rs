//! Per-frame atomic and mass density.

use serde_json::Value;

use nscat_config::{Configuration, ConfiguratorKind, Settings};
use nscat_core::constants::{ANG3_TO_CM3, AVOGADRO};
use nscat_core::{NscatError, NscatResult};
use nscat_traj::FrameReader;

use crate::job::{Job, StepPayload};
use crate::output::OutputData;

/// One step per selected frame; each step yields the frame's atomic
/// number density (1/cm3) and mass density (g/cm3).
#[derive(Debug, Default)]
pub struct Density;

impl Density {
    pub fn new() -> Self {
        Self
    }
}

impl Job for Density {
    fn name(&self) -> &'static str {
        "density"
    }

    fn label(&self) -> &'static str {
        "Density"
    }

    fn category(&self) -> &'static str {
        "thermodynamics"
    }

    fn settings(&self) -> Settings {
        Settings::new()
            .with("trajectory", ConfiguratorKind::Trajectory, Value::Null)
            .with("frames", ConfiguratorKind::Frames, Value::Null)
            .with("output_files", ConfiguratorKind::OutputFiles, Value::Null)
            .with("running_mode", ConfiguratorKind::RunningMode, Value::Null)
    }

    fn initialize(
        &mut self,
        config: &Configuration,
        output: &mut OutputData,
    ) -> NscatResult<usize> {
        let frames = config.frames("frames")?;
        let n = frames.n_frames;
        output.add_line("time", frames.time.clone(), "index", "ps")?;
        output.add_zeros_line("atomic_density", n, "time", "1/cm3")?;
        output.add_zeros_line("mass_density", n, "time", "g/cm3")?;
        output.add_zeros_line("avg_atomic_density", n, "time", "1/cm3")?;
        output.add_zeros_line("avg_mass_density", n, "time", "g/cm3")?;
        output.set_main_result("atomic_density")?;
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
        if frame.unit_cell.is_identity() {
            return Err(NscatError::InputData(format!(
                "frame {} has no unit cell, density is undefined",
                frames.value[step]
            )));
        }
        let volume_cm3 = frame.unit_cell.volume() * ANG3_TO_CM3;
        let system = reader.chemical_system();
        let n_atoms = system.n_atoms() as f64;
        let total_mass: f64 = system.masses().iter().sum();
        Ok(StepPayload::Series(vec![
            n_atoms / volume_cm3,
            total_mass / AVOGADRO / volume_cm3,
        ]))
    }

    fn combine(
        &mut self,
        step: usize,
        payload: StepPayload,
        output: &mut OutputData,
    ) -> NscatResult<()> {
        let series = payload.into_series()?;
        output.data_mut("atomic_density")?[[step]] = series[0];
        output.data_mut("mass_density")?[[step]] = series[1];
        Ok(())
    }

    fn finalize(&mut self, _config: &Configuration, output: &mut OutputData) -> NscatResult<()> {
        for (source, target) in [
            ("atomic_density", "avg_atomic_density"),
            ("mass_density", "avg_mass_density"),
        ] {
            let values = output.data_mut(source)?.clone();
            let averages = output.data_mut(target)?;
            let mut cumulative = 0.0;
            for (i, x) in values.iter().enumerate() {
                cumulative += x;
                averages[[i]] = cumulative / (i + 1) as f64;
            }
        }
        Ok(())
    }
}
