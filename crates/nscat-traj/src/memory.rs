//! In-memory trajectories built from a parametric specification. They obey
//! the same read contract as on-disk trajectories and back most of the
//! test suites.

use std::sync::Arc;

use nscat_core::{ChemicalSystem, NscatResult, UnitCell};

use crate::frame::FrameView;
use crate::trajectory::Trajectory;

pub struct MemoryTrajectoryBuilder {
    system: Arc<ChemicalSystem>,
    md_time_step: f64,
    frames: Vec<FrameView>,
}

impl MemoryTrajectoryBuilder {
    pub fn new(system: ChemicalSystem, md_time_step: f64) -> Self {
        Self {
            system: Arc::new(system),
            md_time_step,
            frames: Vec::new(),
        }
    }

    pub fn push_frame(mut self, frame: FrameView) -> Self {
        self.frames.push(frame);
        self
    }

    /// Append `n_frames` frames produced by `generate(frame_index)`.
    /// Frame times default to `index * md_time_step` when the generator
    /// leaves them at 0.
    pub fn generate<F>(mut self, n_frames: usize, mut generate: F) -> Self
    where
        F: FnMut(usize) -> FrameView,
    {
        for i in 0..n_frames {
            let mut frame = generate(i);
            if frame.time == 0.0 && i > 0 {
                frame.time = i as f64 * self.md_time_step;
            }
            self.frames.push(frame);
        }
        self
    }

    pub fn build(self) -> NscatResult<Trajectory> {
        Trajectory::from_parts(self.system, self.md_time_step, self.frames)
    }
}

impl Trajectory {
    /// Shorthand for a fully explicit in-memory trajectory.
    pub fn from_memory(
        system: ChemicalSystem,
        md_time_step: f64,
        frames: Vec<FrameView>,
    ) -> NscatResult<Self> {
        Trajectory::from_parts(Arc::new(system), md_time_step, frames)
    }

    /// Static trajectory: the same coordinates and cell replicated over
    /// `n_frames` frames. Handy for density-style reference cases.
    pub fn from_static_frames(
        system: ChemicalSystem,
        md_time_step: f64,
        n_frames: usize,
        cell: UnitCell,
        coords: Vec<[f64; 3]>,
    ) -> NscatResult<Self> {
        let frames = (0..n_frames)
            .map(|i| FrameView::new(i as f64 * md_time_step, cell, coords.clone()))
            .collect();
        Trajectory::from_memory(system, md_time_step, frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nscat_core::ChemicalSystemBuilder;

    fn four_hydrogens() -> ChemicalSystem {
        let mut b = ChemicalSystemBuilder::new("h4");
        for i in 0..4 {
            b.add_atom("H", &format!("H{i}"));
        }
        b.build()
    }

    #[test]
    fn generated_frames_get_default_times() {
        let traj = MemoryTrajectoryBuilder::new(four_hydrogens(), 0.5)
            .generate(4, |i| {
                FrameView::new(
                    0.0,
                    UnitCell::cubic(10.0),
                    vec![[i as f64, 0.0, 0.0]; 4],
                )
            })
            .build()
            .unwrap();
        assert_eq!(traj.len(), 4);
        let mut reader = traj.reader().unwrap();
        assert!((reader.frame(3).unwrap().time - 1.5).abs() < 1e-12);
        assert!((reader.frame(0).unwrap().time).abs() < 1e-12);
    }

    #[test]
    fn atom_count_mismatch_is_rejected() {
        let result = Trajectory::from_memory(
            four_hydrogens(),
            1.0,
            vec![FrameView::new(0.0, UnitCell::identity(), vec![[0.0; 3]; 3])],
        );
        assert!(result.is_err());
    }

    #[test]
    fn reader_reports_out_of_range_frame() {
        let traj = Trajectory::from_static_frames(
            four_hydrogens(),
            1.0,
            2,
            UnitCell::cubic(10.0),
            vec![[0.0; 3]; 4],
        )
        .unwrap();
        let mut reader = traj.reader().unwrap();
        let err = reader.frame(5).unwrap_err();
        assert!(err.to_string().contains("frame index 5"));
    }

    #[test]
    fn particle_trajectory_is_weighted_centroid() {
        let traj = Trajectory::from_static_frames(
            four_hydrogens(),
            1.0,
            3,
            UnitCell::cubic(10.0),
            vec![
                [0.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
                [4.0, 0.0, 0.0],
                [6.0, 0.0, 0.0],
            ],
        )
        .unwrap();
        let mut reader = traj.reader().unwrap();
        let series = reader
            .read_particle_trajectory(&[0, 1], 0, 3, 2, "coordinates", None)
            .unwrap();
        assert_eq!(series.len(), 2);
        assert!((series[0][0] - 1.0).abs() < 1e-12);

        let weighted = reader
            .read_particle_trajectory(&[0, 1], 0, 1, 1, "coordinates", Some(&[3.0, 1.0]))
            .unwrap();
        assert!((weighted[0][0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn variable_iterator_reads_frames_lazily() {
        let traj = MemoryTrajectoryBuilder::new(four_hydrogens(), 1.0)
            .generate(3, |i| {
                FrameView::new(0.0, UnitCell::cubic(10.0), vec![[i as f64, 0.0, 0.0]; 4])
            })
            .build()
            .unwrap();
        let mut reader = traj.reader().unwrap();
        let frames: Vec<_> = reader
            .variable("coordinates")
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2][0][0], 2.0);
        assert!(reader.variable("velocities").is_err());
        assert!(reader.variable("charges").is_err());
    }

    #[test]
    fn velocities_requested_from_position_only_trajectory_fail() {
        let traj = Trajectory::from_static_frames(
            four_hydrogens(),
            1.0,
            1,
            UnitCell::cubic(10.0),
            vec![[0.0; 3]; 4],
        )
        .unwrap();
        let mut reader = traj.reader().unwrap();
        assert!(reader
            .read_particle_trajectory(&[0], 0, 1, 1, "velocities", None)
            .is_err());
    }
}
