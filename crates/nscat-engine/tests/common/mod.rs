#![allow(dead_code)]

use nscat_config::SetupContext;
use nscat_core::{ChemicalSystem, ChemicalSystemBuilder, UnitCell};
use nscat_engine::setup_context;
use nscat_traj::{FrameView, Trajectory};

pub fn hydrogens(n: usize) -> ChemicalSystem {
    let mut b = ChemicalSystemBuilder::new("hydrogens");
    for i in 0..n {
        b.add_atom("H", &format!("H{i}"));
    }
    b.build()
}

/// Four hydrogens in a 10 ang cubic box, static over `n_frames` frames,
/// positions from the centre-of-mass reference scenario.
pub fn four_h_box(n_frames: usize) -> Trajectory {
    let coords = vec![
        [0.0, 0.0, 0.0],
        [8.0, 8.0, 8.0],
        [4.0, 4.0, 4.0],
        [2.0, 2.0, 2.0],
    ];
    Trajectory::from_static_frames(hydrogens(4), 1.0, n_frames, UnitCell::cubic(10.0), coords)
        .unwrap()
}

/// Drifting trajectory: every atom moves with constant velocity along x.
pub fn drifting(n_atoms: usize, n_frames: usize, velocity: f64) -> Trajectory {
    let system = hydrogens(n_atoms);
    let frames: Vec<FrameView> = (0..n_frames)
        .map(|f| {
            let coords = (0..n_atoms)
                .map(|a| [a as f64 + velocity * f as f64, 0.0, 0.0])
                .collect();
            FrameView::new(f as f64, UnitCell::cubic(1000.0), coords)
        })
        .collect();
    Trajectory::from_memory(system, 1.0, frames).unwrap()
}

pub fn ctx_with(key: &str, trajectory: Trajectory) -> SetupContext<'static> {
    setup_context().preload(key, trajectory)
}
