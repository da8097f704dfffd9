#![allow(dead_code)]

use nscat_core::{ChemicalSystem, ChemicalSystemBuilder, UnitCell};
use nscat_traj::{FrameView, Trajectory};

/// Flat system of `n` hydrogens.
pub fn hydrogens(n: usize) -> ChemicalSystem {
    let mut b = ChemicalSystemBuilder::new("hydrogens");
    for i in 0..n {
        b.add_atom("H", &format!("H{i}"));
    }
    b.build()
}

/// H-O-O-H, one molecule with bonds.
pub fn peroxide() -> ChemicalSystem {
    let mut b = ChemicalSystemBuilder::new("peroxide");
    b.begin_molecule("HOOH");
    let h1 = b.add_atom("H", "H1");
    let o1 = b.add_atom("O", "O1");
    let o2 = b.add_atom("O", "O2");
    let h2 = b.add_atom("H", "H2");
    b.add_bond(h1, o1);
    b.add_bond(o1, o2);
    b.add_bond(o2, h2);
    b.build()
}

/// Two water molecules, O first in each.
pub fn water_dimer() -> ChemicalSystem {
    let mut b = ChemicalSystemBuilder::new("waters");
    for i in 0..2 {
        b.begin_molecule("WAT");
        let o = b.add_atom("O", &format!("O{i}"));
        let h1 = b.add_atom("H", &format!("H{i}a"));
        let h2 = b.add_atom("H", &format!("H{i}b"));
        b.add_bond(o, h1);
        b.add_bond(o, h2);
    }
    b.build()
}

pub fn static_trajectory(
    system: ChemicalSystem,
    n_frames: usize,
    md_time_step: f64,
    cell_edge: f64,
) -> Trajectory {
    let n = system.n_atoms();
    let coords: Vec<[f64; 3]> = (0..n).map(|i| [i as f64, 0.0, 0.0]).collect();
    let frames = (0..n_frames)
        .map(|i| {
            FrameView::new(
                i as f64 * md_time_step,
                UnitCell::cubic(cell_edge),
                coords.clone(),
            )
        })
        .collect();
    Trajectory::from_memory(system, md_time_step, frames).unwrap()
}
