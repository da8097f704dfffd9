//! Explicit job registry: plain data, no side-effecting registration.

use crate::job::Job;
use crate::jobs::{
    CenterOfMass, CroppedTrajectory, Density, MeanSquareDisplacement, UnfoldedTrajectory,
};

pub struct JobEntry {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub build: fn() -> Box<dyn Job>,
}

pub fn job_registry() -> &'static [JobEntry] {
    &[
        JobEntry {
            name: "density",
            label: "Density",
            category: "thermodynamics",
            build: || Box::new(Density::new()),
        },
        JobEntry {
            name: "com",
            label: "Center Of Mass",
            category: "structure",
            build: || Box::new(CenterOfMass::new()),
        },
        JobEntry {
            name: "msd",
            label: "Mean Square Displacement",
            category: "dynamics",
            build: || Box::new(MeanSquareDisplacement::new()),
        },
        JobEntry {
            name: "cropped_trajectory",
            label: "Cropped Trajectory",
            category: "trajectory",
            build: || Box::new(CroppedTrajectory::new()),
        },
        JobEntry {
            name: "unfolded_trajectory",
            label: "Unfolded Trajectory",
            category: "trajectory",
            build: || Box::new(UnfoldedTrajectory::new()),
        },
    ]
}

pub fn build_job(name: &str) -> Option<Box<dyn Job>> {
    job_registry()
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| (entry.build)())
}
