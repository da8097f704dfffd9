use nscat_core::UnitCell;

/// One time-point of a trajectory, fully materialised.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub time: f64,
    pub unit_cell: UnitCell,
    pub coords: Vec<[f64; 3]>,
    pub velocities: Option<Vec<[f64; 3]>>,
}

impl FrameView {
    pub fn new(time: f64, unit_cell: UnitCell, coords: Vec<[f64; 3]>) -> Self {
        Self {
            time,
            unit_cell,
            coords,
            velocities: None,
        }
    }

    pub fn with_velocities(mut self, velocities: Vec<[f64; 3]>) -> Self {
        self.velocities = Some(velocities);
        self
    }

    pub fn n_atoms(&self) -> usize {
        self.coords.len()
    }
}
