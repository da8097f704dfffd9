#![forbid(unsafe_code)]

pub mod cell;
pub mod constants;
pub mod elements;
pub mod error;
pub mod selection;
pub mod system;

pub use cell::UnitCell;
pub use elements::{AtomsDatabase, ElementRecord, ELEMENTS};
pub use error::{NscatError, NscatResult};
pub use selection::{check_valid_json_settings, Selector};
pub use system::{AtomView, ChemicalSystem, ChemicalSystemBuilder, EntityLevel};
