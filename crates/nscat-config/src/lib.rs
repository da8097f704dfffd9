#![forbid(unsafe_code)]

pub mod configurable;
pub mod configurator;
pub mod context;
pub mod kinds;
pub mod ud_store;
pub mod value;

pub use configurable::{Configuration, Settings};
pub use configurator::{Configurator, ConfiguratorKind, Status};
pub use context::SetupContext;
pub use ud_store::UserDefinitionStore;
