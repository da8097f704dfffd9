//! Shared read-only context handed to every `configure` call.

use fxhash::FxHashMap;

use nscat_core::{AtomsDatabase, ELEMENTS};
use nscat_traj::Trajectory;

use crate::ud_store::UserDefinitionStore;

/// Output formats the engine registers by default, as (name, extension).
pub const DEFAULT_FORMATS: &[(&str, &str)] = &[("text", "dat"), ("json", "json")];

pub struct SetupContext<'a> {
    pub elements: &'a AtomsDatabase,
    pub definitions: Option<&'a UserDefinitionStore>,
    /// Registered output formats as (name, extension).
    pub formats: Vec<(String, String)>,
    /// In-memory trajectories addressable as `mem:<key>`, used to keep
    /// tests and parametric runs off the filesystem.
    pub preloaded: FxHashMap<String, Trajectory>,
}

impl SetupContext<'static> {
    pub fn new() -> Self {
        Self {
            elements: &ELEMENTS,
            definitions: None,
            formats: DEFAULT_FORMATS
                .iter()
                .map(|(n, e)| (n.to_string(), e.to_string()))
                .collect(),
            preloaded: FxHashMap::default(),
        }
    }
}

impl Default for SetupContext<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SetupContext<'a> {
    pub fn with_definitions(mut self, store: &'a UserDefinitionStore) -> SetupContext<'a> {
        self.definitions = Some(store);
        self
    }

    pub fn with_formats(mut self, formats: Vec<(String, String)>) -> Self {
        self.formats = formats;
        self
    }

    pub fn preload(mut self, key: &str, trajectory: Trajectory) -> Self {
        self.preloaded.insert(key.to_string(), trajectory);
        self
    }

    pub fn format_extension(&self, name: &str) -> Option<&str> {
        self.formats
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, e)| e.as_str())
    }

    pub fn has_format(&self, name: &str) -> bool {
        self.formats.iter().any(|(n, _)| n == name)
    }
}
