//! Persistent store of reusable parameter bundles, keyed by trajectory
//! basename, section and name.
//!
//! Backed by one JSON blob; the only contract on the file is that the
//! nested mapping round-trips. Load failures leave the store empty so a
//! corrupt file never takes the process down at startup.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use nscat_core::{NscatError, NscatResult};

type Section = IndexMap<String, Value>;
type Target = IndexMap<String, Section>;

#[derive(Debug, Default, Clone)]
pub struct UserDefinitionStore {
    path: Option<PathBuf>,
    root: IndexMap<String, Target>,
}

impl UserDefinitionStore {
    /// Store with no backing file; `save` is a no-op for it.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Store backed by `path`, initially empty; call `load` to read it.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            root: IndexMap::new(),
        }
    }

    /// Store at the application-home path, loaded immediately.
    pub fn open_default() -> Self {
        let mut store = Self::with_path(Self::default_path());
        store.load();
        store
    }

    pub fn default_path() -> PathBuf {
        let home = std::env::var_os("NSCAT_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| Path::new(&h).join(".nscat")))
            .unwrap_or_else(|| PathBuf::from(".nscat"));
        home.join("user_definitions.json")
    }

    /// Replace the content with whatever the backing file holds. Any
    /// failure leaves the store empty.
    pub fn load(&mut self) {
        self.root.clear();
        let Some(path) = &self.path else {
            return;
        };
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return,
        };
        match serde_json::from_str(&text) {
            Ok(root) => self.root = root,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable user definitions");
            }
        }
    }

    pub fn save(&self) -> NscatResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&self.root)
            .map_err(|e| NscatError::Parse(format!("user definitions encode: {e}")))?;
        fs::write(path, text)?;
        Ok(())
    }

    pub fn has_definition(&self, target: &str, section: &str, name: &str) -> bool {
        self.root
            .get(target)
            .and_then(|t| t.get(section))
            .map(|s| s.contains_key(name))
            .unwrap_or(false)
    }

    pub fn get_definition(&self, target: &str, section: &str, name: &str) -> NscatResult<&Value> {
        self.root
            .get(target)
            .and_then(|t| t.get(section))
            .and_then(|s| s.get(name))
            .ok_or_else(|| {
                NscatError::InputData(format!(
                    "no user definition {target}/{section}/{name}"
                ))
            })
    }

    /// Stores a payload; an existing definition must be removed first.
    pub fn set_definition(
        &mut self,
        target: &str,
        section: &str,
        name: &str,
        payload: Value,
    ) -> NscatResult<()> {
        if self.has_definition(target, section, name) {
            return Err(NscatError::InputData(format!(
                "user definition {target}/{section}/{name} already exists"
            )));
        }
        self.root
            .entry(target.to_string())
            .or_default()
            .entry(section.to_string())
            .or_default()
            .insert(name.to_string(), payload);
        Ok(())
    }

    pub fn remove_target(&mut self, target: &str) -> NscatResult<()> {
        self.root.shift_remove(target).map(|_| ()).ok_or_else(|| {
            NscatError::InputData(format!("no user definitions for target {target}"))
        })
    }

    pub fn remove_section(&mut self, target: &str, section: &str) -> NscatResult<()> {
        self.root
            .get_mut(target)
            .and_then(|t| t.shift_remove(section))
            .map(|_| ())
            .ok_or_else(|| {
                NscatError::InputData(format!("no user definitions in {target}/{section}"))
            })
    }

    pub fn remove_definition(&mut self, target: &str, section: &str, name: &str) -> NscatResult<()> {
        self.root
            .get_mut(target)
            .and_then(|t| t.get_mut(section))
            .and_then(|s| s.shift_remove(name))
            .map(|_| ())
            .ok_or_else(|| {
                NscatError::InputData(format!("no user definition {target}/{section}/{name}"))
            })
    }

    /// Definition names stored under one target/section pair.
    pub fn filter(&self, target: &str, section: &str) -> Vec<String> {
        self.root
            .get(target)
            .and_then(|t| t.get(section))
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_and_overwrite_protection() {
        let mut store = UserDefinitionStore::in_memory();
        store
            .set_definition("traj", "q_vectors", "mine", json!({"generator": "spherical_shells"}))
            .unwrap();
        assert!(store.has_definition("traj", "q_vectors", "mine"));
        assert!(store
            .set_definition("traj", "q_vectors", "mine", json!(1))
            .is_err());
        store.remove_definition("traj", "q_vectors", "mine").unwrap();
        assert!(store
            .set_definition("traj", "q_vectors", "mine", json!(2))
            .is_ok());
    }

    #[test]
    fn filter_lists_names_in_insertion_order() {
        let mut store = UserDefinitionStore::in_memory();
        store.set_definition("t", "sel", "b", json!(1)).unwrap();
        store.set_definition("t", "sel", "a", json!(2)).unwrap();
        store.set_definition("t", "other", "c", json!(3)).unwrap();
        assert_eq!(store.filter("t", "sel"), vec!["b", "a"]);
        assert!(store.filter("nope", "sel").is_empty());
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("defs.json");
        let mut store = UserDefinitionStore::with_path(&path);
        store
            .set_definition("water", "q_vectors", "fine", json!({"a": [1, 2, 3]}))
            .unwrap();
        store.set_definition("water", "selections", "ox", json!("O")).unwrap();
        store.save().unwrap();

        let mut reloaded = UserDefinitionStore::with_path(&path);
        reloaded.load();
        assert_eq!(
            reloaded.get_definition("water", "q_vectors", "fine").unwrap(),
            &json!({"a": [1, 2, 3]})
        );
        assert_eq!(reloaded.filter("water", "selections"), vec!["ox"]);
    }

    #[test]
    fn load_failure_leaves_store_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        let mut store = UserDefinitionStore::with_path(&path);
        store.set_definition("x", "y", "z", json!(1)).unwrap();
        store.load();
        assert!(!store.has_definition("x", "y", "z"));
        assert!(store.filter("x", "y").is_empty());
    }

    #[test]
    fn remove_operations_report_missing_keys() {
        let mut store = UserDefinitionStore::in_memory();
        assert!(store.remove_target("t").is_err());
        assert!(store.remove_section("t", "s").is_err());
        assert!(store.remove_definition("t", "s", "n").is_err());
    }
}
