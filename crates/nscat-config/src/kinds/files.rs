//! Filesystem-facing input configurators.

use std::fs;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::configurable::Configuration;
use crate::context::SetupContext;
use crate::value;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct InputFileOptions {
    pub default: String,
}

#[derive(Debug, Clone)]
pub struct InputFileConfigurator {
    pub options: InputFileOptions,
    pub value: PathBuf,
    pub filename: String,
}

impl InputFileConfigurator {
    pub fn new(options: InputFileOptions) -> Self {
        Self {
            options,
            value: PathBuf::new(),
            filename: String::new(),
        }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let path = match raw {
            Some(raw) => PathBuf::from(value::as_str(raw)?),
            None => PathBuf::from(&self.options.default),
        };
        if !path.is_file() {
            return Err(format!("input file {} does not exist", path.display()));
        }
        self.filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        self.value = path;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!("file: {}", self.value.display())
    }
}

fn default_dot() -> String {
    ".".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputDirectoryOptions {
    pub default: String,
}

impl Default for InputDirectoryOptions {
    fn default() -> Self {
        Self {
            default: default_dot(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputDirectoryConfigurator {
    pub options: InputDirectoryOptions,
    pub value: PathBuf,
}

impl InputDirectoryConfigurator {
    pub fn new(options: InputDirectoryOptions) -> Self {
        Self {
            options,
            value: PathBuf::new(),
        }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let path = match raw {
            Some(raw) => PathBuf::from(value::as_str(raw)?),
            None => PathBuf::from(&self.options.default),
        };
        fs::create_dir_all(&path)
            .map_err(|e| format!("cannot create directory {}: {e}", path.display()))?;
        // Writability probe; metadata alone misses mount-level readonly.
        let probe = path.join(format!(".nscat_probe_{}", std::process::id()));
        fs::write(&probe, b"probe")
            .map_err(|e| format!("directory {} is not writable: {e}", path.display()))?;
        let _ = fs::remove_file(&probe);
        self.value = path;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!("directory: {}", self.value.display())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ResultsFileOptions {
    pub default: String,
    /// Dataset names that must be present under "variables".
    pub datasets: Vec<String>,
}

/// Hierarchical results file (the "json" output of a previous run) with a
/// required set of datasets; each dataset is exposed with its units.
#[derive(Debug, Clone)]
pub struct ResultsFileConfigurator {
    pub options: ResultsFileOptions,
    pub value: PathBuf,
    pub datasets: IndexMap<String, (Value, String)>,
}

impl ResultsFileConfigurator {
    pub fn new(options: ResultsFileOptions) -> Self {
        Self {
            options,
            value: PathBuf::new(),
            datasets: IndexMap::new(),
        }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let path = match raw {
            Some(raw) => PathBuf::from(value::as_str(raw)?),
            None => PathBuf::from(&self.options.default),
        };
        let text = fs::read_to_string(&path)
            .map_err(|e| format!("cannot open results file {}: {e}", path.display()))?;
        let doc: Value = serde_json::from_str(&text)
            .map_err(|e| format!("{} is not a results file: {e}", path.display()))?;
        let variables = doc
            .get("variables")
            .and_then(|v| v.as_object())
            .ok_or_else(|| format!("{} has no variables section", path.display()))?;

        let mut datasets = IndexMap::new();
        for name in &self.options.datasets {
            let var = variables
                .get(name)
                .ok_or_else(|| format!("dataset '{name}' missing from {}", path.display()))?;
            let data = var
                .get("data")
                .cloned()
                .ok_or_else(|| format!("dataset '{name}' carries no data"))?;
            let units = var
                .get("units")
                .and_then(|u| u.as_str())
                .unwrap_or("au")
                .to_string();
            datasets.insert(name.clone(), (data, units));
        }
        self.value = path;
        self.datasets = datasets;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!(
            "results file {} ({} datasets)",
            self.value.display(),
            self.datasets.len()
        )
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptFileOptions {
    pub default: String,
    /// Top-level names the script must define.
    pub required_names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ScriptFileConfigurator {
    pub options: ScriptFileOptions,
    pub value: PathBuf,
    pub names: Vec<String>,
}

impl ScriptFileConfigurator {
    pub fn new(options: ScriptFileOptions) -> Self {
        Self {
            options,
            value: PathBuf::new(),
            names: Vec::new(),
        }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let path = match raw {
            Some(raw) => PathBuf::from(value::as_str(raw)?),
            None => PathBuf::from(&self.options.default),
        };
        let text = fs::read_to_string(&path)
            .map_err(|e| format!("cannot open script {}: {e}", path.display()))?;
        for name in &self.options.required_names {
            if !defines_name(&text, name) {
                return Err(format!(
                    "script {} does not define '{name}'",
                    path.display()
                ));
            }
        }
        self.value = path;
        self.names = self.options.required_names.clone();
        Ok(())
    }

    pub fn information(&self) -> String {
        format!("script: {}", self.value.display())
    }
}

// A name is "defined" when it occurs as a standalone identifier; enough to
// reject scripts that obviously lack a required hook.
fn defines_name(text: &str, name: &str) -> bool {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    let mut start = 0;
    while let Some(pos) = text[start..].find(name) {
        let at = start + pos;
        let before_ok = at == 0 || !text[..at].chars().next_back().map(is_ident).unwrap_or(false);
        let after = at + name.len();
        let after_ok = after >= text.len()
            || !text[after..].chars().next().map(is_ident).unwrap_or(false);
        if before_ok && after_ok {
            return true;
        }
        start = at + name.len();
    }
    false
}
