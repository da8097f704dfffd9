//! Output destination configurators.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use nscat_traj::{Compression, Dtype};

use crate::configurable::Configuration;
use crate::context::SetupContext;
use crate::value;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct OutputFilesOptions {
    pub default: Option<Value>,
}

/// `(root, [format names], write_logs)`: where and how the job's output
/// data is written. Formats are validated against the registered set.
#[derive(Debug, Clone)]
pub struct OutputFilesConfigurator {
    pub options: OutputFilesOptions,
    pub root: PathBuf,
    pub formats: Vec<String>,
    pub files: Vec<PathBuf>,
    pub write_logs: bool,
}

impl OutputFilesConfigurator {
    pub fn new(options: OutputFilesOptions) -> Self {
        Self {
            options,
            root: PathBuf::new(),
            formats: Vec::new(),
            files: Vec::new(),
            write_logs: false,
        }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        ctx: &SetupContext,
    ) -> Result<(), String> {
        let spec = match (raw, &self.options.default) {
            (Some(raw), _) => raw.clone(),
            (None, Some(d)) => d.clone(),
            // Unspecified output stays out of the working directory.
            (None, None) => {
                let fallback = std::env::temp_dir().join("nscat_output");
                serde_json::json!([fallback.to_string_lossy(), ["text"], false])
            }
        };

        let (root, formats, write_logs) = match &spec {
            Value::Array(items) => {
                let root = items
                    .first()
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| "output spec must start with a root path".to_string())?;
                let formats = match items.get(1) {
                    Some(v) => string_vec(v)?,
                    None => vec!["text".to_string()],
                };
                let write_logs = match items.get(2) {
                    Some(v) => value::as_bool(v)?,
                    None => false,
                };
                (root.to_string(), formats, write_logs)
            }
            Value::Object(map) => {
                let root = map
                    .get("root")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| "output spec needs a 'root' field".to_string())?;
                let formats = match map.get("formats") {
                    Some(v) => string_vec(v)?,
                    None => vec!["text".to_string()],
                };
                let write_logs = match map.get("write_logs") {
                    Some(v) => value::as_bool(v)?,
                    None => false,
                };
                (root.to_string(), formats, write_logs)
            }
            other => return Err(format!("bad output spec {other}")),
        };

        if formats.is_empty() {
            return Err("at least one output format is required".to_string());
        }
        for format in &formats {
            if !ctx.has_format(format) {
                return Err(format!("format '{format}' is not registered"));
            }
        }

        let root = PathBuf::from(root);
        if let Some(parent) = root.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("cannot create {}: {e}", parent.display()))?;
            }
        }

        self.files = formats
            .iter()
            .map(|f| {
                let ext = ctx.format_extension(f).unwrap_or(f);
                root.with_extension(ext)
            })
            .collect();
        self.root = root;
        self.formats = formats;
        self.write_logs = write_logs;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!(
            "root {} via {:?}",
            self.root.display(),
            self.formats
        )
    }
}

fn string_vec(v: &Value) -> Result<Vec<String>, String> {
    value::as_array(v)?
        .iter()
        .map(|item| value::as_str(item).map(str::to_string))
        .collect()
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct OutputTrajectoryOptions {
    pub default: Option<Value>,
}

/// `(filename, dtype bits, compression)` for trajectory-producing jobs.
#[derive(Debug, Clone)]
pub struct OutputTrajectoryConfigurator {
    pub options: OutputTrajectoryOptions,
    pub file: PathBuf,
    pub dtype: Dtype,
    pub compression: Compression,
}

impl OutputTrajectoryConfigurator {
    pub fn new(options: OutputTrajectoryOptions) -> Self {
        Self {
            options,
            file: PathBuf::new(),
            dtype: Dtype::F64,
            compression: Compression::None,
        }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let spec = match (raw, &self.options.default) {
            (Some(raw), _) => raw.clone(),
            (None, Some(d)) => d.clone(),
            (None, None) => {
                let fallback = std::env::temp_dir().join("nscat_output.ntj");
                serde_json::json!([fallback.to_string_lossy(), 64, "none"])
            }
        };

        let (file, bits, compression) = match &spec {
            Value::String(file) => (file.to_string(), 64, "none".to_string()),
            Value::Array(items) => {
                let file = items
                    .first()
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| "output trajectory spec must start with a filename".to_string())?;
                let bits = match items.get(1) {
                    Some(v) => value::as_i64(v)?,
                    None => 64,
                };
                let compression = match items.get(2) {
                    Some(v) => value::as_str(v)?.to_string(),
                    None => "none".to_string(),
                };
                (file.to_string(), bits, compression)
            }
            Value::Object(map) => {
                let file = map
                    .get("filename")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| "output trajectory spec needs a 'filename'".to_string())?;
                let bits = match map.get("dtype") {
                    Some(v) => value::as_i64(v)?,
                    None => 64,
                };
                let compression = match map.get("compression") {
                    Some(v) => value::as_str(v)?.to_string(),
                    None => "none".to_string(),
                };
                (file.to_string(), bits, compression)
            }
            other => return Err(format!("bad output trajectory spec {other}")),
        };

        let dtype = Dtype::from_bits(bits as u32)
            .ok_or_else(|| format!("unsupported dtype width {bits} (use 32 or 64)"))?;
        let compression = Compression::from_name(&compression).ok_or_else(|| {
            format!(
                "unknown compression '{compression}' (choices: {})",
                Compression::names().join(", ")
            )
        })?;

        let file = PathBuf::from(file);
        if let Some(parent) = file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("cannot create {}: {e}", parent.display()))?;
            }
        }
        self.file = file;
        self.dtype = dtype;
        self.compression = compression;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!(
            "trajectory {} ({} bit, {})",
            self.file.display(),
            self.dtype.bits(),
            self.compression.name()
        )
    }
}
