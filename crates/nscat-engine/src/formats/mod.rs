//! Output format writers, registered by name.
//!
//! The core knows only the `OutputFormat` interface; `format_writer` is an
//! explicit name-to-writer factory so tests can exercise the registry as
//! data.

use std::path::{Path, PathBuf};

use nscat_core::NscatResult;

use crate::output::{OutputData, OutputInfo};

mod json;
mod text;

pub use json::JsonFormat;
pub use text::TextFormat;

pub trait OutputFormat {
    fn extension(&self) -> &'static str;
    /// Write the full variable map plus metadata, returning the file
    /// produced.
    fn write(&self, root: &Path, outputs: &OutputData, info: &OutputInfo)
        -> NscatResult<PathBuf>;
}

pub fn format_writer(name: &str) -> Option<Box<dyn OutputFormat>> {
    match name {
        "text" => Some(Box::new(TextFormat)),
        "json" => Some(Box::new(JsonFormat)),
        _ => None,
    }
}

/// Registered formats as (name, extension), in registration order.
pub fn format_names() -> Vec<(String, String)> {
    ["text", "json"]
        .iter()
        .map(|name| {
            let writer = format_writer(name).expect("builtin format");
            (name.to_string(), writer.extension().to_string())
        })
        .collect()
}
