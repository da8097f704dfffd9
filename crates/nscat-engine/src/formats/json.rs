//! Hierarchical dump: one JSON document holding the info block and every
//! variable with its shape, flat data, axis and units.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde_json::json;

use nscat_core::{NscatError, NscatResult};

use crate::output::{OutputData, OutputInfo};

pub struct JsonFormat;

impl super::OutputFormat for JsonFormat {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn write(
        &self,
        root: &Path,
        outputs: &OutputData,
        info: &OutputInfo,
    ) -> NscatResult<PathBuf> {
        let path = root.with_extension(self.extension());
        let mut variables = serde_json::Map::new();
        for (name, variable) in outputs.variables() {
            let flat: Vec<f64> = variable.data.iter().copied().collect();
            variables.insert(
                name.to_string(),
                json!({
                    "kind": variable.kind.name(),
                    "axis": variable.axis,
                    "units": variable.units,
                    "main_result": variable.main_result,
                    "shape": variable.data.shape(),
                    "data": flat,
                }),
            );
        }
        let doc = json!({
            "info": {
                "job": info.job,
                "label": info.label,
                "parameters": info.parameters,
                "timestamp": info.timestamp,
            },
            "variables": variables,
        });
        let file = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(file, &doc)
            .map_err(|e| NscatError::Parse(format!("json output: {e}")))?;
        Ok(path)
    }
}
