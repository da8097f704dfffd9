//! Named accumulator of output variables with axes and units.
//!
//! Each variable is an n-dimensional array tagged with a plot kind, an
//! axis string ("time", or "time|q" for multi-axis data; "index" denotes
//! an implicit integer axis) and non-empty units. Leading data dimensions
//! must match the referenced axis variables.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use ndarray::{ArrayD, IxDyn};
use serde_json::Value;
use tracing::info;

use nscat_core::{NscatError, NscatResult};

use crate::formats::format_writer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    Line,
    Surface,
    Volume,
}

impl PlotKind {
    pub fn name(&self) -> &'static str {
        match self {
            PlotKind::Line => "line",
            PlotKind::Surface => "surface",
            PlotKind::Volume => "volume",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputVariable {
    pub kind: PlotKind,
    pub data: ArrayD<f64>,
    pub axis: String,
    pub units: String,
    pub main_result: bool,
}

/// Metadata block written next to the variables by every format.
#[derive(Debug, Clone)]
pub struct OutputInfo {
    pub job: String,
    pub label: String,
    pub parameters: Value,
    pub timestamp: String,
}

#[derive(Debug, Default)]
pub struct OutputData {
    variables: IndexMap<String, OutputVariable>,
}

impl OutputData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        name: &str,
        kind: PlotKind,
        data: ArrayD<f64>,
        axis: &str,
        units: &str,
    ) -> NscatResult<()> {
        if units.trim().is_empty() {
            return Err(NscatError::Schema(format!(
                "output variable '{name}' has empty units"
            )));
        }
        if self.variables.contains_key(name) {
            return Err(NscatError::Schema(format!(
                "output variable '{name}' already declared"
            )));
        }
        self.variables.insert(
            name.to_string(),
            OutputVariable {
                kind,
                data,
                axis: axis.to_string(),
                units: units.to_string(),
                main_result: false,
            },
        );
        Ok(())
    }

    pub fn add_line(
        &mut self,
        name: &str,
        data: Vec<f64>,
        axis: &str,
        units: &str,
    ) -> NscatResult<()> {
        let len = data.len();
        let data = ArrayD::from_shape_vec(IxDyn(&[len]), data)
            .map_err(|e| NscatError::Schema(format!("output variable '{name}': {e}")))?;
        self.add(name, PlotKind::Line, data, axis, units)
    }

    pub fn add_zeros_line(&mut self, name: &str, len: usize, axis: &str, units: &str) -> NscatResult<()> {
        self.add(name, PlotKind::Line, ArrayD::zeros(IxDyn(&[len])), axis, units)
    }

    pub fn add_zeros_surface(
        &mut self,
        name: &str,
        rows: usize,
        cols: usize,
        axis: &str,
        units: &str,
    ) -> NscatResult<()> {
        self.add(
            name,
            PlotKind::Surface,
            ArrayD::zeros(IxDyn(&[rows, cols])),
            axis,
            units,
        )
    }

    pub fn set_main_result(&mut self, name: &str) -> NscatResult<()> {
        self.variables
            .get_mut(name)
            .map(|v| v.main_result = true)
            .ok_or_else(|| NscatError::Schema(format!("no output variable '{name}'")))
    }

    pub fn get(&self, name: &str) -> Option<&OutputVariable> {
        self.variables.get(name)
    }

    /// Mutable data of a declared variable; reading a non-existent one is
    /// a programmer error and fails fast.
    pub fn data_mut(&mut self, name: &str) -> NscatResult<&mut ArrayD<f64>> {
        self.variables
            .get_mut(name)
            .map(|v| &mut v.data)
            .ok_or_else(|| NscatError::Schema(format!("no output variable '{name}'")))
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &OutputVariable)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Every axis token must name a declared variable (or "index"), and
    /// the leading data dimensions must match the axis lengths.
    pub fn validate_axes(&self) -> NscatResult<()> {
        for (name, variable) in &self.variables {
            let tokens: Vec<&str> = variable
                .axis
                .split('|')
                .filter(|t| !t.is_empty())
                .collect();
            if tokens.len() > variable.data.ndim() {
                return Err(NscatError::Schema(format!(
                    "variable '{name}' declares {} axes for {} dimensions",
                    tokens.len(),
                    variable.data.ndim()
                )));
            }
            for (dim, token) in tokens.iter().enumerate() {
                if *token == "index" {
                    continue;
                }
                let axis_var = self.variables.get(*token).ok_or_else(|| {
                    NscatError::Schema(format!(
                        "variable '{name}' references unknown axis '{token}'"
                    ))
                })?;
                let axis_len = axis_var.data.len();
                let dim_len = variable.data.shape()[dim];
                if axis_len != dim_len {
                    return Err(NscatError::Schema(format!(
                        "variable '{name}' dimension {dim} has {dim_len} points, axis '{token}' has {axis_len}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Dispatch to each named format writer. Returns the files written.
    pub fn write(
        &self,
        root: &Path,
        formats: &[String],
        info: &OutputInfo,
    ) -> NscatResult<Vec<PathBuf>> {
        self.validate_axes()?;
        let mut files = Vec::with_capacity(formats.len());
        for name in formats {
            let writer = format_writer(name).ok_or_else(|| {
                NscatError::Schema(format!("output format '{name}' is not registered"))
            })?;
            let path = writer.write(root, self, info)?;
            info!(format = %name, path = %path.display(), "wrote output");
            files.push(path);
        }
        Ok(files)
    }
}
