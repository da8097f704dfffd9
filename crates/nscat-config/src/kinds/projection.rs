//! Projection of vector series onto an axis or a plane.

use serde::Deserialize;
use serde_json::Value;

use crate::configurable::Configuration;
use crate::context::SetupContext;
use crate::value;

#[derive(Debug, Clone, PartialEq)]
pub enum Projector {
    Null,
    Axial([f64; 3]),
    Planar([f64; 3]),
}

impl Projector {
    /// Apply to an `[F x 3]` series.
    pub fn project(&self, series: &[[f64; 3]]) -> Vec<[f64; 3]> {
        match self {
            Projector::Null => series.to_vec(),
            Projector::Axial(n) => series
                .iter()
                .map(|r| {
                    let p = dot(r, n);
                    [p * n[0], p * n[1], p * n[2]]
                })
                .collect(),
            Projector::Planar(n) => series
                .iter()
                .map(|r| {
                    let p = dot(r, n);
                    [r[0] - p * n[0], r[1] - p * n[1], r[2] - p * n[2]]
                })
                .collect(),
        }
    }
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn default_null() -> Value {
    Value::String("null".to_string())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectionOptions {
    pub default: Value,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            default: default_null(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProjectionConfigurator {
    pub options: ProjectionOptions,
    pub projector: Projector,
    pub axis: Option<[f64; 3]>,
}

impl ProjectionConfigurator {
    pub fn new(options: ProjectionOptions) -> Self {
        Self {
            options,
            projector: Projector::Null,
            axis: None,
        }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let spec = raw.unwrap_or(&self.options.default);

        let (kind, axis_value): (String, Option<&Value>) = match spec {
            Value::Null => ("null".to_string(), None),
            Value::String(s) => (s.clone(), None),
            Value::Array(items) => {
                let kind = items
                    .first()
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| "projection spec must start with a projector name".to_string())?;
                (kind.to_string(), items.get(1))
            }
            Value::Object(map) => {
                let kind = map
                    .get("projector")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| "projection spec needs a 'projector' field".to_string())?;
                (kind.to_string(), map.get("axis"))
            }
            other => return Err(format!("bad projection spec {other}")),
        };

        let normalized_axis = |v: Option<&Value>| -> Result<[f64; 3], String> {
            let axis = v.ok_or_else(|| format!("projector '{kind}' needs an axis"))?;
            let a = value::as_f64_tuple::<3>(axis)?;
            let norm = dot(&a, &a).sqrt();
            if norm < 1e-12 {
                return Err("projection axis must be non-null".to_string());
            }
            Ok([a[0] / norm, a[1] / norm, a[2] / norm])
        };

        match kind.as_str() {
            "null" | "NullProjector" => {
                self.projector = Projector::Null;
                self.axis = None;
            }
            "axial" | "AxialProjector" => {
                let axis = normalized_axis(axis_value)?;
                self.projector = Projector::Axial(axis);
                self.axis = Some(axis);
            }
            "planar" | "PlanarProjector" => {
                let axis = normalized_axis(axis_value)?;
                self.projector = Projector::Planar(axis);
                self.axis = Some(axis);
            }
            other => return Err(format!("unknown projector '{other}'")),
        }
        Ok(())
    }

    pub fn information(&self) -> String {
        match (&self.projector, &self.axis) {
            (Projector::Null, _) => "no projection".to_string(),
            (Projector::Axial(_), Some(axis)) => format!("axial projection along {axis:?}"),
            (Projector::Planar(_), Some(axis)) => format!("planar projection, normal {axis:?}"),
            _ => "projection".to_string(),
        }
    }
}
