//! Fixed-dimension numeric vector configurator.

use serde::Deserialize;
use serde_json::Value;

use crate::configurable::Configuration;
use crate::context::SetupContext;
use crate::value;

fn default_dimension() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VectorOptions {
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    pub normalize: bool,
    pub not_null: bool,
    pub default: Vec<f64>,
}

impl Default for VectorOptions {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            normalize: false,
            not_null: false,
            default: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VectorConfigurator {
    pub options: VectorOptions,
    pub vector: Vec<f64>,
}

impl VectorConfigurator {
    pub fn new(options: VectorOptions) -> Self {
        Self {
            options,
            vector: Vec::new(),
        }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let mut v = match raw {
            Some(raw) => value::as_f64_vec(raw)?,
            None => {
                if self.options.default.is_empty() {
                    vec![0.0; self.options.dimension]
                } else {
                    self.options.default.clone()
                }
            }
        };
        if v.len() != self.options.dimension {
            return Err(format!(
                "expected {} components, got {}",
                self.options.dimension,
                v.len()
            ));
        }
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        if self.options.not_null && norm < 1e-12 {
            return Err("null vector is not allowed".to_string());
        }
        if self.options.normalize {
            if norm < 1e-12 {
                return Err("cannot normalize a null vector".to_string());
            }
            for x in &mut v {
                *x /= norm;
            }
        }
        self.vector = v;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!("vector: {:?}", self.vector)
    }
}
