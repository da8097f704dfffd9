//! Scalar-valued configurators.

use serde::Deserialize;
use serde_json::Value;

use crate::configurable::Configuration;
use crate::context::SetupContext;
use crate::value;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct IntegerOptions {
    pub default: i64,
    pub mini: Option<i64>,
    pub maxi: Option<i64>,
    pub choices: Vec<i64>,
    pub exclude: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct IntegerConfigurator {
    pub options: IntegerOptions,
    pub value: i64,
}

impl IntegerConfigurator {
    pub fn new(options: IntegerOptions) -> Self {
        Self { options, value: 0 }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let v = match raw {
            Some(raw) => value::as_i64(raw)?,
            None => self.options.default,
        };
        if let Some(mini) = self.options.mini {
            if v < mini {
                return Err(format!("{v} is below the minimum {mini}"));
            }
        }
        if let Some(maxi) = self.options.maxi {
            if v > maxi {
                return Err(format!("{v} is above the maximum {maxi}"));
            }
        }
        if !self.options.choices.is_empty() && !self.options.choices.contains(&v) {
            return Err(format!("{v} is not one of the allowed choices"));
        }
        if self.options.exclude.contains(&v) {
            return Err(format!("{v} is excluded"));
        }
        self.value = v;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!("value: {}", self.value)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FloatOptions {
    pub default: f64,
    pub mini: Option<f64>,
    pub maxi: Option<f64>,
    pub choices: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct FloatConfigurator {
    pub options: FloatOptions,
    pub value: f64,
}

impl FloatConfigurator {
    pub fn new(options: FloatOptions) -> Self {
        Self {
            options,
            value: 0.0,
        }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let v = match raw {
            Some(raw) => value::as_f64(raw)?,
            None => self.options.default,
        };
        if !v.is_finite() {
            return Err(format!("{v} is not a finite number"));
        }
        if let Some(mini) = self.options.mini {
            if v < mini {
                return Err(format!("{v} is below the minimum {mini}"));
            }
        }
        if let Some(maxi) = self.options.maxi {
            if v > maxi {
                return Err(format!("{v} is above the maximum {maxi}"));
            }
        }
        if !self.options.choices.is_empty()
            && !self.options.choices.iter().any(|c| (c - v).abs() < 1e-12)
        {
            return Err(format!("{v} is not one of the allowed choices"));
        }
        self.value = v;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!("value: {}", self.value)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct BooleanOptions {
    pub default: bool,
}

#[derive(Debug, Clone)]
pub struct BooleanConfigurator {
    pub options: BooleanOptions,
    pub value: bool,
}

impl BooleanConfigurator {
    pub fn new(options: BooleanOptions) -> Self {
        Self {
            options,
            value: false,
        }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        self.value = match raw {
            Some(raw) => value::as_bool(raw)?,
            None => self.options.default,
        };
        Ok(())
    }

    pub fn information(&self) -> String {
        format!("value: {}", self.value)
    }
}

fn default_accept_null() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrOptions {
    pub default: String,
    #[serde(default = "default_accept_null")]
    pub accept_null_string: bool,
    /// Require the string to parse as this type: "int", "float" or "json".
    pub eval_type: Option<String>,
}

impl Default for StrOptions {
    fn default() -> Self {
        Self {
            default: String::new(),
            accept_null_string: default_accept_null(),
            eval_type: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StrConfigurator {
    pub options: StrOptions,
    pub value: String,
}

impl StrConfigurator {
    pub fn new(options: StrOptions) -> Self {
        Self {
            options,
            value: String::new(),
        }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let v = match raw {
            Some(raw) => value::as_str(raw)?.to_string(),
            None => self.options.default.clone(),
        };
        if !self.options.accept_null_string && v.trim().is_empty() {
            return Err("blank string is not allowed".to_string());
        }
        if let Some(eval_type) = &self.options.eval_type {
            let ok = match eval_type.as_str() {
                "int" => v.trim().parse::<i64>().is_ok(),
                "float" => v.trim().parse::<f64>().is_ok(),
                "json" => serde_json::from_str::<Value>(&v).is_ok(),
                other => return Err(format!("unknown eval type '{other}'")),
            };
            if !ok {
                return Err(format!("'{v}' does not evaluate as {eval_type}"));
            }
        }
        self.value = v;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!("value: '{}'", self.value)
    }
}

fn default_literal() -> String {
    "null".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LiteralOptions {
    pub default: String,
}

impl Default for LiteralOptions {
    fn default() -> Self {
        Self {
            default: default_literal(),
        }
    }
}

/// A literal-evaluable token: the raw value is either structured already
/// or a string parsed as a JSON literal.
#[derive(Debug, Clone)]
pub struct LiteralConfigurator {
    pub options: LiteralOptions,
    pub value: Value,
}

impl LiteralConfigurator {
    pub fn new(options: LiteralOptions) -> Self {
        Self {
            options,
            value: Value::Null,
        }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        self.value = match raw {
            Some(Value::String(token)) => serde_json::from_str(token)
                .map_err(|e| format!("'{token}' is not a literal: {e}"))?,
            Some(other) => other.clone(),
            None => serde_json::from_str(&self.options.default)
                .map_err(|e| format!("'{}' is not a literal: {e}", self.options.default))?,
        };
        Ok(())
    }

    pub fn information(&self) -> String {
        format!("value: {}", self.value)
    }
}
