//! Step scheduling mode for the job engine.

use serde::Deserialize;
use serde_json::Value;

use crate::configurable::Configuration;
use crate::context::SetupContext;
use crate::value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Monoprocessor,
    Multiprocessor(usize),
}

impl RunMode {
    pub fn slots(&self) -> usize {
        match self {
            RunMode::Monoprocessor => 1,
            RunMode::Multiprocessor(slots) => *slots,
        }
    }
}

fn default_mono() -> Value {
    Value::String("monoprocessor".to_string())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunningModeOptions {
    pub default: Value,
}

impl Default for RunningModeOptions {
    fn default() -> Self {
        Self {
            default: default_mono(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunningModeConfigurator {
    pub options: RunningModeOptions,
    pub mode: RunMode,
    pub slots: usize,
}

impl RunningModeConfigurator {
    pub fn new(options: RunningModeOptions) -> Self {
        Self {
            options,
            mode: RunMode::Monoprocessor,
            slots: 1,
        }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let spec = raw.unwrap_or(&self.options.default);
        let (mode_name, slots) = match spec {
            Value::String(name) => (name.clone(), None),
            Value::Array(items) => {
                let name = items
                    .first()
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| "running mode spec must start with a mode name".to_string())?;
                (name.to_string(), items.get(1))
            }
            Value::Object(map) => {
                let name = map
                    .get("mode")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| "running mode spec needs a 'mode' field".to_string())?;
                (name.to_string(), map.get("slots"))
            }
            other => return Err(format!("bad running mode spec {other}")),
        };

        match mode_name.as_str() {
            "monoprocessor" => {
                self.mode = RunMode::Monoprocessor;
                self.slots = 1;
            }
            "multiprocessor" => {
                let available = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                let slots = match slots {
                    Some(v) => value::as_i64(v)?,
                    None => available as i64,
                };
                if slots <= 0 {
                    return Err(format!("slot count must be positive, got {slots}"));
                }
                if slots as usize > available {
                    return Err(format!(
                        "{slots} slots requested, only {available} available"
                    ));
                }
                self.mode = RunMode::Multiprocessor(slots as usize);
                self.slots = slots as usize;
            }
            other => return Err(format!("unknown running mode '{other}'")),
        }
        Ok(())
    }

    pub fn information(&self) -> String {
        match self.mode {
            RunMode::Monoprocessor => "monoprocessor".to_string(),
            RunMode::Multiprocessor(slots) => format!("multiprocessor with {slots} slots"),
        }
    }
}
