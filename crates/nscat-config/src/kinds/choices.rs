//! Choice-constrained configurators.

use serde::Deserialize;
use serde_json::Value;

use crate::configurable::Configuration;
use crate::context::SetupContext;
use crate::value;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SingleChoiceOptions {
    pub choices: Vec<Value>,
    pub default: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct SingleChoiceConfigurator {
    pub options: SingleChoiceOptions,
    pub value: Value,
    pub index: usize,
}

impl SingleChoiceConfigurator {
    pub fn new(options: SingleChoiceOptions) -> Self {
        Self {
            options,
            value: Value::Null,
            index: 0,
        }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        if self.options.choices.is_empty() {
            return Err("no choices declared".to_string());
        }
        let v = match raw {
            Some(raw) => raw.clone(),
            None => self
                .options
                .default
                .clone()
                .unwrap_or_else(|| self.options.choices[0].clone()),
        };
        let index = self
            .options
            .choices
            .iter()
            .position(|c| value::loose_eq(c, &v))
            .ok_or_else(|| format!("{v} is not one of the allowed choices"))?;
        self.value = self.options.choices[index].clone();
        self.index = index;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!("value: {} (choice {})", self.value, self.index)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct MultipleChoicesOptions {
    pub choices: Vec<Value>,
    /// Exact number of picks required, when set.
    pub n_choices: Option<usize>,
    pub default: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct MultipleChoicesConfigurator {
    pub options: MultipleChoicesOptions,
    pub value: Vec<Value>,
    pub indexes: Vec<usize>,
}

impl MultipleChoicesConfigurator {
    pub fn new(options: MultipleChoicesOptions) -> Self {
        Self {
            options,
            value: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let picks: Vec<Value> = match raw {
            Some(raw) => value::as_array(raw)?.clone(),
            None => self.options.default.clone(),
        };
        if picks.is_empty() {
            return Err("at least one choice is required".to_string());
        }
        if let Some(n) = self.options.n_choices {
            if picks.len() != n {
                return Err(format!("exactly {n} choices required, got {}", picks.len()));
            }
        }
        let mut indexes = Vec::with_capacity(picks.len());
        let mut chosen = Vec::with_capacity(picks.len());
        for pick in &picks {
            let index = self
                .options
                .choices
                .iter()
                .position(|c| value::loose_eq(c, pick))
                .ok_or_else(|| format!("{pick} is not one of the allowed choices"))?;
            indexes.push(index);
            chosen.push(self.options.choices[index].clone());
        }
        self.value = chosen;
        self.indexes = indexes;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!("{} choices selected", self.value.len())
    }
}
