//! Numeric range configurator: `(first, last, step)` expanded to the full
//! sequence plus its midpoints.

use serde::Deserialize;
use serde_json::Value;

use crate::configurable::Configuration;
use crate::context::SetupContext;
use crate::value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeValueType {
    Int,
    Float,
}

fn default_triplet() -> [f64; 3] {
    [0.0, 10.0, 1.0]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RangeOptions {
    pub default: [f64; 3],
    pub value_type: RangeValueType,
    pub include_last: bool,
    pub sort: bool,
    pub mini: Option<f64>,
    pub maxi: Option<f64>,
}

impl Default for RangeOptions {
    fn default() -> Self {
        Self {
            default: default_triplet(),
            value_type: RangeValueType::Int,
            include_last: false,
            sort: false,
            mini: None,
            maxi: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RangeConfigurator {
    pub options: RangeOptions,
    pub value: Vec<f64>,
    pub first: f64,
    pub last: f64,
    pub step: f64,
    pub number: usize,
    pub mid_points: Vec<f64>,
}

impl RangeConfigurator {
    pub fn new(options: RangeOptions) -> Self {
        Self {
            options,
            value: Vec::new(),
            first: 0.0,
            last: 0.0,
            step: 0.0,
            number: 0,
            mid_points: Vec::new(),
        }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let [mut first, mut last, step] = match raw {
            Some(raw) => value::as_f64_tuple::<3>(raw)?,
            None => self.options.default,
        };
        if step == 0.0 {
            return Err("step must be non-zero".to_string());
        }
        if let Some(mini) = self.options.mini {
            first = first.max(mini);
        }
        if let Some(maxi) = self.options.maxi {
            last = last.min(maxi);
        }

        // Tolerance keeps float accumulation from dropping or duplicating
        // the endpoint.
        let tol = step.abs() * 1.0e-9;
        let mut sequence = Vec::new();
        let mut v = first;
        if step > 0.0 {
            while (self.options.include_last && v <= last + tol)
                || (!self.options.include_last && v < last - tol)
            {
                sequence.push(v);
                v += step;
            }
        } else {
            while (self.options.include_last && v >= last - tol)
                || (!self.options.include_last && v > last + tol)
            {
                sequence.push(v);
                v += step;
            }
        }
        if self.options.value_type == RangeValueType::Int {
            for v in &mut sequence {
                *v = v.round();
            }
        }
        if self.options.sort {
            sequence.sort_by(|a, b| a.partial_cmp(b).expect("finite range values"));
        }
        if sequence.is_empty() {
            return Err(format!("range ({first}, {last}, {step}) is empty"));
        }

        self.first = sequence[0];
        self.last = *sequence.last().expect("non-empty sequence");
        self.step = step;
        self.number = sequence.len();
        self.mid_points = sequence
            .windows(2)
            .map(|w| (w[0] + w[1]) / 2.0)
            .collect();
        self.value = sequence;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!(
            "{} values from {} to {} (step {})",
            self.number, self.first, self.last, self.step
        )
    }
}
