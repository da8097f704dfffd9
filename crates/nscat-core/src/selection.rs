//! Declarative atom selection over a chemical system.
//!
//! A rule is a JSON object; the selector evaluates it to a sorted,
//! deduplicated index set within `[0, n_atoms)`. Errors are reported as
//! plain strings so they can surface through configurator statuses.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::system::ChemicalSystem;

pub struct Selector<'a> {
    system: &'a ChemicalSystem,
    indices: Vec<u32>,
}

impl<'a> Selector<'a> {
    pub fn new(system: &'a ChemicalSystem) -> Self {
        Self {
            system,
            indices: Vec::new(),
        }
    }

    pub fn from_json(system: &'a ChemicalSystem, spec: &Value) -> Result<Self, String> {
        let mut selector = Self::new(system);
        selector.update_from_json(spec)?;
        Ok(selector)
    }

    pub fn system(&self) -> &ChemicalSystem {
        self.system
    }

    pub fn update_from_json(&mut self, spec: &Value) -> Result<(), String> {
        let set = evaluate(spec, self.system)?;
        self.indices = set.into_iter().collect();
        Ok(())
    }

    /// Sorted ascending, unique.
    pub fn get_idxs(&self) -> &[u32] {
        &self.indices
    }

    pub fn into_idxs(self) -> Vec<u32> {
        self.indices
    }
}

/// Structural check without a system: does the rule use only known keys
/// with plausible operand shapes?
pub fn check_valid_json_settings(spec: &Value) -> bool {
    let Some(obj) = spec.as_object() else {
        return false;
    };
    if obj.len() != 1 {
        return false;
    }
    let (key, operand) = obj.iter().next().expect("non-empty object");
    match key.as_str() {
        "all" => operand.as_bool() == Some(true),
        "indexes" | "elements" | "names" | "molecules" => operand.is_array(),
        "index_range" => operand.as_array().map(|a| a.len() == 2).unwrap_or(false),
        "and" | "or" => operand
            .as_array()
            .map(|a| !a.is_empty() && a.iter().all(check_valid_json_settings))
            .unwrap_or(false),
        "not" => check_valid_json_settings(operand),
        _ => false,
    }
}

fn evaluate(spec: &Value, system: &ChemicalSystem) -> Result<BTreeSet<u32>, String> {
    let obj = spec
        .as_object()
        .ok_or_else(|| "selection rule must be a JSON object".to_string())?;
    if obj.len() != 1 {
        return Err(format!(
            "selection rule must have exactly one key, got {}",
            obj.len()
        ));
    }
    let (key, operand) = obj.iter().next().expect("non-empty object");
    let n = system.n_atoms() as u32;
    match key.as_str() {
        "all" => {
            if operand.as_bool() != Some(true) {
                return Err("the 'all' rule takes the literal true".to_string());
            }
            Ok((0..n).collect())
        }
        "indexes" => {
            let mut set = BTreeSet::new();
            for item in as_array(operand, "indexes")? {
                let idx = item
                    .as_u64()
                    .ok_or_else(|| format!("bad atom index {item}"))?;
                if idx >= n as u64 {
                    return Err(format!("atom index {idx} out of bounds ({n} atoms)"));
                }
                set.insert(idx as u32);
            }
            Ok(set)
        }
        "index_range" => {
            let pair = as_array(operand, "index_range")?;
            if pair.len() != 2 {
                return Err("'index_range' takes [first, last]".to_string());
            }
            let first = pair[0]
                .as_u64()
                .ok_or_else(|| "bad range bound".to_string())?;
            let last = pair[1]
                .as_u64()
                .ok_or_else(|| "bad range bound".to_string())?;
            if last >= n as u64 || first > last {
                return Err(format!(
                    "index range [{first}, {last}] invalid for {n} atoms"
                ));
            }
            Ok((first as u32..=last as u32).collect())
        }
        "elements" => {
            let wanted = string_list(operand, "elements")?;
            Ok((0..n)
                .filter(|&i| wanted.iter().any(|w| w == system.atom(i as usize).symbol))
                .collect())
        }
        "names" => {
            let wanted = string_list(operand, "names")?;
            Ok((0..n)
                .filter(|&i| wanted.iter().any(|w| w == system.atom(i as usize).name))
                .collect())
        }
        "molecules" => {
            let wanted = string_list(operand, "molecules")?;
            Ok((0..n)
                .filter(|&i| {
                    let mol = system.parent_of(crate::system::EntityLevel::Molecule, i as usize);
                    wanted
                        .iter()
                        .any(|w| w == system.entity_label(crate::system::EntityLevel::Molecule, mol))
                })
                .collect())
        }
        "and" => {
            let mut terms = as_array(operand, "and")?.iter();
            let first = terms.next().ok_or_else(|| "'and' needs operands".to_string())?;
            let mut acc = evaluate(first, system)?;
            for term in terms {
                let other = evaluate(term, system)?;
                acc = acc.intersection(&other).copied().collect();
            }
            Ok(acc)
        }
        "or" => {
            let terms = as_array(operand, "or")?;
            if terms.is_empty() {
                return Err("'or' needs operands".to_string());
            }
            let mut acc = BTreeSet::new();
            for term in terms {
                acc.extend(evaluate(term, system)?);
            }
            Ok(acc)
        }
        "not" => {
            let inner = evaluate(operand, system)?;
            Ok((0..n).filter(|i| !inner.contains(i)).collect())
        }
        other => Err(format!("unknown selection rule '{other}'")),
    }
}

fn as_array<'v>(value: &'v Value, rule: &str) -> Result<&'v Vec<Value>, String> {
    value
        .as_array()
        .ok_or_else(|| format!("'{rule}' takes an array"))
}

fn string_list(value: &Value, rule: &str) -> Result<Vec<String>, String> {
    as_array(value, rule)?
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| format!("'{rule}' takes strings"))
        })
        .collect()
}
