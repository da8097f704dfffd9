//! Lenient coercion of raw JSON parameter values.
//!
//! User input arrives as strings, numbers or arrays depending on the
//! front end; every coercion here accepts the reasonable encodings and
//! reports a readable message otherwise. Errors are plain strings so they
//! can land in configurator statuses unchanged.

use serde_json::Value;

pub fn as_i64(v: &Value) -> Result<i64, String> {
    match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 {
                    Ok(f as i64)
                } else {
                    Err(format!("{f} is not an integer"))
                }
            } else {
                Err(format!("{n} is not an integer"))
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("'{s}' is not an integer")),
        other => Err(format!("{other} is not an integer")),
    }
}

pub fn as_usize(v: &Value) -> Result<usize, String> {
    let i = as_i64(v)?;
    usize::try_from(i).map_err(|_| format!("{i} is negative"))
}

pub fn as_f64(v: &Value) -> Result<f64, String> {
    match v {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("{n} is not a number")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{s}' is not a number")),
        other => Err(format!("{other} is not a number")),
    }
}

/// The documented boolean token set, case-insensitive.
pub fn as_bool(v: &Value) -> Result<bool, String> {
    match v {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(format!("{n} is not a boolean")),
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "t" | "1" => Ok(true),
            "false" | "no" | "n" | "f" | "0" => Ok(false),
            other => Err(format!("'{other}' is not a recognized boolean token")),
        },
        other => Err(format!("{other} is not a boolean")),
    }
}

pub fn as_str(v: &Value) -> Result<&str, String> {
    v.as_str()
        .ok_or_else(|| format!("{v} is not a string"))
}

pub fn as_array<'v>(v: &'v Value) -> Result<&'v Vec<Value>, String> {
    v.as_array()
        .ok_or_else(|| format!("{v} is not a sequence"))
}

/// Fixed-length numeric tuple.
pub fn as_f64_tuple<const N: usize>(v: &Value) -> Result<[f64; N], String> {
    let items = as_array(v)?;
    if items.len() != N {
        return Err(format!("expected {N} values, got {}", items.len()));
    }
    let mut out = [0.0; N];
    for (i, item) in items.iter().enumerate() {
        out[i] = as_f64(item)?;
    }
    Ok(out)
}

pub fn as_f64_vec(v: &Value) -> Result<Vec<f64>, String> {
    as_array(v)?.iter().map(as_f64).collect()
}

/// Equality that treats 1 and 1.0 as the same choice.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}
