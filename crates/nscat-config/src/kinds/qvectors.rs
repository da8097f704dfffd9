//! Reciprocal-space vector generation for the scattering-family jobs.
//!
//! Two generators: `spherical_shells` draws isotropic random directions on
//! each |q| shell; `spherical_lattice` enumerates reciprocal-lattice points
//! of the trajectory's cell and bins them into shells. A raw string names a
//! stored user definition instead.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use serde_json::Value;

use crate::configurable::Configuration;
use crate::context::SetupContext;
use crate::value;

fn default_trajectory_param() -> String {
    "trajectory".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QVectorsOptions {
    pub default: Value,
    pub trajectory: String,
}

impl Default for QVectorsOptions {
    fn default() -> Self {
        Self {
            default: serde_json::json!({
                "generator": "spherical_shells",
                "parameters": {}
            }),
            trajectory: default_trajectory_param(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct QVectorParams {
    /// Shell grid (first, last, step) in 1/ang.
    shells: [f64; 3],
    /// Vectors kept per shell.
    n_vectors: usize,
    /// Shell half-width tolerance in 1/ang.
    width: f64,
    seed: u64,
}

impl Default for QVectorParams {
    fn default() -> Self {
        Self {
            shells: [0.1, 1.0, 0.1],
            n_vectors: 50,
            width: 0.1,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QShell {
    pub q: f64,
    pub vectors: Vec<[f64; 3]>,
}

#[derive(Debug, Clone)]
pub struct QVectorsConfigurator {
    pub options: QVectorsOptions,
    pub generator: String,
    pub shells: Vec<f64>,
    pub q_vectors: Vec<QShell>,
    pub n_shells: usize,
    pub is_lattice: bool,
}

impl QVectorsConfigurator {
    pub fn new(options: QVectorsOptions) -> Self {
        Self {
            options,
            generator: String::new(),
            shells: Vec::new(),
            q_vectors: Vec::new(),
            n_shells: 0,
            is_lattice: false,
        }
    }

    pub fn dependencies(&self) -> Vec<(&'static str, String)> {
        vec![("trajectory", self.options.trajectory.clone())]
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        deps: &mut Configuration,
        ctx: &SetupContext,
    ) -> Result<(), String> {
        let trajectory = deps
            .trajectory(&self.options.trajectory)
            .map_err(|e| e.to_string())?
            .instance()?
            .clone();

        // Resolve a user-definition name into its stored generator spec.
        let spec: Value = match raw.unwrap_or(&self.options.default) {
            Value::String(name) => {
                let store = ctx
                    .definitions
                    .ok_or_else(|| "no user-definition store available".to_string())?;
                store
                    .get_definition(trajectory.basename(), "q_vectors", name)
                    .map_err(|e| e.to_string())?
                    .clone()
            }
            other => other.clone(),
        };

        let obj = spec
            .as_object()
            .ok_or_else(|| "q-vector spec must be an object or a definition name".to_string())?;
        let generator = obj
            .get("generator")
            .and_then(|g| g.as_str())
            .ok_or_else(|| "q-vector spec needs a 'generator' field".to_string())?
            .to_string();
        let params: QVectorParams = match obj.get("parameters") {
            Some(p) => serde_json::from_value(p.clone())
                .map_err(|e| format!("bad q-vector parameters: {e}"))?,
            None => QVectorParams::default(),
        };
        let [first, last, step] = params.shells;
        if step <= 0.0 || last < first || first < 0.0 {
            return Err(format!("bad shell grid ({first}, {last}, {step})"));
        }
        let mut shells = Vec::new();
        let mut q = first;
        while q <= last + step * 1e-9 {
            shells.push(q);
            q += step;
        }

        let q_vectors = match generator.as_str() {
            "spherical_shells" => spherical_shells(&shells, &params),
            "spherical_lattice" => {
                let cell = trajectory
                    .reader()
                    .and_then(|mut r| r.frame(0))
                    .map_err(|e| e.to_string())?
                    .unit_cell;
                if cell.is_identity() {
                    return Err(
                        "spherical_lattice needs a periodic cell, trajectory is aperiodic"
                            .to_string(),
                    );
                }
                let inv = cell
                    .inverse()
                    .ok_or_else(|| "degenerate unit cell".to_string())?;
                spherical_lattice(&shells, &params, &inv)
            }
            other => return Err(format!("unknown q-vector generator '{other}'")),
        };

        let total: usize = q_vectors.iter().map(|s| s.vectors.len()).sum();
        if total == 0 {
            return Err(format!("generator '{generator}' produced no q vectors"));
        }
        self.n_shells = q_vectors.len();
        self.shells = q_vectors.iter().map(|s| s.q).collect();
        self.is_lattice = generator == "spherical_lattice";
        self.generator = generator;
        self.q_vectors = q_vectors;
        Ok(())
    }

    pub fn information(&self) -> String {
        let total: usize = self.q_vectors.iter().map(|s| s.vectors.len()).sum();
        format!(
            "{} q vectors on {} shells ({})",
            total, self.n_shells, self.generator
        )
    }
}

fn spherical_shells(shells: &[f64], params: &QVectorParams) -> Vec<QShell> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    shells
        .iter()
        .map(|&q| {
            let vectors = (0..params.n_vectors)
                .map(|_| {
                    let dir = random_unit(&mut rng);
                    [q * dir[0], q * dir[1], q * dir[2]]
                })
                .collect();
            QShell { q, vectors }
        })
        .collect()
}

// Isotropic direction from three gaussians (Box-Muller), rejecting the
// numerically degenerate origin.
fn random_unit(rng: &mut StdRng) -> [f64; 3] {
    loop {
        let mut g = [0.0f64; 4];
        for pair in 0..2 {
            let u1: f64 = rng.gen::<f64>().max(1e-12);
            let u2: f64 = rng.gen();
            let r = (-2.0 * u1.ln()).sqrt();
            g[2 * pair] = r * (2.0 * std::f64::consts::PI * u2).cos();
            g[2 * pair + 1] = r * (2.0 * std::f64::consts::PI * u2).sin();
        }
        let v = [g[0], g[1], g[2]];
        let norm = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        if norm > 1e-9 {
            return [v[0] / norm, v[1] / norm, v[2] / norm];
        }
    }
}

fn spherical_lattice(shells: &[f64], params: &QVectorParams, inv: &[[f64; 3]; 3]) -> Vec<QShell> {
    // Reciprocal basis rows: b_i[j] = 2 pi (B^-1)[j][i].
    let two_pi = 2.0 * std::f64::consts::PI;
    let b: [[f64; 3]; 3] = [
        [two_pi * inv[0][0], two_pi * inv[1][0], two_pi * inv[2][0]],
        [two_pi * inv[0][1], two_pi * inv[1][1], two_pi * inv[2][1]],
        [two_pi * inv[0][2], two_pi * inv[1][2], two_pi * inv[2][2]],
    ];
    let q_max = shells.last().copied().unwrap_or(0.0) + params.width;
    let h_max: i64 = (0..3)
        .map(|i| {
            let len = (b[i][0] * b[i][0] + b[i][1] * b[i][1] + b[i][2] * b[i][2]).sqrt();
            if len > 1e-12 {
                (q_max / len).ceil() as i64
            } else {
                0
            }
        })
        .max()
        .unwrap_or(0)
        .min(32);

    let mut out: Vec<QShell> = shells
        .iter()
        .map(|&q| QShell {
            q,
            vectors: Vec::new(),
        })
        .collect();
    let step = if shells.len() >= 2 {
        shells[1] - shells[0]
    } else {
        params.width.max(1e-12)
    };
    for h in -h_max..=h_max {
        for k in -h_max..=h_max {
            for l in -h_max..=h_max {
                if h == 0 && k == 0 && l == 0 {
                    continue;
                }
                let qv = [
                    h as f64 * b[0][0] + k as f64 * b[1][0] + l as f64 * b[2][0],
                    h as f64 * b[0][1] + k as f64 * b[1][1] + l as f64 * b[2][1],
                    h as f64 * b[0][2] + k as f64 * b[1][2] + l as f64 * b[2][2],
                ];
                let q_norm = (qv[0] * qv[0] + qv[1] * qv[1] + qv[2] * qv[2]).sqrt();
                let bin = ((q_norm - shells[0]) / step).round();
                if bin < 0.0 || bin as usize >= out.len() {
                    continue;
                }
                let bin = bin as usize;
                if (q_norm - out[bin].q).abs() <= params.width
                    && out[bin].vectors.len() < params.n_vectors
                {
                    out[bin].vectors.push(qv);
                }
            }
        }
    }
    out.retain(|shell| !shell.vectors.is_empty());
    out
}
