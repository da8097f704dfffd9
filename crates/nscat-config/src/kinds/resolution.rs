//! Instrument resolution kernels on the frequency window of a frame
//! selection, and their time-domain counterparts.

use indexmap::IndexMap;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use serde::Deserialize;
use serde_json::Value;

use crate::configurable::Configuration;
use crate::context::SetupContext;

/// Relative tail magnitude of the time window above which a kernel is
/// rejected as too sharp for the frame window. Tunable; the historical
/// default is 0.1.
pub const RESOLUTION_DMAX: f64 = 0.1;

fn default_frames_param() -> String {
    "frames".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstrumentResolutionOptions {
    pub default: Value,
    pub frames: String,
}

impl Default for InstrumentResolutionOptions {
    fn default() -> Self {
        Self {
            default: Value::String("ideal".to_string()),
            frames: default_frames_param(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InstrumentResolutionConfigurator {
    pub options: InstrumentResolutionOptions,
    pub kernel: String,
    pub parameters: IndexMap<String, f64>,
    pub omega: Vec<f64>,
    pub omega_window: Vec<f64>,
    pub time: Vec<f64>,
    pub time_window: Vec<f64>,
}

impl InstrumentResolutionConfigurator {
    pub fn new(options: InstrumentResolutionOptions) -> Self {
        Self {
            options,
            kernel: String::new(),
            parameters: IndexMap::new(),
            omega: Vec::new(),
            omega_window: Vec::new(),
            time: Vec::new(),
            time_window: Vec::new(),
        }
    }

    pub fn dependencies(&self) -> Vec<(&'static str, String)> {
        vec![("frames", self.options.frames.clone())]
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let frames = deps
            .frames(&self.options.frames)
            .map_err(|e| e.to_string())?;
        let n_frames = frames.n_frames;
        let time_step = frames.time_step;

        let (kernel, parameters) = parse_kernel_spec(raw.unwrap_or(&self.options.default))?;

        let n_omegas = 2 * n_frames - 1;
        let center = n_frames - 1;
        let d_omega = 2.0 * std::f64::consts::PI / (n_omegas as f64 * time_step);
        self.omega = (0..n_omegas)
            .map(|k| (k as f64 - center as f64) * d_omega)
            .collect();
        self.time = (0..n_omegas)
            .map(|k| (k as f64 - center as f64) * time_step)
            .collect();

        if kernel == "ideal" {
            self.omega_window = vec![0.0; n_omegas];
            self.omega_window[center] = 1.0 / d_omega;
            self.time_window = vec![1.0; n_omegas];
            self.kernel = kernel;
            self.parameters = parameters;
            return Ok(());
        }

        let mut window: Vec<f64> = self
            .omega
            .iter()
            .map(|&w| evaluate_kernel(&kernel, &parameters, w))
            .collect::<Result<_, _>>()?;
        let integral: f64 = window.iter().sum::<f64>() * d_omega;
        if integral <= 0.0 {
            return Err(format!(
                "kernel '{kernel}' vanishes on the frequency window"
            ));
        }
        for w in &mut window {
            *w /= integral;
        }

        // Time window: inverse FFT of the ifftshifted frequency window,
        // shifted back and normalized to 1 at t = 0.
        let mut planner = FftPlanner::<f64>::new();
        let ifft = planner.plan_fft_inverse(n_omegas);
        let mut buf: Vec<Complex<f64>> = (0..n_omegas)
            .map(|j| Complex {
                re: window[(j + center) % n_omegas],
                im: 0.0,
            })
            .collect();
        ifft.process(&mut buf);
        let mut shifted = vec![Complex { re: 0.0, im: 0.0 }; n_omegas];
        for (k, v) in buf.into_iter().enumerate() {
            shifted[(k + center) % n_omegas] = v;
        }
        let center_mag = shifted[center].norm();
        if center_mag < 1e-300 {
            return Err(format!("kernel '{kernel}' has no time-domain support"));
        }
        let tail = shifted[0].norm().max(shifted[n_omegas - 1].norm()) / center_mag;
        if n_omegas > 1 && tail > RESOLUTION_DMAX {
            return Err(format!(
                "kernel '{kernel}' is too sharp for the frame window (tail {tail:.3} > {RESOLUTION_DMAX})"
            ));
        }
        self.time_window = shifted.iter().map(|c| c.re / center_mag).collect();
        self.omega_window = window;
        self.kernel = kernel;
        self.parameters = parameters;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!(
            "kernel '{}' on {} frequencies",
            self.kernel,
            self.omega.len()
        )
    }
}

fn parse_kernel_spec(spec: &Value) -> Result<(String, IndexMap<String, f64>), String> {
    let (name, params) = match spec {
        Value::String(name) => (name.clone(), None),
        Value::Array(items) => {
            let name = items
                .first()
                .and_then(|v| v.as_str())
                .ok_or_else(|| "resolution spec must start with a kernel name".to_string())?;
            (name.to_string(), items.get(1))
        }
        Value::Object(map) => {
            let name = map
                .get("kernel")
                .and_then(|v| v.as_str())
                .ok_or_else(|| "resolution spec needs a 'kernel' field".to_string())?;
            (name.to_string(), map.get("parameters"))
        }
        other => return Err(format!("bad resolution spec {other}")),
    };
    if !KERNELS.contains(&name.as_str()) {
        return Err(format!("unknown resolution kernel '{name}'"));
    }
    let mut parameters = IndexMap::new();
    if let Some(params) = params {
        let obj = params
            .as_object()
            .ok_or_else(|| "kernel parameters must be an object".to_string())?;
        for (key, v) in obj {
            let x = v
                .as_f64()
                .ok_or_else(|| format!("kernel parameter '{key}' must be numeric"))?;
            parameters.insert(key.clone(), x);
        }
    }
    Ok((name, parameters))
}

const KERNELS: &[&str] = &["ideal", "gaussian", "lorentzian", "square", "triangular"];

fn evaluate_kernel(
    kernel: &str,
    parameters: &IndexMap<String, f64>,
    omega: f64,
) -> Result<f64, String> {
    let mu = parameters.get("mu").copied().unwrap_or(0.0);
    let width = |key: &str| -> Result<f64, String> {
        let w = parameters.get(key).copied().unwrap_or(1.0);
        if w <= 0.0 {
            return Err(format!("kernel parameter '{key}' must be positive"));
        }
        Ok(w)
    };
    let x = omega - mu;
    match kernel {
        "gaussian" => {
            let sigma = width("sigma")?;
            Ok((-x * x / (2.0 * sigma * sigma)).exp())
        }
        "lorentzian" => {
            let gamma = width("gamma")?;
            Ok(gamma / (std::f64::consts::PI * (x * x + gamma * gamma)))
        }
        "square" => {
            let sigma = width("sigma")?;
            Ok(if x.abs() <= sigma { 1.0 } else { 0.0 })
        }
        "triangular" => {
            let sigma = width("sigma")?;
            Ok((1.0 - x.abs() / sigma).max(0.0))
        }
        other => Err(format!("unknown resolution kernel '{other}'")),
    }
}
