//! Trajectory-facing configurators: the trajectory itself, frame
//! selections and the time-derivative settings that depend on it.

use serde::Deserialize;
use serde_json::Value;

use nscat_traj::Trajectory;

use crate::configurable::Configuration;
use crate::context::SetupContext;
use crate::value;

/// Sentinel time step when a selection holds one frame; documented rather
/// than produced by an error path.
pub const SINGLE_FRAME_TIME_STEP: f64 = 1.0;

fn default_trajectory_param() -> String {
    "trajectory".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct TrajectoryOptions {
    pub default: String,
}

#[derive(Debug, Clone)]
pub struct TrajectoryConfigurator {
    pub options: TrajectoryOptions,
    pub trajectory: Option<Trajectory>,
    pub basename: String,
    pub length: usize,
    pub md_time_step: f64,
    pub has_velocities: bool,
}

impl TrajectoryConfigurator {
    pub fn new(options: TrajectoryOptions) -> Self {
        Self {
            options,
            trajectory: None,
            basename: String::new(),
            length: 0,
            md_time_step: 0.0,
            has_velocities: false,
        }
    }

    pub fn instance(&self) -> Result<&Trajectory, String> {
        self.trajectory
            .as_ref()
            .ok_or_else(|| "trajectory is not configured".to_string())
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        ctx: &SetupContext,
    ) -> Result<(), String> {
        let spec = match raw {
            Some(raw) => value::as_str(raw)?.to_string(),
            None => self.options.default.clone(),
        };
        let trajectory = if let Some(key) = spec.strip_prefix("mem:") {
            ctx.preloaded
                .get(key)
                .cloned()
                .ok_or_else(|| format!("no in-memory trajectory '{key}'"))?
        } else {
            Trajectory::open(&spec).map_err(|e| e.to_string())?
        };
        self.basename = trajectory.basename().to_string();
        self.length = trajectory.len();
        self.md_time_step = trajectory.md_time_step();
        self.has_velocities = trajectory.has_velocities();
        self.trajectory = Some(trajectory);
        Ok(())
    }

    pub fn information(&self) -> String {
        format!(
            "trajectory '{}': {} frames, dt {} ps, velocities: {}",
            self.basename, self.length, self.md_time_step, self.has_velocities
        )
    }
}

fn default_coordinates() -> String {
    "coordinates".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrajectoryVariableOptions {
    pub default: String,
    pub trajectory: String,
}

impl Default for TrajectoryVariableOptions {
    fn default() -> Self {
        Self {
            default: default_coordinates(),
            trajectory: default_trajectory_param(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrajectoryVariableConfigurator {
    pub options: TrajectoryVariableOptions,
    pub value: String,
}

impl TrajectoryVariableConfigurator {
    pub fn new(options: TrajectoryVariableOptions) -> Self {
        Self {
            options,
            value: String::new(),
        }
    }

    pub fn dependencies(&self) -> Vec<(&'static str, String)> {
        vec![("trajectory", self.options.trajectory.clone())]
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let name = match raw {
            Some(raw) => value::as_str(raw)?.to_string(),
            None => self.options.default.clone(),
        };
        let trajectory = deps
            .trajectory(&self.options.trajectory)
            .map_err(|e| e.to_string())?
            .instance()?;
        if !trajectory.variables().contains(&name) {
            return Err(format!(
                "variable '{name}' is not stored in trajectory '{}'",
                trajectory.basename()
            ));
        }
        self.value = name;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!("variable: {}", self.value)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FramesOptions {
    pub default: Value,
    pub trajectory: String,
}

impl Default for FramesOptions {
    fn default() -> Self {
        Self {
            default: Value::String("all".to_string()),
            trajectory: default_trajectory_param(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FramesConfigurator {
    pub options: FramesOptions,
    pub value: Vec<usize>,
    pub first: usize,
    pub last: usize,
    pub step: usize,
    pub n_frames: usize,
    pub time: Vec<f64>,
    pub time_step: f64,
    pub duration: f64,
}

impl FramesConfigurator {
    pub fn new(options: FramesOptions) -> Self {
        Self {
            options,
            value: Vec::new(),
            first: 0,
            last: 0,
            step: 1,
            n_frames: 0,
            time: Vec::new(),
            time_step: 0.0,
            duration: 0.0,
        }
    }

    pub fn dependencies(&self) -> Vec<(&'static str, String)> {
        vec![("trajectory", self.options.trajectory.clone())]
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let trajectory = deps
            .trajectory(&self.options.trajectory)
            .map_err(|e| e.to_string())?;
        let total = trajectory.length;
        let md_time_step = trajectory.md_time_step;

        let spec = raw.unwrap_or(&self.options.default);
        let (first, last, step) = parse_frame_spec(spec, total)?;
        if step == 0 {
            return Err("frame step must be non-zero".to_string());
        }
        if first >= total || last > total {
            return Err(format!(
                "frame range ({first}, {last}) exceeds the {total} stored frames"
            ));
        }

        let indices: Vec<usize> = (first..last).step_by(step).collect();
        if indices.is_empty() {
            return Err(format!("frame selection ({first}, {last}, {step}) is empty"));
        }
        self.time = indices.iter().map(|&i| i as f64 * md_time_step).collect();
        self.time_step = if indices.len() == 1 {
            SINGLE_FRAME_TIME_STEP
        } else {
            step as f64 * md_time_step
        };
        self.duration = self.time.last().expect("non-empty") - self.time[0];
        self.n_frames = indices.len();
        self.first = first;
        self.last = last;
        self.step = step;
        self.value = indices;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!(
            "{} frames ({}..{} step {}), time step {} ps",
            self.n_frames, self.first, self.last, self.step, self.time_step
        )
    }
}

pub(crate) fn parse_frame_spec(spec: &Value, total: usize) -> Result<(usize, usize, usize), String> {
    match spec {
        Value::String(s) if s == "all" => Ok((0, total, 1)),
        Value::Array(_) => {
            let t = value::as_f64_tuple::<3>(spec)?;
            Ok((t[0] as usize, t[1] as usize, t[2] as usize))
        }
        other => Err(format!("bad frame selection {other}")),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorrelationFramesOptions {
    pub default: Option<Value>,
    pub trajectory: String,
}

impl Default for CorrelationFramesOptions {
    fn default() -> Self {
        Self {
            default: None,
            trajectory: default_trajectory_param(),
        }
    }
}

/// Frame selection for correlation jobs: `(first, last, step, c_frames)`.
/// `n_frames` is the correlation window length; `n_configs` counts the
/// window origins available in the selection.
#[derive(Debug, Clone)]
pub struct CorrelationFramesConfigurator {
    pub options: CorrelationFramesOptions,
    pub value: Vec<usize>,
    pub first: usize,
    pub last: usize,
    pub step: usize,
    pub n_frames: usize,
    pub n_configs: usize,
    pub time: Vec<f64>,
    pub time_step: f64,
    pub duration: f64,
}

impl CorrelationFramesConfigurator {
    pub fn new(options: CorrelationFramesOptions) -> Self {
        Self {
            options,
            value: Vec::new(),
            first: 0,
            last: 0,
            step: 1,
            n_frames: 0,
            n_configs: 0,
            time: Vec::new(),
            time_step: 0.0,
            duration: 0.0,
        }
    }

    pub fn dependencies(&self) -> Vec<(&'static str, String)> {
        vec![("trajectory", self.options.trajectory.clone())]
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let trajectory = deps
            .trajectory(&self.options.trajectory)
            .map_err(|e| e.to_string())?;
        let total = trajectory.length;
        let md_time_step = trajectory.md_time_step;

        let default;
        let spec = match (raw, &self.options.default) {
            (Some(raw), _) => raw,
            (None, Some(d)) => d,
            (None, None) => {
                default = serde_json::json!([0, total, 1, total]);
                &default
            }
        };
        let t = value::as_f64_tuple::<4>(spec)?;
        let (first, last, step) = (t[0] as usize, t[1] as usize, t[2] as usize);
        let c_frames = t[3] as usize;
        if step == 0 {
            return Err("frame step must be non-zero".to_string());
        }
        if first >= total || last > total {
            return Err(format!(
                "frame range ({first}, {last}) exceeds the {total} stored frames"
            ));
        }
        let indices: Vec<usize> = (first..last).step_by(step).collect();
        if indices.is_empty() {
            return Err(format!("frame selection ({first}, {last}, {step}) is empty"));
        }
        if c_frames < 2 {
            return Err(format!("correlation window must hold at least 2 frames, got {c_frames}"));
        }
        if c_frames > indices.len() {
            return Err(format!(
                "correlation window of {c_frames} frames exceeds the {} selected frames",
                indices.len()
            ));
        }

        self.time_step = step as f64 * md_time_step;
        self.time = (0..c_frames).map(|i| i as f64 * self.time_step).collect();
        self.duration = (c_frames - 1) as f64 * self.time_step;
        self.n_configs = indices.len() - c_frames + 1;
        self.n_frames = c_frames;
        self.first = first;
        self.last = last;
        self.step = step;
        self.value = indices;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!(
            "correlation over {} frames, {} window origins",
            self.n_frames, self.n_configs
        )
    }
}

fn default_order() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterpolationOrderOptions {
    pub default: i64,
    pub trajectory: String,
}

impl Default for InterpolationOrderOptions {
    fn default() -> Self {
        Self {
            default: default_order(),
            trajectory: default_trajectory_param(),
        }
    }
}

/// Order 0 means "use the stored velocities"; orders 1..=5 differentiate
/// the coordinates numerically.
#[derive(Debug, Clone)]
pub struct InterpolationOrderConfigurator {
    pub options: InterpolationOrderOptions,
    pub value: i64,
    pub variable: String,
}

impl InterpolationOrderConfigurator {
    pub fn new(options: InterpolationOrderOptions) -> Self {
        Self {
            options,
            value: 0,
            variable: String::new(),
        }
    }

    pub fn dependencies(&self) -> Vec<(&'static str, String)> {
        vec![("trajectory", self.options.trajectory.clone())]
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let order = match raw {
            Some(raw) => value::as_i64(raw)?,
            None => self.options.default,
        };
        if !(0..=5).contains(&order) {
            return Err(format!("interpolation order {order} outside 0..=5"));
        }
        let trajectory = deps
            .trajectory(&self.options.trajectory)
            .map_err(|e| e.to_string())?;
        if order == 0 {
            if !trajectory.has_velocities {
                return Err(
                    "order 0 needs stored velocities, but the trajectory has none".to_string()
                );
            }
            self.variable = "velocities".to_string();
        } else {
            self.variable = "coordinates".to_string();
        }
        self.value = order;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!("order {} on {}", self.value, self.variable)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DerivativeOrderOptions {
    pub default: i64,
}

impl Default for DerivativeOrderOptions {
    fn default() -> Self {
        Self {
            default: default_order(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DerivativeOrderConfigurator {
    pub options: DerivativeOrderOptions,
    pub value: i64,
}

impl DerivativeOrderConfigurator {
    pub fn new(options: DerivativeOrderOptions) -> Self {
        Self { options, value: 0 }
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        _deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let order = match raw {
            Some(raw) => value::as_i64(raw)?,
            None => self.options.default,
        };
        if !(1..=5).contains(&order) {
            return Err(format!("derivative order {order} outside 1..=5"));
        }
        self.value = order;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!("order {}", self.value)
    }
}
