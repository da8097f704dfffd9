//! Settings schema and dependency-ordered configuration.
//!
//! `Settings` is the ordered schema a job declares; `configure` resolves
//! the dependency graph (Kahn's algorithm, declaration order breaking
//! ties), runs every configurator in that order and aggregates the
//! statuses. Validation is cumulative: every configurator is attempted so
//! the caller sees all fixable problems at once. Schema defects (unknown
//! kinds, missing dependency targets, cycles) are fatal instead.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use nscat_core::{NscatError, NscatResult};
use nscat_traj::Trajectory;

use crate::configurator::{Configurator, ConfiguratorKind, Status};
use crate::context::SetupContext;
use crate::kinds::{
    AtomSelectionConfigurator, AtomTransmutationConfigurator, BooleanConfigurator,
    CorrelationFramesConfigurator, DerivativeOrderConfigurator, FloatConfigurator,
    FramesConfigurator, GroupingLevelConfigurator, InputDirectoryConfigurator,
    InputFileConfigurator, InstrumentResolutionConfigurator, IntegerConfigurator,
    InterpolationOrderConfigurator, LiteralConfigurator, MultipleChoicesConfigurator,
    OutputFilesConfigurator, OutputTrajectoryConfigurator, PartialChargeConfigurator,
    ProjectionConfigurator, QVectorsConfigurator, RangeConfigurator, ResultsFileConfigurator,
    RunningModeConfigurator, ScriptFileConfigurator, SingleChoiceConfigurator, StrConfigurator,
    TrajectoryConfigurator, TrajectoryVariableConfigurator, VectorConfigurator,
    WeightsConfigurator,
};

#[derive(Debug, Clone)]
pub struct SettingEntry {
    pub name: String,
    pub kind: ConfiguratorKind,
    pub options: Value,
}

/// Ordered schema: parameter name to (kind, options), in declaration
/// order.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    entries: Vec<SettingEntry>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, kind: ConfiguratorKind, options: Value) -> Self {
        self.entries.push(SettingEntry {
            name: name.to_string(),
            kind,
            options,
        });
        self
    }

    pub fn entries(&self) -> &[SettingEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Instantiate, order and run every configurator against the raw
    /// parameter map (`null` or missing entries mean "use the default").
    pub fn configure(&self, raw: &Value, ctx: &SetupContext) -> NscatResult<Configuration> {
        let empty = Map::new();
        let raw_map = match raw {
            Value::Null => &empty,
            Value::Object(map) => map,
            other => {
                return Err(NscatError::Schema(format!(
                    "job parameters must be an object, got {other}"
                )))
            }
        };
        for key in raw_map.keys() {
            if !self.contains(key) {
                warn!(parameter = %key, "ignoring parameter absent from the job settings");
            }
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|e| e.name == entry.name) {
                return Err(NscatError::Schema(format!(
                    "duplicate parameter '{}' in settings",
                    entry.name
                )));
            }
        }

        let mut instances: Vec<Option<Configurator>> = self
            .entries
            .iter()
            .map(|e| e.kind.build(&e.options).map(Some))
            .collect::<NscatResult<_>>()?;

        // Dependency edges by schema position; unknown targets are fatal.
        let n = self.entries.len();
        let mut dep_indices: Vec<Vec<usize>> = vec![Vec::new(); n];
        for i in 0..n {
            let deps = instances[i].as_ref().expect("instance present").dependencies();
            for (role, target) in deps {
                let target_index = self
                    .entries
                    .iter()
                    .position(|e| e.name == target)
                    .ok_or_else(|| {
                        NscatError::Schema(format!(
                            "parameter '{}' depends on unknown parameter '{}' (role '{}')",
                            self.entries[i].name, target, role
                        ))
                    })?;
                dep_indices[i].push(target_index);
            }
        }

        // Kahn's algorithm; repeated declaration-order sweeps keep the
        // result deterministic with ties resolved by schema order.
        let mut done = vec![false; n];
        let mut order = Vec::with_capacity(n);
        while order.len() < n {
            let before = order.len();
            for i in 0..n {
                if !done[i] && dep_indices[i].iter().all(|&d| done[d]) {
                    done[i] = true;
                    order.push(i);
                }
            }
            if order.len() == before {
                let cyclic: Vec<&str> = (0..n)
                    .filter(|&i| !done[i])
                    .map(|i| self.entries[i].name.as_str())
                    .collect();
                return Err(NscatError::Schema(format!(
                    "dependency cycle among parameters: {}",
                    cyclic.join(", ")
                )));
            }
        }

        let mut configuration = Configuration::default();
        for &i in &order {
            let entry = &self.entries[i];
            let mut configurator = instances[i].take().expect("instance taken once");
            let raw_value = raw_map.get(&entry.name).filter(|v| !v.is_null());
            let status = match configurator.apply(raw_value, &mut configuration, ctx) {
                Ok(()) => Status::Ok,
                Err(message) => Status::Error(message),
            };
            debug!(parameter = %entry.name, status = %status, "configured");
            configuration.entries.insert(
                entry.name.clone(),
                ConfiguredEntry {
                    status,
                    configurator,
                },
            );
        }

        // Present entries in declaration order regardless of the
        // resolution order.
        let mut ordered = IndexMap::with_capacity(n);
        for entry in &self.entries {
            if let Some(configured) = configuration.entries.swap_remove(&entry.name) {
                ordered.insert(entry.name.clone(), configured);
            }
        }
        configuration.entries = ordered;
        Ok(configuration)
    }
}

#[derive(Debug)]
pub struct ConfiguredEntry {
    pub status: Status,
    pub configurator: Configurator,
}

/// The configured parameter map a job reads from.
#[derive(Debug, Default)]
pub struct Configuration {
    entries: IndexMap<String, ConfiguredEntry>,
}

macro_rules! typed_accessor {
    ($fn_name:ident, $variant:ident, $ty:ty) => {
        pub fn $fn_name(&self, name: &str) -> NscatResult<&$ty> {
            match self.checked(name)? {
                Configurator::$variant(c) => Ok(c),
                other => Err(NscatError::Schema(format!(
                    "parameter '{name}' is a {} configurator, not {}",
                    other.kind().name(),
                    ConfiguratorKind::$variant.name()
                ))),
            }
        }
    };
}

impl Configuration {
    pub fn get(&self, name: &str) -> Option<&Configurator> {
        self.entries.get(name).map(|e| &e.configurator)
    }

    pub fn status(&self, name: &str) -> Option<&Status> {
        self.entries.get(name).map(|e| &e.status)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Valid iff every configurator reported OK.
    pub fn is_valid(&self) -> bool {
        self.entries.values().all(|e| e.status.is_ok())
    }

    /// `(parameter, status message)` for every non-OK entry, in
    /// declaration order.
    pub fn failures(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter(|(_, e)| !e.status.is_ok())
            .map(|(name, e)| (name.clone(), e.status.message().to_string()))
            .collect()
    }

    pub fn report(&self) -> String {
        self.failures()
            .into_iter()
            .map(|(name, status)| format!("{name}: {status}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Summary of every configured parameter.
    pub fn information(&self) -> String {
        self.entries
            .iter()
            .map(|(name, e)| match &e.status {
                Status::Ok => format!("{name}: {}", e.configurator.get_information()),
                other => format!("{name}: [{other}]"),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn checked(&self, name: &str) -> NscatResult<&Configurator> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| NscatError::Schema(format!("unknown parameter '{name}'")))?;
        if !entry.status.is_ok() {
            return Err(NscatError::Schema(format!(
                "parameter '{name}' was not configured successfully: {}",
                entry.status
            )));
        }
        Ok(&entry.configurator)
    }

    typed_accessor!(integer, Integer, IntegerConfigurator);
    typed_accessor!(float, Float, FloatConfigurator);
    typed_accessor!(boolean, Boolean, BooleanConfigurator);
    typed_accessor!(string, Str, StrConfigurator);
    typed_accessor!(literal, Literal, LiteralConfigurator);
    typed_accessor!(range, Range, RangeConfigurator);
    typed_accessor!(single_choice, SingleChoice, SingleChoiceConfigurator);
    typed_accessor!(multiple_choices, MultipleChoices, MultipleChoicesConfigurator);
    typed_accessor!(vector, Vector, VectorConfigurator);
    typed_accessor!(input_file, InputFile, InputFileConfigurator);
    typed_accessor!(input_directory, InputDirectory, InputDirectoryConfigurator);
    typed_accessor!(results_file, ResultsFile, ResultsFileConfigurator);
    typed_accessor!(script_file, ScriptFile, ScriptFileConfigurator);
    typed_accessor!(trajectory, Trajectory, TrajectoryConfigurator);
    typed_accessor!(
        trajectory_variable,
        TrajectoryVariable,
        TrajectoryVariableConfigurator
    );
    typed_accessor!(frames, Frames, FramesConfigurator);
    typed_accessor!(
        correlation_frames,
        CorrelationFrames,
        CorrelationFramesConfigurator
    );
    typed_accessor!(
        interpolation_order,
        InterpolationOrder,
        InterpolationOrderConfigurator
    );
    typed_accessor!(derivative_order, DerivativeOrder, DerivativeOrderConfigurator);
    typed_accessor!(atom_selection, AtomSelection, AtomSelectionConfigurator);
    typed_accessor!(grouping_level, GroupingLevel, GroupingLevelConfigurator);
    typed_accessor!(
        atom_transmutation,
        AtomTransmutation,
        AtomTransmutationConfigurator
    );
    typed_accessor!(partial_charge, PartialCharge, PartialChargeConfigurator);
    typed_accessor!(weights, Weights, WeightsConfigurator);
    typed_accessor!(projection, Projection, ProjectionConfigurator);
    typed_accessor!(q_vectors, QVectors, QVectorsConfigurator);
    typed_accessor!(
        instrument_resolution,
        InstrumentResolution,
        InstrumentResolutionConfigurator
    );
    typed_accessor!(output_files, OutputFiles, OutputFilesConfigurator);
    typed_accessor!(output_trajectory, OutputTrajectory, OutputTrajectoryConfigurator);
    typed_accessor!(running_mode, RunningMode, RunningModeConfigurator);

    /// Mutable access for the selection-rewriting configurators.
    pub fn atom_selection_mut(
        &mut self,
        name: &str,
    ) -> NscatResult<&mut AtomSelectionConfigurator> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| NscatError::Schema(format!("unknown parameter '{name}'")))?;
        if !entry.status.is_ok() {
            return Err(NscatError::Schema(format!(
                "parameter '{name}' was not configured successfully: {}",
                entry.status
            )));
        }
        match &mut entry.configurator {
            Configurator::AtomSelection(c) => Ok(c),
            other => Err(NscatError::Schema(format!(
                "parameter '{name}' is a {} configurator, not atom_selection",
                other.kind().name()
            ))),
        }
    }

    /// The opened trajectory behind a trajectory parameter.
    pub fn trajectory_instance(&self, name: &str) -> NscatResult<&Trajectory> {
        self.trajectory(name)?
            .instance()
            .map_err(NscatError::Schema)
    }
}
