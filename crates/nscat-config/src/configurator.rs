//! The closed set of configurator kinds and the dispatching wrapper.
//!
//! The registry is plain data: `ConfiguratorKind::from_name` plus
//! `build` form an explicit factory, with no side-effecting registration.

use serde_json::Value;

use nscat_core::{NscatError, NscatResult};

use crate::configurable::Configuration;
use crate::context::SetupContext;
use crate::kinds::atoms::{
    AtomSelectionConfigurator, AtomSelectionOptions, AtomTransmutationConfigurator,
    AtomTransmutationOptions, GroupingLevelConfigurator, GroupingLevelOptions,
    PartialChargeConfigurator, PartialChargeOptions, WeightsConfigurator, WeightsOptions,
};
use crate::kinds::choices::{
    MultipleChoicesConfigurator, MultipleChoicesOptions, SingleChoiceConfigurator,
    SingleChoiceOptions,
};
use crate::kinds::files::{
    InputDirectoryConfigurator, InputDirectoryOptions, InputFileConfigurator, InputFileOptions,
    ResultsFileConfigurator, ResultsFileOptions, ScriptFileConfigurator, ScriptFileOptions,
};
use crate::kinds::mode::{RunningModeConfigurator, RunningModeOptions};
use crate::kinds::output::{
    OutputFilesConfigurator, OutputFilesOptions, OutputTrajectoryConfigurator,
    OutputTrajectoryOptions,
};
use crate::kinds::primitives::{
    BooleanConfigurator, BooleanOptions, FloatConfigurator, FloatOptions, IntegerConfigurator,
    IntegerOptions, LiteralConfigurator, LiteralOptions, StrConfigurator, StrOptions,
};
use crate::kinds::projection::{ProjectionConfigurator, ProjectionOptions};
use crate::kinds::qvectors::{QVectorsConfigurator, QVectorsOptions};
use crate::kinds::range::{RangeConfigurator, RangeOptions};
use crate::kinds::resolution::{InstrumentResolutionConfigurator, InstrumentResolutionOptions};
use crate::kinds::trajectory::{
    CorrelationFramesConfigurator, CorrelationFramesOptions, DerivativeOrderConfigurator,
    DerivativeOrderOptions, FramesConfigurator, FramesOptions, InterpolationOrderConfigurator,
    InterpolationOrderOptions, TrajectoryConfigurator, TrajectoryOptions,
    TrajectoryVariableConfigurator, TrajectoryVariableOptions,
};
use crate::kinds::vector::{VectorConfigurator, VectorOptions};

/// Outcome of the last `configure` call; "OK" iff it succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Unconfigured,
    Ok,
    Error(String),
}

impl Status {
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }

    pub fn message(&self) -> &str {
        match self {
            Status::Unconfigured => "not configured",
            Status::Ok => "OK",
            Status::Error(msg) => msg,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

macro_rules! configurator_kinds {
    ($( $variant:ident => ($name:literal, $conf:ty, $opts:ty) ),+ $(,)?) => {
        /// Kind tag of a configurator; the set is closed.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ConfiguratorKind {
            $($variant),+
        }

        impl ConfiguratorKind {
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn all() -> &'static [ConfiguratorKind] {
                &[$(Self::$variant),+]
            }

            /// Instantiate a configurator of this kind from its (possibly
            /// null) options object. Malformed options are programmer
            /// errors in the schema, not user input failures.
            pub fn build(&self, options: &Value) -> NscatResult<Configurator> {
                let options = if options.is_null() {
                    Value::Object(Default::default())
                } else {
                    options.clone()
                };
                match self {
                    $(Self::$variant => {
                        let opts: $opts = serde_json::from_value(options).map_err(|e| {
                            NscatError::Schema(format!(
                                "bad options for {} configurator: {e}",
                                $name
                            ))
                        })?;
                        Ok(Configurator::$variant(<$conf>::new(opts)))
                    })+
                }
            }
        }

        /// One typed input validator for a single job parameter.
        #[derive(Debug, Clone)]
        pub enum Configurator {
            $($variant($conf)),+
        }

        impl Configurator {
            pub fn kind(&self) -> ConfiguratorKind {
                match self {
                    $(Self::$variant(_) => ConfiguratorKind::$variant),+
                }
            }

            pub(crate) fn apply(
                &mut self,
                raw: Option<&Value>,
                deps: &mut Configuration,
                ctx: &SetupContext,
            ) -> Result<(), String> {
                match self {
                    $(Self::$variant(c) => c.apply(raw, deps, ctx)),+
                }
            }

            /// Human-readable summary of the configured state.
            pub fn get_information(&self) -> String {
                match self {
                    $(Self::$variant(c) => c.information()),+
                }
            }
        }
    };
}

configurator_kinds! {
    Integer => ("integer", IntegerConfigurator, IntegerOptions),
    Float => ("float", FloatConfigurator, FloatOptions),
    Boolean => ("boolean", BooleanConfigurator, BooleanOptions),
    Str => ("string", StrConfigurator, StrOptions),
    Literal => ("literal", LiteralConfigurator, LiteralOptions),
    Range => ("range", RangeConfigurator, RangeOptions),
    SingleChoice => ("single_choice", SingleChoiceConfigurator, SingleChoiceOptions),
    MultipleChoices => ("multiple_choices", MultipleChoicesConfigurator, MultipleChoicesOptions),
    Vector => ("vector", VectorConfigurator, VectorOptions),
    InputFile => ("input_file", InputFileConfigurator, InputFileOptions),
    InputDirectory => ("input_directory", InputDirectoryConfigurator, InputDirectoryOptions),
    ResultsFile => ("results_file", ResultsFileConfigurator, ResultsFileOptions),
    ScriptFile => ("script_file", ScriptFileConfigurator, ScriptFileOptions),
    Trajectory => ("trajectory", TrajectoryConfigurator, TrajectoryOptions),
    TrajectoryVariable => ("trajectory_variable", TrajectoryVariableConfigurator, TrajectoryVariableOptions),
    Frames => ("frames", FramesConfigurator, FramesOptions),
    CorrelationFrames => ("correlation_frames", CorrelationFramesConfigurator, CorrelationFramesOptions),
    InterpolationOrder => ("interpolation_order", InterpolationOrderConfigurator, InterpolationOrderOptions),
    DerivativeOrder => ("derivative_order", DerivativeOrderConfigurator, DerivativeOrderOptions),
    AtomSelection => ("atom_selection", AtomSelectionConfigurator, AtomSelectionOptions),
    GroupingLevel => ("grouping_level", GroupingLevelConfigurator, GroupingLevelOptions),
    AtomTransmutation => ("atom_transmutation", AtomTransmutationConfigurator, AtomTransmutationOptions),
    PartialCharge => ("partial_charge", PartialChargeConfigurator, PartialChargeOptions),
    Weights => ("weights", WeightsConfigurator, WeightsOptions),
    Projection => ("projection", ProjectionConfigurator, ProjectionOptions),
    QVectors => ("q_vectors", QVectorsConfigurator, QVectorsOptions),
    InstrumentResolution => ("instrument_resolution", InstrumentResolutionConfigurator, InstrumentResolutionOptions),
    OutputFiles => ("output_files", OutputFilesConfigurator, OutputFilesOptions),
    OutputTrajectory => ("output_trajectory", OutputTrajectoryConfigurator, OutputTrajectoryOptions),
    RunningMode => ("running_mode", RunningModeConfigurator, RunningModeOptions),
}

impl Configurator {
    /// Declared dependencies as `(role, parameter name)` pairs.
    pub fn dependencies(&self) -> Vec<(&'static str, String)> {
        match self {
            Configurator::TrajectoryVariable(c) => c.dependencies(),
            Configurator::Frames(c) => c.dependencies(),
            Configurator::CorrelationFrames(c) => c.dependencies(),
            Configurator::InterpolationOrder(c) => c.dependencies(),
            Configurator::AtomSelection(c) => c.dependencies(),
            Configurator::GroupingLevel(c) => c.dependencies(),
            Configurator::AtomTransmutation(c) => c.dependencies(),
            Configurator::PartialCharge(c) => c.dependencies(),
            Configurator::Weights(c) => c.dependencies(),
            Configurator::QVectors(c) => c.dependencies(),
            Configurator::InstrumentResolution(c) => c.dependencies(),
            _ => Vec::new(),
        }
    }
}
