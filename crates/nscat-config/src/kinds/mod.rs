pub mod atoms;
pub mod choices;
pub mod files;
pub mod mode;
pub mod output;
pub mod primitives;
pub mod projection;
pub mod qvectors;
pub mod range;
pub mod resolution;
pub mod trajectory;
pub mod vector;

pub use atoms::{
    AtomSelectionConfigurator, AtomTransmutationConfigurator, GroupingLevelConfigurator,
    PartialChargeConfigurator, WeightsConfigurator,
};
pub use choices::{MultipleChoicesConfigurator, SingleChoiceConfigurator};
pub use files::{
    InputDirectoryConfigurator, InputFileConfigurator, ResultsFileConfigurator,
    ScriptFileConfigurator,
};
pub use mode::{RunMode, RunningModeConfigurator};
pub use output::{OutputFilesConfigurator, OutputTrajectoryConfigurator};
pub use primitives::{
    BooleanConfigurator, FloatConfigurator, IntegerConfigurator, LiteralConfigurator,
    StrConfigurator,
};
pub use projection::{ProjectionConfigurator, Projector};
pub use qvectors::{QShell, QVectorsConfigurator};
pub use range::RangeConfigurator;
pub use resolution::{InstrumentResolutionConfigurator, RESOLUTION_DMAX};
pub use trajectory::{
    CorrelationFramesConfigurator, DerivativeOrderConfigurator, FramesConfigurator,
    InterpolationOrderConfigurator, TrajectoryConfigurator, TrajectoryVariableConfigurator,
};
pub use vector::VectorConfigurator;
