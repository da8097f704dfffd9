#![forbid(unsafe_code)]

pub mod file;
pub mod frame;
pub mod memory;
pub mod trajectory;
pub mod writer;

pub use file::{Compression, Dtype};
pub use frame::FrameView;
pub use memory::MemoryTrajectoryBuilder;
pub use trajectory::{FrameReader, Trajectory};
pub use writer::TrajectoryWriter;
