//! Configuration helpers shared by the CLI and the directory model.

pub mod size;

pub use size::{parse_size_spec, SizeSpecError};
