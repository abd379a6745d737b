//! Testing utilities for rapidpe stages.

mod fixtures;

pub use fixtures::{TestWorkflow, INPUT_DIR};
