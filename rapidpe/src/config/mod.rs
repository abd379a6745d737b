//! Workflow configuration.
//!
//! The configuration is a two-level `section -> option -> value` store.
//! Lookups can be scoped by tags: a tag `POSTPROC1` on section
//! `workflow-rapidpe` also searches `[workflow-rapidpe-postproc1]`.

mod parser;

pub use parser::{Sections, WorkflowConfigParser};
