//! # Rapidpe
//!
//! The rapidpe follow-up stage of a gravitational-wave workflow generator.
//!
//! The stage reads `rapidpe-method` from the `[workflow-rapidpe]` section of
//! the workflow configuration, optionally scoped by tags, and hands the
//! workflow to the method registered under that identifier. Methods append
//! jobs to the workflow and return the files those jobs will produce.
//!
//! - **Configuration**: sectioned options with tag-scoped subsections
//! - **Workflow model**: files, executables and nodes forming a DAG
//! - **Method registry**: follow-up strategies selected by identifier
//! - **Observability**: structured `tracing` logs around every stage call
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rapidpe::prelude::*;
//!
//! let cp = WorkflowConfigParser::from_json_file("workflow.json")?;
//! let mut workflow = Workflow::new("followup", cp);
//! let outputs = setup_rapidpe_followup_workflow(
//!     &mut workflow,
//!     "rapidpe",
//!     Some(&["POSTPROC1".to_string()]),
//!     &StageParams::new(),
//! )?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod errors;
pub mod observability;
pub mod stages;
pub mod testing;
pub mod workflow;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::WorkflowConfigParser;
    pub use crate::errors::{
        ConfigurationError, ErrorInfo, MissingInputError, OutputConflictError, RapidpeError,
        Result, UnrecognizedMethodError,
    };
    pub use crate::observability::{init_logging, LogFormat};
    pub use crate::stages::{
        setup_rapidpe_followup_workflow, CohPtfMethod, FollowupMethod, MethodRegistry,
        RapidpeFollowup, StageParams,
    };
    pub use crate::workflow::{
        select_generic_executable, DagDocument, ExecutableDescriptor, File, FileList, Node,
        NodeId, Segment, Workflow,
    };
}
