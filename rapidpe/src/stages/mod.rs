//! The rapidpe follow-up stage.
//!
//! [`setup_rapidpe_followup_workflow`] reads `rapidpe-method` from
//! `[workflow-rapidpe]` and hands the workflow to the [`FollowupMethod`]
//! registered under that identifier. Methods live in a [`MethodRegistry`]
//! so new ones are added by registration alone.

mod coh_ptf;
mod dispatch;
mod registry;

#[cfg(test)]
mod integration_tests;

pub use coh_ptf::{
    CohPtfMethod, BANK_DESCRIPTION_OPTION, DEFAULT_TRIGGER_DESCRIPTION, OUTPUT_FILE_FLAG,
    RAPIDPE_ROLE, TRIGGER_DESCRIPTION_OPTION, TRIGGER_DESCRIPTION_PARAM,
};
pub use dispatch::{
    setup_rapidpe_followup_workflow, RapidpeFollowup, METHOD_OPTION, RAPIDPE_SECTION, STAGE_NAME,
};
pub use registry::MethodRegistry;

use crate::errors::Result;
use crate::workflow::{FileList, Workflow};
use std::fmt::Debug;
use std::path::Path;

/// Open-ended keyword parameters forwarded verbatim to the selected method.
pub type StageParams = serde_json::Map<String, serde_json::Value>;

/// A way of setting up the rapidpe stage.
///
/// Implementations append nodes to the workflow and return the files those
/// nodes produce, in the order downstream stages should see them.
pub trait FollowupMethod: Send + Sync + Debug {
    /// Identifier matched against `rapidpe-method`.
    fn identifier(&self) -> &str;

    /// Builds the stage.
    ///
    /// # Arguments
    ///
    /// * `workflow` - The workflow nodes are added to
    /// * `output_dir` - Directory for output files (already created)
    /// * `tags` - Tags scoping configuration and naming outputs
    /// * `params` - Extra parameters passed through the dispatcher
    fn setup(
        &self,
        workflow: &mut Workflow,
        output_dir: &Path,
        tags: &[String],
        params: &StageParams,
    ) -> Result<FileList>;
}
