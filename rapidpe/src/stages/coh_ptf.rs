//! Rapidpe as a sub-workflow of a coh_PTF style main workflow.
//!
//! Every coherent trigger file already in the workflow becomes one rapidpe
//! job. Jobs are validated as a batch before any of them is registered, so a
//! failure leaves the workflow exactly as it was.

use super::{FollowupMethod, StageParams, RAPIDPE_SECTION};
use crate::config::WorkflowConfigParser;
use crate::errors::{ConfigurationError, MissingInputError, Result};
use crate::workflow::{select_generic_executable, FileList, Workflow};
use std::path::Path;

/// Executable role resolved through `[executables]`.
pub const RAPIDPE_ROLE: &str = "rapidpe";

/// Trigger description used when nothing else is configured.
pub const DEFAULT_TRIGGER_DESCRIPTION: &str = "COH_PTF_INSPIRAL";

/// Option naming the description of upstream trigger files.
pub const TRIGGER_DESCRIPTION_OPTION: &str = "rapidpe-trigger-description";

/// Stage parameter overriding [`TRIGGER_DESCRIPTION_OPTION`].
pub const TRIGGER_DESCRIPTION_PARAM: &str = "trigger-description";

/// Option naming the description of template bank files, if jobs need one.
pub const BANK_DESCRIPTION_OPTION: &str = "rapidpe-bank-description";

/// Flag carrying each job's output file.
pub const OUTPUT_FILE_FLAG: &str = "--output-file";

/// The `COH_PTF_WORKFLOW` method.
#[derive(Debug, Clone, Copy, Default)]
pub struct CohPtfMethod;

impl CohPtfMethod {
    /// Identifier under which the method registers.
    pub const IDENTIFIER: &'static str = "COH_PTF_WORKFLOW";
}

impl FollowupMethod for CohPtfMethod {
    fn identifier(&self) -> &str {
        Self::IDENTIFIER
    }

    fn setup(
        &self,
        workflow: &mut Workflow,
        output_dir: &Path,
        tags: &[String],
        params: &StageParams,
    ) -> Result<FileList> {
        let trigger_description = trigger_description(workflow.config(), tags, params)?;
        let triggers = workflow.files().find_by_description(&trigger_description);
        if triggers.is_empty() {
            tracing::warn!(
                description = %trigger_description,
                "No upstream trigger files, rapidpe adds no jobs"
            );
            return Ok(FileList::new());
        }

        let bank_description =
            workflow
                .config()
                .get_opt_tags_optional(RAPIDPE_SECTION, BANK_DESCRIPTION_OPTION, tags)?;
        let exe = select_generic_executable(workflow, RAPIDPE_ROLE, tags)?;

        let mut nodes = Vec::with_capacity(triggers.len());
        for (index, trigger) in triggers.iter().enumerate() {
            let mut node = exe.create_node();
            node.add_input_opt("--trigger-file", trigger);

            if let Some(bank_description) = &bank_description {
                let bank = workflow
                    .files()
                    .find_output_covering(bank_description, trigger.segment())
                    .ok_or_else(|| {
                        MissingInputError::new(
                            RAPIDPE_ROLE,
                            format!(
                                "no '{bank_description}' file covers trigger file '{}'",
                                trigger.name()
                            ),
                        )
                    })?;
                node.add_input_opt("--template-bank", bank);
            }

            if let Some(segment) = trigger.segment() {
                node.add_opt("--gps-start-time", segment.start().to_string());
                node.add_opt("--gps-end-time", segment.end().to_string());
            }

            let mut output_tags = tags.to_vec();
            output_tags.push(index.to_string());
            node.new_output_file_opt(
                OUTPUT_FILE_FLAG,
                trigger.ifos().to_vec(),
                trigger.segment(),
                output_dir,
                output_tags,
            )?;
            nodes.push(node);
        }

        let ids = workflow.add_nodes(nodes)?;
        let outputs: FileList = ids
            .iter()
            .filter_map(|id| workflow.node(*id))
            .flat_map(|node| node.outputs().iter().cloned())
            .collect();

        tracing::info!(
            jobs = ids.len(),
            executable = %exe.name,
            output_dir = %output_dir.display(),
            "Added rapidpe jobs"
        );
        Ok(outputs)
    }
}

fn trigger_description(
    cp: &WorkflowConfigParser,
    tags: &[String],
    params: &StageParams,
) -> Result<String> {
    if let Some(value) = params.get(TRIGGER_DESCRIPTION_PARAM) {
        return value.as_str().map(str::to_string).ok_or_else(|| {
            ConfigurationError::option(
                "stage parameters",
                TRIGGER_DESCRIPTION_PARAM,
                "value must be a string",
            )
            .into()
        });
    }

    Ok(cp
        .get_opt_tags_optional(RAPIDPE_SECTION, TRIGGER_DESCRIPTION_OPTION, tags)?
        .unwrap_or_else(|| DEFAULT_TRIGGER_DESCRIPTION.to_string()))
}
