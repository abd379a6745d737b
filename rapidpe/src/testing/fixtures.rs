//! Test fixtures for building workflows.

use crate::config::WorkflowConfigParser;
use crate::errors::Result;
use crate::stages::{CohPtfMethod, DEFAULT_TRIGGER_DESCRIPTION, METHOD_OPTION, RAPIDPE_SECTION};
use crate::workflow::{File, Segment, Workflow, EXECUTABLES_SECTION};
use std::path::{Path, PathBuf};

/// Directory external input files are placed in.
pub const INPUT_DIR: &str = "/data/inputs";

#[derive(Debug, Clone)]
struct InputSpec {
    ifos: Vec<String>,
    description: String,
    segment: Option<(i64, i64)>,
    tags: Vec<String>,
}

/// A workflow builder for tests.
#[derive(Debug, Default)]
pub struct TestWorkflow {
    /// Workflow name.
    pub name: Option<String>,
    /// Configuration to start from.
    pub config: WorkflowConfigParser,
    inputs: Vec<InputSpec>,
}

impl TestWorkflow {
    /// Creates a new test workflow builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the workflow name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets a configuration option.
    #[must_use]
    pub fn with_option(mut self, section: &str, option: &str, value: &str) -> Self {
        self.config.set(section, option, value);
        self
    }

    /// Selects the rapidpe method in the plain `[workflow-rapidpe]` section.
    #[must_use]
    pub fn with_method(self, method: &str) -> Self {
        self.with_option(RAPIDPE_SECTION, METHOD_OPTION, method)
    }

    /// Configures the default `COH_PTF_WORKFLOW` method.
    #[must_use]
    pub fn with_coh_ptf_method(self) -> Self {
        self.with_method(CohPtfMethod::IDENTIFIER)
    }

    /// Maps an executable role to a path.
    #[must_use]
    pub fn with_executable(self, role: &str, path: &str) -> Self {
        self.with_option(EXECUTABLES_SECTION, role, path)
    }

    /// Adds an external input file.
    #[must_use]
    pub fn with_input(
        mut self,
        ifos: &[&str],
        description: &str,
        segment: Option<(i64, i64)>,
        tags: &[&str],
    ) -> Self {
        self.inputs.push(InputSpec {
            ifos: ifos.iter().map(|s| (*s).to_string()).collect(),
            description: description.to_string(),
            segment,
            tags: tags.iter().map(|s| (*s).to_string()).collect(),
        });
        self
    }

    /// Adds a trigger file with the default trigger description.
    #[must_use]
    pub fn with_trigger(self, ifos: &[&str], start: i64, end: i64, tags: &[&str]) -> Self {
        self.with_input(ifos, DEFAULT_TRIGGER_DESCRIPTION, Some((start, end)), tags)
    }

    /// Builds the workflow, registering every input file.
    pub fn build(self) -> Result<Workflow> {
        let name = self.name.unwrap_or_else(|| "test-workflow".to_string());
        let mut workflow = Workflow::new(name, self.config);
        let dir = PathBuf::from(INPUT_DIR);

        for spec in self.inputs {
            workflow.add_input_file(input_file(&dir, spec)?)?;
        }
        Ok(workflow)
    }
}

fn input_file(dir: &Path, spec: InputSpec) -> Result<File> {
    let segment = spec
        .segment
        .map(|(start, end)| Segment::new(start, end))
        .transpose()?;
    File::new_output(spec.ifos, spec.description, segment, dir, "xml.gz", spec.tags)
}
