//! Resolution of logical executable roles to concrete job templates.

use super::{Node, Workflow};
use crate::config::WorkflowConfigParser;
use crate::errors::{ConfigurationError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Section mapping roles to executable paths.
pub const EXECUTABLES_SECTION: &str = "executables";

/// Prefix of the sections holding scheduler profiles for a role.
pub const PROFILE_SECTION_PREFIX: &str = "pegasus_profile";

/// Known rapidpe executables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutableKind {
    /// Marginalises the likelihood over extrinsic parameters.
    IntegrateExtrinsicLikelihood,
    /// Builds the intrinsic parameter grid.
    ComputeIntrinsicGrid,
    /// Writes a per-event sub-DAG.
    CreateEventDag,
}

impl ExecutableKind {
    /// Catalog of executable basenames and their kinds.
    pub const CATALOG: [(&'static str, Self); 3] = [
        (
            "rapidpe_integrate_extrinsic_likelihood",
            Self::IntegrateExtrinsicLikelihood,
        ),
        ("rapidpe_compute_intrinsic_grid", Self::ComputeIntrinsicGrid),
        ("rapidpe_create_event_dag", Self::CreateEventDag),
    ];

    /// Looks up an executable by basename.
    #[must_use]
    pub fn from_basename(name: &str) -> Option<Self> {
        Self::CATALOG
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, kind)| *kind)
    }

    /// Extension of the files this executable writes.
    #[must_use]
    pub const fn output_extension(self) -> &'static str {
        match self {
            Self::IntegrateExtrinsicLikelihood | Self::ComputeIntrinsicGrid => "xml.gz",
            Self::CreateEventDag => "dag",
        }
    }
}

/// A concrete, configured job template for a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutableDescriptor {
    /// Logical role, e.g. `rapidpe`.
    pub role: String,
    /// Executable basename.
    pub name: String,
    /// Full executable path.
    pub path: PathBuf,
    /// Kind resolved from the catalog.
    pub kind: ExecutableKind,
    /// Command line options, plain section first then tagged subsections.
    pub options: Vec<(String, String)>,
    /// Scheduler profiles (namespace|key -> value).
    pub profiles: BTreeMap<String, String>,
    /// Tags the descriptor was resolved with.
    pub tags: Vec<String>,
}

impl ExecutableDescriptor {
    /// Creates a node running this executable.
    #[must_use]
    pub fn create_node(&self) -> Node {
        Node::new(self)
    }
}

/// Resolves `role` to an executable using `[executables]`, the `[role]`
/// option sections and `[pegasus_profile-role]`.
///
/// # Errors
///
/// Fails when the role has no executable path or the executable is not in
/// [`ExecutableKind::CATALOG`].
pub fn select_generic_executable(
    workflow: &Workflow,
    role: &str,
    tags: &[String],
) -> Result<ExecutableDescriptor> {
    resolve_executable(workflow.config(), role, tags)
}

fn resolve_executable(
    cp: &WorkflowConfigParser,
    role: &str,
    tags: &[String],
) -> Result<ExecutableDescriptor> {
    let path = PathBuf::from(cp.get(EXECUTABLES_SECTION, role)?);
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let kind = ExecutableKind::from_basename(&name).ok_or_else(|| {
        let known: Vec<&str> = ExecutableKind::CATALOG.iter().map(|(n, _)| *n).collect();
        ConfigurationError::option(
            EXECUTABLES_SECTION,
            role,
            format!(
                "no job class exists for executable '{}'; known executables: {}",
                display_name(&path, &name),
                known.join(", ")
            ),
        )
    })?;

    let options = cp
        .sections_for_tags(role, tags)
        .iter()
        .flat_map(|section| cp.items(section))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let profiles = cp
        .sections_for_tags(&format!("{PROFILE_SECTION_PREFIX}-{role}"), tags)
        .iter()
        .flat_map(|section| cp.items(section))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    Ok(ExecutableDescriptor {
        role: role.to_string(),
        name,
        path,
        kind,
        options,
        profiles,
        tags: tags.to_vec(),
    })
}

fn display_name(path: &Path, name: &str) -> String {
    if name.is_empty() {
        path.display().to_string()
    } else {
        name.to_string()
    }
}
