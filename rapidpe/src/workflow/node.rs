//! Job nodes.

use super::{ExecutableDescriptor, File, Segment};
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Index of a node within its workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// One command line argument of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Argument {
    /// A flag with an optional literal value.
    Opt {
        /// Flag, e.g. `--approximant`.
        flag: String,
        /// Value, empty for switches.
        value: String,
    },
    /// A flag whose value is a workflow file.
    File {
        /// Flag, e.g. `--trigger-file`.
        flag: String,
        /// Logical file name.
        file: String,
    },
}

/// A single job in the workflow graph.
///
/// Nodes are built detached and only receive an id when the workflow
/// registers them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<NodeId>,
    executable: ExecutableDescriptor,
    arguments: Vec<Argument>,
    inputs: Vec<File>,
    outputs: Vec<File>,
}

impl Node {
    /// Creates a node for `executable`, pre-filled with its configured options.
    #[must_use]
    pub fn new(executable: &ExecutableDescriptor) -> Self {
        let arguments = executable
            .options
            .iter()
            .map(|(flag, value)| Argument::Opt {
                flag: format!("--{flag}"),
                value: value.clone(),
            })
            .collect();

        Self {
            id: None,
            executable: executable.clone(),
            arguments,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Adds a literal option.
    pub fn add_opt(&mut self, flag: impl Into<String>, value: impl Into<String>) {
        self.arguments.push(Argument::Opt {
            flag: flag.into(),
            value: value.into(),
        });
    }

    /// Adds an input file passed with `flag`.
    pub fn add_input_opt(&mut self, flag: impl Into<String>, file: &File) {
        self.arguments.push(Argument::File {
            flag: flag.into(),
            file: file.name().to_string(),
        });
        self.inputs.push(file.clone());
    }

    /// Declares an output file written to `directory` and passed with `flag`.
    pub fn new_output_file_opt(
        &mut self,
        flag: impl Into<String>,
        ifos: Vec<String>,
        segment: Option<Segment>,
        directory: &Path,
        tags: Vec<String>,
    ) -> Result<&File> {
        let description = self.executable.role.to_uppercase();
        let extension = self.executable.kind.output_extension();
        let file = File::new_output(ifos, description, segment, directory, extension, tags)?;

        self.arguments.push(Argument::File {
            flag: flag.into(),
            file: file.name().to_string(),
        });
        self.outputs.push(file);
        Ok(&self.outputs[self.outputs.len() - 1])
    }

    /// Id assigned by the workflow, if registered.
    #[must_use]
    pub const fn id(&self) -> Option<NodeId> {
        self.id
    }

    /// Executable run by this node.
    #[must_use]
    pub const fn executable(&self) -> &ExecutableDescriptor {
        &self.executable
    }

    /// Arguments in command line order.
    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Files consumed.
    #[must_use]
    pub fn inputs(&self) -> &[File] {
        &self.inputs
    }

    /// Files produced.
    #[must_use]
    pub fn outputs(&self) -> &[File] {
        &self.outputs
    }

    /// Renders the argument list as it would appear on a command line.
    #[must_use]
    pub fn command_line(&self) -> Vec<String> {
        let mut line = vec![self.executable.path.display().to_string()];
        for arg in &self.arguments {
            match arg {
                Argument::Opt { flag, value } => {
                    line.push(flag.clone());
                    if !value.is_empty() {
                        line.push(value.clone());
                    }
                }
                Argument::File { flag, file } => {
                    line.push(flag.clone());
                    line.push(file.clone());
                }
            }
        }
        line
    }

    pub(crate) fn assign_id(&mut self, id: NodeId) {
        self.id = Some(id);
        for output in &mut self.outputs {
            output.set_node(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::ExecutableKind;
    use std::collections::BTreeMap;

    fn descriptor() -> ExecutableDescriptor {
        ExecutableDescriptor {
            role: "rapidpe".to_string(),
            name: "rapidpe_integrate_extrinsic_likelihood".to_string(),
            path: "/opt/bin/rapidpe_integrate_extrinsic_likelihood".into(),
            kind: ExecutableKind::IntegrateExtrinsicLikelihood,
            options: vec![
                ("approximant".to_string(), "SEOBNRv4".to_string()),
                ("save-samples".to_string(), String::new()),
            ],
            profiles: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_node_command_line() {
        let input = File::new(
            vec!["H1".to_string()],
            "COH_PTF_INSPIRAL",
            None,
            "/data/H1-COH_PTF_INSPIRAL.xml.gz",
            Vec::new(),
        )
        .unwrap();

        let mut node = descriptor().create_node();
        node.add_input_opt("--trigger-file", &input);
        node.add_opt("--gps-start-time", "100");
        let out = node
            .new_output_file_opt(
                "--output-file",
                vec!["H1".to_string()],
                Some(Segment::new(100, 200).unwrap()),
                Path::new("/out"),
                vec!["0".to_string()],
            )
            .unwrap();
        assert_eq!(out.name(), "H1-RAPIDPE_0-100-100.xml.gz");

        assert_eq!(
            node.command_line(),
            vec![
                "/opt/bin/rapidpe_integrate_extrinsic_likelihood",
                "--approximant",
                "SEOBNRv4",
                "--save-samples",
                "--trigger-file",
                "H1-COH_PTF_INSPIRAL.xml.gz",
                "--gps-start-time",
                "100",
                "--output-file",
                "H1-RAPIDPE_0-100-100.xml.gz",
            ]
        );
        assert_eq!(node.inputs().len(), 1);
        assert!(node.id().is_none());
    }

    #[test]
    fn test_assign_id_marks_outputs() {
        let mut node = descriptor().create_node();
        node.new_output_file_opt("--output-file", vec!["L1".to_string()], None, Path::new("out"), Vec::new())
            .unwrap();
        node.assign_id(NodeId(7));

        assert_eq!(node.id(), Some(NodeId(7)));
        assert_eq!(node.outputs()[0].node(), Some(NodeId(7)));
        assert_eq!(NodeId(7).to_string(), "node-7");
    }
}
