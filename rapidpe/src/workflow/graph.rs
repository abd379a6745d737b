//! The workflow aggregate.

use super::{File, FileList, Node, NodeId};
use crate::config::WorkflowConfigParser;
use crate::errors::{MissingInputError, OutputConflictError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// A workflow under construction.
///
/// Stages receive the workflow by `&mut` and only ever append to it.
/// Every registered file is unique by logical name.
#[derive(Debug, Clone)]
pub struct Workflow {
    name: String,
    cp: WorkflowConfigParser,
    nodes: Vec<Node>,
    files: FileList,
    by_name: HashMap<String, usize>,
}

impl Workflow {
    /// Creates an empty workflow.
    #[must_use]
    pub fn new(name: impl Into<String>, cp: WorkflowConfigParser) -> Self {
        Self {
            name: name.into(),
            cp,
            nodes: Vec::new(),
            files: FileList::new(),
            by_name: HashMap::new(),
        }
    }

    /// Workflow name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared configuration.
    #[must_use]
    pub const fn config(&self) -> &WorkflowConfigParser {
        &self.cp
    }

    /// Registered nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of registered nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Looks up a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Every file known to the workflow, inputs first then node outputs, in
    /// registration order.
    #[must_use]
    pub const fn files(&self) -> &FileList {
        &self.files
    }

    /// Registers a file produced outside this workflow.
    ///
    /// Any producing node recorded on `file` is discarded: only
    /// [`add_nodes`](Self::add_nodes) establishes provenance.
    ///
    /// # Errors
    ///
    /// Fails if the name is already registered or the naming fields are invalid.
    pub fn add_input_file(&mut self, mut file: File) -> Result<()> {
        file.validate()?;
        file.clear_node();
        if self.by_name.contains_key(file.name()) {
            return Err(OutputConflictError::new(file.name(), "file is already registered").into());
        }
        self.register_file(file);
        Ok(())
    }

    /// Registers a single node. See [`add_nodes`](Self::add_nodes).
    pub fn add_node(&mut self, node: Node) -> Result<NodeId> {
        let mut ids = self.add_nodes(vec![node])?;
        Ok(ids.remove(0))
    }

    /// Registers a batch of nodes atomically.
    ///
    /// Inputs must already be registered or be produced by an earlier node
    /// of the same batch; outputs must not collide with any registered file
    /// or with each other. On error nothing is appended.
    pub fn add_nodes(&mut self, nodes: Vec<Node>) -> Result<Vec<NodeId>> {
        let mut pending: HashSet<&str> = HashSet::new();
        for node in &nodes {
            for input in node.inputs() {
                if !self.by_name.contains_key(input.name()) && !pending.contains(input.name()) {
                    return Err(MissingInputError::new(
                        node.executable().role.as_str(),
                        format!("input file '{}' is not registered in the workflow", input.name()),
                    )
                    .into());
                }
            }
            for output in node.outputs() {
                if self.by_name.contains_key(output.name()) || !pending.insert(output.name()) {
                    return Err(OutputConflictError::new(
                        output.name(),
                        "another node already produces this file",
                    )
                    .into());
                }
            }
        }

        let mut ids = Vec::with_capacity(nodes.len());
        for mut node in nodes {
            let id = NodeId(self.nodes.len());
            node.assign_id(id);
            for output in node.outputs() {
                self.register_file(output.clone());
            }
            tracing::debug!(
                workflow = %self.name,
                node = %id,
                executable = %node.executable().name,
                outputs = node.outputs().len(),
                "Added node"
            );
            self.nodes.push(node);
            ids.push(id);
        }
        Ok(ids)
    }

    /// Nodes producing the inputs of `id`, ascending and de-duplicated.
    #[must_use]
    pub fn parents(&self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        node.inputs()
            .iter()
            .filter_map(|input| self.producer_of(input.name()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Node producing the named file, if the file came from a node.
    #[must_use]
    pub fn producer_of(&self, name: &str) -> Option<NodeId> {
        let index = *self.by_name.get(name)?;
        self.files.get(index)?.node()
    }

    /// Exports the graph for an external workflow engine.
    #[must_use]
    pub fn to_dag(&self) -> DagDocument {
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| DagNode {
                id: NodeId(index),
                executable: node.executable().name.clone(),
                command_line: node.command_line(),
                inputs: node.inputs().iter().map(|f| f.name().to_string()).collect(),
                outputs: node.outputs().iter().map(|f| f.name().to_string()).collect(),
                profiles: node
                    .executable()
                    .profiles
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            })
            .collect();

        let edges = (0..self.nodes.len())
            .flat_map(|child| {
                self.parents(NodeId(child))
                    .into_iter()
                    .map(move |parent| DagEdge {
                        parent,
                        child: NodeId(child),
                    })
            })
            .collect();

        DagDocument {
            name: self.name.clone(),
            nodes,
            edges,
        }
    }

    fn register_file(&mut self, file: File) {
        self.by_name.insert(file.name().to_string(), self.files.len());
        self.files.push(file);
    }
}

/// Serializable snapshot of the workflow graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagDocument {
    /// Workflow name.
    pub name: String,
    /// Jobs.
    pub nodes: Vec<DagNode>,
    /// Parent/child dependencies.
    pub edges: Vec<DagEdge>,
}

/// A job in a [`DagDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagNode {
    /// Node id.
    pub id: NodeId,
    /// Executable basename.
    pub executable: String,
    /// Full command line.
    pub command_line: Vec<String>,
    /// Logical input names.
    pub inputs: Vec<String>,
    /// Logical output names.
    pub outputs: Vec<String>,
    /// Scheduler profiles.
    pub profiles: Vec<(String, String)>,
}

/// A dependency in a [`DagDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagEdge {
    /// Producing node.
    pub parent: NodeId,
    /// Consuming node.
    pub child: NodeId,
}
