//! Workflow model: files, nodes, executables and the graph they form.

mod dirs;
mod executable;
mod file;
mod graph;
mod node;
mod segment;

pub use dirs::make_analysis_dir;
pub use executable::{
    select_generic_executable, ExecutableDescriptor, ExecutableKind, EXECUTABLES_SECTION,
    PROFILE_SECTION_PREFIX,
};
pub use file::{File, FileList};
pub use graph::{DagDocument, DagEdge, DagNode, Workflow};
pub use node::{Argument, Node, NodeId};
pub use segment::Segment;
