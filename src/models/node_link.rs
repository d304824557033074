//! Node-link interchange format for job graphs.
//!
//! ```text
//! { "directed": true,
//!   "nodes": [ { "id": "start" }, ... ],
//!   "links": [ { "source": "start", "target": "J4_M1_1", "weight": 2,
//!                "parallel_machines": [["start", "J4_M1_1"], ...] }, ... ] }
//! ```
//!
//! Loading then storing a graph is loss-free for nodes, links, weights
//! and round groups.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::graph::{EdgeKey, JobGraph, Link, NodeId};
use crate::error::{ScheduleError, ScheduleResult};

/// Serialized form of a [`JobGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLinkGraph {
    /// Always `true` for schedule graphs.
    pub directed: bool,
    /// Declared nodes in order.
    pub nodes: Vec<NodeEntry>,
    /// Links in order.
    pub links: Vec<LinkEntry>,
}

/// A node record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntry {
    /// Node identifier.
    pub id: NodeId,
}

/// A link record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    /// Predecessor node.
    pub source: NodeId,
    /// Successor node.
    pub target: NodeId,
    /// Slice duration.
    pub weight: u32,
    /// Round group; empty when absent.
    #[serde(default)]
    pub parallel_machines: Vec<EdgeKey>,
}

impl JobGraph {
    /// Reconstructs a graph from its node-link form.
    ///
    /// Nodes referenced only by links are added implicitly, after the
    /// declared nodes.
    ///
    /// # Errors
    /// `Format` if the graph is undirected, declares a node twice, or
    /// contains two links with the same `(source, target)`.
    pub fn from_node_link(data: NodeLinkGraph) -> ScheduleResult<Self> {
        if !data.directed {
            return Err(ScheduleError::Format(
                "schedule graphs must be directed".into(),
            ));
        }

        let mut graph = JobGraph::new();
        for node in data.nodes {
            let id = node.id;
            if !graph.add_node(id.clone()) {
                return Err(ScheduleError::Format(format!("duplicate node id '{id}'")));
            }
        }

        let mut seen: HashSet<EdgeKey> = HashSet::new();
        for entry in data.links {
            let link = Link::new(entry.source, entry.target, entry.weight)
                .with_parallel_machines(entry.parallel_machines);
            if !seen.insert(link.key()) {
                return Err(ScheduleError::Format(format!(
                    "duplicate link '{}' -> '{}'",
                    link.source, link.target
                )));
            }
            graph.add_link(link);
        }

        Ok(graph)
    }

    /// Converts the graph to its node-link form.
    pub fn to_node_link(&self) -> NodeLinkGraph {
        NodeLinkGraph {
            directed: true,
            nodes: self
                .nodes()
                .iter()
                .map(|id| NodeEntry { id: id.clone() })
                .collect(),
            links: self
                .links()
                .iter()
                .map(|l| LinkEntry {
                    source: l.source.clone(),
                    target: l.target.clone(),
                    weight: l.weight,
                    parallel_machines: l.parallel_machines.clone(),
                })
                .collect(),
        }
    }
}

/// Parses a job graph from node-link JSON.
pub fn load_graph(json: &str) -> ScheduleResult<JobGraph> {
    let data: NodeLinkGraph = serde_json::from_str(json)?;
    JobGraph::from_node_link(data)
}

/// Parses a job graph from an already-decoded JSON value.
pub fn load_graph_value(value: serde_json::Value) -> ScheduleResult<JobGraph> {
    let data: NodeLinkGraph = serde_json::from_value(value)?;
    JobGraph::from_node_link(data)
}

/// Serializes a job graph to node-link JSON.
pub fn store_graph(graph: &JobGraph) -> ScheduleResult<String> {
    Ok(serde_json::to_string(&graph.to_node_link())?)
}
