//! Typed schedule graph.
//!
//! Each built job is a directed graph: nodes are processed time slices,
//! edges (links) carry the slice duration and the set of links that ran
//! in the same scheduling round.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the synthetic node preceding the first job.
pub const START_NODE: &str = "start";

/// Identifier of one processed time slice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wraps an arbitrary identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The synthetic start node.
    pub fn start() -> Self {
        Self::new(START_NODE)
    }

    /// Identifier for the `sequence`-th slice machine `machine` processed for `job_id`.
    pub fn slice(job_id: u32, machine: usize, sequence: u32) -> Self {
        Self(format!("J{job_id}_M{machine}_{sequence}"))
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A `(source, target)` pair naming one link.
pub type EdgeKey = (NodeId, NodeId);

/// A directed edge between two slices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Predecessor slice.
    pub source: NodeId,
    /// Successor slice.
    pub target: NodeId,
    /// Duration of the target slice.
    pub weight: u32,
    /// Links created in the same round, this one included.
    pub parallel_machines: Vec<EdgeKey>,
}

impl Link {
    /// Creates a link with no round group.
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, weight: u32) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
            parallel_machines: Vec::new(),
        }
    }

    /// Sets the round group.
    pub fn with_parallel_machines(mut self, group: Vec<EdgeKey>) -> Self {
        self.parallel_machines = group;
        self
    }

    /// The `(source, target)` key of this link.
    pub fn key(&self) -> EdgeKey {
        (self.source.clone(), self.target.clone())
    }
}

/// Directed graph of one job's slices.
///
/// Nodes and links keep insertion order; links are unique per
/// `(source, target)`.
#[derive(Debug, Clone, Default)]
pub struct JobGraph {
    nodes: Vec<NodeId>,
    node_index: HashSet<NodeId>,
    links: Vec<Link>,
    link_index: HashMap<EdgeKey, usize>,
}

impl PartialEq for JobGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.links == other.links
    }
}

impl Eq for JobGraph {}

impl JobGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node. Returns `false` if it already existed.
    pub fn add_node(&mut self, id: NodeId) -> bool {
        if self.node_index.contains(&id) {
            return false;
        }
        self.node_index.insert(id.clone());
        self.nodes.push(id);
        true
    }

    /// Adds a link, creating missing endpoints.
    ///
    /// An existing link with the same `(source, target)` is replaced in place.
    pub fn add_link(&mut self, link: Link) {
        self.add_node(link.source.clone());
        self.add_node(link.target.clone());
        match self.link_index.get(&link.key()) {
            Some(&idx) => self.links[idx] = link,
            None => {
                self.link_index.insert(link.key(), self.links.len());
                self.links.push(link);
            }
        }
    }

    /// Replaces the round group of an existing link.
    ///
    /// Returns `false` if no such link exists.
    pub fn set_parallel_machines(&mut self, key: &EdgeKey, group: Vec<EdgeKey>) -> bool {
        match self.link_index.get(key) {
            Some(&idx) => {
                self.links[idx].parallel_machines = group;
                true
            }
            None => false,
        }
    }

    /// Whether `id` is a node of this graph.
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node_index.contains(id)
    }

    /// The link from `source` to `target`, if present.
    pub fn link(&self, source: &NodeId, target: &NodeId) -> Option<&Link> {
        self.link_index
            .get(&(source.clone(), target.clone()))
            .map(|&idx| &self.links[idx])
    }

    /// Weight of the link `key`, if present.
    pub fn weight(&self, key: &EdgeKey) -> Option<u32> {
        self.link_index.get(key).map(|&idx| self.links[idx].weight)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Links in insertion order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Number of links entering `id`.
    pub fn in_degree(&self, id: &NodeId) -> usize {
        self.links.iter().filter(|l| &l.target == id).count()
    }

    /// Sum of all link weights.
    pub fn total_weight(&self) -> u64 {
        self.links.iter().map(|l| u64::from(l.weight)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_ids_are_unique_per_triple() {
        assert_eq!(NodeId::slice(4, 1, 1).as_str(), "J4_M1_1");
        assert_ne!(NodeId::slice(1, 11, 1), NodeId::slice(11, 1, 1));
        assert_eq!(NodeId::start().as_str(), START_NODE);
    }

    #[test]
    fn test_add_link_creates_nodes() {
        let mut g = JobGraph::new();
        g.add_link(Link::new("start", "a", 2));

        assert_eq!(g.node_count(), 2);
        assert_eq!(g.link_count(), 1);
        assert!(g.contains_node(&"a".into()));
        assert_eq!(g.in_degree(&"a".into()), 1);
        assert_eq!(g.in_degree(&"start".into()), 0);
    }

    #[test]
    fn test_link_replaced_by_key() {
        let mut g = JobGraph::new();
        g.add_link(Link::new("a", "b", 2));
        g.add_link(Link::new("a", "b", 1));

        assert_eq!(g.link_count(), 1);
        assert_eq!(g.weight(&("a".into(), "b".into())), Some(1));
    }

    #[test]
    fn test_set_parallel_machines() {
        let mut g = JobGraph::new();
        g.add_link(Link::new("s", "a", 2));
        g.add_link(Link::new("s", "b", 1));

        let group: Vec<EdgeKey> = vec![("s".into(), "a".into()), ("s".into(), "b".into())];
        assert!(g.set_parallel_machines(&("s".into(), "a".into()), group.clone()));
        assert!(!g.set_parallel_machines(&("x".into(), "y".into()), group.clone()));

        let link = g.link(&"s".into(), &"a".into()).unwrap();
        assert_eq!(link.parallel_machines, group);
        assert_eq!(g.total_weight(), 3);
    }

    #[test]
    fn test_equality_ignores_index_layout() {
        let mut a = JobGraph::new();
        a.add_link(Link::new("s", "a", 2));
        let mut b = JobGraph::new();
        b.add_node("s".into());
        b.add_link(Link::new("s", "a", 2));
        assert_eq!(a, b);
    }
}
