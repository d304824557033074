//! Scheduling domain models.
//!
//! Input side: [`ScheduledJob`]s made of [`Operation`]s, plus the
//! per-build [`JobAllocations`] snapshot. Output side: a [`Schedule`] of
//! built [`Job`]s, each a [`JobGraph`] of time slices joined by [`Link`]s.
//!
//! # Domain Mappings
//!
//! | u-jobshop | Manufacturing | Computing |
//! |-----------|---------------|-----------|
//! | ScheduledJob | Work order | Process |
//! | Operation | Routing step | CPU burst |
//! | Machine | Workstation | Core |
//! | Quantum | Shift slot | Time slice |

mod allocation;
mod graph;
mod node_link;
mod operation;
mod schedule;

pub use allocation::JobAllocations;
pub use graph::{EdgeKey, JobGraph, Link, NodeId, START_NODE};
pub use node_link::{
    load_graph, load_graph_value, store_graph, LinkEntry, NodeEntry, NodeLinkGraph,
};
pub use operation::{generate_jobs, Operation, ScheduledJob};
pub use schedule::{Job, JobRecord, Schedule};
