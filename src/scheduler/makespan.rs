//! Overlap-aware makespan.
//!
//! Links in the same `parallel_machines` group ran on different machines
//! during the same round, so the round lasts as long as its slowest
//! slice. The makespan is the sum of those per-round maxima over every
//! job, in schedule order.

use std::collections::HashSet;

use tracing::debug;

use crate::models::{EdgeKey, JobGraph, Schedule};

/// Computes the makespan of a schedule.
pub fn compute_makespan(schedule: &Schedule) -> u64 {
    schedule
        .jobs
        .iter()
        .map(|job| {
            let span = job_makespan(&job.operations, schedule.debug);
            if schedule.debug {
                debug!(job = job.id, span, "job makespan");
            }
            span
        })
        .sum()
}

/// Computes one job graph's contribution to the makespan.
///
/// Each round group is counted once: members already counted through an
/// earlier link are skipped, and members missing from the graph do not
/// qualify. A group with no qualifying members adds 0.
pub fn job_makespan(graph: &JobGraph, debug: bool) -> u64 {
    let mut seen: HashSet<&EdgeKey> = HashSet::new();
    let mut total: u64 = 0;

    for link in graph.links() {
        let fresh: Vec<&EdgeKey> = link
            .parallel_machines
            .iter()
            .filter(|pair| !seen.contains(pair))
            .collect();
        if fresh.is_empty() {
            continue;
        }

        let longest = fresh
            .iter()
            .filter_map(|pair| graph.weight(pair))
            .max()
            .unwrap_or(0);
        if debug {
            debug!(
                source = %link.source,
                target = %link.target,
                members = fresh.len(),
                longest,
                "round"
            );
        }

        total += u64::from(longest);
        seen.extend(fresh);
    }

    total
}
