//! Depth of units within their forest.

use tracing::instrument;

use crate::domain::entities::UnitId;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::snapshot::ForestSnapshot;

/// Depth of `unit_id` counted from its root, which has depth 1.
///
/// Walks `parent_id` upward. A parent chain longer than the snapshot can only
/// come from corrupted data and is reported as a cycle.
#[instrument(level = "trace", skip(snapshot))]
pub fn depth_of(snapshot: &ForestSnapshot, unit_id: UnitId) -> DomainResult<usize> {
    let mut current = snapshot.require(unit_id)?;
    let mut depth = 1;

    while let Some(parent_id) = current.parent_id {
        if depth > snapshot.len() {
            return Err(DomainError::CycleDetected {
                unit: unit_id,
                parent: parent_id,
            });
        }
        current = snapshot.require(parent_id)?;
        depth += 1;
    }
    Ok(depth)
}

/// Greatest number of edges from `unit_id` down to any leaf of its subtree (0 for a leaf).
#[instrument(level = "trace", skip(snapshot))]
pub fn max_subtree_depth(snapshot: &ForestSnapshot, unit_id: UnitId) -> DomainResult<usize> {
    snapshot.require(unit_id)?;

    let mut max_edges = 0;
    let mut visited = 0usize;
    let mut stack = vec![(unit_id, 0usize)];

    while let Some((current, edges)) = stack.pop() {
        visited += 1;
        if visited > snapshot.len() {
            return Err(DomainError::CycleDetected {
                unit: unit_id,
                parent: current,
            });
        }
        max_edges = max_edges.max(edges);
        for &child in snapshot.children_of(current) {
            stack.push((child, edges + 1));
        }
    }
    Ok(max_edges)
}
