//! Cycle guard for reparenting.

use tracing::instrument;

use crate::domain::entities::UnitId;
use crate::domain::snapshot::ForestSnapshot;

/// True if `candidate` lies in the subtree rooted at `root` (including `candidate == root`).
///
/// Setting the parent of `root` to `candidate` is a cycle exactly when this holds.
/// Walks upward from `candidate`; a parent chain that never terminates is treated
/// as reaching `root`, so corrupted data is never accepted as a valid target.
#[instrument(level = "trace", skip(snapshot))]
pub fn is_descendant(snapshot: &ForestSnapshot, candidate: UnitId, root: UnitId) -> bool {
    let mut current = Some(candidate);
    let mut steps = 0usize;

    while let Some(id) = current {
        if id == root {
            return true;
        }
        steps += 1;
        if steps > snapshot.len() {
            return true;
        }
        current = snapshot.get(id).and_then(|unit| unit.parent_id);
    }
    false
}
