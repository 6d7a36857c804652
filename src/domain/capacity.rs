//! Capacity ledger: fte sums over parts of a forest.
//!
//! Containment is enforced one level at a time (a parent's fte bounds the sum
//! of its direct children's fte). Transitive sums are reporting only.

use serde::Serialize;
use tracing::instrument;

use crate::domain::entities::UnitId;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::snapshot::ForestSnapshot;

/// Sum of fte over the direct children of `parent_id`, optionally leaving one unit out.
#[instrument(level = "trace", skip(snapshot))]
pub fn direct_children_capacity(
    snapshot: &ForestSnapshot,
    parent_id: UnitId,
    exclude: Option<UnitId>,
) -> u64 {
    snapshot
        .children_of(parent_id)
        .iter()
        .filter(|&&child| Some(child) != exclude)
        .filter_map(|&child| snapshot.get(child))
        .map(|child| u64::from(child.fte))
        .sum()
}

/// Sum of fte over the whole subtree below `unit_id`, the unit itself excluded.
#[instrument(level = "trace", skip(snapshot))]
pub fn transitive_capacity(snapshot: &ForestSnapshot, unit_id: UnitId) -> DomainResult<u64> {
    snapshot.require(unit_id)?;

    let mut total = 0u64;
    let mut visited = 0usize;
    let mut stack: Vec<UnitId> = snapshot.children_of(unit_id).to_vec();

    while let Some(current) = stack.pop() {
        visited += 1;
        if visited > snapshot.len() {
            return Err(DomainError::CycleDetected {
                unit: unit_id,
                parent: current,
            });
        }
        if let Some(unit) = snapshot.get(current) {
            total += u64::from(unit.fte);
        }
        stack.extend_from_slice(snapshot.children_of(current));
    }
    Ok(total)
}

/// Capacity diagnostics for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityReport {
    pub unit_id: UnitId,
    pub fte: u32,
    /// Allocated to direct children
    pub direct_children: u64,
    /// Allocated anywhere below the unit
    pub transitive: u64,
    /// Remaining fte that can still go to new direct children
    pub headroom: u64,
}

pub fn capacity_report(snapshot: &ForestSnapshot, unit_id: UnitId) -> DomainResult<CapacityReport> {
    let unit = snapshot.require(unit_id)?;
    let direct_children = direct_children_capacity(snapshot, unit_id, None);
    let transitive = transitive_capacity(snapshot, unit_id)?;

    Ok(CapacityReport {
        unit_id,
        fte: unit.fte,
        direct_children,
        transitive,
        headroom: u64::from(unit.fte).saturating_sub(direct_children),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testing::unit;

    fn sample() -> (ForestSnapshot, UnitId, UnitId, UnitId) {
        let root = unit("root", 10, None);
        let a = unit("a", 6, Some(root.id));
        let b = unit("b", 3, Some(root.id));
        let a1 = unit("a1", 4, Some(a.id));
        let a2 = unit("a2", 2, Some(a.id));
        let ids = (root.id, a.id, b.id);
        (ForestSnapshot::new(vec![root, a, b, a1, a2]), ids.0, ids.1, ids.2)
    }

    #[test]
    fn given_children_when_summing_direct_capacity_then_adds_one_level() {
        let (snapshot, root, a, b) = sample();
        assert_eq!(direct_children_capacity(&snapshot, root, None), 9);
        assert_eq!(direct_children_capacity(&snapshot, root, Some(a)), 3);
        assert_eq!(direct_children_capacity(&snapshot, a, None), 6);
        assert_eq!(direct_children_capacity(&snapshot, b, None), 0);
    }

    #[test]
    fn given_unknown_parent_when_summing_direct_capacity_then_zero() {
        let (snapshot, ..) = sample();
        assert_eq!(direct_children_capacity(&snapshot, UnitId::new(), None), 0);
    }

    #[test]
    fn given_subtree_when_summing_transitive_capacity_then_excludes_root() {
        let (snapshot, root, a, b) = sample();
        assert_eq!(transitive_capacity(&snapshot, root).unwrap(), 15);
        assert_eq!(transitive_capacity(&snapshot, a).unwrap(), 6);
        assert_eq!(transitive_capacity(&snapshot, b).unwrap(), 0);
    }

    #[test]
    fn given_unit_when_reporting_then_computes_headroom() {
        let (snapshot, root, ..) = sample();
        let report = capacity_report(&snapshot, root).unwrap();
        assert_eq!(report.fte, 10);
        assert_eq!(report.direct_children, 9);
        assert_eq!(report.transitive, 15);
        assert_eq!(report.headroom, 1);
    }
}
