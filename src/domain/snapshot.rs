//! In-memory, id-indexed view of a company's unit forest.
//!
//! Loaded once per mutation and handed to the depth, cycle and capacity walks,
//! so validation never goes back to the store hop by hop.

use std::collections::HashMap;

use crate::domain::entities::{BusinessUnit, UnitId};
use crate::domain::error::{DomainError, DomainResult};

#[derive(Debug, Clone, Default)]
pub struct ForestSnapshot {
    units: HashMap<UnitId, BusinessUnit>,
    children: HashMap<UnitId, Vec<UnitId>>,
}

impl ForestSnapshot {
    pub fn new(units: impl IntoIterator<Item = BusinessUnit>) -> Self {
        let mut snapshot = Self::default();
        for unit in units {
            if let Some(parent) = unit.parent_id {
                snapshot.children.entry(parent).or_default().push(unit.id);
            }
            snapshot.units.insert(unit.id, unit);
        }
        snapshot
    }

    pub fn get(&self, id: UnitId) -> Option<&BusinessUnit> {
        self.units.get(&id)
    }

    /// Look up a unit, signalling `NotFound` when absent.
    pub fn require(&self, id: UnitId) -> DomainResult<&BusinessUnit> {
        self.units.get(&id).ok_or(DomainError::NotFound(id))
    }

    /// Direct children of `id`, in load order. Empty for leaves and unknown ids.
    pub fn children_of(&self, id: UnitId) -> &[UnitId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of units; bounds every walk over a corrupted parent chain.
    pub(crate) fn len(&self) -> usize {
        self.units.len()
    }
}
