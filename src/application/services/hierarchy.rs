//! Business unit hierarchy service
//!
//! Every mutation is one store transaction: load the company's forest once,
//! validate against that snapshot, then issue the single write. A rejection
//! returns before any write, so the store is left unchanged.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{
    capacity_report, depth_of, direct_children_capacity, is_descendant, max_subtree_depth,
    normalize_description, validate_fte, validate_name, BusinessUnit, CapacityReport, CompanyId,
    DomainError, FlatUnit, ForestSnapshot, NewUnit, ParentChange, SiblingOrder, UnitForest,
    UnitId, UnitTreeNode, UnitUpdate, MAX_DEPTH,
};
use crate::infrastructure::traits::{UnitStore, UnitTransaction};

/// Structural limits and presentation order applied by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyPolicy {
    pub max_depth: usize,
    pub sibling_order: SiblingOrder,
}

impl Default for HierarchyPolicy {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            sibling_order: SiblingOrder::default(),
        }
    }
}

impl From<&Settings> for HierarchyPolicy {
    fn from(settings: &Settings) -> Self {
        Self {
            max_depth: settings.hierarchy.max_depth,
            sibling_order: settings.tree.sibling_order,
        }
    }
}

/// Service enforcing depth, capacity and acyclicity on a company's unit forest.
pub struct HierarchyService<S> {
    store: Arc<S>,
    policy: HierarchyPolicy,
}

fn reject(err: DomainError) -> ApplicationError {
    debug!(error = %err, "rejected");
    ApplicationError::Domain(err)
}

impl<S: UnitStore> HierarchyService<S> {
    pub fn new(store: Arc<S>, policy: HierarchyPolicy) -> Self {
        Self { store, policy }
    }

    /// Create a unit, as a root or under an existing parent of the same company.
    #[instrument(level = "debug", skip(self, request), fields(company = %request.company_id, name = %request.name))]
    pub fn create_unit(&self, request: NewUnit) -> ApplicationResult<BusinessUnit> {
        let name = validate_name(&request.name).map_err(reject)?;
        let fte = validate_fte(request.fte).map_err(reject)?;
        let description = normalize_description(request.description);
        let company_id = request.company_id;

        let unit = self.store.transaction(|tx| -> ApplicationResult<BusinessUnit> {
            if !tx.company_exists(company_id)? {
                return Err(reject(DomainError::InvalidCompany(company_id)));
            }

            if let Some(parent_id) = request.parent_id {
                let parent = load_parent(tx, parent_id, company_id)?;
                let snapshot = ForestSnapshot::new(tx.company_units(company_id)?);

                let parent_depth = depth_of(&snapshot, parent_id).map_err(reject)?;
                if parent_depth >= self.policy.max_depth {
                    return Err(reject(DomainError::DepthExceeded {
                        depth: parent_depth + 1,
                        max: self.policy.max_depth,
                    }));
                }

                let allocated = direct_children_capacity(&snapshot, parent_id, None);
                ensure_capacity(&parent, allocated, fte)?;
            }

            let now = Utc::now();
            let unit = BusinessUnit {
                id: UnitId::new(),
                company_id,
                parent_id: request.parent_id,
                name,
                description,
                fte,
                created_at: now,
                updated_at: now,
            };
            tx.insert(unit.clone())?;
            Ok(unit)
        })?;

        info!("created unit {} ({})", unit.id, unit.name);
        Ok(unit)
    }

    /// Update name, capacity, description and position of a unit.
    ///
    /// A `None` description keeps the current one; an empty one clears it.
    #[instrument(level = "debug", skip(self, update))]
    pub fn update_unit(&self, unit_id: UnitId, update: UnitUpdate) -> ApplicationResult<BusinessUnit> {
        let unit = self
            .store
            .transaction(|tx| self.apply_update(tx, unit_id, |_| Ok(update)))?;
        info!("updated unit {} ({})", unit.id, unit.name);
        Ok(unit)
    }

    /// Reparent a unit (and its subtree), keeping its other fields. `None` makes it a root.
    #[instrument(level = "debug", skip(self))]
    pub fn move_unit(&self, unit_id: UnitId, new_parent: Option<UnitId>) -> ApplicationResult<BusinessUnit> {
        let parent = match new_parent {
            Some(id) => ParentChange::MoveTo(id),
            None => ParentChange::Detach,
        };
        let unit = self.store.transaction(|tx| {
            self.apply_update(tx, unit_id, |existing| {
                Ok(UnitUpdate {
                    name: existing.name.clone(),
                    fte: f64::from(existing.fte),
                    description: None,
                    parent,
                })
            })
        })?;
        info!("moved unit {} under {:?}", unit.id, unit.parent_id);
        Ok(unit)
    }

    fn apply_update<F>(
        &self,
        tx: &mut dyn UnitTransaction,
        unit_id: UnitId,
        build: F,
    ) -> ApplicationResult<BusinessUnit>
    where
        F: FnOnce(&BusinessUnit) -> ApplicationResult<UnitUpdate>,
    {
        let existing = tx
            .get(unit_id)?
            .ok_or_else(|| reject(DomainError::NotFound(unit_id)))?;
        let update = build(&existing)?;

        let name = validate_name(&update.name).map_err(reject)?;
        let fte = validate_fte(update.fte).map_err(reject)?;
        let description = match update.description {
            Some(text) => normalize_description(Some(text)),
            None => existing.description.clone(),
        };

        let snapshot = ForestSnapshot::new(tx.company_units(existing.company_id)?);

        if fte < existing.fte {
            let allocated = direct_children_capacity(&snapshot, unit_id, None);
            if u64::from(fte) < allocated {
                return Err(reject(DomainError::CapacityBelowChildren {
                    unit: unit_id,
                    fte,
                    allocated,
                }));
            }
        }

        let new_parent = update.parent.resolve(existing.parent_id);
        match new_parent {
            Some(parent_id) if new_parent != existing.parent_id => {
                if parent_id == unit_id {
                    return Err(reject(DomainError::InvalidParent {
                        parent: parent_id,
                        reason: "a unit cannot be its own parent".to_string(),
                    }));
                }
                let parent = load_parent(tx, parent_id, existing.company_id)?;

                if is_descendant(&snapshot, parent_id, unit_id) {
                    return Err(reject(DomainError::CycleDetected {
                        unit: unit_id,
                        parent: parent_id,
                    }));
                }

                let depth = depth_of(&snapshot, parent_id).map_err(reject)?
                    + 1
                    + max_subtree_depth(&snapshot, unit_id).map_err(reject)?;
                if depth > self.policy.max_depth {
                    return Err(reject(DomainError::DepthExceeded {
                        depth,
                        max: self.policy.max_depth,
                    }));
                }

                let allocated = direct_children_capacity(&snapshot, parent_id, Some(unit_id));
                ensure_capacity(&parent, allocated, fte)?;
            }
            Some(parent_id) if fte != existing.fte => {
                let parent = snapshot.require(parent_id).map_err(reject)?;
                let allocated = direct_children_capacity(&snapshot, parent_id, Some(unit_id));
                ensure_capacity(parent, allocated, fte)?;
            }
            // Unchanged parent with unchanged fte, or detached to a root: depth can only shrink
            _ => {}
        }

        let updated = BusinessUnit {
            parent_id: new_parent,
            name,
            description,
            fte,
            updated_at: Utc::now(),
            ..existing
        };
        tx.update(updated.clone())?;
        Ok(updated)
    }

    /// Delete a leaf unit that no process references. Returns the removed record.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_unit(&self, unit_id: UnitId) -> ApplicationResult<BusinessUnit> {
        let removed = self.store.transaction(|tx| -> ApplicationResult<BusinessUnit> {
            let existing = tx
                .get(unit_id)?
                .ok_or_else(|| reject(DomainError::NotFound(unit_id)))?;

            let snapshot = ForestSnapshot::new(tx.company_units(existing.company_id)?);
            let count = snapshot.children_of(unit_id).len();
            if count > 0 {
                return Err(reject(DomainError::HasChildren {
                    unit: unit_id,
                    count,
                }));
            }
            if tx.has_dependents(unit_id)? {
                return Err(reject(DomainError::HasDependents(unit_id)));
            }

            tx.delete(unit_id)?;
            Ok(existing)
        })?;

        info!("deleted unit {} ({})", removed.id, removed.name);
        Ok(removed)
    }

    /// Committed unit by id.
    pub fn get_unit(&self, unit_id: UnitId) -> ApplicationResult<BusinessUnit> {
        self.store
            .get(unit_id)?
            .ok_or(ApplicationError::Domain(DomainError::NotFound(unit_id)))
    }

    /// Assembled forest of one company, or of every company when `None`.
    #[instrument(level = "debug", skip(self))]
    pub fn forest(&self, company: Option<CompanyId>) -> ApplicationResult<UnitForest> {
        let units = self.store.scan(company)?;
        let scanned = units.len();
        let forest = UnitForest::assemble(units, self.policy.sibling_order);
        if forest.len() < scanned {
            warn!(
                unreachable = scanned - forest.len(),
                "units without a path to a root left out of the forest"
            );
        }
        Ok(forest)
    }

    /// Nested tree listing; each node carries its depth and children.
    pub fn get_tree(&self, company: Option<CompanyId>) -> ApplicationResult<Vec<UnitTreeNode>> {
        Ok(self.forest(company)?.to_nested())
    }

    /// Depth-ordered flat listing, parents before children.
    pub fn get_flat(&self, company: Option<CompanyId>) -> ApplicationResult<Vec<FlatUnit>> {
        Ok(self.forest(company)?.flatten())
    }

    /// Capacity diagnostics for one unit, including the transitive subtree sum.
    #[instrument(level = "debug", skip(self))]
    pub fn capacity_report(&self, unit_id: UnitId) -> ApplicationResult<CapacityReport> {
        let unit = self.get_unit(unit_id)?;
        let snapshot = ForestSnapshot::new(self.store.scan(Some(unit.company_id))?);
        capacity_report(&snapshot, unit_id).map_err(ApplicationError::Domain)
    }
}

/// Load a prospective parent and check it belongs to `company_id`.
fn load_parent(
    tx: &dyn UnitTransaction,
    parent_id: UnitId,
    company_id: CompanyId,
) -> ApplicationResult<BusinessUnit> {
    let parent = tx.get(parent_id)?.ok_or_else(|| {
        reject(DomainError::InvalidParent {
            parent: parent_id,
            reason: "parent does not exist".to_string(),
        })
    })?;
    if parent.company_id != company_id {
        return Err(reject(DomainError::InvalidParent {
            parent: parent_id,
            reason: format!("parent belongs to company {}", parent.company_id),
        }));
    }
    Ok(parent)
}

/// One-level containment: siblings' allocation plus `fte` must fit in the parent.
fn ensure_capacity(parent: &BusinessUnit, allocated: u64, fte: u32) -> ApplicationResult<()> {
    if allocated + u64::from(fte) > u64::from(parent.fte) {
        return Err(reject(DomainError::CapacityExceeded {
            parent: parent.id,
            allocated,
            requested: fte,
            available: parent.fte,
        }));
    }
    Ok(())
}
