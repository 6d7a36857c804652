//! In-memory transactional store
//!
//! A single `RwLock` guards the whole state. Transactions take the write lock,
//! work on a copy and swap it in on success, so validation and write of one
//! mutation can never interleave with another. Scans take the read lock and
//! only ever see committed state.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::{BusinessUnit, Company, CompanyId, ProcessRef, UnitId};
use crate::infrastructure::error::{StoreError, StoreResult};
use crate::infrastructure::traits::{Registry, UnitStore, UnitTransaction};

/// Complete store contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    companies: BTreeMap<CompanyId, Company>,
    units: BTreeMap<UnitId, BusinessUnit>,
    processes: Vec<ProcessRef>,
}

/// On-disk layout of [`StoreState`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreDocument {
    pub companies: Vec<Company>,
    pub units: Vec<BusinessUnit>,
    pub processes: Vec<ProcessRef>,
}

impl From<StoreDocument> for StoreState {
    fn from(doc: StoreDocument) -> Self {
        Self {
            companies: doc.companies.into_iter().map(|c| (c.id, c)).collect(),
            units: doc.units.into_iter().map(|u| (u.id, u)).collect(),
            processes: doc.processes,
        }
    }
}

impl From<&StoreState> for StoreDocument {
    fn from(state: &StoreState) -> Self {
        Self {
            companies: state.companies.values().cloned().collect(),
            units: state.units.values().cloned().collect(),
            processes: state.processes.clone(),
        }
    }
}

impl StoreState {
    fn scan(&self, company: Option<CompanyId>) -> Vec<BusinessUnit> {
        self.units
            .values()
            .filter(|u| company.map_or(true, |c| u.company_id == c))
            .cloned()
            .collect()
    }

    pub(crate) fn add_company(&mut self, name: &str) -> Company {
        let company = Company {
            id: CompanyId::new(),
            name: name.to_string(),
        };
        self.companies.insert(company.id, company.clone());
        company
    }

    pub(crate) fn add_process(&mut self, unit: UnitId, name: &str) -> StoreResult<ProcessRef> {
        if !self.units.contains_key(&unit) {
            return Err(StoreError::MissingUnit(unit));
        }
        let process = ProcessRef {
            id: Uuid::new_v4(),
            business_unit_id: unit,
            name: name.to_string(),
        };
        self.processes.push(process.clone());
        Ok(process)
    }
}

impl UnitTransaction for StoreState {
    fn company_exists(&self, company: CompanyId) -> StoreResult<bool> {
        Ok(self.companies.contains_key(&company))
    }

    fn company_units(&self, company: CompanyId) -> StoreResult<Vec<BusinessUnit>> {
        Ok(self.scan(Some(company)))
    }

    fn get(&self, id: UnitId) -> StoreResult<Option<BusinessUnit>> {
        Ok(self.units.get(&id).cloned())
    }

    fn has_dependents(&self, id: UnitId) -> StoreResult<bool> {
        Ok(self.processes.iter().any(|p| p.business_unit_id == id))
    }

    fn insert(&mut self, unit: BusinessUnit) -> StoreResult<()> {
        if self.units.contains_key(&unit.id) {
            return Err(StoreError::DuplicateUnit(unit.id));
        }
        self.units.insert(unit.id, unit);
        Ok(())
    }

    fn update(&mut self, unit: BusinessUnit) -> StoreResult<()> {
        match self.units.get_mut(&unit.id) {
            Some(slot) => {
                *slot = unit;
                Ok(())
            }
            None => Err(StoreError::MissingUnit(unit.id)),
        }
    }

    fn delete(&mut self, id: UnitId) -> StoreResult<()> {
        self.units
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::MissingUnit(id))
    }
}

/// Process-local store; also the engine behind [`JsonFileStore`](super::JsonFileStore).
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: StoreState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Copy of the committed state.
    pub fn snapshot(&self) -> StoreResult<StoreState> {
        let guard = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.clone())
    }

    /// Replace the committed state wholesale, e.g. after reloading it from disk.
    pub(crate) fn reset(&self, state: StoreState) -> StoreResult<()> {
        let mut guard = self.state.write().map_err(|_| StoreError::Poisoned)?;
        *guard = state;
        Ok(())
    }

    /// Run `work` on a copy of the state under the write lock.
    ///
    /// `on_commit` sees the new state before it replaces the old one; if it fails
    /// nothing is committed.
    pub(crate) fn commit_with<T, E, W, C>(&self, work: W, on_commit: C) -> Result<T, E>
    where
        E: From<StoreError>,
        W: FnOnce(&mut StoreState) -> Result<T, E>,
        C: FnOnce(&StoreState) -> StoreResult<()>,
    {
        let mut guard = self.state.write().map_err(|_| StoreError::Poisoned)?;
        let mut working = guard.clone();
        let output = work(&mut working)?;
        if working != *guard {
            on_commit(&working)?;
            *guard = working;
            debug!("transaction committed");
        }
        Ok(output)
    }
}

impl UnitStore for MemoryStore {
    #[instrument(level = "trace", skip(self))]
    fn scan(&self, company: Option<CompanyId>) -> StoreResult<Vec<BusinessUnit>> {
        let guard = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.scan(company))
    }

    fn get(&self, id: UnitId) -> StoreResult<Option<BusinessUnit>> {
        let guard = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.units.get(&id).cloned())
    }

    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn UnitTransaction) -> Result<T, E>,
    {
        self.commit_with(|state| work(state), |_| Ok(()))
    }
}

impl Registry for MemoryStore {
    fn add_company(&self, name: &str) -> StoreResult<Company> {
        self.commit_with(|state| Ok(state.add_company(name)), |_| Ok(()))
    }

    fn companies(&self) -> StoreResult<Vec<Company>> {
        let guard = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.companies.values().cloned().collect())
    }

    fn add_process(&self, unit: UnitId, name: &str) -> StoreResult<ProcessRef> {
        self.commit_with(|state| state.add_process(unit, name), |_| Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn unit(company: CompanyId, name: &str) -> BusinessUnit {
        let now = Utc::now();
        BusinessUnit {
            id: UnitId::new(),
            company_id: company,
            parent_id: None,
            name: name.to_string(),
            description: None,
            fte: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn given_failed_transaction_when_committing_then_state_unchanged() {
        let store = MemoryStore::new();
        let company = store.add_company("Acme").unwrap();
        let before = store.snapshot().unwrap();

        let result: StoreResult<()> = store.transaction(|tx| {
            tx.insert(unit(company.id, "ghost"))?;
            Err(StoreError::Poisoned)
        });

        assert!(result.is_err());
        assert_eq!(store.snapshot().unwrap(), before);
        assert!(store.scan(None).unwrap().is_empty());
    }

    #[test]
    fn given_units_of_two_companies_when_scanning_then_filters_by_company() {
        let store = MemoryStore::new();
        let acme = store.add_company("Acme").unwrap();
        let globex = store.add_company("Globex").unwrap();

        store
            .transaction(|tx| -> StoreResult<()> {
                tx.insert(unit(acme.id, "a"))?;
                tx.insert(unit(globex.id, "g"))
            })
            .unwrap();

        assert_eq!(store.scan(Some(acme.id)).unwrap().len(), 1);
        assert_eq!(store.scan(None).unwrap().len(), 2);
    }

    #[test]
    fn given_duplicate_id_when_inserting_then_errors() {
        let store = MemoryStore::new();
        let company = store.add_company("Acme").unwrap();
        let u = unit(company.id, "a");

        let result = store.transaction(|tx| -> StoreResult<()> {
            tx.insert(u.clone())?;
            tx.insert(u.clone())
        });

        assert!(matches!(result, Err(StoreError::DuplicateUnit(_))));
    }

    #[test]
    fn given_process_for_unknown_unit_when_registering_then_errors() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.add_process(UnitId::new(), "Billing"),
            Err(StoreError::MissingUnit(_))
        ));
    }
}
