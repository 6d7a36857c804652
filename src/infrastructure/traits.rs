//! Store boundary traits
//!
//! The hierarchy engine only sees these traits. Implementations decide how
//! isolation is achieved; the contract is that `transaction` runs its work
//! with no other transaction interleaving and commits only on success.

use crate::domain::{BusinessUnit, Company, CompanyId, ProcessRef, UnitId};
use crate::infrastructure::error::{StoreError, StoreResult};

/// Reads and writes available inside a transaction.
pub trait UnitTransaction {
    /// Company lookup by id (existence only).
    fn company_exists(&self, company: CompanyId) -> StoreResult<bool>;

    /// All units of one company: the forest a mutation is validated against.
    fn company_units(&self, company: CompanyId) -> StoreResult<Vec<BusinessUnit>>;

    /// Point lookup across companies.
    fn get(&self, id: UnitId) -> StoreResult<Option<BusinessUnit>>;

    /// Whether any process record references the unit.
    fn has_dependents(&self, id: UnitId) -> StoreResult<bool>;

    fn insert(&mut self, unit: BusinessUnit) -> StoreResult<()>;

    fn update(&mut self, unit: BusinessUnit) -> StoreResult<()>;

    fn delete(&mut self, id: UnitId) -> StoreResult<()>;
}

/// Persistence over the flat table of business units.
pub trait UnitStore: Send + Sync {
    /// Committed units of one company, or of all companies.
    fn scan(&self, company: Option<CompanyId>) -> StoreResult<Vec<BusinessUnit>>;

    /// Committed point lookup.
    fn get(&self, id: UnitId) -> StoreResult<Option<BusinessUnit>>;

    /// Run `work` in one serializable transaction.
    ///
    /// Writes become visible only if `work` returns `Ok`; on `Err` the store is unchanged.
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn UnitTransaction) -> Result<T, E>;
}

/// Registration of the collaborator records the engine checks against.
pub trait Registry: Send + Sync {
    fn add_company(&self, name: &str) -> StoreResult<Company>;

    fn companies(&self) -> StoreResult<Vec<Company>>;

    /// Record a process referencing `unit`; the unit must exist.
    fn add_process(&self, unit: UnitId, name: &str) -> StoreResult<ProcessRef>;
}
