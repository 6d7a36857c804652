//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::{CompanyId, UnitId};

/// Domain errors represent hierarchy rule violations.
/// All of them are recoverable by the caller; none leave a partial write behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    #[error("company not found: {0}")]
    InvalidCompany(CompanyId),

    #[error("invalid parent {parent}: {reason}")]
    InvalidParent { parent: UnitId, reason: String },

    #[error("depth {depth} would exceed the maximum of {max}")]
    DepthExceeded { depth: usize, max: usize },

    #[error(
        "capacity of parent {parent} exceeded: {allocated} already allocated + {requested} requested > {available}"
    )]
    CapacityExceeded {
        parent: UnitId,
        allocated: u64,
        requested: u32,
        available: u32,
    },

    #[error("fte {fte} of {unit} is below the {allocated} allocated to its children")]
    CapacityBelowChildren {
        unit: UnitId,
        fte: u32,
        allocated: u64,
    },

    #[error("moving {unit} under {parent} would create a cycle")]
    CycleDetected { unit: UnitId, parent: UnitId },

    #[error("business unit not found: {0}")]
    NotFound(UnitId),

    #[error("business unit {unit} still has {count} child unit(s)")]
    HasChildren { unit: UnitId, count: usize },

    #[error("business unit {0} is referenced by one or more processes")]
    HasDependents(UnitId),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
