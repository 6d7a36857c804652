//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::{DomainError, DomainResult};

/// Default maximum depth of a business unit forest (roots have depth 1).
pub const MAX_DEPTH: usize = 3;

/// Identifier of a business unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(Uuid);

impl UnitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UnitId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UnitId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Identifier of a company owning a forest of business units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(Uuid);

impl CompanyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CompanyId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CompanyId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CompanyId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A node of a company's unit forest carrying an allocatable capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessUnit {
    pub id: UnitId,
    pub company_id: CompanyId,
    /// `None` for a root of the company's forest
    pub parent_id: Option<UnitId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allocatable capacity (FTE); bounds the sum of the direct children's fte
    pub fte: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BusinessUnit {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Company referenced by business units. Only identity matters to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
}

/// Process record pointing at a business unit; blocks deletion of that unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRef {
    pub id: Uuid,
    pub business_unit_id: UnitId,
    pub name: String,
}

/// Unvalidated request to create a unit.
///
/// `fte` arrives as a float from the caller; it is floored and range-checked
/// before any capacity comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUnit {
    pub company_id: CompanyId,
    pub name: String,
    pub fte: f64,
    pub description: Option<String>,
    pub parent_id: Option<UnitId>,
}

/// Requested change of a unit's position in the forest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParentChange {
    /// Leave the unit where it is
    #[default]
    Keep,
    /// Make the unit a root of its company's forest
    Detach,
    /// Reparent the unit (and its subtree) under the given unit
    MoveTo(UnitId),
}

impl ParentChange {
    /// Resolve the parent the unit ends up with, given its current one.
    pub fn resolve(self, current: Option<UnitId>) -> Option<UnitId> {
        match self {
            ParentChange::Keep => current,
            ParentChange::Detach => None,
            ParentChange::MoveTo(id) => Some(id),
        }
    }
}

/// Unvalidated full update of a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitUpdate {
    pub name: String,
    pub fte: f64,
    pub description: Option<String>,
    pub parent: ParentChange,
}

/// Trim and check a display name.
pub fn validate_name(name: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput {
            field: "name",
            message: "must not be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Convert caller-supplied capacity to an integer fte.
///
/// Non-finite, negative and out-of-range values are rejected; fractions are floored.
pub fn validate_fte(fte: f64) -> DomainResult<u32> {
    if !fte.is_finite() {
        return Err(DomainError::InvalidInput {
            field: "fte",
            message: format!("must be a finite number, got {fte}"),
        });
    }
    if fte < 0.0 {
        return Err(DomainError::InvalidInput {
            field: "fte",
            message: format!("must not be negative, got {fte}"),
        });
    }
    let floored = fte.floor();
    if floored > f64::from(u32::MAX) {
        return Err(DomainError::InvalidInput {
            field: "fte",
            message: format!("must not exceed {}, got {fte}", u32::MAX),
        });
    }
    Ok(floored as u32)
}

/// Blank descriptions are stored as absent.
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_fractional_fte_when_validating_then_floors() {
        assert_eq!(validate_fte(4.9).unwrap(), 4);
        assert_eq!(validate_fte(0.0).unwrap(), 0);
    }

    #[test]
    fn given_invalid_fte_when_validating_then_rejects() {
        for bad in [-1.0, -0.5, f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e12] {
            assert!(
                matches!(validate_fte(bad), Err(DomainError::InvalidInput { field: "fte", .. })),
                "expected {bad} to be rejected"
            );
        }
    }

    #[test]
    fn given_blank_name_when_validating_then_rejects() {
        assert!(validate_name("   ").is_err());
        assert_eq!(validate_name("  Sales ").unwrap(), "Sales");
    }

    #[test]
    fn given_parent_change_when_resolving_then_applies_intent() {
        let current = Some(UnitId::new());
        let other = UnitId::new();
        assert_eq!(ParentChange::Keep.resolve(current), current);
        assert_eq!(ParentChange::Detach.resolve(current), None);
        assert_eq!(ParentChange::MoveTo(other).resolve(current), Some(other));
    }

    #[test]
    fn given_unit_id_string_when_parsing_then_round_trips() {
        let id = UnitId::new();
        let parsed: UnitId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<UnitId>().is_err());
    }
}
