//! Builders for domain unit tests.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::{BusinessUnit, CompanyId, UnitId};

pub fn company() -> CompanyId {
    CompanyId::from(Uuid::nil())
}

pub fn unit(name: &str, fte: u32, parent_id: Option<UnitId>) -> BusinessUnit {
    let now = Utc::now();
    BusinessUnit {
        id: UnitId::new(),
        company_id: company(),
        parent_id,
        name: name.to_string(),
        description: None,
        fte,
        created_at: now,
        updated_at: now,
    }
}

/// Linear chain `names[0] <- names[1] <- ...`, each with fte 10.
pub fn chain(names: &[&str]) -> Vec<BusinessUnit> {
    let mut units: Vec<BusinessUnit> = Vec::new();
    for name in names {
        let parent = units.last().map(|u| u.id);
        units.push(unit(name, 10, parent));
    }
    units
}
