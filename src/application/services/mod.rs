//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services are generic over the store traits but are themselves concrete structs.

mod hierarchy;

pub use hierarchy::{HierarchyPolicy, HierarchyService};
