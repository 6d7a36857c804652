//! Domain layer: entities and hierarchy rules
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).
//! Every walk takes a `ForestSnapshot`, so the rules are testable without a store.

pub mod arena;
pub mod capacity;
pub mod cycle;
pub mod depth;
pub mod entities;
pub mod error;
pub mod snapshot;
pub mod tree_traits;

#[cfg(test)]
pub(crate) mod testing;

pub use arena::{flatten, FlatUnit, SiblingOrder, UnitForest, UnitTreeNode};
pub use capacity::{capacity_report, direct_children_capacity, transitive_capacity, CapacityReport};
pub use cycle::is_descendant;
pub use depth::{depth_of, max_subtree_depth};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use snapshot::ForestSnapshot;
pub use tree_traits::TreeNodeConvert;
