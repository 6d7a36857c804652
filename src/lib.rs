//! orgtree: business unit hierarchy engine
//!
//! Maintains a per-company forest of business units, each carrying a capacity (FTE),
//! and enforces bounded depth, one-level capacity containment and acyclicity
//! across create, update, move and delete.
//!
//! Layers (dependencies point inward):
//! - `domain`: entities, forest snapshot, depth/cycle/capacity walks, tree assembly
//! - `application`: `HierarchyService` orchestrating validate-then-write transactions
//! - `infrastructure`: store traits, in-memory and JSON file stores, service container
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
