//! Infrastructure layer: store implementations and DI container
//!
//! This layer implements the store boundary traits and wires up services.

pub mod di;
pub mod error;
pub mod json_store;
pub mod memory_store;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use json_store::JsonFileStore;
pub use memory_store::{MemoryStore, StoreDocument, StoreState};
pub use traits::{Registry, UnitStore, UnitTransaction};
