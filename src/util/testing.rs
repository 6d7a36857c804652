//! Shared test setup: tracing subscriber and seeded stores.

use std::env;
use std::sync::{Arc, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::services::{HierarchyPolicy, HierarchyService};
use crate::domain::{CompanyId, NewUnit, UnitId};
use crate::infrastructure::memory_store::MemoryStore;
use crate::infrastructure::traits::Registry;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    let noisy_modules = ["config"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Hierarchy service over a fresh in-memory store with one registered company.
pub fn memory_service() -> (Arc<MemoryStore>, HierarchyService<MemoryStore>, CompanyId) {
    memory_service_with(HierarchyPolicy::default())
}

pub fn memory_service_with(
    policy: HierarchyPolicy,
) -> (Arc<MemoryStore>, HierarchyService<MemoryStore>, CompanyId) {
    init_test_setup();
    let store = Arc::new(MemoryStore::new());
    let company = store
        .add_company("Acme")
        .unwrap_or_else(|e| panic!("seed company: {e}"));
    let service = HierarchyService::new(Arc::clone(&store), policy);
    (store, service, company.id)
}

/// Request for a unit of `company`, as a root when `parent` is `None`.
pub fn new_unit(
    company: CompanyId,
    name: &str,
    fte: f64,
    parent: Option<UnitId>,
) -> NewUnit {
    NewUnit {
        company_id: company,
        name: name.to_string(),
        fte,
        description: None,
        parent_id: parent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn given_memory_service_when_created_then_company_is_registered() {
        let (store, _service, company) = memory_service();
        let companies = store.companies().unwrap();
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].id, company);
    }
}
