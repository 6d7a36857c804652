//! Tests for JsonFileStore persistence

use std::fs;
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use orgtree::application::services::{HierarchyPolicy, HierarchyService};
use orgtree::application::ApplicationError;
use orgtree::domain::DomainError;
use orgtree::infrastructure::error::StoreError;
use orgtree::infrastructure::traits::{Registry, UnitStore};
use orgtree::infrastructure::JsonFileStore;
use orgtree::util::testing::{init_test_setup, new_unit};

#[test]
fn given_missing_file_when_opening_then_empty_store() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("units.json");

    let store = JsonFileStore::open(&path).unwrap();

    assert!(store.scan(None).unwrap().is_empty());
    assert!(store.companies().unwrap().is_empty());
    assert!(!path.exists());
}

#[test]
fn given_committed_units_when_reopening_then_state_restored() {
    // Arrange
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("units.json");

    let store = Arc::new(JsonFileStore::open(&path).unwrap());
    let company = store.add_company("Acme").unwrap();
    let service = HierarchyService::new(Arc::clone(&store), HierarchyPolicy::default());
    let root = service.create_unit(new_unit(company.id, "Root", 10.0, None)).unwrap();
    let child = service
        .create_unit(new_unit(company.id, "Child", 4.0, Some(root.id)))
        .unwrap();
    store.add_process(child.id, "Billing").unwrap();

    // Act
    let reopened = Arc::new(JsonFileStore::open(&path).unwrap());

    // Assert
    assert_eq!(reopened.companies().unwrap(), vec![company]);
    assert_eq!(UnitStore::get(&*reopened, child.id).unwrap(), Some(child.clone()));
    let service = HierarchyService::new(reopened, HierarchyPolicy::default());
    assert!(service.delete_unit(child.id).is_err(), "process survives reload");
}

#[test]
fn given_rejected_mutation_when_committing_then_file_unchanged() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("units.json");

    let store = Arc::new(JsonFileStore::open(&path).unwrap());
    let company = store.add_company("Acme").unwrap();
    let service = HierarchyService::new(Arc::clone(&store), HierarchyPolicy::default());
    let root = service.create_unit(new_unit(company.id, "Root", 10.0, None)).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    let result = service.create_unit(new_unit(company.id, "Too big", 11.0, Some(root.id)));

    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn given_data_file_when_reading_then_uses_camel_case_document() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("units.json");

    let store = Arc::new(JsonFileStore::open(&path).unwrap());
    let company = store.add_company("Acme").unwrap();
    let service = HierarchyService::new(Arc::clone(&store), HierarchyPolicy::default());
    service.create_unit(new_unit(company.id, "Root", 10.0, None)).unwrap();

    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(doc["companies"][0]["name"], "Acme");
    assert_eq!(doc["units"][0]["companyId"], company.id.to_string());
    assert_eq!(doc["units"][0]["fte"], 10);
    assert!(doc["processes"].as_array().unwrap().is_empty());
}

#[test]
fn given_corrupt_file_when_opening_then_serialization_error() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("units.json");
    fs::write(&path, "{ not json").unwrap();

    let result = JsonFileStore::open(&path);

    assert!(matches!(result, Err(StoreError::Serialization { .. })));
}

#[test]
fn given_two_handles_on_one_file_when_both_commit_then_no_write_is_lost() {
    // Arrange: both handles opened before either writes
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("units.json");
    let seed = JsonFileStore::open(&path).unwrap();
    let company = seed.add_company("Acme").unwrap();

    let first = Arc::new(JsonFileStore::open(&path).unwrap());
    let second = Arc::new(JsonFileStore::open(&path).unwrap());
    let first_service = HierarchyService::new(Arc::clone(&first), HierarchyPolicy::default());
    let second_service = HierarchyService::new(Arc::clone(&second), HierarchyPolicy::default());

    // Act
    first_service
        .create_unit(new_unit(company.id, "A", 1.0, None))
        .unwrap();
    second_service
        .create_unit(new_unit(company.id, "B", 1.0, None))
        .unwrap();

    // Assert
    let reopened = JsonFileStore::open(&path).unwrap();
    let mut names: Vec<String> = reopened
        .scan(Some(company.id))
        .unwrap()
        .into_iter()
        .map(|u| u.name)
        .collect();
    names.sort();
    assert_eq!(names, ["A", "B"]);
}

#[test]
fn given_stale_handle_when_validating_capacity_then_sees_other_handles_commit() {
    // Arrange: root of 10, a second handle opened before the first child is added
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("units.json");

    let first = Arc::new(JsonFileStore::open(&path).unwrap());
    let company = first.add_company("Acme").unwrap();
    let first_service = HierarchyService::new(Arc::clone(&first), HierarchyPolicy::default());
    let root = first_service
        .create_unit(new_unit(company.id, "Root", 10.0, None))
        .unwrap();

    let second = Arc::new(JsonFileStore::open(&path).unwrap());
    let second_service = HierarchyService::new(second, HierarchyPolicy::default());
    first_service
        .create_unit(new_unit(company.id, "A", 6.0, Some(root.id)))
        .unwrap();

    // Act: 6 + 5 > 10 only holds if the second handle sees A
    let result = second_service.create_unit(new_unit(company.id, "B", 5.0, Some(root.id)));

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::CapacityExceeded { allocated: 6, .. }))
    ));
}

#[test]
fn given_two_handles_racing_from_threads_when_committing_then_capacity_holds() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("units.json");

    let seed = Arc::new(JsonFileStore::open(&path).unwrap());
    let company = seed.add_company("Acme").unwrap();
    let root = HierarchyService::new(seed, HierarchyPolicy::default())
        .create_unit(new_unit(company.id, "Root", 4.0, None))
        .unwrap();

    // Act: 8 threads, each with its own handle, compete for 4 slots of 1 fte
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let path = path.clone();
            thread::spawn(move || {
                let store = Arc::new(JsonFileStore::open(&path).unwrap());
                HierarchyService::new(store, HierarchyPolicy::default())
                    .create_unit(new_unit(company.id, &format!("C{i}"), 1.0, Some(root.id)))
                    .is_ok()
            })
        })
        .collect();
    let accepted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    // Assert
    assert_eq!(accepted, 4);
    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.scan(Some(company.id)).unwrap().len(), 5);
}
