//! Concurrent mutations must not jointly break capacity or depth limits

use std::sync::Arc;
use std::thread;

use orgtree::application::services::HierarchyService;
use orgtree::domain::{CapacityReport, ParentChange, UnitUpdate};
use orgtree::infrastructure::memory_store::MemoryStore;
use orgtree::util::testing::{memory_service, new_unit};

#[test]
fn given_racing_creates_under_one_parent_when_committed_then_capacity_holds() {
    // Arrange: parent with room for exactly 5 children of 2 fte
    let (_store, service, company) = memory_service();
    let parent = service.create_unit(new_unit(company, "Parent", 10.0, None)).unwrap();
    let service = Arc::new(service);

    // Act: 16 threads race for the slots
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                service
                    .create_unit(new_unit(company, &format!("Child {i}"), 2.0, Some(parent.id)))
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
    assert_eq!(accepted, 5);
    let report: CapacityReport = service.capacity_report(parent.id).unwrap();
    assert_eq!(report.direct_children, 10);
    assert_eq!(report.headroom, 0);
}

#[test]
fn given_racing_cross_moves_when_committed_then_no_cycle() {
    // Arrange: two roots, each thread hangs one under the other
    let (_store, service, company) = memory_service();
    let r1 = service.create_unit(new_unit(company, "R1", 10.0, None)).unwrap();
    let r2 = service.create_unit(new_unit(company, "R2", 10.0, None)).unwrap();
    let service: Arc<HierarchyService<MemoryStore>> = Arc::new(service);

    // Act
    let moves = [(r1.clone(), r2.id), (r2.clone(), r1.id)];
    let handles: Vec<_> = moves
        .into_iter()
        .map(|(unit, target)| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                service
                    .update_unit(
                        unit.id,
                        UnitUpdate {
                            name: unit.name.clone(),
                            fte: f64::from(unit.fte),
                            description: None,
                            parent: ParentChange::MoveTo(target),
                        },
                    )
                    .is_ok()
            })
        })
        .collect();
    let accepted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    // Assert: the second move sees the first and is rejected as a cycle
    assert_eq!(accepted, 1);
    let flat = service.get_flat(Some(company)).unwrap();
    assert_eq!(flat.len(), 2, "both units still reachable from a root");
    assert_eq!(flat[0].depth, 1);
    assert_eq!(flat[1].depth, 2);
}
