//! Integration tests for component stores
//!
//! Tests dense storage, registry writeback, the remove/erase split, and
//! entities moving between stores.

use warren_foundation::{Error, Location};
use warren_storage::{ComponentStore, EntityRegistry};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    x: i32,
    y: i32,
}

// =============================================================================
// Residency
// =============================================================================

#[test]
fn components_attach_to_existing_entities() {
    let mut registry = EntityRegistry::<()>::new();
    let mut positions = ComponentStore::new(&mut registry);
    let h = registry.create_unassigned(()).unwrap();

    positions
        .add(&mut registry, h.id(), Position { x: 1, y: 2 })
        .unwrap();

    assert!(positions.contains(&registry, h.id()));
    assert_eq!(positions.get(&registry, h), Ok(&Position { x: 1, y: 2 }));
}

#[test]
fn one_entity_lives_in_at_most_one_store() {
    let mut registry = EntityRegistry::<()>::new();
    let mut positions = ComponentStore::<Position>::new(&mut registry);
    let mut speeds = ComponentStore::<f32>::new(&mut registry);

    let h = positions
        .add_new(&mut registry, Position { x: 0, y: 0 }, ())
        .unwrap();

    let err = speeds.add(&mut registry, h.id(), 1.5).unwrap_err();
    assert_eq!(
        err,
        Error::AlreadyAssigned {
            id: h.id(),
            store: positions.store_id(),
        }
    );
}

#[test]
fn an_entity_moves_by_detach_then_attach() {
    let mut registry = EntityRegistry::<()>::new();
    let mut active = ComponentStore::<Position>::new(&mut registry);
    let mut frozen = ComponentStore::<Position>::new(&mut registry);

    let h = active
        .add_new(&mut registry, Position { x: 3, y: 4 }, ())
        .unwrap();

    let position = active.take(&mut registry, h.id()).unwrap();
    frozen.add(&mut registry, h.id(), position).unwrap();

    assert!(!active.contains(&registry, h.id()));
    assert!(frozen.contains(&registry, h.id()));
    assert_eq!(frozen.get(&registry, h), Ok(&Position { x: 3, y: 4 }));
    active.validate(&registry).unwrap();
    frozen.validate(&registry).unwrap();
}

// =============================================================================
// Registry Writeback
// =============================================================================

#[test]
fn every_row_move_updates_the_registry() {
    let mut registry = EntityRegistry::<()>::new();
    let mut store = ComponentStore::new(&mut registry);
    let handles: Vec<_> = (0..6)
        .map(|i| store.add_new(&mut registry, i, ()).unwrap())
        .collect();

    // Erase from the middle a few times; locations must track the swaps.
    store.erase(&mut registry, handles[1].id());
    store.erase(&mut registry, handles[3].id());

    for &h in &[handles[0], handles[2], handles[4], handles[5]] {
        let row = registry.location(h.id()).index();
        assert_eq!(store.ids()[row], h.id());
    }
    store.validate(&registry).unwrap();
}

#[test]
fn remove_leaves_the_entity_alive() {
    let mut registry = EntityRegistry::<()>::new();
    let mut store = ComponentStore::new(&mut registry);
    let h = store.add_new(&mut registry, 1u8, ()).unwrap();

    assert!(store.remove(&mut registry, h.id()));

    assert!(registry.is_valid(h));
    assert_eq!(registry.location(h.id()), Location::unassigned());
    assert!(!store.contains(&registry, h.id()));
}

#[test]
fn erase_destroys_the_entity_too() {
    let mut registry = EntityRegistry::<()>::new();
    let mut store = ComponentStore::new(&mut registry);
    let h = store.add_new(&mut registry, 1u8, ()).unwrap();

    assert!(store.erase(&mut registry, h.id()));

    assert!(!registry.is_valid(h));
    assert!(registry.is_empty());
}

// =============================================================================
// Bulk Operations
// =============================================================================

#[test]
fn erase_if_destroys_matching_entities() {
    let mut registry = EntityRegistry::<()>::new();
    let mut store = ComponentStore::new(&mut registry);
    for value in 0..10u32 {
        store.add_new(&mut registry, value, ()).unwrap();
    }

    let erased = store.erase_if(&mut registry, |_, &value| value % 3 == 0);

    assert_eq!(erased, 4);
    assert_eq!(store.len(), 6);
    assert_eq!(registry.len(), 6);
    assert!(store.iter().all(|(_, &value)| value % 3 != 0));
    store.validate(&registry).unwrap();
}

#[test]
fn clear_detaches_without_destroying() {
    let mut registry = EntityRegistry::<()>::new();
    let mut store = ComponentStore::new(&mut registry);
    let handles: Vec<_> = (0..4)
        .map(|i| store.add_new(&mut registry, i, ()).unwrap())
        .collect();

    store.clear(&mut registry);

    assert!(store.is_empty());
    assert_eq!(registry.len(), 4);
    for h in &handles {
        assert!(registry.location(h.id()).is_unassigned());
    }

    // The loose entities can be re-added.
    store.add(&mut registry, handles[2].id(), 9).unwrap();
    assert_eq!(store.get(&registry, handles[2]), Ok(&9));
}

// =============================================================================
// Access Tiers
// =============================================================================

#[test]
fn checked_access_reports_each_failure_mode() {
    let mut registry = EntityRegistry::<()>::new();
    let mut store = ComponentStore::new(&mut registry);
    let resident = store.add_new(&mut registry, 1u8, ()).unwrap();
    let loose = registry.create_unassigned(()).unwrap();

    assert!(store.get(&registry, resident).is_ok());
    assert_eq!(
        store.get(&registry, loose),
        Err(Error::NotInStore {
            id: loose.id(),
            store: store.store_id(),
        })
    );

    store.erase(&mut registry, resident.id());
    assert_eq!(
        store.get(&registry, resident),
        Err(Error::EntityNotFound(resident.id()))
    );
}

#[test]
fn raw_access_skips_the_checks() {
    let mut registry = EntityRegistry::<()>::new();
    let mut store = ComponentStore::new(&mut registry);
    let h = store.add_new(&mut registry, 41u8, ()).unwrap();

    *store.component_mut(&registry, h.id()) += 1;
    assert_eq!(*store.component(&registry, h.id()), 42);
}

#[test]
fn slices_expose_the_dense_layout() {
    let mut registry = EntityRegistry::<()>::new();
    let mut store = ComponentStore::new(&mut registry);
    for value in [5u16, 6, 7] {
        store.add_new(&mut registry, value, ()).unwrap();
    }

    assert_eq!(store.components(), &[5, 6, 7]);
    assert_eq!(store.ids().len(), 3);

    for value in store.components_mut() {
        *value *= 2;
    }
    assert_eq!(store.components(), &[10, 12, 14]);
}
