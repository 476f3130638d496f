//! Integration tests for locations
//!
//! Tests the three location states and store id sentinels.

use warren_foundation::{Location, StoreId};

// =============================================================================
// Store Ids
// =============================================================================

#[test]
fn store_id_sentinels_are_distinct() {
    assert!(StoreId::NONE.is_none());
    assert!(!StoreId::NONE.is_invalid());
    assert!(StoreId::INVALID.is_invalid());
    assert!(!StoreId::INVALID.is_none());
    assert_ne!(StoreId::NONE, StoreId::INVALID);
}

#[test]
fn real_store_ids_are_neither_sentinel() {
    let store = StoreId::new(3);
    assert!(!store.is_none());
    assert!(!store.is_invalid());
    assert_eq!(store.get(), 3);
}

#[test]
fn store_ids_format_readably() {
    assert_eq!(format!("{}", StoreId::new(3)), "Store(3)");
    assert_eq!(format!("{}", StoreId::NONE), "Store(none)");
    assert_eq!(format!("{}", StoreId::INVALID), "Store(invalid)");
}

// =============================================================================
// Location States
// =============================================================================

#[test]
fn unassigned_is_alive_but_nowhere() {
    let loc = Location::unassigned();
    assert!(loc.is_unassigned());
    assert!(!loc.is_assigned());
    assert!(!loc.is_invalid());
    assert!(loc.store().is_none());
}

#[test]
fn in_store_locations_carry_store_and_row() {
    let loc = Location::in_store(StoreId::new(2), 7);
    assert!(loc.is_assigned());
    assert!(!loc.is_unassigned());
    assert!(!loc.is_invalid());
    assert_eq!(loc.store(), StoreId::new(2));
    assert_eq!(loc.row(), 7);
    assert_eq!(loc.index(), 7usize);
}

#[test]
fn invalid_marks_dead_entities() {
    let loc = Location::invalid();
    assert!(loc.is_invalid());
    assert!(!loc.is_assigned());
    assert!(!loc.is_unassigned());
}

#[test]
fn the_default_location_is_unassigned() {
    assert!(Location::default().is_unassigned());
}

#[test]
fn locations_format_readably() {
    assert_eq!(
        format!("{:?}", Location::in_store(StoreId::new(2), 7)),
        "Location(Store(2) row 7)"
    );
    assert_eq!(
        format!("{:?}", Location::unassigned()),
        "Location(unassigned)"
    );
    assert_eq!(format!("{:?}", Location::invalid()), "Location(invalid)");
}
