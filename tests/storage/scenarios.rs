//! End-to-end storage scenarios
//!
//! Walks multi-step lifecycles across the registry and stores the way an
//! application would drive them.

use warren_foundation::Error;
use warren_storage::{ArchetypeStore, ComponentStore, EntityRegistry, ReusePolicy};

// =============================================================================
// Erase, Backfill, Reuse
// =============================================================================

#[test]
fn erase_backfill_and_reuse_round_trip() {
    let mut registry = EntityRegistry::<()>::new();
    let mut store = ComponentStore::new(&mut registry);

    // Five entities land in rows 0..5 in creation order.
    let handles: Vec<_> = (0..5)
        .map(|i| store.add_new(&mut registry, i * 100, ()).unwrap())
        .collect();
    for (row, h) in handles.iter().enumerate() {
        assert_eq!(registry.location(h.id()).index(), row);
    }

    // Erasing the middle entity backfills its row with the last one.
    let erased = handles[2];
    store.erase(&mut registry, erased.id());

    assert_eq!(registry.location(handles[4].id()).index(), 2);
    assert_eq!(*store.component(&registry, handles[4].id()), 400);
    assert!(!registry.contains(erased.id()));

    // The freed id comes back first, one generation later.
    let revived = store.add_new(&mut registry, 999, ()).unwrap();
    assert_eq!(revived.id(), erased.id());
    assert_eq!(revived.generation(), erased.generation() + 1);
    assert_eq!(registry.location(revived.id()).index(), 4);

    // The old handle is recognizably stale, not merely missing.
    assert_eq!(registry.validate(erased), Err(Error::StaleHandle(erased)));
    assert_eq!(
        store.get(&registry, erased),
        Err(Error::StaleHandle(erased))
    );
    assert_eq!(store.get(&registry, revived), Ok(&999));

    // Every surviving handle still resolves to its own value.
    for (i, h) in handles.iter().enumerate() {
        if i == 2 {
            continue;
        }
        assert_eq!(store.get(&registry, *h), Ok(&(i as i32 * 100)));
    }
    store.validate(&registry).unwrap();
}

// =============================================================================
// A Small Game Loop
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct Hitpoints(i32);

#[test]
fn waves_of_spawns_and_culls() {
    // FIFO reuse spreads ids out, so late respawns do not immediately
    // shadow recently dead entities.
    let mut registry = EntityRegistry::<u8>::new().with_policy(ReusePolicy::Fifo);
    let mut mobs = ArchetypeStore::<(Hitpoints, u32)>::new(&mut registry);

    const WAVE: usize = 8;
    let mut alive = Vec::new();

    for wave in 0..4u8 {
        // Spawn a wave tagged with its number in the metadata.
        for i in 0..WAVE {
            let row = (Hitpoints(i as i32 * 2 - 5), wave as u32);
            let h = mobs.add_new(&mut registry, row, wave).unwrap();
            alive.push(h);
        }

        // Cull everything at or below zero hitpoints.
        mobs.erase_if_component::<Hitpoints, _, _>(&mut registry, |_, hp| hp.0 <= 0);
        alive.retain(|h| registry.is_valid(*h));

        // The survivors' metadata still names their wave.
        for &h in &alive {
            let (_, spawned_in) = mobs.row(&registry, h.id());
            assert_eq!(u32::from(*registry.metadata(h.id())), *spawned_in);
        }
        mobs.validate(&registry).unwrap();
    }

    // 3 of each wave's 8 spawns sit at or below zero hitpoints.
    assert_eq!(registry.len(), 4 * (WAVE - 3));
    assert_eq!(mobs.len(), registry.len());
}

// =============================================================================
// Capacity Pressure
// =============================================================================

#[test]
fn a_bounded_pool_recycles_under_pressure() {
    let mut registry = EntityRegistry::<()>::new().with_limit(4);
    let mut pool = ComponentStore::new(&mut registry).with_limit(4);

    let mut live: Vec<_> = (0..4)
        .map(|i| pool.add_new(&mut registry, i, ()).unwrap())
        .collect();

    // The pool is at capacity on both axes.
    assert!(matches!(
        pool.add_new(&mut registry, 99, ()),
        Err(Error::StoreFull { .. })
    ));

    // Retiring one slot frees an id and a row together.
    for round in 0..8 {
        let retired = live.remove(0);
        pool.erase(&mut registry, retired.id());
        let fresh = pool.add_new(&mut registry, round + 10, ()).unwrap();
        assert!(!registry.is_valid(retired));
        live.push(fresh);
        assert_eq!(pool.len(), 4);
        assert_eq!(registry.len(), 4);
    }
    pool.validate(&registry).unwrap();
}

// =============================================================================
// Rebuilding a World
// =============================================================================

#[test]
fn clear_supports_level_reloads_without_stale_leaks() {
    let mut registry = EntityRegistry::<()>::new();
    let mut props = ComponentStore::new(&mut registry);

    let old_handles: Vec<_> = (0..3)
        .map(|i| props.add_new(&mut registry, i, ()).unwrap())
        .collect();

    // Reload: stores clear their rows, then the registry clears its ids.
    props.clear(&mut registry);
    registry.clear();

    let new_handles: Vec<_> = (0..3)
        .map(|i| props.add_new(&mut registry, i + 50, ()).unwrap())
        .collect();

    // Same ids, new generations. Old handles cannot reach new props.
    for (old, new) in old_handles.iter().zip(&new_handles) {
        assert_eq!(old.id(), new.id());
        assert_ne!(old.generation(), new.generation());
        assert!(props.get(&registry, *old).is_err());
    }
    assert_eq!(props.get(&registry, new_handles[1]), Ok(&51));
}
