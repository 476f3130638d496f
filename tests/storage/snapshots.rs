//! Snapshot round trips through MessagePack
//!
//! With the `serde` feature on, every storage container can be frozen to
//! bytes and thawed back. These tests check that what comes back is the
//! same world: handles resolve, dead handles stay dead, stores still agree
//! with their registry, and the id reuse order picks up where it left off.

use serde::{Deserialize, Serialize};

use warren_foundation::{Error, StoreId};
use warren_storage::{ArchetypeStore, ComponentStore, EntityRegistry, ReusePolicy, SlotArena};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Velocity {
    dx: f32,
    dy: f32,
}

type Probe = (Position, Velocity);

fn round_trip<T>(value: &T) -> T
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let bytes = rmp_serde::to_vec_named(value).expect("serialize");
    rmp_serde::from_slice(&bytes).expect("deserialize")
}

// =============================================================================
// Arena Snapshots
// =============================================================================

#[test]
fn a_slot_arena_snapshot_keeps_dead_handles_dead() {
    let mut arena = SlotArena::new()
        .with_policy(ReusePolicy::Fifo)
        .with_limit(16);
    let a = arena.insert("alpha".to_string()).unwrap();
    let b = arena.insert("beta".to_string()).unwrap();
    let c = arena.insert("gamma".to_string()).unwrap();
    arena.remove(b);

    let thawed: SlotArena<String> = round_trip(&arena);

    assert_eq!(thawed.len(), 2);
    assert_eq!(thawed.get(a).map(String::as_str), Some("alpha"));
    assert_eq!(thawed.get(c).map(String::as_str), Some("gamma"));
    assert!(!thawed.is_valid(b));
    assert_eq!(thawed.policy(), ReusePolicy::Fifo);
    assert_eq!(thawed.limit(), 16);
}

#[test]
fn an_arena_thaws_with_its_free_chain_intact() {
    let mut arena = SlotArena::new().with_policy(ReusePolicy::Fifo);
    let handles: Vec<_> = (0..4).map(|i| arena.insert(i).unwrap()).collect();
    arena.remove(handles[1]);
    arena.remove(handles[3]);

    let mut thawed: SlotArena<i32> = round_trip(&arena);

    // Both copies hand out the same ids in the same order from here on.
    for value in [90, 91, 92] {
        let expected = arena.insert(value).unwrap();
        assert_eq!(thawed.insert(value).unwrap(), expected);
    }
}

// =============================================================================
// Registry Snapshots
// =============================================================================

#[test]
fn a_registry_round_trips_through_messagepack() {
    let mut registry = EntityRegistry::<()>::new();
    let handles: Vec<_> = (0..4)
        .map(|_| registry.create_unassigned(()).unwrap())
        .collect();
    registry.erase(handles[2]);

    let thawed: EntityRegistry<()> = round_trip(&registry);

    assert_eq!(thawed.len(), 3);
    for (i, h) in handles.iter().enumerate() {
        assert_eq!(thawed.is_valid(*h), i != 2);
    }
    assert_eq!(
        thawed.validate(handles[2]),
        Err(Error::EntityNotFound(handles[2].id()))
    );
    assert_eq!(thawed.generation(handles[2].id()), Some(1));
}

#[test]
fn reuse_order_is_part_of_the_snapshot() {
    let mut registry = EntityRegistry::<()>::new().with_policy(ReusePolicy::Fifo);
    let handles: Vec<_> = (0..6)
        .map(|_| registry.create_unassigned(()).unwrap())
        .collect();
    for i in [4, 0, 2] {
        registry.erase(handles[i]);
    }

    let mut thawed: EntityRegistry<()> = round_trip(&registry);

    for _ in 0..3 {
        let expected = registry.create_unassigned(()).unwrap();
        assert_eq!(thawed.create_unassigned(()).unwrap(), expected);
    }
    assert_eq!(thawed.len(), registry.len());
}

#[test]
fn metadata_rides_through_the_snapshot() {
    let mut registry = EntityRegistry::<u8>::new();
    let a = registry.create_unassigned(7).unwrap();
    let b = registry.create_unassigned(9).unwrap();

    let thawed: EntityRegistry<u8> = round_trip(&registry);

    assert_eq!(thawed.metadata_of(a), Ok(7));
    assert_eq!(thawed.metadata_of(b), Ok(9));
}

// =============================================================================
// Whole-World Snapshots
// =============================================================================

#[derive(Serialize, Deserialize)]
struct SaveFile {
    registry: EntityRegistry<u8>,
    positions: ComponentStore<Position>,
}

#[test]
fn a_registry_and_its_store_freeze_together() {
    let mut registry = EntityRegistry::<u8>::new();
    let mut positions = ComponentStore::new(&mut registry);

    let handles: Vec<_> = (0..5)
        .map(|i| {
            let x = f32::from(i);
            let position = Position { x, y: -x };
            positions.add_new(&mut registry, position, i).unwrap()
        })
        .collect();
    // Leave a swap-and-pop scar so the thawed rows are not simply 0..n.
    positions.erase(&mut registry, handles[1].id());

    let save = SaveFile {
        registry,
        positions,
    };
    let thawed: SaveFile = round_trip(&save);
    let SaveFile { mut registry, positions } = thawed;

    positions
        .validate(&registry)
        .expect("store and registry agree after thaw");
    assert_eq!(registry.len(), 4);
    assert_eq!(positions.len(), 4);
    for (i, h) in handles.iter().enumerate() {
        if i == 1 {
            assert!(positions.get(&registry, *h).is_err());
            continue;
        }
        let x = i as f32;
        let expected = Position { x, y: -x };
        assert_eq!(positions.get(&registry, *h), Ok(&expected));
        assert_eq!(registry.metadata_of(*h), Ok(i as u8));
    }

    // The store-id counter thawed too; the next store gets the next id.
    assert_eq!(registry.register_store(), StoreId::new(2));
}

#[test]
fn archetype_columns_round_trip() {
    let mut registry = EntityRegistry::<()>::new();
    let mut probes = ArchetypeStore::<Probe>::new(&mut registry);

    for i in 0..4u8 {
        let x = f32::from(i);
        let row = (Position { x, y: 0.0 }, Velocity { dx: 1.0, dy: x });
        probes.add_new(&mut registry, row, ()).unwrap();
    }
    let first = *probes.ids().first().unwrap();
    probes.erase(&mut registry, first);

    let frozen = (registry, probes);
    let (thawed_registry, thawed_probes): (EntityRegistry<()>, ArchetypeStore<Probe>) =
        round_trip(&frozen);

    thawed_probes
        .validate(&thawed_registry)
        .expect("columns and registry agree after thaw");
    assert_eq!(thawed_probes.ids(), frozen.1.ids());
    assert_eq!(
        thawed_probes.column::<Position>(),
        frozen.1.column::<Position>()
    );
    assert_eq!(
        thawed_probes.column::<Velocity>(),
        frozen.1.column::<Velocity>()
    );
}

// =============================================================================
// Edge States
// =============================================================================

#[test]
fn empty_containers_round_trip() {
    let registry = EntityRegistry::<()>::new();
    let thawed: EntityRegistry<()> = round_trip(&registry);
    assert!(thawed.is_empty());
    assert_eq!(thawed.limit(), registry.limit());

    let arena = SlotArena::<u8>::new();
    let thawed: SlotArena<u8> = round_trip(&arena);
    assert!(thawed.is_empty());
    assert_eq!(thawed.slots(), 0);
}
