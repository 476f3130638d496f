//! Entity registry: the id authority shared by all dense stores.
//!
//! [`EntityRegistry`] owns the id space. Per entity it tracks a generation, a
//! [`Location`] naming the store and row where the entity's data lives, and a
//! caller-defined blob of `Copy` metadata. The stores themselves hold the
//! component data and write locations back through the registry whenever a
//! swap-and-pop moves a row.
//!
//! Accessors come in two tiers. Raw-id forms (`location`, `set_location`,
//! `metadata`) trust the caller and panic on a dead id, like slice indexing.
//! Handle-taking forms (`validate`, `location_of`, `metadata_of`) pay the
//! generation test and report failure as a [`Result`].

// Ids are u32 by construction; record counts never exceed them.
#![allow(clippy::cast_possible_truncation)]

use warren_foundation::{EntityId, Error, Handle, Location, Result, StoreId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arena::{MAX_IDS, ReusePolicy};

/// Occupancy state of one registry record.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
enum RecordState<M> {
    /// The entity is alive.
    Live {
        /// Which store holds the entity's row, and where.
        location: Location,
        /// Caller-defined per-entity metadata.
        metadata: M,
    },
    /// The record is free; `next_free` chains toward the free tail.
    Free {
        /// The next freed id in reissue order.
        next_free: Option<EntityId>,
    },
}

#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct Record<M> {
    /// Bumped every time the record is freed.
    generation: u32,
    state: RecordState<M>,
}

/// The id authority for a family of dense stores.
///
/// The registry never stores component data. It answers three questions:
/// does this id name a live entity, where does that entity's row live, and
/// is this handle still current. Stores registered with it keep the answers
/// truthful by writing locations back on every row move.
///
/// Nothing here is synchronized; the registry and its stores expect one
/// logical owner. Wrap the whole family behind one lock for cross-thread
/// use and keep multi-step mutations under a single acquisition.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityRegistry<M = ()> {
    records: Vec<Record<M>>,
    free_head: Option<EntityId>,
    free_tail: Option<EntityId>,
    free_len: usize,
    live: usize,
    policy: ReusePolicy,
    limit: usize,
    next_store: u16,
}

impl<M: Copy> EntityRegistry<M> {
    /// Creates an empty registry with the default (LIFO) reuse policy and no
    /// practical id limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            free_head: None,
            free_tail: None,
            free_len: 0,
            live: 0,
            policy: ReusePolicy::Lifo,
            limit: MAX_IDS,
            next_store: 1,
        }
    }

    /// Creates an empty registry with preallocated room for `capacity`
    /// records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Sets the reuse policy. Intended at construction time.
    #[must_use]
    pub fn with_policy(mut self, policy: ReusePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the id limit. Intended at construction time; use
    /// [`set_limit`](Self::set_limit) on a populated registry.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(MAX_IDS);
        self
    }

    /// Reserves room for at least `additional` more records.
    pub fn reserve(&mut self, additional: usize) {
        self.records.reserve(additional);
    }

    /// Issues the next store id.
    ///
    /// Stores call this once at construction and keep the id for life.
    ///
    /// # Panics
    /// Panics when the `u16` store-id space is exhausted; a program that
    /// opens 65,534 stores against one registry has a structural bug.
    pub fn register_store(&mut self) -> StoreId {
        assert!(self.next_store < u16::MAX, "store id space exhausted");
        let store = StoreId::new(self.next_store);
        self.next_store += 1;
        store
    }

    /// Creates an entity at the given location.
    ///
    /// Most callers want [`create_unassigned`](Self::create_unassigned) and
    /// let a store's `add` claim the entity afterwards; creating directly
    /// into a store is how the stores implement `add_new`. Freed ids are
    /// recycled in the order the reuse policy dictates.
    ///
    /// # Errors
    /// Returns [`Error::IdExhausted`] if the live count reached the id
    /// limit. The registry is left untouched.
    pub fn create(&mut self, location: Location, metadata: M) -> Result<Handle> {
        debug_assert!(!location.is_invalid(), "create() with the erased marker");
        if self.live >= self.limit {
            return Err(Error::IdExhausted { limit: self.limit });
        }
        let (id, generation) = match self.pop_free() {
            Some(id) => {
                let record = &mut self.records[id.index()];
                record.state = RecordState::Live { location, metadata };
                (id, record.generation)
            }
            None => {
                let id = EntityId::new(self.records.len() as u32);
                self.records.push(Record {
                    generation: 0,
                    state: RecordState::Live { location, metadata },
                });
                (id, 0)
            }
        };
        self.live += 1;
        Ok(Handle::new(id, generation))
    }

    /// Creates an entity that is alive but resident in no store.
    ///
    /// # Errors
    /// Returns [`Error::IdExhausted`] if the live count reached the id
    /// limit.
    pub fn create_unassigned(&mut self, metadata: M) -> Result<Handle> {
        self.create(Location::unassigned(), metadata)
    }

    /// Returns true if `id` names a live entity.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.records
            .get(id.index())
            .is_some_and(|record| matches!(record.state, RecordState::Live { .. }))
    }

    /// Returns true if the handle refers to an entity that still exists.
    #[must_use]
    pub fn is_valid(&self, handle: Handle) -> bool {
        self.records.get(handle.id().index()).is_some_and(|record| {
            record.generation == handle.generation()
                && matches!(record.state, RecordState::Live { .. })
        })
    }

    /// Checks a handle, reporting why it fails.
    ///
    /// # Errors
    /// Returns [`Error::EntityNotFound`] if the id names no live entity, or
    /// [`Error::StaleHandle`] if the entity at that id is a newer
    /// incarnation.
    pub fn validate(&self, handle: Handle) -> Result<()> {
        let Some(record) = self.records.get(handle.id().index()) else {
            return Err(Error::EntityNotFound(handle.id()));
        };
        match record.state {
            RecordState::Free { .. } => Err(Error::EntityNotFound(handle.id())),
            RecordState::Live { .. } if record.generation == handle.generation() => Ok(()),
            RecordState::Live { .. } => Err(Error::StaleHandle(handle)),
        }
    }

    /// Returns a live entity's location.
    ///
    /// Raw-tier accessor.
    ///
    /// # Panics
    /// Panics if `id` does not name a live entity.
    #[must_use]
    pub fn location(&self, id: EntityId) -> Location {
        match self.records[id.index()].state {
            RecordState::Live { location, .. } => location,
            RecordState::Free { .. } => panic!("location() on dead {id:?}"),
        }
    }

    /// Checked variant of [`location`](Self::location).
    ///
    /// # Errors
    /// Returns [`Error::EntityNotFound`] or [`Error::StaleHandle`] if the
    /// handle no longer refers to a live entity.
    pub fn location_of(&self, handle: Handle) -> Result<Location> {
        self.validate(handle)?;
        Ok(self.location(handle.id()))
    }

    /// Writes a live entity's location.
    ///
    /// Writing [`Location::invalid`] is the erase path and behaves exactly
    /// like [`erase_id`](Self::erase_id), tolerating a dead id.
    ///
    /// # Panics
    /// Panics if `id` does not name a live entity (unless erasing).
    pub fn set_location(&mut self, id: EntityId, location: Location) {
        if location.is_invalid() {
            self.erase_id(id);
            return;
        }
        match &mut self.records[id.index()].state {
            RecordState::Live { location: slot, .. } => *slot = location,
            RecordState::Free { .. } => panic!("set_location() on dead {id:?}"),
        }
    }

    /// Returns a live entity's metadata.
    ///
    /// Raw-tier accessor.
    ///
    /// # Panics
    /// Panics if `id` does not name a live entity.
    #[must_use]
    pub fn metadata(&self, id: EntityId) -> &M {
        match &self.records[id.index()].state {
            RecordState::Live { metadata, .. } => metadata,
            RecordState::Free { .. } => panic!("metadata() on dead {id:?}"),
        }
    }

    /// Mutable variant of [`metadata`](Self::metadata).
    ///
    /// # Panics
    /// Panics if `id` does not name a live entity.
    #[must_use]
    pub fn metadata_mut(&mut self, id: EntityId) -> &mut M {
        match &mut self.records[id.index()].state {
            RecordState::Live { metadata, .. } => metadata,
            RecordState::Free { .. } => panic!("metadata_mut() on dead {id:?}"),
        }
    }

    /// Checked metadata read through a handle.
    ///
    /// # Errors
    /// Returns [`Error::EntityNotFound`] or [`Error::StaleHandle`] if the
    /// handle no longer refers to a live entity.
    pub fn metadata_of(&self, handle: Handle) -> Result<M> {
        self.validate(handle)?;
        Ok(*self.metadata(handle.id()))
    }

    /// Destroys a live entity's record.
    ///
    /// The generation is bumped, so handles minted for this incarnation
    /// fail validation forever after, and the id joins the free chain per
    /// the reuse policy. Returns false for a dead id, leaving the registry
    /// untouched. Erasure never touches any store; detach the row first
    /// (or use a store's `erase`, which does both).
    pub fn erase_id(&mut self, id: EntityId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.records[id.index()].generation += 1;
        self.push_free(id);
        self.live -= 1;
        true
    }

    /// Handle-checked variant of [`erase_id`](Self::erase_id).
    ///
    /// Returns false for stale handles, leaving the registry untouched.
    pub fn erase(&mut self, handle: Handle) -> bool {
        if !self.is_valid(handle) {
            return false;
        }
        self.erase_id(handle.id())
    }

    /// Mints a handle for a live id.
    #[must_use]
    pub fn handle_of(&self, id: EntityId) -> Option<Handle> {
        let record = self.records.get(id.index())?;
        match record.state {
            RecordState::Live { .. } => Some(Handle::new(id, record.generation)),
            RecordState::Free { .. } => None,
        }
    }

    /// Returns the generation counter of a slot, live or free.
    #[must_use]
    pub fn generation(&self, id: EntityId) -> Option<u32> {
        self.records.get(id.index()).map(|record| record.generation)
    }

    /// Iterates the live entities in id order.
    pub fn iter(&self) -> impl Iterator<Item = Handle> + '_ {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| match record.state {
                RecordState::Live { .. } => {
                    Some(Handle::new(EntityId::new(index as u32), record.generation))
                }
                RecordState::Free { .. } => None,
            })
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true if no entities are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Returns the total record count, free records included.
    #[must_use]
    pub fn slots(&self) -> usize {
        self.records.len()
    }

    /// Returns the id limit.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the reuse policy.
    #[must_use]
    pub fn policy(&self) -> ReusePolicy {
        self.policy
    }

    /// Lowers (or raises) the id limit.
    ///
    /// On success, records at or above the new limit are dropped; they are
    /// all free at that point. Their generation history is dropped with
    /// them.
    ///
    /// # Errors
    /// Returns [`Error::LimitBelowLive`] if any live id sits at or above
    /// the proposed limit. The registry is left untouched.
    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        let limit = limit.min(MAX_IDS);
        let stranded = self
            .records
            .iter()
            .skip(limit)
            .filter(|record| matches!(record.state, RecordState::Live { .. }))
            .count();
        if stranded > 0 {
            return Err(Error::LimitBelowLive {
                limit,
                live: stranded,
            });
        }
        self.limit = limit;
        if self.records.len() > limit {
            self.rebuild_free_chain_below(limit);
            self.records.truncate(limit);
        }
        Ok(())
    }

    /// Erases every live entity while keeping record memory and generation
    /// history.
    ///
    /// Handles minted before the clear all go stale, and freed ids become
    /// reusable in ascending order. Stores registered with this registry
    /// still hold their rows afterwards; clear them in the same breath.
    pub fn clear(&mut self) {
        for record in &mut self.records {
            if matches!(record.state, RecordState::Live { .. }) {
                record.generation += 1;
            }
        }
        self.link_all_free();
        self.live = 0;
    }

    /// Drops all records and generation history.
    ///
    /// Unlike [`clear`](Self::clear) this forgets generations: a handle
    /// minted before the reset can later pass validation against an
    /// unrelated entity that reused its id. The store-id counter survives,
    /// so stores already registered stay unique.
    pub fn reset(&mut self) {
        self.records = Vec::new();
        self.free_head = None;
        self.free_tail = None;
        self.free_len = 0;
        self.live = 0;
    }

    /// Sheds unused memory, dropping trailing free records.
    ///
    /// Dropped records lose their generation history, with the same caveat
    /// as [`reset`](Self::reset) for handles to ids that get reissued
    /// later.
    pub fn shrink_to_fit(&mut self) {
        let mut new_len = self.records.len();
        while new_len > 0 && matches!(self.records[new_len - 1].state, RecordState::Free { .. }) {
            new_len -= 1;
        }
        if new_len < self.records.len() {
            self.rebuild_free_chain_below(new_len);
            self.records.truncate(new_len);
        }
        self.records.shrink_to_fit();
    }

    fn pop_free(&mut self) -> Option<EntityId> {
        let id = self.free_head?;
        let next = match self.records[id.index()].state {
            RecordState::Free { next_free } => next_free,
            RecordState::Live { .. } => {
                debug_assert!(false, "free head points at a live record");
                None
            }
        };
        self.free_head = next;
        if self.free_head.is_none() {
            self.free_tail = None;
        }
        self.free_len -= 1;
        Some(id)
    }

    fn push_free(&mut self, id: EntityId) {
        match self.policy {
            ReusePolicy::Lifo => {
                self.records[id.index()].state = RecordState::Free {
                    next_free: self.free_head,
                };
                self.free_head = Some(id);
                if self.free_tail.is_none() {
                    self.free_tail = Some(id);
                }
            }
            ReusePolicy::Fifo => {
                self.records[id.index()].state = RecordState::Free { next_free: None };
                if let Some(tail) = self.free_tail {
                    if let RecordState::Free { next_free } = &mut self.records[tail.index()].state
                    {
                        *next_free = Some(id);
                    } else {
                        debug_assert!(false, "free tail points at a live record");
                    }
                } else {
                    self.free_head = Some(id);
                }
                self.free_tail = Some(id);
            }
        }
        self.free_len += 1;
    }

    /// Walks the free chain, keeping only ids below `bound` in their
    /// original order, and relinks the survivors.
    fn rebuild_free_chain_below(&mut self, bound: usize) {
        let mut kept: Vec<EntityId> = Vec::with_capacity(self.free_len);
        let mut cursor = self.free_head;
        while let Some(id) = cursor {
            cursor = match self.records[id.index()].state {
                RecordState::Free { next_free } => next_free,
                RecordState::Live { .. } => {
                    debug_assert!(false, "free chain runs through a live record");
                    None
                }
            };
            if id.index() < bound {
                kept.push(id);
            }
        }
        for pair in kept.windows(2) {
            self.records[pair[0].index()].state = RecordState::Free {
                next_free: Some(pair[1]),
            };
        }
        if let Some(&last) = kept.last() {
            self.records[last.index()].state = RecordState::Free { next_free: None };
        }
        self.free_head = kept.first().copied();
        self.free_tail = kept.last().copied();
        self.free_len = kept.len();
    }

    /// Marks every record free and chains them in ascending id order.
    fn link_all_free(&mut self) {
        let count = self.records.len();
        for (index, record) in self.records.iter_mut().enumerate() {
            let next_free = if index + 1 < count {
                Some(EntityId::new((index + 1) as u32))
            } else {
                None
            };
            record.state = RecordState::Free { next_free };
        }
        self.free_head = if count > 0 {
            Some(EntityId::new(0))
        } else {
            None
        };
        self.free_tail = if count > 0 {
            Some(EntityId::new((count - 1) as u32))
        } else {
            None
        };
        self.free_len = count;
    }
}

impl<M: Copy> Default for EntityRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}
