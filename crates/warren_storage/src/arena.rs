//! Generational slot arena with dense value storage.
//!
//! [`SlotArena`] hands out stable ids while keeping the values themselves
//! packed in one contiguous vector. Lookup goes id, to slot, to dense index;
//! removal swap-and-pops the dense pair and repoints the slot of whichever
//! value got moved into the hole. Freed ids are recycled through an intrusive
//! free chain in either LIFO or FIFO order.

// Dense indices and ids are u32 by construction; lengths never exceed them.
#![allow(clippy::cast_possible_truncation)]

use warren_foundation::{EntityId, Error, Handle, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest id count any container hands out; the top value stays reserved
/// for [`EntityId::INVALID`].
pub(crate) const MAX_IDS: usize = u32::MAX as usize;

/// Order in which freed ids are reissued.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReusePolicy {
    /// Most recently freed id first.
    #[default]
    Lifo,
    /// Oldest freed id first, maximizing the delay before an id returns.
    Fifo,
}

/// Occupancy state of one slot.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
enum SlotState {
    /// The slot's value lives at this dense index.
    Occupied {
        /// Index into the dense vectors.
        dense: u32,
    },
    /// The slot is free; `next_free` chains toward the free tail.
    Vacant {
        /// The next freed id in reissue order.
        next_free: Option<EntityId>,
    },
}

#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct Slot {
    /// Bumped every time the slot is freed.
    generation: u32,
    state: SlotState,
}

/// A generational slot map with packed values.
///
/// Values are stored densely, so iteration touches contiguous memory; the
/// id-indexed slot table provides the stable indirection. All single-value
/// operations are O(1). Removal does not preserve the order of the
/// surviving values.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotArena<T> {
    slots: Vec<Slot>,
    dense: Vec<T>,
    dense_ids: Vec<EntityId>,
    free_head: Option<EntityId>,
    free_tail: Option<EntityId>,
    free_len: usize,
    policy: ReusePolicy,
    limit: usize,
}

impl<T> SlotArena<T> {
    /// Creates an empty arena with the default (LIFO) reuse policy and no
    /// practical id limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            dense: Vec::new(),
            dense_ids: Vec::new(),
            free_head: None,
            free_tail: None,
            free_len: 0,
            policy: ReusePolicy::Lifo,
            limit: MAX_IDS,
        }
    }

    /// Creates an empty arena with preallocated room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            dense: Vec::with_capacity(capacity),
            dense_ids: Vec::with_capacity(capacity),
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
    /// [`set_limit`](Self::set_limit) on a populated arena.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(MAX_IDS);
        self
    }

    /// Reserves room for at least `additional` more values.
    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
        self.dense.reserve(additional);
        self.dense_ids.reserve(additional);
    }

    /// Inserts a value and returns a handle to it.
    ///
    /// Recycles a freed id when one is available, in the order the reuse
    /// policy dictates; otherwise a fresh id is assigned.
    ///
    /// # Errors
    /// Returns [`Error::IdExhausted`] if the arena already holds `limit`
    /// values. The arena is left untouched.
    pub fn insert(&mut self, value: T) -> Result<Handle> {
        if self.dense.len() >= self.limit {
            return Err(Error::IdExhausted { limit: self.limit });
        }
        let dense = self.dense.len() as u32;
        let (id, generation) = match self.pop_free() {
            Some(id) => {
                let slot = &mut self.slots[id.index()];
                slot.state = SlotState::Occupied { dense };
                (id, slot.generation)
            }
            None => {
                let id = EntityId::new(self.slots.len() as u32);
                self.slots.push(Slot {
                    generation: 0,
                    state: SlotState::Occupied { dense },
                });
                (id, 0)
            }
        };
        self.dense.push(value);
        self.dense_ids.push(id);
        Ok(Handle::new(id, generation))
    }

    /// Removes the value the handle refers to and returns it.
    ///
    /// The last value is swapped into the vacated dense position, the freed
    /// slot's generation is bumped, and its id joins the free chain. Returns
    /// `None` for stale or dead handles, leaving the arena untouched.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        if !self.is_valid(handle) {
            return None;
        }
        self.remove_id(handle.id())
    }

    /// Removes the value stored under `id`, without a generation test.
    ///
    /// Returns `None` if the id holds no value.
    pub fn remove_id(&mut self, id: EntityId) -> Option<T> {
        let dense_index = match self.slots.get(id.index())?.state {
            SlotState::Occupied { dense } => dense as usize,
            SlotState::Vacant { .. } => return None,
        };
        let value = self.take_at(dense_index);
        self.slots[id.index()].generation += 1;
        self.push_free(id);
        Some(value)
    }

    /// Returns the value the handle refers to, or `None` if it is stale.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        let slot = self.slots.get(handle.id().index())?;
        match slot.state {
            SlotState::Occupied { dense } if slot.generation == handle.generation() => {
                self.dense.get(dense as usize)
            }
            _ => None,
        }
    }

    /// Mutable variant of [`get`](Self::get).
    #[must_use]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let slot = self.slots.get(handle.id().index())?;
        let dense = match slot.state {
            SlotState::Occupied { dense } if slot.generation == handle.generation() => {
                dense as usize
            }
            _ => return None,
        };
        self.dense.get_mut(dense)
    }

    /// Returns the value stored under `id`, without a generation test.
    #[must_use]
    pub fn get_id(&self, id: EntityId) -> Option<&T> {
        let slot = self.slots.get(id.index())?;
        match slot.state {
            SlotState::Occupied { dense } => self.dense.get(dense as usize),
            SlotState::Vacant { .. } => None,
        }
    }

    /// Mutable variant of [`get_id`](Self::get_id).
    #[must_use]
    pub fn get_id_mut(&mut self, id: EntityId) -> Option<&mut T> {
        let slot = self.slots.get(id.index())?;
        let dense = match slot.state {
            SlotState::Occupied { dense } => dense as usize,
            SlotState::Vacant { .. } => return None,
        };
        self.dense.get_mut(dense)
    }

    /// Returns true if `id` currently holds a value.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.slots
            .get(id.index())
            .is_some_and(|slot| matches!(slot.state, SlotState::Occupied { .. }))
    }

    /// Returns true if the handle refers to a value that still exists.
    #[must_use]
    pub fn is_valid(&self, handle: Handle) -> bool {
        self.slots.get(handle.id().index()).is_some_and(|slot| {
            slot.generation == handle.generation()
                && matches!(slot.state, SlotState::Occupied { .. })
        })
    }

    /// Mints a handle for a live id.
    #[must_use]
    pub fn handle_of(&self, id: EntityId) -> Option<Handle> {
        let slot = self.slots.get(id.index())?;
        match slot.state {
            SlotState::Occupied { .. } => Some(Handle::new(id, slot.generation)),
            SlotState::Vacant { .. } => None,
        }
    }

    /// Returns the packed values. Order is unspecified.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.dense
    }

    /// Mutable variant of [`values`](Self::values).
    #[must_use]
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.dense
    }

    /// Returns the ids owning each packed value, in dense order.
    #[must_use]
    pub fn ids(&self) -> &[EntityId] {
        &self.dense_ids
    }

    /// Iterates the live values with their current handles.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.dense_ids
            .iter()
            .zip(self.dense.iter())
            .map(|(&id, value)| (Handle::new(id, self.slots[id.index()].generation), value))
    }

    /// Mutable variant of [`iter`](Self::iter).
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> + '_ {
        let slots = &self.slots;
        self.dense_ids
            .iter()
            .zip(self.dense.iter_mut())
            .map(move |(&id, value)| (Handle::new(id, slots[id.index()].generation), value))
    }

    /// Returns the number of live values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns true if the arena holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Returns the total slot count, free slots included.
    #[must_use]
    pub fn slots(&self) -> usize {
        self.slots.len()
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
    /// On success, slots at or above the new limit are dropped; they are all
    /// vacant at that point. Their generation history is dropped with them.
    ///
    /// # Errors
    /// Returns [`Error::LimitBelowLive`] if any live id sits at or above the
    /// proposed limit. The arena is left untouched.
    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        let limit = limit.min(MAX_IDS);
        let stranded = self
            .dense_ids
            .iter()
            .filter(|id| id.index() >= limit)
            .count();
        if stranded > 0 {
            return Err(Error::LimitBelowLive {
                limit,
                live: stranded,
            });
        }
        self.limit = limit;
        if self.slots.len() > limit {
            self.rebuild_free_chain_below(limit);
            self.slots.truncate(limit);
        }
        Ok(())
    }

    /// Removes every value while keeping slot memory and generation history.
    ///
    /// Every previously live slot gets a generation bump, so handles minted
    /// before the clear all go stale. Freed ids become reusable in ascending
    /// order.
    pub fn clear(&mut self) {
        self.dense.clear();
        self.dense_ids.clear();
        for slot in &mut self.slots {
            if matches!(slot.state, SlotState::Occupied { .. }) {
                slot.generation += 1;
            }
        }
        self.link_all_vacant();
    }

    /// Drops all values, slots, and generation history.
    ///
    /// Unlike [`clear`](Self::clear) this forgets generations: a handle
    /// minted before the reset can later pass validation against an
    /// unrelated value that reused its id. Reach for `clear` unless the
    /// memory must go.
    pub fn reset(&mut self) {
        self.slots = Vec::new();
        self.dense = Vec::new();
        self.dense_ids = Vec::new();
        self.free_head = None;
        self.free_tail = None;
        self.free_len = 0;
    }

    /// Sheds unused memory, dropping trailing vacant slots.
    ///
    /// Dropped slots lose their generation history, with the same caveat as
    /// [`reset`](Self::reset) for handles to ids that get reissued later.
    pub fn shrink_to_fit(&mut self) {
        let mut new_len = self.slots.len();
        while new_len > 0 && matches!(self.slots[new_len - 1].state, SlotState::Vacant { .. }) {
            new_len -= 1;
        }
        if new_len < self.slots.len() {
            self.rebuild_free_chain_below(new_len);
            self.slots.truncate(new_len);
        }
        self.slots.shrink_to_fit();
        self.dense.shrink_to_fit();
        self.dense_ids.shrink_to_fit();
    }

    /// Swap-and-pops the dense pair at `dense_index`, repointing the slot of
    /// the value that moved into the hole.
    fn take_at(&mut self, dense_index: usize) -> T {
        let value = self.dense.swap_remove(dense_index);
        self.dense_ids.swap_remove(dense_index);
        if dense_index < self.dense.len() {
            let moved = self.dense_ids[dense_index];
            self.slots[moved.index()].state = SlotState::Occupied {
                dense: dense_index as u32,
            };
        }
        value
    }

    fn pop_free(&mut self) -> Option<EntityId> {
        let id = self.free_head?;
        let next = match self.slots[id.index()].state {
            SlotState::Vacant { next_free } => next_free,
            SlotState::Occupied { .. } => {
                debug_assert!(false, "free head points at an occupied slot");
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
                self.slots[id.index()].state = SlotState::Vacant {
                    next_free: self.free_head,
                };
                self.free_head = Some(id);
                if self.free_tail.is_none() {
                    self.free_tail = Some(id);
                }
            }
            ReusePolicy::Fifo => {
                self.slots[id.index()].state = SlotState::Vacant { next_free: None };
                if let Some(tail) = self.free_tail {
                    if let SlotState::Vacant { next_free } = &mut self.slots[tail.index()].state {
                        *next_free = Some(id);
                    } else {
                        debug_assert!(false, "free tail points at an occupied slot");
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
            cursor = match self.slots[id.index()].state {
                SlotState::Vacant { next_free } => next_free,
                SlotState::Occupied { .. } => {
                    debug_assert!(false, "free chain runs through an occupied slot");
                    None
                }
            };
            if id.index() < bound {
                kept.push(id);
            }
        }
        for pair in kept.windows(2) {
            self.slots[pair[0].index()].state = SlotState::Vacant {
                next_free: Some(pair[1]),
            };
        }
        if let Some(&last) = kept.last() {
            self.slots[last.index()].state = SlotState::Vacant { next_free: None };
        }
        self.free_head = kept.first().copied();
        self.free_tail = kept.last().copied();
        self.free_len = kept.len();
    }

    /// Marks every slot vacant and chains them in ascending id order.
    fn link_all_vacant(&mut self) {
        let count = self.slots.len();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let next_free = if index + 1 < count {
                Some(EntityId::new((index + 1) as u32))
            } else {
                None
            };
            slot.state = SlotState::Vacant { next_free };
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

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
