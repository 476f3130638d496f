//! Dense single-component storage.
//!
//! [`ComponentStore`] keeps one component type packed in parallel `ids`/`data`
//! vectors. It owns no liveness information: an [`EntityRegistry`] is passed
//! into every operation that reads or writes locations, and every row move by
//! swap-and-pop is written back through it so the registry's answer for the
//! displaced entity stays truthful.
//!
//! `remove` and `erase` differ on purpose. Remove detaches: the row goes
//! away but the entity stays alive, loose and unassigned. Erase removes the
//! row and destroys the registry record in the same step.

// Rows are u32 by construction; store lengths never exceed them.
#![allow(clippy::cast_possible_truncation)]

use warren_foundation::{EntityId, Error, Handle, Location, Result, StoreId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arena::MAX_IDS;
use crate::registry::EntityRegistry;

/// Packed storage for one component type.
///
/// A store is bound to the registry that issued its [`StoreId`] at
/// construction; passing a different registry to its operations is a logic
/// error. Row order is unspecified and changes on removal.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentStore<C> {
    store: StoreId,
    ids: Vec<EntityId>,
    data: Vec<C>,
    limit: usize,
}

impl<C> ComponentStore<C> {
    /// Creates a store registered with `registry`.
    #[must_use]
    pub fn new<M: Copy>(registry: &mut EntityRegistry<M>) -> Self {
        Self {
            store: registry.register_store(),
            ids: Vec::new(),
            data: Vec::new(),
            limit: MAX_IDS,
        }
    }

    /// Sets the element limit. Intended at construction time.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(MAX_IDS);
        self
    }

    /// Preallocates room for `capacity` rows.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.ids.reserve(capacity);
        self.data.reserve(capacity);
        self
    }

    /// Adds a component for an entity that is currently in no store.
    ///
    /// On success the entity's location points at the new dense row.
    ///
    /// # Errors
    /// Returns [`Error::StoreFull`] at the element limit, or
    /// [`Error::AlreadyAssigned`] if the entity resides in any store,
    /// this one included. Nothing changes on error.
    ///
    /// # Panics
    /// Panics if `id` does not name a live entity.
    pub fn add<M: Copy>(
        &mut self,
        registry: &mut EntityRegistry<M>,
        id: EntityId,
        component: C,
    ) -> Result<()> {
        if self.data.len() >= self.limit {
            return Err(Error::StoreFull {
                store: self.store,
                limit: self.limit,
            });
        }
        let location = registry.location(id);
        if !location.is_unassigned() {
            return Err(Error::AlreadyAssigned {
                id,
                store: location.store(),
            });
        }
        let row = self.data.len() as u32;
        registry.set_location(id, Location::in_store(self.store, row));
        self.ids.push(id);
        self.data.push(component);
        Ok(())
    }

    /// Creates a fresh entity and adds its component in one step.
    ///
    /// # Errors
    /// Returns [`Error::StoreFull`] at the element limit, or
    /// [`Error::IdExhausted`] if the registry cannot create the entity.
    /// Nothing is created anywhere on error.
    pub fn add_new<M: Copy>(
        &mut self,
        registry: &mut EntityRegistry<M>,
        component: C,
        metadata: M,
    ) -> Result<Handle> {
        if self.data.len() >= self.limit {
            return Err(Error::StoreFull {
                store: self.store,
                limit: self.limit,
            });
        }
        let row = self.data.len() as u32;
        let handle = registry.create(Location::in_store(self.store, row), metadata)?;
        self.ids.push(handle.id());
        self.data.push(component);
        Ok(handle)
    }

    /// Detaches an entity's component without destroying the entity.
    ///
    /// The last row is swapped into the hole and the displaced entity's
    /// location is rewritten; the removed entity goes back to unassigned.
    /// Returns false if the entity is not resident here, touching nothing.
    ///
    /// # Panics
    /// Panics if `id` does not name a live entity.
    pub fn remove<M: Copy>(&mut self, registry: &mut EntityRegistry<M>, id: EntityId) -> bool {
        self.take(registry, id).is_some()
    }

    /// Like [`remove`](Self::remove), but hands the component back.
    ///
    /// # Panics
    /// Panics if `id` does not name a live entity.
    pub fn take<M: Copy>(&mut self, registry: &mut EntityRegistry<M>, id: EntityId) -> Option<C> {
        let location = registry.location(id);
        if location.store() != self.store {
            return None;
        }
        let component = self.take_row(registry, location.index());
        registry.set_location(id, Location::unassigned());
        Some(component)
    }

    /// Removes the row and destroys the entity's registry record.
    ///
    /// Returns false if the entity is not resident here; the registry
    /// record survives in that case.
    ///
    /// # Panics
    /// Panics if `id` does not name a live entity.
    pub fn erase<M: Copy>(&mut self, registry: &mut EntityRegistry<M>, id: EntityId) -> bool {
        let location = registry.location(id);
        if location.store() != self.store {
            return false;
        }
        self.take_row(registry, location.index());
        registry.erase_id(id);
        true
    }

    /// Erases every resident whose component matches the predicate.
    ///
    /// Sweeps the dense array with swap-and-pop per match; the row swapped
    /// into the hole is tested before the cursor advances. Order of the
    /// survivors is not preserved. Returns the number erased.
    pub fn erase_if<M: Copy, F>(&mut self, registry: &mut EntityRegistry<M>, mut pred: F) -> usize
    where
        F: FnMut(EntityId, &C) -> bool,
    {
        let mut erased = 0;
        let mut row = 0;
        while row < self.data.len() {
            if pred(self.ids[row], &self.data[row]) {
                let id = self.ids[row];
                self.take_row(registry, row);
                registry.erase_id(id);
                erased += 1;
            } else {
                row += 1;
            }
        }
        erased
    }

    /// Returns true if the entity is alive and its component lives here.
    #[must_use]
    pub fn contains<M: Copy>(&self, registry: &EntityRegistry<M>, id: EntityId) -> bool {
        registry.contains(id) && registry.location(id).store() == self.store
    }

    /// Returns the component for a validated handle.
    ///
    /// # Errors
    /// Returns [`Error::EntityNotFound`] or [`Error::StaleHandle`] for a
    /// dead handle, or [`Error::NotInStore`] if the entity lives elsewhere.
    pub fn get<'a, M: Copy>(
        &'a self,
        registry: &EntityRegistry<M>,
        handle: Handle,
    ) -> Result<&'a C> {
        registry.validate(handle)?;
        let location = registry.location(handle.id());
        if location.store() != self.store {
            return Err(Error::NotInStore {
                id: handle.id(),
                store: self.store,
            });
        }
        Ok(&self.data[location.index()])
    }

    /// Mutable variant of [`get`](Self::get).
    ///
    /// # Errors
    /// Returns [`Error::EntityNotFound`] or [`Error::StaleHandle`] for a
    /// dead handle, or [`Error::NotInStore`] if the entity lives elsewhere.
    pub fn get_mut<'a, M: Copy>(
        &'a mut self,
        registry: &EntityRegistry<M>,
        handle: Handle,
    ) -> Result<&'a mut C> {
        registry.validate(handle)?;
        let location = registry.location(handle.id());
        if location.store() != self.store {
            return Err(Error::NotInStore {
                id: handle.id(),
                store: self.store,
            });
        }
        Ok(&mut self.data[location.index()])
    }

    /// Returns the component of a live resident entity.
    ///
    /// Raw-tier accessor: one indexed load off the registry location.
    ///
    /// # Panics
    /// Panics if the entity is dead; debug builds also assert residency.
    #[must_use]
    pub fn component<'a, M: Copy>(&'a self, registry: &EntityRegistry<M>, id: EntityId) -> &'a C {
        let location = registry.location(id);
        debug_assert!(
            location.store() == self.store,
            "component() for {id:?} outside {}",
            self.store
        );
        &self.data[location.index()]
    }

    /// Mutable variant of [`component`](Self::component).
    ///
    /// # Panics
    /// Panics if the entity is dead; debug builds also assert residency.
    #[must_use]
    pub fn component_mut<'a, M: Copy>(
        &'a mut self,
        registry: &EntityRegistry<M>,
        id: EntityId,
    ) -> &'a mut C {
        let location = registry.location(id);
        debug_assert!(
            location.store() == self.store,
            "component_mut() for {id:?} outside {}",
            self.store
        );
        &mut self.data[location.index()]
    }

    /// Returns the resident ids in dense order.
    #[must_use]
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    /// Returns the packed components in dense order.
    #[must_use]
    pub fn components(&self) -> &[C] {
        &self.data
    }

    /// Mutable variant of [`components`](Self::components).
    #[must_use]
    pub fn components_mut(&mut self) -> &mut [C] {
        &mut self.data
    }

    /// Iterates `(id, component)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C)> + '_ {
        self.ids.iter().copied().zip(self.data.iter())
    }

    /// Mutable variant of [`iter`](Self::iter).
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut C)> + '_ {
        self.ids.iter().copied().zip(self.data.iter_mut())
    }

    /// Returns the number of resident rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the store holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns this store's id.
    #[must_use]
    pub fn store_id(&self) -> StoreId {
        self.store
    }

    /// Returns the element limit.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Reserves room for at least `additional` more rows.
    pub fn reserve(&mut self, additional: usize) {
        self.ids.reserve(additional);
        self.data.reserve(additional);
    }

    /// Sheds unused memory.
    pub fn shrink_to_fit(&mut self) {
        self.ids.shrink_to_fit();
        self.data.shrink_to_fit();
    }

    /// Detaches every resident entity and empties the store.
    ///
    /// All former residents stay alive with unassigned locations.
    pub fn clear<M: Copy>(&mut self, registry: &mut EntityRegistry<M>) {
        for &id in &self.ids {
            registry.set_location(id, Location::unassigned());
        }
        self.ids.clear();
        self.data.clear();
    }

    /// Checks store/registry agreement row by row.
    ///
    /// Intended for tests and debug assertions.
    ///
    /// # Errors
    /// Returns the first inconsistency found: a resident id that is not
    /// live, or a resident whose registry location does not point back at
    /// its row.
    pub fn validate<M: Copy>(&self, registry: &EntityRegistry<M>) -> Result<()> {
        debug_assert_eq!(self.ids.len(), self.data.len());
        for (row, &id) in self.ids.iter().enumerate() {
            if !registry.contains(id) {
                return Err(Error::EntityNotFound(id));
            }
            let location = registry.location(id);
            if location.store() != self.store || location.index() != row {
                return Err(Error::NotInStore {
                    id,
                    store: self.store,
                });
            }
        }
        Ok(())
    }

    /// Swap-and-pops the dense pair at `row`, rewriting the location of the
    /// entity whose row got moved into the hole.
    fn take_row<M: Copy>(&mut self, registry: &mut EntityRegistry<M>, row: usize) -> C {
        let component = self.data.swap_remove(row);
        self.ids.swap_remove(row);
        if row < self.data.len() {
            let moved = self.ids[row];
            registry.set_location(moved, Location::in_store(self.store, row as u32));
        }
        component
    }
}
