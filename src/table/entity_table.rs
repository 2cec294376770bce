//! Entity table implementation
//!
//! Slot array with a per-slot RwLock.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{RwLock, RwLockWriteGuard};

use crate::error::{Result, WayfarerError};

/// Fixed-capacity table of entities indexed by id
pub struct EntityTable<T> {
    /// One slot per id, allocated up front
    slots: Box<[RwLock<Option<T>>]>,

    /// Number of populated slots
    len: AtomicUsize,
}

impl<T> EntityTable<T> {
    /// Create a table with `capacity` empty slots
    pub fn with_capacity(capacity: usize) -> Self {
        let slots: Vec<RwLock<Option<T>>> = (0..capacity).map(|_| RwLock::new(None)).collect();
        Self {
            slots: slots.into_boxed_slice(),
            len: AtomicUsize::new(0),
        }
    }

    /// Total number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of populated slots
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bounds-checked slot access
    pub fn slot(&self, id: u32) -> Option<&RwLock<Option<T>>> {
        self.slots.get(id as usize)
    }

    /// Check whether an entity exists (read lock)
    pub fn contains(&self, id: u32) -> bool {
        self.slot(id).is_some_and(|slot| slot.read().is_some())
    }

    /// Run `f` against the entity under a read lock
    pub fn with<R>(&self, id: u32, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.slot(id)?.read();
        guard.as_ref().map(f)
    }

    /// Cloned snapshot of the entity
    pub fn get(&self, id: u32) -> Option<T>
    where
        T: Clone,
    {
        self.with(id, T::clone)
    }

    /// Exclusively lock a slot, populated or not
    ///
    /// Out-of-range ids are reported as `NotFound`.
    pub fn lock(&self, id: u32) -> Result<RwLockWriteGuard<'_, Option<T>>> {
        self.slot(id).map(|slot| slot.write()).ok_or(WayfarerError::NotFound)
    }

    /// Run `f` against the entity under a write lock
    pub fn update<R>(&self, id: u32, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut guard = self.lock(id)?;
        guard.as_mut().map(f).ok_or(WayfarerError::NotFound)
    }

    /// Populate an empty slot
    ///
    /// Fails when `id` is past capacity or the slot is already taken.
    pub fn insert(&self, id: u32, value: T) -> Result<()> {
        let slot = self.slot(id).ok_or_else(|| {
            WayfarerError::invalid(format!("id {} exceeds table capacity {}", id, self.capacity()))
        })?;

        let mut guard = slot.write();
        if guard.is_some() {
            return Err(WayfarerError::invalid(format!("id {} already exists", id)));
        }
        *guard = Some(value);
        self.len.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Mark a slot populated by a caller holding its write guard
    pub(crate) fn note_inserted(&self) {
        self.len.fetch_add(1, Ordering::Relaxed);
    }

    /// Lock-free mutable access for bulk loading (requires exclusive access)
    pub(crate) fn slot_mut(&mut self, id: u32) -> Option<&mut Option<T>> {
        self.slots.get_mut(id as usize).map(RwLock::get_mut)
    }

    /// Mutable iteration over populated slots (requires exclusive access)
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(|slot| slot.get_mut().as_mut())
    }

    /// Recount populated slots after bulk loading
    pub(crate) fn recount(&mut self) {
        let count = self
            .slots
            .iter_mut()
            .map(RwLock::get_mut)
            .filter(|slot| slot.is_some())
            .count();
        *self.len.get_mut() = count;
    }
}
