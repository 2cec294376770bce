//! Table Module
//!
//! Fixed-capacity, id-indexed entity storage.
//!
//! ## Responsibilities
//! - O(1) addressing: the id *is* the slot offset
//! - One lock per entity, so writers to different entities never contend
//! - Capacity is fixed at construction; ids past it are rejected, never grown into
//!
//! ## Data Structure Choice
//! A boxed slice of `parking_lot::RwLock<Option<T>>`:
//! - empty slot = `None` (no entity with that id)
//! - readers take short shared locks; writers take the slot exclusively

mod entity_table;

pub use entity_table::EntityTable;
