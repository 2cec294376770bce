//! Model Module
//!
//! Entity definitions and the per-owner visit index.
//!
//! ## Reference Graph
//! Entities never own each other. A [`Visit`] stores the ids of its account
//! and place; an [`Account`] or [`Place`] stores a list of [`VisitRef`]s
//! sorted ascending by `visited_at`. Every link is resolved through the
//! engine's tables.
//!
//! ```text
//!   Account ──visits: [VisitRef]──┐       ┌──visits: [VisitRef]── Place
//!      ▲                          ▼       ▼                         ▲
//!      └──────────── account ── Visit ── place ─────────────────────┘
//! ```

mod account;
mod place;
mod visit;
mod filter;

pub use account::{age_at, Account, AccountRecord, AccountUpdate, Gender};
pub use place::{Place, PlaceUpdate};
pub use visit::{AccountVisit, Visit, VisitUpdate};
pub use filter::{AverageFilter, VisitsFilter};

/// Entry in an owner's visit list
///
/// Carries the timestamp so the list can be ordered and range-searched
/// without touching the visit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitRef {
    pub visited_at: i64,
    pub id: u32,
}

/// An entity that keeps a timestamp-sorted list of its visits
pub trait Owner {
    fn visits(&self) -> &[VisitRef];

    fn visits_mut(&mut self) -> &mut Vec<VisitRef>;

    /// Insert after any existing entries with the same timestamp
    fn insert_visit(&mut self, entry: VisitRef) {
        let list = self.visits_mut();
        let pos = list.partition_point(|r| r.visited_at <= entry.visited_at);
        list.insert(pos, entry);
    }

    /// Remove the entry for `id`, returning whether it was present
    fn remove_visit(&mut self, id: u32) -> bool {
        let list = self.visits_mut();
        match list.iter().position(|r| r.id == id) {
            Some(pos) => {
                list.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Entries with `from < visited_at < to` (both bounds optional and exclusive)
    fn visits_between(&self, from: Option<i64>, to: Option<i64>) -> &[VisitRef] {
        let list = self.visits();
        let start = match from {
            Some(from) => list.partition_point(|r| r.visited_at <= from),
            None => 0,
        };
        let end = match to {
            Some(to) => list.partition_point(|r| r.visited_at < to),
            None => list.len(),
        };
        if start >= end {
            &[]
        } else {
            &list[start..end]
        }
    }
}
