//! Engine Module
//!
//! The in-memory storage engine that owns every entity.
//!
//! ## Responsibilities
//! - Create and update accounts, places and visits
//! - Keep each owner's visit list sorted by timestamp
//! - Answer the two aggregate queries (average mark, account visits)
//! - Bulk-populate from a [`Dataset`] at startup

use parking_lot::RwLockWriteGuard;

use crate::error::{Result, WayfarerError};
use crate::loader::Dataset;
use crate::model::{
    Account, AccountRecord, AccountUpdate, AccountVisit, AverageFilter, Owner, Place, PlaceUpdate,
    Visit, VisitRef, VisitUpdate, VisitsFilter,
};
use crate::table::EntityTable;

/// Sizing and clock for a fresh engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub accounts_capacity: usize,
    pub places_capacity: usize,
    pub visits_capacity: usize,

    /// Reference timestamp for age derivation (unix seconds)
    pub now: i64,
}

impl EngineConfig {
    /// Same capacity for all three tables
    pub fn uniform(capacity: usize, now: i64) -> Self {
        Self {
            accounts_capacity: capacity,
            places_capacity: capacity,
            visits_capacity: capacity,
            now,
        }
    }
}

/// The storage engine
///
/// ## Concurrency Model: per-entity RwLock
///
/// - **Writes** lock only the entities they touch. Visit writes that move
///   list entries lock in one global order:
///   visit → places (ascending id) → accounts (ascending id)
///   and hold every lock until the move is complete.
///
/// - **Reads** take one short shared lock at a time and never nest. Scans
///   snapshot the owner's visit range, then resolve each visit separately,
///   so a scan racing a writer may observe a mix of old and new state.
///   That weak consistency is accepted in exchange for never blocking
///   readers behind multi-entity writes.
pub struct Engine {
    accounts: EntityTable<Account>,
    places: EntityTable<Place>,
    visits: EntityTable<Visit>,

    /// Reference "current time" for ages, fixed for the process lifetime
    now: i64,
}

impl Engine {
    /// Create an empty engine
    pub fn new(config: EngineConfig) -> Self {
        Self {
            accounts: EntityTable::with_capacity(config.accounts_capacity),
            places: EntityTable::with_capacity(config.places_capacity),
            visits: EntityTable::with_capacity(config.visits_capacity),
            now: config.now,
        }
    }

    /// Build an engine from an imported dataset
    ///
    /// Each table gets `headroom` spare slots past its highest loaded id.
    /// Owner lists are filled unsorted and sorted once at the end.
    pub fn load(dataset: Dataset, headroom: usize, now: i64) -> Result<Self> {
        fn capacity(ids: impl Iterator<Item = u32>, headroom: usize) -> usize {
            ids.map(|id| id as usize + 1).max().unwrap_or(0) + headroom
        }

        let config = EngineConfig {
            accounts_capacity: capacity(dataset.accounts.iter().map(|a| a.id), headroom),
            places_capacity: capacity(dataset.places.iter().map(|p| p.id), headroom),
            visits_capacity: capacity(dataset.visits.iter().map(|v| v.id), headroom),
            now,
        };
        let mut engine = Self::new(config);

        for record in dataset.accounts {
            let slot = engine.accounts.slot_mut(record.id).ok_or_else(|| {
                WayfarerError::Load(format!("account {} is out of range", record.id))
            })?;
            if slot.is_some() {
                return Err(WayfarerError::Load(format!("duplicate account {}", record.id)));
            }
            *slot = Some(Account::from_record(record, now));
        }

        for mut place in dataset.places {
            let id = place.id;
            let slot = engine.places.slot_mut(id).ok_or_else(|| {
                WayfarerError::Load(format!("place {} is out of range", id))
            })?;
            if slot.is_some() {
                return Err(WayfarerError::Load(format!("duplicate place {}", id)));
            }
            place.visits.clear();
            *slot = Some(place);
        }

        for visit in dataset.visits {
            let entry = VisitRef {
                visited_at: visit.visited_at,
                id: visit.id,
            };

            let Some(Some(account)) = engine.accounts.slot_mut(visit.account) else {
                return Err(WayfarerError::Load(format!(
                    "visit {} references missing account {}",
                    visit.id, visit.account
                )));
            };
            account.visits.push(entry);

            let Some(Some(place)) = engine.places.slot_mut(visit.place) else {
                return Err(WayfarerError::Load(format!(
                    "visit {} references missing place {}",
                    visit.id, visit.place
                )));
            };
            place.visits.push(entry);

            let slot = engine.visits.slot_mut(visit.id).ok_or_else(|| {
                WayfarerError::Load(format!("visit {} is out of range", visit.id))
            })?;
            if slot.is_some() {
                return Err(WayfarerError::Load(format!("duplicate visit {}", visit.id)));
            }
            *slot = Some(visit);
        }

        // Stable sort keeps file order among equal timestamps
        for account in engine.accounts.iter_mut() {
            account.visits.sort_by_key(|r| r.visited_at);
        }
        for place in engine.places.iter_mut() {
            place.visits.sort_by_key(|r| r.visited_at);
        }

        engine.accounts.recount();
        engine.places.recount();
        engine.visits.recount();

        tracing::info!(
            accounts = engine.accounts.len(),
            places = engine.places.len(),
            visits = engine.visits.len(),
            now,
            "Dataset loaded"
        );

        Ok(engine)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn get_account(&self, id: u32) -> Option<Account> {
        self.accounts.get(id)
    }

    pub fn get_place(&self, id: u32) -> Option<Place> {
        self.places.get(id)
    }

    pub fn get_visit(&self, id: u32) -> Option<Visit> {
        self.visits.get(id)
    }

    /// Run `f` against an account without cloning it
    pub fn with_account<R>(&self, id: u32, f: impl FnOnce(&Account) -> R) -> Option<R> {
        self.accounts.with(id, f)
    }

    /// Run `f` against a place without cloning it
    pub fn with_place<R>(&self, id: u32, f: impl FnOnce(&Place) -> R) -> Option<R> {
        self.places.with(id, f)
    }

    pub fn with_visit<R>(&self, id: u32, f: impl FnOnce(&Visit) -> R) -> Option<R> {
        self.visits.with(id, f)
    }

    pub fn account_exists(&self, id: u32) -> bool {
        self.accounts.contains(id)
    }

    pub fn place_exists(&self, id: u32) -> bool {
        self.places.contains(id)
    }

    pub fn visit_exists(&self, id: u32) -> bool {
        self.visits.contains(id)
    }

    // =========================================================================
    // Creates
    // =========================================================================

    pub fn create_account(&self, record: AccountRecord) -> Result<()> {
        self.accounts.insert(record.id, Account::from_record(record, self.now))
    }

    pub fn create_place(&self, mut place: Place) -> Result<()> {
        place.visits.clear();
        self.places.insert(place.id, place)
    }

    /// Create a visit and link it into both owners' lists
    ///
    /// Lock order: visit → place → account.
    pub fn create_visit(&self, visit: Visit) -> Result<()> {
        let slot = self.visits.slot(visit.id).ok_or_else(|| {
            WayfarerError::invalid(format!(
                "id {} exceeds table capacity {}",
                visit.id,
                self.visits.capacity()
            ))
        })?;

        let mut visit_guard = slot.write();
        if visit_guard.is_some() {
            return Err(WayfarerError::invalid(format!("id {} already exists", visit.id)));
        }

        let mut place_guard = lock_existing(&self.places, visit.place, "place")?;
        let mut account_guard = lock_existing(&self.accounts, visit.account, "account")?;

        let entry = VisitRef {
            visited_at: visit.visited_at,
            id: visit.id,
        };
        if let Some(place) = &mut *place_guard {
            place.insert_visit(entry);
        }
        if let Some(account) = &mut *account_guard {
            account.insert_visit(entry);
        }

        *visit_guard = Some(visit);
        self.visits.note_inserted();
        Ok(())
    }

    // =========================================================================
    // Updates
    // =========================================================================

    /// Overwrite the supplied account fields
    pub fn update_account(&self, id: u32, update: AccountUpdate) -> Result<()> {
        let now = self.now;
        self.accounts.update(id, |account| update.apply(account, now))
    }

    /// Overwrite the supplied place fields
    pub fn update_place(&self, id: u32, update: PlaceUpdate) -> Result<()> {
        self.places.update(id, |place| update.apply(place))
    }

    /// Overwrite the supplied visit fields, moving list entries as needed
    ///
    /// - owner change: entry leaves the old owner's list and enters the new one
    /// - timestamp change: entry is re-positioned in both current owners' lists
    /// - mark only: no list is touched
    ///
    /// New owners are checked before anything changes, so a rejected update
    /// leaves every list as it was.
    pub fn update_visit(&self, id: u32, update: VisitUpdate) -> Result<()> {
        let mut visit_guard = self.visits.lock(id)?;
        let visit = visit_guard.as_mut().ok_or(WayfarerError::NotFound)?;

        let place = update.place.unwrap_or(visit.place);
        let account = update.account.unwrap_or(visit.account);
        let visited_at = update.visited_at.unwrap_or(visit.visited_at);

        let moved_in_time = visited_at != visit.visited_at;
        let mut places = if moved_in_time || place != visit.place {
            Some(Relink::lock(&self.places, visit.place, place, "place")?)
        } else {
            None
        };
        let mut accounts = if moved_in_time || account != visit.account {
            Some(Relink::lock(&self.accounts, visit.account, account, "account")?)
        } else {
            None
        };

        if let Some(relink) = &places {
            relink.ensure_target()?;
        }
        if let Some(relink) = &accounts {
            relink.ensure_target()?;
        }

        if let Some(relink) = &mut places {
            relink.apply(id, visited_at);
        }
        if let Some(relink) = &mut accounts {
            relink.apply(id, visited_at);
        }

        visit.place = place;
        visit.account = account;
        visit.visited_at = visited_at;
        if let Some(mark) = update.mark {
            visit.mark = mark;
        }
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Mean mark of a place's visits matching `filter`, rounded to 5 decimals
    ///
    /// Returns 0 when nothing matches.
    pub fn average_mark(&self, place_id: u32, filter: &AverageFilter) -> Result<f64> {
        let candidates: Vec<u32> = self
            .places
            .with(place_id, |place| {
                place
                    .visits_between(filter.from_date, filter.to_date)
                    .iter()
                    .map(|r| r.id)
                    .collect()
            })
            .ok_or(WayfarerError::NotFound)?;

        let mut sum = 0u64;
        let mut count = 0u64;
        for id in candidates {
            let Some((account_id, mark)) = self.visits.with(id, |v| (v.account, v.mark)) else {
                continue;
            };
            if filter.needs_account()
                && !self
                    .accounts
                    .with(account_id, |a| filter.matches_account(a))
                    .unwrap_or(false)
            {
                continue;
            }
            sum += u64::from(mark);
            count += 1;
        }

        if count == 0 {
            return Ok(0.0);
        }
        Ok(round_decimals(sum as f64 / count as f64, 5))
    }

    /// An account's visits matching `filter`, ascending by timestamp
    pub fn account_visits(&self, account_id: u32, filter: &VisitsFilter) -> Result<Vec<AccountVisit>> {
        let candidates: Vec<VisitRef> = self
            .accounts
            .with(account_id, |account| {
                account.visits_between(filter.from_date, filter.to_date).to_vec()
            })
            .ok_or(WayfarerError::NotFound)?;

        let mut result = Vec::with_capacity(candidates.len());
        for entry in candidates {
            let Some(visit) = self.visits.get(entry.id) else {
                continue;
            };
            let name = self
                .places
                .with(visit.place, |p| filter.matches_place(p).then(|| p.place.clone()))
                .flatten();
            if let Some(place) = name {
                result.push(AccountVisit {
                    mark: visit.mark,
                    visited_at: visit.visited_at,
                    place,
                });
            }
        }
        Ok(result)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Snapshot of an account's visit list
    pub fn account_visit_refs(&self, id: u32) -> Option<Vec<VisitRef>> {
        self.accounts.with(id, |a| a.visits.clone())
    }

    /// Snapshot of a place's visit list
    pub fn place_visit_refs(&self, id: u32) -> Option<Vec<VisitRef>> {
        self.places.with(id, |p| p.visits.clone())
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    pub fn visit_count(&self) -> usize {
        self.visits.len()
    }

    /// The reference timestamp ages are computed against
    pub fn now(&self) -> i64 {
        self.now
    }
}

/// Round half away from zero to `digits` decimal places
fn round_decimals(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// Write-lock a slot that must hold an entity; used for link targets
fn lock_existing<'a, T>(
    table: &'a EntityTable<T>,
    id: u32,
    what: &str,
) -> Result<RwLockWriteGuard<'a, Option<T>>> {
    let guard = table
        .slot(id)
        .map(|slot| slot.write())
        .ok_or_else(|| WayfarerError::invalid(format!("{} {} does not exist", what, id)))?;
    if guard.is_none() {
        return Err(WayfarerError::invalid(format!("{} {} does not exist", what, id)));
    }
    Ok(guard)
}

/// Both owners involved in moving one visit entry, locked in ascending id order
struct Relink<'a, T> {
    old: RwLockWriteGuard<'a, Option<T>>,

    /// `None` when the owner is unchanged (timestamp-only move)
    new: Option<RwLockWriteGuard<'a, Option<T>>>,

    new_id: u32,
    what: &'static str,
}

impl<'a, T: Owner> Relink<'a, T> {
    fn lock(table: &'a EntityTable<T>, old: u32, new: u32, what: &'static str) -> Result<Self> {
        if table.slot(new).is_none() {
            return Err(WayfarerError::invalid(format!("{} {} does not exist", what, new)));
        }

        let (old_guard, new_guard) = if old == new {
            (table.lock(old)?, None)
        } else if old < new {
            let old_guard = table.lock(old)?;
            (old_guard, Some(table.lock(new)?))
        } else {
            let new_guard = table.lock(new)?;
            (table.lock(old)?, Some(new_guard))
        };

        Ok(Self {
            old: old_guard,
            new: new_guard,
            new_id: new,
            what,
        })
    }

    fn ensure_target(&self) -> Result<()> {
        let present = match &self.new {
            Some(guard) => guard.is_some(),
            None => self.old.is_some(),
        };
        if present {
            Ok(())
        } else {
            Err(WayfarerError::invalid(format!("{} {} does not exist", self.what, self.new_id)))
        }
    }

    fn apply(&mut self, id: u32, visited_at: i64) {
        if let Some(owner) = &mut *self.old {
            owner.remove_visit(id);
        }
        let target = match self.new.as_mut() {
            Some(guard) => guard,
            None => &mut self.old,
        };
        if let Some(owner) = &mut **target {
            owner.insert_visit(VisitRef { visited_at, id });
        }
    }
}
