//! Dataset Loader
//!
//! Reads the initial dataset from a data directory or a zip archive of the
//! same files.
//!
//! ## Directory Layout
//! ```text
//! {data_dir}/
//!   ├── users_1.json       {"users":     [{id, email, first_name, last_name, gender, birth_date}, ...]}
//!   ├── locations_1.json   {"locations": [{id, place, country, city, distance}, ...]}
//!   ├── visits_1.json      {"visits":    [{id, location, user, visited_at, mark}, ...]}
//!   └── options.txt        line 1: reference timestamp (unix seconds)
//! ```
//! Files are read in name order; anything else is ignored. An archive is
//! read the same way, by entry file name.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{Result, WayfarerError};
use crate::model::{AccountRecord, Place, Visit};

const OPTIONS_FILENAME: &str = "options.txt";

/// Everything needed to populate an engine
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub accounts: Vec<AccountRecord>,
    pub places: Vec<Place>,
    pub visits: Vec<Visit>,

    /// Reference timestamp from `options.txt`, if present
    pub now: Option<i64>,
}

impl Dataset {
    /// Pick the reference timestamp: explicit override, then `options.txt`,
    /// then the clock at startup
    pub fn resolve_now(&self, override_now: Option<i64>) -> i64 {
        override_now.or(self.now).unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0)
        })
    }
}

#[derive(Deserialize)]
struct UsersFile {
    users: Vec<AccountRecord>,
}

#[derive(Deserialize)]
struct LocationsFile {
    locations: Vec<Place>,
}

#[derive(Deserialize)]
struct VisitsFile {
    visits: Vec<Visit>,
}

/// Load a dataset from a `.zip` archive or an unpacked directory
pub fn load(path: &Path) -> Result<Dataset> {
    if path.is_file() {
        load_archive(path)
    } else {
        load_dir(path)
    }
}

/// Load a dataset from a data directory
pub fn load_dir(path: &Path) -> Result<Dataset> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(path)? {
        let file_path = entry?.path();
        if file_path.is_file() {
            files.push(file_path);
        }
    }
    files.sort();

    let mut dataset = Dataset::default();
    for file_path in &files {
        let Some(name) = file_path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if is_wanted(name) {
            let bytes = fs::read(file_path)?;
            add_entry(&mut dataset, name, &bytes, &file_path.display().to_string())?;
        } else {
            tracing::debug!("Skipping unrecognized file {}", file_path.display());
        }
    }

    log_dataset(&dataset, path);
    Ok(dataset)
}

/// Load a dataset from a zip archive
///
/// Entries are routed by file name like directory files. Without an
/// `options.txt` inside the archive, one next to the archive is used.
pub fn load_archive(path: &Path) -> Result<Dataset> {
    let file = fs::File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| archive_error(path, e))?;

    let mut entries: Vec<(String, usize)> = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(|e| archive_error(path, e))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().rsplit('/').next().unwrap_or_default().to_string();
        entries.push((name, index));
    }
    entries.sort();

    let mut dataset = Dataset::default();
    for (name, index) in &entries {
        if !is_wanted(name) {
            tracing::debug!("Skipping unrecognized archive entry {}", name);
            continue;
        }
        let mut entry = archive.by_index(*index).map_err(|e| archive_error(path, e))?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        add_entry(&mut dataset, name, &bytes, &format!("{}:{}", path.display(), name))?;
    }

    if dataset.now.is_none() {
        if let Some(options) = path.parent().map(|dir| dir.join(OPTIONS_FILENAME)) {
            if options.is_file() {
                let bytes = fs::read(&options)?;
                dataset.now = Some(parse_options(&bytes, &options.display().to_string())?);
            }
        }
    }

    log_dataset(&dataset, path);
    Ok(dataset)
}

fn is_wanted(name: &str) -> bool {
    name == OPTIONS_FILENAME
        || (name.ends_with(".json")
            && (name.starts_with("users") || name.starts_with("locations") || name.starts_with("visits")))
}

/// Route one file's contents into the dataset by its name
fn add_entry(dataset: &mut Dataset, name: &str, bytes: &[u8], origin: &str) -> Result<()> {
    if name == OPTIONS_FILENAME {
        dataset.now = Some(parse_options(bytes, origin)?);
    } else if name.starts_with("users") {
        let file: UsersFile = parse_json(bytes, origin)?;
        dataset.accounts.extend(file.users);
    } else if name.starts_with("locations") {
        let file: LocationsFile = parse_json(bytes, origin)?;
        dataset.places.extend(file.locations);
    } else if name.starts_with("visits") {
        let file: VisitsFile = parse_json(bytes, origin)?;
        dataset.visits.extend(file.visits);
    }
    Ok(())
}

fn log_dataset(dataset: &Dataset, path: &Path) {
    tracing::info!(
        accounts = dataset.accounts.len(),
        places = dataset.places.len(),
        visits = dataset.visits.len(),
        "Read dataset from {}",
        path.display()
    );
}

fn archive_error(path: &Path, e: ZipError) -> WayfarerError {
    WayfarerError::Load(format!("{}: {}", path.display(), e))
}

fn parse_json<T: for<'de> Deserialize<'de>>(bytes: &[u8], origin: &str) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| WayfarerError::Load(format!("{}: {}", origin, e)))
}

fn parse_options(bytes: &[u8], origin: &str) -> Result<i64> {
    let text = String::from_utf8_lossy(bytes);
    let line = text.lines().next().unwrap_or("").trim();
    line.parse()
        .map_err(|_| WayfarerError::Load(format!("{}: invalid timestamp {:?}", origin, line)))
}
