//! Tests for the dataset loader
//!
//! These tests verify:
//! - Reading users/locations/visits files from a data directory
//! - Honoring the reference timestamp in `options.txt`
//! - Reading the same files from a zip archive
//! - Rejecting malformed input
//! - Loading the result into a queryable engine

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use wayfarer::engine::Engine;
use wayfarer::error::WayfarerError;
use wayfarer::loader::{load, load_archive, load_dir, Dataset};
use wayfarer::model::{age_at, AverageFilter, Gender};

// =============================================================================
// Helper Functions
// =============================================================================

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn setup_data_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    write(
        dir,
        "users_1.json",
        r#"{"users": [
            {"id": 1, "email": "a@b.c", "first_name": "Ann", "last_name": "Lee", "gender": "f", "birth_date": 0},
            {"id": 2, "email": "d@e.f", "first_name": "Bob", "last_name": "Ray", "gender": "m", "birth_date": 315532800}
        ]}"#,
    );
    write(
        dir,
        "locations_1.json",
        r#"{"locations": [
            {"id": 1, "place": "Tower", "country": "France", "city": "Paris", "distance": 12}
        ]}"#,
    );
    write(
        dir,
        "visits_1.json",
        r#"{"visits": [
            {"id": 1, "location": 1, "user": 1, "visited_at": 1000000300, "mark": 5}
        ]}"#,
    );
    write(
        dir,
        "visits_2.json",
        r#"{"visits": [
            {"id": 2, "location": 1, "user": 2, "visited_at": 1000000100, "mark": 2},
            {"id": 3, "location": 1, "user": 1, "visited_at": 1000000200, "mark": 3}
        ]}"#,
    );
    write(dir, "options.txt", "1500000000\n1\n");
    write(dir, "README", "not data");

    temp_dir
}

/// Pack `entries` into `{dir}/data.zip`
fn write_zip(dir: &Path, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.join("data.zip");
    let mut writer = zip::ZipWriter::new(fs::File::create(&path).unwrap());
    for (name, contents) in entries {
        writer.start_file(*name, zip::write::FileOptions::default()).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    path
}

// =============================================================================
// Directory Reading Tests
// =============================================================================

#[test]
fn test_load_dir_reads_all_files() {
    let temp_dir = setup_data_dir();

    let dataset = load_dir(temp_dir.path()).unwrap();

    assert_eq!(dataset.accounts.len(), 2);
    assert_eq!(dataset.places.len(), 1);
    assert_eq!(dataset.visits.len(), 3);
    assert_eq!(dataset.now, Some(1_500_000_000));
    assert_eq!(dataset.accounts[1].gender, Gender::Male);
    assert_eq!(dataset.places[0].city, "Paris");
    assert_eq!(dataset.visits[0].place, 1);
}

#[test]
fn test_load_dir_without_options() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "users_1.json", r#"{"users": []}"#);

    let dataset = load_dir(temp_dir.path()).unwrap();

    assert!(dataset.accounts.is_empty());
    assert_eq!(dataset.now, None);
}

#[test]
fn test_load_dir_rejects_bad_json() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "locations_1.json", r#"{"locations": [{"id": 1}]}"#);

    let result = load_dir(temp_dir.path());

    assert!(matches!(result, Err(WayfarerError::Load(_))));
}

#[test]
fn test_load_dir_rejects_bad_options() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "options.txt", "yesterday\n");

    let result = load_dir(temp_dir.path());

    assert!(matches!(result, Err(WayfarerError::Load(_))));
}

#[test]
fn test_load_dir_missing_directory() {
    let temp_dir = TempDir::new().unwrap();

    let result = load_dir(&temp_dir.path().join("absent"));

    assert!(matches!(result, Err(WayfarerError::Io(_))));
}

// =============================================================================
// Archive Reading Tests
// =============================================================================

#[test]
fn test_load_archive_reads_all_entries() {
    let temp_dir = TempDir::new().unwrap();
    let archive = write_zip(
        temp_dir.path(),
        &[
            ("data/visits_1.json", r#"{"visits": [{"id": 1, "location": 1, "user": 1, "visited_at": 1000000300, "mark": 5}]}"#),
            ("data/users_1.json", r#"{"users": [{"id": 1, "email": "a@b.c", "first_name": "Ann", "last_name": "Lee", "gender": "f", "birth_date": 0}]}"#),
            ("data/locations_1.json", r#"{"locations": [{"id": 1, "place": "Tower", "country": "France", "city": "Paris", "distance": 12}]}"#),
            ("data/options.txt", "1500000000\n1\n"),
            ("data/notes.md", "not data"),
        ],
    );

    let dataset = load_archive(&archive).unwrap();

    assert_eq!(dataset.accounts.len(), 1);
    assert_eq!(dataset.places.len(), 1);
    assert_eq!(dataset.visits.len(), 1);
    assert_eq!(dataset.now, Some(1_500_000_000));
    assert_eq!(dataset.places[0].city, "Paris");

    let engine = Engine::load(dataset, 10, 1_500_000_000).unwrap();
    assert_eq!(engine.average_mark(1, &AverageFilter::default()).unwrap(), 5.0);
}

#[test]
fn test_load_archive_uses_sibling_options() {
    let temp_dir = TempDir::new().unwrap();
    let archive = write_zip(temp_dir.path(), &[("users_1.json", r#"{"users": []}"#)]);
    write(temp_dir.path(), "options.txt", "1400000000\n");

    let dataset = load_archive(&archive).unwrap();

    assert_eq!(dataset.now, Some(1_400_000_000));
}

#[test]
fn test_load_archive_options_inside_take_precedence() {
    let temp_dir = TempDir::new().unwrap();
    let archive = write_zip(temp_dir.path(), &[("options.txt", "1500000000\n")]);
    write(temp_dir.path(), "options.txt", "1400000000\n");

    let dataset = load_archive(&archive).unwrap();

    assert_eq!(dataset.now, Some(1_500_000_000));
}

#[test]
fn test_load_archive_rejects_bad_entry() {
    let temp_dir = TempDir::new().unwrap();
    let archive = write_zip(temp_dir.path(), &[("users_1.json", r#"{"users": [{"id": 1}]}"#)]);

    let result = load_archive(&archive);

    assert!(matches!(result, Err(WayfarerError::Load(_))));
}

#[test]
fn test_load_archive_rejects_non_zip() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "data.zip", "plain text, not an archive");

    let result = load_archive(&temp_dir.path().join("data.zip"));

    assert!(matches!(result, Err(WayfarerError::Load(_))));
}

#[test]
fn test_load_accepts_archive_or_directory() {
    let data_dir = setup_data_dir();
    let from_dir = load(data_dir.path()).unwrap();

    let temp_dir = TempDir::new().unwrap();
    let archive = write_zip(
        temp_dir.path(),
        &[("locations_1.json", r#"{"locations": [{"id": 4, "place": "Pier", "country": "Malta", "city": "Valletta", "distance": 1}]}"#)],
    );
    let from_archive = load(&archive).unwrap();

    assert_eq!(from_dir.visits.len(), 3);
    assert_eq!(from_archive.places.len(), 1);
    assert_eq!(from_archive.places[0].id, 4);
    assert_eq!(from_archive.now, None);
}

// =============================================================================
// Reference Timestamp Tests
// =============================================================================

#[test]
fn test_resolve_now_precedence() {
    let dataset = Dataset {
        now: Some(100),
        ..Default::default()
    };

    assert_eq!(dataset.resolve_now(Some(7)), 7);
    assert_eq!(dataset.resolve_now(None), 100);
    assert!(Dataset::default().resolve_now(None) > 1_500_000_000);
}

// =============================================================================
// Engine Population Tests
// =============================================================================

#[test]
fn test_loaded_engine_is_queryable() {
    let temp_dir = setup_data_dir();
    let dataset = load_dir(temp_dir.path()).unwrap();
    let now = dataset.resolve_now(None);

    let engine = Engine::load(dataset, 10, now).unwrap();

    let order: Vec<u32> = engine.place_visit_refs(1).unwrap().iter().map(|r| r.id).collect();
    assert_eq!(order, vec![2, 3, 1]);
    assert_eq!(engine.get_account(2).unwrap().age, age_at(315_532_800, 1_500_000_000));

    let female = AverageFilter {
        gender: Some(Gender::Female),
        ..Default::default()
    };
    assert_eq!(engine.average_mark(1, &female).unwrap(), 4.0);
}
