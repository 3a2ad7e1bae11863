use std::fs;
use std::path::Path;

use localzone::{ZoneError, load, manage};

const ZONEFILE: &str = "tests/zonefiles/db.example.com";
const ORIGIN: &str = "example.com.";
const TTL: u32 = 3600;

#[test]
fn test_load() {
    let zone = load(ZONEFILE, Some(ORIGIN)).unwrap();
    assert_eq!(zone.file_path(), Some(Path::new(ZONEFILE)));
    assert_eq!(zone.default_ttl(), TTL);
    assert_eq!(zone.origin(), ORIGIN);
    assert_eq!(zone.records().len(), 16);
}

#[test]
fn test_load_missing_origin() {
    let result = load("tests/zonefiles/db.no-origin.com", None);
    assert!(matches!(result, Err(ZoneError::UnknownOrigin(_))));
}

#[test]
fn test_load_missing_origin_supplied() {
    let zone = load("tests/zonefiles/db.no-origin.com", Some("example.com.")).unwrap();
    assert_eq!(zone.records().len(), 3);
}

#[test]
fn test_manage() {
    let count = manage(ZONEFILE, Some(ORIGIN), false, |zone| {
        assert_eq!(zone.file_path(), Some(Path::new(ZONEFILE)));
        assert_eq!(zone.default_ttl(), TTL);
        Ok(zone.records().len())
    })
    .unwrap();
    assert_eq!(count, 16);
}

#[test]
fn test_manage_autosave() {
    let dir = tempfile::TempDir::new().unwrap();
    let zonefile = dir.path().join("db.example.com");
    fs::copy(ZONEFILE, &zonefile).unwrap();

    let serial = load(&zonefile, Some(ORIGIN)).unwrap().soa_serial().unwrap();

    manage(&zonefile, Some(ORIGIN), true, |zone| {
        zone.add_record("greeting", "TXT", "hello, world!")?;
        Ok(())
    })
    .unwrap();

    let zone = load(&zonefile, Some(ORIGIN)).unwrap();
    assert_eq!(zone.records().len(), 17);
    assert!(zone.soa_serial().unwrap() > serial);

    let records = zone.find_record("TXT", Some("greeting"), None).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].content(), "\"hello,\" \"world!\"");
}

#[test]
fn test_manage_autosave_persists_on_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let zonefile = dir.path().join("db.example.com");
    fs::copy(ZONEFILE, &zonefile).unwrap();

    let result: localzone::Result<()> = manage(&zonefile, Some(ORIGIN), true, |zone| {
        zone.add_record("late", "A", "192.0.2.50")?;
        // A failing lookup after a successful mutation
        zone.get_record("deadbeef")?;
        Ok(())
    });

    // The closure's error wins, but the mutation was persisted
    assert!(matches!(result, Err(ZoneError::NotFound(_))));
    let zone = load(&zonefile, Some(ORIGIN)).unwrap();
    assert_eq!(
        zone.find_record("A", Some("late"), None).unwrap().len(),
        1
    );
}

#[test]
fn test_manage_without_autosave_discards_changes() {
    let dir = tempfile::TempDir::new().unwrap();
    let zonefile = dir.path().join("db.example.com");
    fs::copy(ZONEFILE, &zonefile).unwrap();

    manage(&zonefile, Some(ORIGIN), false, |zone| {
        zone.add_record("scratch", "A", "192.0.2.60")?;
        Ok(())
    })
    .unwrap();

    let zone = load(&zonefile, Some(ORIGIN)).unwrap();
    assert_eq!(zone.records().len(), 16);
}
