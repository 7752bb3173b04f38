//! Tests for snapshot stores
//!
//! These tests verify:
//! - Exact XML layout and lenient parsing
//! - Binary header validation and checksum
//! - Saves replace the file without leaving temp files behind
//! - open_store picks the right format

use std::fs;

use tempfile::TempDir;
use trainstation::config::SnapshotFormat;
use trainstation::registry::TimeOfDay;
use trainstation::storage::{
    open_store, BinarySnapshotStore, SnapshotStore, StoredTrain, XmlSnapshotStore,
};
use trainstation::StationError;

// =============================================================================
// Helper Functions
// =============================================================================

fn stored(id: &str, dep: &str, arr: &str, delay: i32) -> StoredTrain {
    StoredTrain {
        id: id.to_string(),
        departure: TimeOfDay::parse(dep).unwrap(),
        arrival: TimeOfDay::parse(arr).unwrap(),
        delay,
    }
}

fn sample_trains() -> Vec<StoredTrain> {
    vec![
        stored("R101", "08:30", "10:00", 15),
        stored("IC202", "09:20", "11:45", -999),
    ]
}

const SAMPLE_XML: &str = "<Trains>
    <Train id=\"R101\">
        <Departure>08:30</Departure>
        <Arrival>10:00</Arrival>
        <Delay>15</Delay>
    </Train>
    <Train id=\"IC202\">
        <Departure>09:20</Departure>
        <Arrival>11:45</Arrival>
        <Delay>-999</Delay>
    </Train>
</Trains>
";

// =============================================================================
// XML Tests
// =============================================================================

#[test]
fn test_xml_render_layout() {
    assert_eq!(XmlSnapshotStore::render(&sample_trains()), SAMPLE_XML);
}

#[test]
fn test_xml_render_empty() {
    assert_eq!(XmlSnapshotStore::render(&[]), "<Trains>\n</Trains>\n");
}

#[test]
fn test_xml_parse_layout() {
    assert_eq!(XmlSnapshotStore::parse(SAMPLE_XML), sample_trains());
}

#[test]
fn test_xml_parse_tolerates_whitespace_and_extra_lines() {
    let text = "<?xml version=\"1.0\"?>\r\n<Trains>\r\n\
                <!-- morning service -->\r\n\
                <Train id=\"R7\">\r\n\
                <Arrival>07:45</Arrival>\r\n\
                <Departure>7:05</Departure>\r\n\
                <Delay> 3 </Delay>\r\n\
                </Train>\r\n</Trains>\r\n";

    assert_eq!(
        XmlSnapshotStore::parse(text),
        vec![stored("R7", "07:05", "07:45", 3)]
    );
}

#[test]
fn test_xml_parse_bad_values_fall_back() {
    let text = "<Trains>
    <Train id=\"X1\">
        <Departure>25:99</Departure>
        <Arrival>10:00</Arrival>
        <Delay>soon</Delay>
    </Train>
</Trains>
";

    assert_eq!(
        XmlSnapshotStore::parse(text),
        vec![stored("X1", "00:00", "10:00", 0)]
    );
}

#[test]
fn test_xml_parse_missing_fields_default() {
    let text = "<Trains>\n<Train id=\"X2\">\n<Departure>06:00</Departure>\n</Train>\n</Trains>\n";

    assert_eq!(
        XmlSnapshotStore::parse(text),
        vec![stored("X2", "06:00", "00:00", 0)]
    );
}

#[test]
fn test_xml_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trains.xml");
    let store = XmlSnapshotStore::new(&path);

    store.save(&sample_trains()).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE_XML);
    assert_eq!(store.load().unwrap(), sample_trains());
}

#[test]
fn test_xml_save_replaces_and_cleans_up() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trains.xml");
    let store = XmlSnapshotStore::new(&path);

    store.save(&sample_trains()).unwrap();
    store.save(&[stored("ONLY", "12:00", "13:00", 0)]).unwrap();

    assert_eq!(store.load().unwrap(), vec![stored("ONLY", "12:00", "13:00", 0)]);
    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["trains.xml".to_string()]);
}

#[test]
fn test_xml_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let store = XmlSnapshotStore::new(dir.path().join("absent.xml"));

    assert!(matches!(store.load(), Err(StationError::Io(_))));
}

#[test]
fn test_xml_describe_is_path() {
    let store = XmlSnapshotStore::new("data/trains.xml");
    assert_eq!(store.describe(), "data/trains.xml");
}

// =============================================================================
// Binary Tests
// =============================================================================

#[test]
fn test_binary_header() {
    let bytes = BinarySnapshotStore::encode(&sample_trains()).unwrap();

    assert_eq!(&bytes[0..4], b"TRNS");
    assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), 1);
    let len = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
    assert_eq!(len, bytes.len() - 14);
}

#[test]
fn test_binary_save_and_load() {
    let dir = TempDir::new().unwrap();
    let store = BinarySnapshotStore::new(dir.path().join("trains.bin"));

    store.save(&sample_trains()).unwrap();
    assert_eq!(store.load().unwrap(), sample_trains());
}

#[test]
fn test_binary_detects_flipped_payload_byte() {
    let mut bytes = BinarySnapshotStore::encode(&sample_trains()).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    assert!(matches!(
        BinarySnapshotStore::decode(&bytes),
        Err(StationError::Corruption(_))
    ));
}

#[test]
fn test_binary_rejects_bad_magic() {
    let mut bytes = BinarySnapshotStore::encode(&sample_trains()).unwrap();
    bytes[0] = b'X';

    assert!(matches!(
        BinarySnapshotStore::decode(&bytes),
        Err(StationError::Corruption(_))
    ));
}

#[test]
fn test_binary_rejects_truncated_file() {
    let bytes = BinarySnapshotStore::encode(&sample_trains()).unwrap();

    assert!(matches!(
        BinarySnapshotStore::decode(&bytes[..10]),
        Err(StationError::Corruption(_))
    ));
    assert!(matches!(
        BinarySnapshotStore::decode(&bytes[..bytes.len() - 3]),
        Err(StationError::Corruption(_))
    ));
}

#[test]
fn test_binary_rejects_unknown_version() {
    let mut bytes = BinarySnapshotStore::encode(&sample_trains()).unwrap();
    bytes[4] = 9;

    assert!(matches!(
        BinarySnapshotStore::decode(&bytes),
        Err(StationError::Corruption(_))
    ));
}

// =============================================================================
// Format Selection Tests
// =============================================================================

#[test]
fn test_open_store_by_format() {
    let dir = TempDir::new().unwrap();
    let xml_path = dir.path().join("a.xml");
    let bin_path = dir.path().join("a.bin");

    open_store(SnapshotFormat::Xml, &xml_path)
        .save(&sample_trains())
        .unwrap();
    open_store(SnapshotFormat::Binary, &bin_path)
        .save(&sample_trains())
        .unwrap();

    assert!(fs::read_to_string(&xml_path).unwrap().starts_with("<Trains>"));
    assert_eq!(&fs::read(&bin_path).unwrap()[0..4], b"TRNS");
}
