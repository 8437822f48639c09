use std::io::{Read, Write};
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bgpkit_mirror::converter::{
    convert, ArchiveConverter, ConversionEvent, ConvertOutcome, EventKind, EventOutcome,
};
use bgpkit_mirror::encoder::MrtUpdatesEncoder;
use bgpkit_mirror::models::*;
use bgpkit_mirror::store::{ArchiveStore, LocalStore, Project};
use bgpkit_mirror::{ConvertError, TransferError};
use bytes::Bytes;
use flate2::read::GzDecoder;
use serde_json::Value;
use tempfile::TempDir;

const ARCHIVE: &str = "route-views.linx/bgpdata/2022.04/UPDATES/updates.20220427.1900.bz2";
const CONVERTED: &str = "route-views.linx/bgpdata/2022.04/UPDATES/updates.20220427.1900.gz";

fn peer() -> Bgp4MpPeer {
    Bgp4MpPeer {
        peer_asn: Asn::new_32bit(6447),
        local_asn: Asn::new_32bit(0),
        interface_index: 0,
        peer_ip: IpAddr::from_str("10.0.0.1").unwrap(),
        local_ip: IpAddr::from_str("0.0.0.0").unwrap(),
    }
}

fn announcement(prefix: &str) -> BgpUpdateMessage {
    let mut msg = BgpUpdateMessage {
        announced_prefixes: vec![NetworkPrefix::from_str(prefix).unwrap()],
        ..Default::default()
    };
    msg.attributes.insert(Attribute {
        value: AttributeValue::Origin(Origin::IGP),
        flag: AttrFlags::TRANSITIVE,
    });
    msg
}

fn withdrawal(prefix: &str) -> BgpUpdateMessage {
    BgpUpdateMessage {
        withdrawn_prefixes: vec![NetworkPrefix::from_str(prefix).unwrap()],
        ..Default::default()
    }
}

/// An uncompressed archive with two announcements, a state change and a withdrawal.
fn mrt_archive(extended: bool) -> Bytes {
    let mut encoder = MrtUpdatesEncoder::new().with_extended_timestamp(extended);
    encoder.push_update(1651086000, 125, &peer(), &announcement("10.1.0.0/16"));
    encoder.push_update(1651086001, 0, &peer(), &announcement("10.2.0.0/16"));
    encoder.push_state_change(
        1651086002,
        &Bgp4MpStateChange {
            msg_type: Bgp4MpType::StateChangeAs4,
            peer: peer(),
            old_state: BgpState::Established,
            new_state: BgpState::Idle,
        },
    );
    encoder.push_update(1651086003, 0, &peer(), &withdrawal("10.1.0.0/16"));
    encoder.export_bytes()
}

fn bzip2(raw: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(vec![], bzip2::Compression::default());
    encoder.write_all(raw).unwrap();
    encoder.finish().unwrap()
}

fn rows(gz: &[u8]) -> Vec<Value> {
    let mut text = String::new();
    GzDecoder::new(gz).read_to_string(&mut text).unwrap();
    text.lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_convert_rows() {
    let mut out = vec![];
    let stats = convert("route-views2", bzip2(&mrt_archive(false)).as_slice(), &mut out).unwrap();
    assert_eq!(stats.records, 4);
    assert_eq!(stats.updates, 3);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.errors, 0);

    let rows = rows(&out);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["Collector"], "route-views2");
    assert_eq!(rows[0]["SeenAt"], "2022-04-27T19:00:00Z");
    assert_eq!(rows[0]["PeerAS"], 6447);
    assert_eq!(rows[0]["Announced"], serde_json::json!(["10.1.0.0/16"]));
    assert_eq!(rows[0]["Withdrawn"], serde_json::json!([]));
    assert_eq!(rows[0]["Attributes"][0]["AttrType"], 1);
    assert!(rows[0]["Attributes"][0]["Payload"].is_string());

    assert_eq!(rows[2]["Announced"], serde_json::json!([]));
    assert_eq!(rows[2]["Withdrawn"], serde_json::json!(["10.1.0.0/16"]));
    assert_eq!(rows[2]["Attributes"], serde_json::json!([]));
}

#[test]
fn test_convert_extended_timestamp_rows_match() {
    let mut plain = vec![];
    let mut extended = vec![];
    convert("route-views2", bzip2(&mrt_archive(false)).as_slice(), &mut plain).unwrap();
    convert("route-views2", bzip2(&mrt_archive(true)).as_slice(), &mut extended).unwrap();
    assert_eq!(rows(&plain), rows(&extended));
}

#[test]
fn test_convert_concatenated_streams() {
    let mut raw = bzip2(&mrt_archive(false));
    raw.extend(bzip2(&mrt_archive(true)));
    let mut out = vec![];
    let stats = convert("route-views2", raw.as_slice(), &mut out).unwrap();
    assert_eq!(stats.records, 8);
    assert_eq!(rows(&out).len(), 6);
}

#[test]
fn test_convert_truncated_archive_keeps_earlier_rows() {
    let raw = mrt_archive(false);
    let truncated = &raw[..raw.len() - 3];
    let mut out = vec![];
    match convert("route-views2", bzip2(truncated).as_slice(), &mut out) {
        Err(ConvertError::TruncatedArchive { records, .. }) => assert_eq!(records, 3),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(rows(&out).len(), 2);
}

#[test]
fn test_convert_skips_broken_record() {
    let mut encoder = MrtUpdatesEncoder::new();
    encoder.push_raw(
        &CommonHeader {
            timestamp: 1651086000,
            entry_type: EntryType::BGP4MP as u16,
            entry_subtype: Bgp4MpType::MessageAs4 as u16,
            length: 5,
        },
        &[0, 0, 0xfd, 0xe8, 0],
    );
    encoder.push_update(1651086001, 0, &peer(), &announcement("10.2.0.0/16"));
    let mut out = vec![];
    let stats = convert("route-views2", bzip2(&encoder.export_bytes()).as_slice(), &mut out)
        .unwrap();
    assert_eq!(stats.records, 2);
    assert_eq!(stats.errors, 1);
    let rows = rows(&out);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["Announced"], serde_json::json!(["10.2.0.0/16"]));
}

/// Counts reads to tell whether a conversion touched the source.
struct CountingStore {
    inner: LocalStore,
    reads: AtomicUsize,
}

impl ArchiveStore for CountingStore {
    fn md5(&self, path: &str) -> Result<Option<[u8; 16]>, TransferError> {
        self.inner.md5(path)
    }

    fn exists(&self, path: &str) -> Result<bool, TransferError> {
        self.inner.exists(path)
    }

    fn read(&self, path: &str) -> Result<Bytes, TransferError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(path)
    }

    fn write(&self, path: &str, content: &[u8]) -> Result<(), TransferError> {
        self.inner.write(path, content)
    }
}

fn setup() -> (TempDir, Arc<CountingStore>, Arc<LocalStore>, ArchiveConverter) {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(CountingStore {
        inner: LocalStore::new(dir.path().join("source")),
        reads: AtomicUsize::new(0),
    });
    let destination = Arc::new(LocalStore::new(dir.path().join("converted")));
    let converter = ArchiveConverter::new(source.clone(), destination.clone(), Project::RouteViews);
    (dir, source, destination, converter)
}

#[test]
fn test_process_is_idempotent() {
    let (_dir, source, destination, converter) = setup();
    source
        .write(ARCHIVE, &bzip2(&mrt_archive(false)))
        .unwrap();

    match converter.process(ARCHIVE).unwrap() {
        ConvertOutcome::Converted { destination, stats } => {
            assert_eq!(destination, CONVERTED);
            assert_eq!(stats.updates, 3);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    let rows = rows(&destination.read(CONVERTED).unwrap());
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["Collector"], "route-views.linx");
    assert_eq!(source.reads.load(Ordering::SeqCst), 1);

    assert_eq!(
        converter.process(ARCHIVE).unwrap(),
        ConvertOutcome::Skipped {
            destination: CONVERTED.to_string()
        }
    );
    assert_eq!(source.reads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_process_empty_archive() {
    let (_dir, source, destination, converter) = setup();
    source.write(ARCHIVE, &[]).unwrap();
    assert!(matches!(
        converter.process(ARCHIVE),
        Err(ConvertError::EmptyArchive(_))
    ));
    assert!(!destination.exists(CONVERTED).unwrap());
}

#[test]
fn test_process_truncated_archive_writes_nothing() {
    let (_dir, source, destination, converter) = setup();
    let raw = mrt_archive(false);
    source
        .write(ARCHIVE, &bzip2(&raw[..raw.len() - 3]))
        .unwrap();
    assert!(matches!(
        converter.process(ARCHIVE),
        Err(ConvertError::TruncatedArchive { .. })
    ));
    assert!(!destination.exists(CONVERTED).unwrap());
}

#[test]
fn test_process_all_keeps_order() {
    let (_dir, source, _destination, converter) = setup();
    let paths: Vec<String> = (0..6)
        .map(|i| format!("bgpdata/2022.04/UPDATES/updates.20220427.19{:02}.bz2", i * 5))
        .collect();
    for path in &paths[1..] {
        source.write(path, &bzip2(&mrt_archive(false))).unwrap();
    }

    let results = converter.process_all(&paths, 3);
    assert_eq!(results.len(), paths.len());
    for ((path, result), want) in results.iter().zip(&paths) {
        assert_eq!(path, want);
        match path == &paths[0] {
            true => assert!(result.is_err()),
            false => assert!(matches!(result, Ok(ConvertOutcome::Converted { .. }))),
        }
    }
}

#[test]
fn test_handle_event() {
    let (_dir, source, destination, converter) = setup();
    source
        .write(ARCHIVE, &bzip2(&mrt_archive(false)))
        .unwrap();

    let payload = |kind: &str| {
        format!(
            r#"{{"message":{{"attributes":{{"bucketId":"archive","objectId":"{}","eventType":"{}"}},"messageId":"7"}}}}"#,
            ARCHIVE, kind
        )
    };

    let event = ConversionEvent::from_json(payload("OBJECT_DELETE").as_bytes()).unwrap();
    assert_eq!(
        converter.handle_event(&event).unwrap(),
        EventOutcome::Ignored(EventKind::ObjectDelete)
    );
    assert!(!destination.exists(CONVERTED).unwrap());

    let event = ConversionEvent::from_json(payload("OBJECT_FINALIZE").as_bytes()).unwrap();
    assert!(matches!(
        converter.handle_event(&event).unwrap(),
        EventOutcome::Processed(ConvertOutcome::Converted { .. })
    ));
    assert!(destination.exists(CONVERTED).unwrap());
}
