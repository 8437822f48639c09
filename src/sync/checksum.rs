use crate::error::TransferError;
use crate::origin::ArchiveOrigin;
use crate::store::ArchiveStore;
use bytes::Bytes;
use log::debug;

/// Whether an archive has to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The stored object has the same MD5 as the origin's content.
    InSync,
    /// The store lacks the object or holds different content. `content` is what was digested.
    Upload { content: Bytes, digest: [u8; 16] },
}

/// Compares the MD5 of a stored object with the MD5 of the origin's current content.
pub struct ChecksumDiffer<'a> {
    origin: &'a dyn ArchiveOrigin,
    store: &'a dyn ArchiveStore,
}

impl<'a> ChecksumDiffer<'a> {
    pub fn new(origin: &'a dyn ArchiveOrigin, store: &'a dyn ArchiveStore) -> ChecksumDiffer<'a> {
        ChecksumDiffer { origin, store }
    }

    /// Retrieves the origin content of `path` and checks it against the store.
    ///
    /// The digest is always computed over freshly retrieved bytes, and those same bytes are
    /// returned for upload. A store lookup failure counts as a missing object; only origin
    /// failures are returned as errors.
    pub fn needs_upload(&self, path: &str) -> Result<Verdict, TransferError> {
        let stored = match self.store.md5(path) {
            Ok(stored) => stored,
            Err(e) => {
                debug!("no stored checksum for {}: {}", path, e);
                None
            }
        };
        let content = self.origin.retrieve(path)?;
        let digest = md5::compute(&content).0;
        match stored {
            Some(stored) if stored == digest => Ok(Verdict::InSync),
            _ => Ok(Verdict::Upload { content, digest }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::OriginEntry;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FixedOrigin(Bytes);

    impl ArchiveOrigin for FixedOrigin {
        fn list(&self, _path: &str) -> Result<Vec<OriginEntry>, TransferError> {
            Ok(vec![])
        }

        fn retrieve(&self, _path: &str) -> Result<Bytes, TransferError> {
            Ok(self.0.clone())
        }
    }

    /// A store that only knows checksums.
    #[derive(Default)]
    struct Digests(Mutex<HashMap<String, [u8; 16]>>);

    impl ArchiveStore for Digests {
        fn md5(&self, path: &str) -> Result<Option<[u8; 16]>, TransferError> {
            Ok(self.0.lock().unwrap().get(path).copied())
        }

        fn exists(&self, path: &str) -> Result<bool, TransferError> {
            Ok(self.0.lock().unwrap().contains_key(path))
        }

        fn read(&self, path: &str) -> Result<Bytes, TransferError> {
            Err(TransferError::NotFound(path.to_string()))
        }

        fn write(&self, path: &str, content: &[u8]) -> Result<(), TransferError> {
            self.0
                .lock()
                .unwrap()
                .insert(path.to_string(), md5::compute(content).0);
            Ok(())
        }
    }

    fn digest(hex_digest: &str) -> [u8; 16] {
        hex::decode(hex_digest).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_needs_upload() {
        let origin = FixedOrigin(Bytes::from_static(b"Foo Bar Baz"));
        let store = Digests::default();
        let differ = ChecksumDiffer::new(&origin, &store);

        // absent
        match differ.needs_upload("a.bz2").unwrap() {
            Verdict::Upload { content, digest: d } => {
                assert_eq!(content.as_ref(), b"Foo Bar Baz");
                assert_eq!(d, digest("50e3903156f5d2dac6c9f89626d48c75"));
            }
            Verdict::InSync => panic!("missing object reported in sync"),
        }

        // mismatch: stored digest of empty content
        store
            .0
            .lock()
            .unwrap()
            .insert("a.bz2".to_string(), digest("d41d8cd98f00b204e9800998ecf8427e"));
        assert!(matches!(
            differ.needs_upload("a.bz2").unwrap(),
            Verdict::Upload { .. }
        ));

        // match
        store.write("a.bz2", b"Foo Bar Baz").unwrap();
        assert_eq!(differ.needs_upload("a.bz2").unwrap(), Verdict::InSync);
    }

    #[test]
    fn test_digest_not_cached() {
        let store = Digests::default();
        store.write("a.bz2", b"Foo Bar Baz").unwrap();
        let before = FixedOrigin(Bytes::from_static(b"Foo Bar Baz"));
        assert_eq!(
            ChecksumDiffer::new(&before, &store).needs_upload("a.bz2").unwrap(),
            Verdict::InSync
        );
        let after = FixedOrigin(Bytes::from_static(b"Foo Bar Baz Qux"));
        assert!(matches!(
            ChecksumDiffer::new(&after, &store).needs_upload("a.bz2").unwrap(),
            Verdict::Upload { .. }
        ));
    }
}
