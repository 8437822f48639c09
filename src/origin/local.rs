use crate::error::TransferError;
use crate::origin::{ArchiveOrigin, OriginConnector, OriginEntry};
use bytes::Bytes;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// An origin mounted on the local filesystem, e.g. a mirror of the collectors' FTP tree.
#[derive(Debug, Clone)]
pub struct LocalMirror {
    root: PathBuf,
}

impl LocalMirror {
    pub fn new<P: AsRef<Path>>(root: P) -> LocalMirror {
        LocalMirror {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

fn map_io(path: &str, e: std::io::Error) -> TransferError {
    match e.kind() {
        ErrorKind::NotFound => TransferError::NotFound(path.to_string()),
        _ => TransferError::io(path, e),
    }
}

impl ArchiveOrigin for LocalMirror {
    fn list(&self, path: &str) -> Result<Vec<OriginEntry>, TransferError> {
        let mut entries = vec![];
        for entry in fs::read_dir(self.full_path(path)).map_err(|e| map_io(path, e))? {
            let entry = entry.map_err(|e| map_io(path, e))?;
            let file_type = entry.file_type().map_err(|e| map_io(path, e))?;
            let name = entry.file_name().to_string_lossy().to_string();
            entries.push(match file_type.is_dir() {
                true => OriginEntry::directory(&name),
                false => OriginEntry::file(&name),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn retrieve(&self, path: &str) -> Result<Bytes, TransferError> {
        fs::read(self.full_path(path))
            .map(Bytes::from)
            .map_err(|e| map_io(path, e))
    }
}

impl OriginConnector for LocalMirror {
    fn connect(&self) -> Result<Box<dyn ArchiveOrigin>, TransferError> {
        Ok(Box::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_and_retrieve() {
        let dir = tempfile::tempdir().unwrap();
        let updates = dir.path().join("bgpdata/2022.04/UPDATES");
        fs::create_dir_all(&updates).unwrap();
        fs::write(updates.join("updates.20220427.1900.bz2"), b"abc").unwrap();
        fs::create_dir_all(dir.path().join("route-views.linx")).unwrap();

        let mirror = LocalMirror::new(dir.path());
        let root = mirror.list("").unwrap();
        assert_eq!(
            root,
            vec![
                OriginEntry::directory("bgpdata"),
                OriginEntry::directory("route-views.linx")
            ]
        );
        let files = mirror.list("bgpdata/2022.04/UPDATES").unwrap();
        assert_eq!(files, vec![OriginEntry::file("updates.20220427.1900.bz2")]);
        assert_eq!(
            mirror
                .retrieve("/bgpdata/2022.04/UPDATES/updates.20220427.1900.bz2")
                .unwrap()
                .as_ref(),
            b"abc"
        );
    }

    #[test]
    fn test_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = LocalMirror::new(dir.path());
        assert!(matches!(
            mirror.list("bgpdata/2022.04/UPDATES"),
            Err(TransferError::NotFound(_))
        ));
        assert!(matches!(
            mirror.connect().unwrap().retrieve("nope.bz2"),
            Err(TransferError::NotFound(_))
        ));
    }
}
