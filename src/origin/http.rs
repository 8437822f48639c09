use crate::error::TransferError;
use crate::origin::{ArchiveOrigin, OriginConnector, OriginEntry};
use bytes::Bytes;
use log::debug;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

/// An origin served over HTTP, walked through its auto-generated directory index pages.
///
/// Files are downloaded over HTTP rather than FTP; listings come from `<a href="...">` links, a
/// trailing `/` marking a directory.
#[derive(Debug, Clone)]
pub struct HttpMirror {
    base_url: String,
    client: Client,
    href: Regex,
}

impl HttpMirror {
    /// Creates a mirror rooted at `base_url`. `timeout` bounds every request, body included.
    pub fn new(base_url: &str, timeout: Duration) -> Result<HttpMirror, TransferError> {
        if !base_url.starts_with("http") {
            return Err(TransferError::InvalidRequest(format!(
                "{} does not have the HTTP prefix",
                base_url
            )));
        }
        let base_url = match base_url.ends_with('/') {
            true => base_url.to_string(),
            false => format!("{}/", base_url),
        };
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let href = Regex::new(r#"href="([^"?#]+)""#).map_err(|e| {
            TransferError::InvalidRequest(format!("invalid listing pattern: {}", e))
        })?;
        Ok(HttpMirror {
            base_url,
            client,
            href,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get(&self, path: &str, url: &str) -> Result<Bytes, TransferError> {
        debug!("GET {}", url);
        let resp = self.client.get(url).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(TransferError::NotFound(path.to_string()));
        }
        Ok(resp.error_for_status()?.bytes()?)
    }

    /// Extracts the entries linked from an index page, skipping parent and absolute links.
    fn parse_index(&self, page: &str) -> Vec<OriginEntry> {
        let mut entries: Vec<OriginEntry> = self
            .href
            .captures_iter(page)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
            .filter(|link| !link.starts_with('/') && !link.starts_with("..") && !link.contains("://"))
            .filter_map(|link| match link.strip_suffix('/') {
                Some(dir) if !dir.contains('/') => Some(OriginEntry::directory(dir)),
                Some(_) => None,
                None if !link.contains('/') => Some(OriginEntry::file(link)),
                None => None,
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.dedup();
        entries
    }
}

impl ArchiveOrigin for HttpMirror {
    fn list(&self, path: &str) -> Result<Vec<OriginEntry>, TransferError> {
        let url = match path.is_empty() || path.ends_with('/') {
            true => self.url(path),
            false => format!("{}/", self.url(path)),
        };
        let page = self.get(path, &url)?;
        Ok(self.parse_index(&String::from_utf8_lossy(&page)))
    }

    fn retrieve(&self, path: &str) -> Result<Bytes, TransferError> {
        self.get(path, &self.url(path))
    }
}

impl OriginConnector for HttpMirror {
    fn connect(&self) -> Result<Box<dyn ArchiveOrigin>, TransferError> {
        Ok(Box::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index() {
        let mirror = HttpMirror::new("http://archive.example.net", Duration::from_secs(1)).unwrap();
        assert_eq!(mirror.url("/bgpdata"), "http://archive.example.net/bgpdata");

        let page = r#"
        <a href="?C=N;O=D">Name</a>
        <a href="/">Parent Directory</a>
        <a href="../">Up</a>
        <a href="bgpdata/">bgpdata/</a>
        <a href="route-views.linx/">route-views.linx/</a>
        <a href="updates.20220427.1900.bz2">updates.20220427.1900.bz2</a>
        <a href="https://elsewhere.example.net/x.bz2">x</a>
        <a href="bgpdata/">bgpdata/</a>
        "#;
        assert_eq!(
            mirror.parse_index(page),
            vec![
                OriginEntry::directory("bgpdata"),
                OriginEntry::directory("route-views.linx"),
                OriginEntry::file("updates.20220427.1900.bz2"),
            ]
        );
    }

    #[test]
    fn test_invalid_base() {
        assert!(matches!(
            HttpMirror::new("ftp://archive.example.net", Duration::from_secs(1)),
            Err(TransferError::InvalidRequest(_))
        ));
    }
}
