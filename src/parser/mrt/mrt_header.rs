use crate::models::{CommonHeader, COMMON_HEADER_LEN};
use crate::ParserError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use log::debug;
use std::io::{ErrorKind, Read};

/// MRT common header [RFC6396][header].
///
/// [header]: https://tools.ietf.org/html/rfc6396#section-4.1
///
/// A MRT record is constructed as the following:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           Timestamp                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |             Type              |            Subtype            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             Length                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                      Message... (variable)
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// For `BGP4MP_ET` the first 4 bytes of the message are the microsecond timestamp and are
/// counted in `Length`. They are left in the payload here.
pub fn parse_common_header(raw: &[u8; COMMON_HEADER_LEN]) -> CommonHeader {
    let mut data = &raw[..];
    CommonHeader {
        timestamp: data.get_u32(),
        entry_type: data.get_u16(),
        entry_subtype: data.get_u16(),
        // the length field does not include the length of the common header
        length: data.get_u32(),
    }
}

impl CommonHeader {
    pub fn encode(&self) -> Bytes {
        let mut bytes = BytesMut::with_capacity(COMMON_HEADER_LEN);
        bytes.put_u32(self.timestamp);
        bytes.put_u16(self.entry_type);
        bytes.put_u16(self.entry_subtype);
        bytes.put_u32(self.length);
        bytes.freeze()
    }
}

/// Frames MRT records out of a byte stream.
///
/// A stream that ends exactly on a record boundary is finished cleanly. A stream that ends inside
/// a header or inside a payload yields [ParserError::TruncatedRecord], after which the reader is
/// exhausted.
pub struct RecordReader<R> {
    reader: R,
    records: usize,
    finished: bool,
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        RecordReader {
            reader,
            records: 0,
            finished: false,
        }
    }

    /// Number of records framed so far.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Reads the next record: its header and exactly `length` payload bytes.
    ///
    /// Returns `Ok(None)` at a clean end of stream.
    pub fn next_record(&mut self) -> Result<Option<(CommonHeader, Bytes)>, ParserError> {
        if self.finished {
            return Ok(None);
        }
        match self.read_record() {
            Ok(Some(record)) => {
                self.records += 1;
                Ok(Some(record))
            }
            other => {
                self.finished = true;
                other
            }
        }
    }

    fn read_record(&mut self) -> Result<Option<(CommonHeader, Bytes)>, ParserError> {
        let mut raw = [0u8; COMMON_HEADER_LEN];
        let read = read_until_full(&mut self.reader, &mut raw)?;
        if read == 0 {
            debug!("end of stream after {} records", self.records);
            return Ok(None);
        }
        if read < COMMON_HEADER_LEN {
            return Err(ParserError::TruncatedRecord {
                expected: COMMON_HEADER_LEN,
                actual: read,
            });
        }
        let header = parse_common_header(&raw);

        let mut buffer = BytesMut::zeroed(header.length as usize);
        let read = read_until_full(&mut self.reader, &mut buffer)?;
        if read < buffer.len() {
            return Err(ParserError::TruncatedRecord {
                expected: buffer.len(),
                actual: read,
            });
        }
        Ok(Some((header, buffer.freeze())))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<(CommonHeader, Bytes), ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Like `read_exact`, but reports how many bytes were available before the end of stream
/// instead of failing.
fn read_until_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, ParserError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ParserError::IoError(e)),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryType;

    fn record(subtype: u16, payload: &[u8]) -> Vec<u8> {
        let header = CommonHeader {
            timestamp: 1,
            entry_type: EntryType::BGP4MP as u16,
            entry_subtype: subtype,
            length: payload.len() as u32,
        };
        let mut bytes = header.encode().to_vec();
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_encode_common_header() {
        let header = CommonHeader {
            timestamp: 1,
            entry_type: EntryType::BGP4MP_ET as u16,
            entry_subtype: 4,
            length: 9,
        };

        let expected: [u8; 12] = [
            0, 0, 0, 1, // timestamp
            0, 17, // entry type
            0, 4, // entry subtype
            0, 0, 0, 9, // length
        ];

        assert_eq!(header.encode().as_ref(), &expected);
        assert_eq!(parse_common_header(&expected), header);
    }

    #[test]
    fn test_read_records_until_clean_eof() {
        let mut data = record(4, &[1, 2, 3]);
        data.extend(record(1, &[]));
        let mut reader = RecordReader::new(data.as_slice());

        let (header, payload) = reader.next_record().unwrap().unwrap();
        assert_eq!(header.entry_subtype, 4);
        assert_eq!(payload.as_ref(), &[1, 2, 3]);
        let (header, payload) = reader.next_record().unwrap().unwrap();
        assert_eq!(header.entry_subtype, 1);
        assert!(payload.is_empty());
        assert!(reader.next_record().unwrap().is_none());
        assert_eq!(reader.records(), 2);
    }

    #[test]
    fn test_truncated_payload() {
        let mut data = record(4, &[1, 2, 3]);
        data.extend(record(4, &[4, 5, 6, 7]));
        data.truncate(data.len() - 2);

        let records: Vec<_> = RecordReader::new(data.as_slice()).collect();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_ok());
        assert!(matches!(
            records[1],
            Err(ParserError::TruncatedRecord {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_truncated_header() {
        let mut data = record(4, &[1]);
        data.extend_from_slice(&[0, 0, 0]);
        let mut reader = RecordReader::new(data.as_slice());
        assert!(reader.next_record().unwrap().is_some());
        assert!(matches!(
            reader.next_record(),
            Err(ParserError::TruncatedRecord {
                expected: 12,
                actual: 3
            })
        ));
        // exhausted after the error
        assert!(reader.next_record().unwrap().is_none());
    }
}
