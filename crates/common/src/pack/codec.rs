use std::collections::HashSet;

use bytes::{Buf, BufMut, Bytes, BytesMut};

pub const PACK_FILE_MAGIC: &[u8; 4] = b"CFSP";
pub const PACK_FILE_VERSION: u32 = 1;

/// Errors from reading a malformed pack
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("not a pack file (bad magic)")]
    BadMagic,
    #[error("unsupported pack file version {0}")]
    UnsupportedVersion(u32),
    #[error("pack file truncated in {0}")]
    Truncated(&'static str),
    #[error("pack entry {0} has a non utf-8 path or hash")]
    InvalidString(u32),
    #[error("pack entry '{path}' exceeds payload ({end} > {len})")]
    OutOfBounds { path: String, end: u64, len: usize },
    #[error("pack entry field too long: {0}")]
    FieldTooLong(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackEntry {
    pub path: String,
    pub hash: String,
    /// Offset of the entry's bytes within the payload
    pub pos: u64,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackFile {
    pub version: u32,
    pub entries: Vec<PackEntry>,
}

impl PackFile {
    pub fn new(entries: Vec<PackEntry>) -> Self {
        Self {
            version: PACK_FILE_VERSION,
            entries,
        }
    }

    /// Encode the header
    ///
    /// # Errors
    ///
    /// Fails if a path is longer than `u16::MAX` bytes, a hash longer than
    /// `u8::MAX` bytes, or there are more than `u32::MAX` entries.
    pub fn encode(&self) -> Result<Bytes, PackError> {
        let count = u32::try_from(self.entries.len())
            .map_err(|_| PackError::FieldTooLong("entry count".to_string()))?;

        let mut buf = BytesMut::new();
        buf.put_slice(PACK_FILE_MAGIC);
        buf.put_u32_le(self.version);
        buf.put_u32_le(count);

        for entry in &self.entries {
            let path_len = u16::try_from(entry.path.len())
                .map_err(|_| PackError::FieldTooLong(entry.path.clone()))?;
            let hash_len = u8::try_from(entry.hash.len())
                .map_err(|_| PackError::FieldTooLong(entry.hash.clone()))?;

            buf.put_u16_le(path_len);
            buf.put_slice(entry.path.as_bytes());
            buf.put_u8(hash_len);
            buf.put_slice(entry.hash.as_bytes());
            buf.put_u64_le(entry.pos);
            buf.put_u64_le(entry.size);
        }

        Ok(buf.freeze())
    }

    /// Decode a header, leaving `buf` positioned at the payload
    pub fn decode(buf: &mut impl Buf) -> Result<Self, PackError> {
        ensure(buf, PACK_FILE_MAGIC.len(), "magic")?;
        let mut magic = [0u8; 4];
        buf.copy_to_slice(&mut magic);
        if &magic != PACK_FILE_MAGIC {
            return Err(PackError::BadMagic);
        }

        ensure(buf, 8, "header")?;
        let version = buf.get_u32_le();
        if version != PACK_FILE_VERSION {
            return Err(PackError::UnsupportedVersion(version));
        }
        let count = buf.get_u32_le();

        // count comes from untrusted input, don't preallocate on it
        let mut entries = Vec::new();
        for index in 0..count {
            ensure(buf, 2, "entry path length")?;
            let path_len = buf.get_u16_le() as usize;
            let path = read_string(buf, path_len, index, "entry path")?;

            ensure(buf, 1, "entry hash length")?;
            let hash_len = buf.get_u8() as usize;
            let hash = read_string(buf, hash_len, index, "entry hash")?;

            ensure(buf, 16, "entry position")?;
            let pos = buf.get_u64_le();
            let size = buf.get_u64_le();

            entries.push(PackEntry {
                path,
                hash,
                pos,
                size,
            });
        }

        Ok(Self { version, entries })
    }

    /// Split a whole pack blob into its header and payload
    pub fn open(data: Bytes) -> Result<(Self, Bytes), PackError> {
        let mut buf = data;
        let pack = Self::decode(&mut buf)?;
        Ok((pack, buf))
    }

    /// Slice an entry's bytes out of the payload
    pub fn entry_data(&self, payload: &Bytes, entry: &PackEntry) -> Result<Bytes, PackError> {
        let end = entry.pos.checked_add(entry.size);
        match end {
            Some(end) if end <= payload.len() as u64 => {
                Ok(payload.slice(entry.pos as usize..end as usize))
            }
            _ => Err(PackError::OutOfBounds {
                path: entry.path.clone(),
                end: end.unwrap_or(u64::MAX),
                len: payload.len(),
            }),
        }
    }

    pub fn find(&self, path: &str) -> Option<&PackEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// New pack with only the entries whose path is in `keep`, order kept
    pub fn retain(&self, keep: &HashSet<String>) -> PackFile {
        PackFile {
            version: self.version,
            entries: self
                .entries
                .iter()
                .filter(|e| keep.contains(&e.path))
                .cloned()
                .collect(),
        }
    }
}

fn ensure(buf: &impl Buf, len: usize, what: &'static str) -> Result<(), PackError> {
    if buf.remaining() < len {
        return Err(PackError::Truncated(what));
    }
    Ok(())
}

fn read_string(
    buf: &mut impl Buf,
    len: usize,
    index: u32,
    what: &'static str,
) -> Result<String, PackError> {
    ensure(buf, len, what)?;
    let mut raw = vec![0u8; len];
    buf.copy_to_slice(&mut raw);
    String::from_utf8(raw).map_err(|_| PackError::InvalidString(index))
}

#[cfg(test)]
mod test {
    use super::*;

    const HASH: &str = "0123456789abcdef0123456789abcdef";

    fn entry(path: &str, pos: u64, size: u64) -> PackEntry {
        PackEntry {
            path: path.to_string(),
            hash: HASH.to_string(),
            pos,
            size,
        }
    }

    fn sample() -> PackFile {
        PackFile::new(vec![
            entry("hoge", 0, 1),
            entry("fugafuga", 0, 100),
            entry("piyo", 0, 0),
        ])
    }

    #[test]
    fn test_pack_round_trip() {
        let pack = sample();
        let encoded = pack.encode().unwrap();
        let decoded = PackFile::decode(&mut encoded.clone()).unwrap();
        assert_eq!(decoded, pack);
    }

    #[test]
    fn test_empty_pack_round_trip() {
        let pack = PackFile::new(Vec::new());
        let encoded = pack.encode().unwrap();
        assert_eq!(encoded.len(), 12);
        assert_eq!(PackFile::decode(&mut encoded.clone()).unwrap(), pack);
    }

    #[test]
    fn test_header_layout() {
        let pack = PackFile::new(vec![entry("ab", 7, 9)]);
        let encoded = pack.encode().unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(b"CFSP");
        expected.extend_from_slice(&1u32.to_le_bytes());
        expected.extend_from_slice(&1u32.to_le_bytes());
        expected.extend_from_slice(&2u16.to_le_bytes());
        expected.extend_from_slice(b"ab");
        expected.push(32);
        expected.extend_from_slice(HASH.as_bytes());
        expected.extend_from_slice(&7u64.to_le_bytes());
        expected.extend_from_slice(&9u64.to_le_bytes());

        assert_eq!(encoded.as_ref(), expected.as_slice());
    }

    #[test]
    fn test_decode_leaves_payload() {
        let mut data = BytesMut::from(sample().encode().unwrap().as_ref());
        data.extend_from_slice(b"payload");

        let (pack, payload) = PackFile::open(data.freeze()).unwrap();
        assert_eq!(pack, sample());
        assert_eq!(payload.as_ref(), b"payload");
    }

    #[test]
    fn test_bad_magic() {
        let mut data = Bytes::from_static(b"NOPE\x01\x00\x00\x00\x00\x00\x00\x00");
        assert!(matches!(
            PackFile::decode(&mut data),
            Err(PackError::BadMagic)
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let mut pack = sample();
        pack.version = 2;
        let mut encoded = pack.encode().unwrap();
        assert!(matches!(
            PackFile::decode(&mut encoded),
            Err(PackError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn test_truncated_at_every_offset() {
        let encoded = sample().encode().unwrap();
        for len in 0..encoded.len() {
            let mut truncated = encoded.slice(..len);
            assert!(
                matches!(PackFile::decode(&mut truncated), Err(PackError::Truncated(_))),
                "decoding {} of {} bytes should fail",
                len,
                encoded.len()
            );
        }
    }

    #[test]
    fn test_invalid_utf8_path() {
        let mut data = BytesMut::new();
        data.put_slice(PACK_FILE_MAGIC);
        data.put_u32_le(PACK_FILE_VERSION);
        data.put_u32_le(1);
        data.put_u16_le(2);
        data.put_slice(&[0xff, 0xfe]);
        data.put_u8(0);
        data.put_u64_le(0);
        data.put_u64_le(0);

        assert!(matches!(
            PackFile::decode(&mut data.freeze()),
            Err(PackError::InvalidString(0))
        ));
    }

    #[test]
    fn test_entry_data_bounds() {
        let pack = PackFile::new(vec![entry("a", 2, 3), entry("b", 4, 3)]);
        let payload = Bytes::from_static(b"0123456");

        assert_eq!(
            pack.entry_data(&payload, &pack.entries[0]).unwrap().as_ref(),
            b"234"
        );
        assert!(pack.entry_data(&payload, &pack.entries[1]).is_err());
        assert!(pack
            .entry_data(&payload, &entry("huge", u64::MAX, 2))
            .is_err());
    }

    #[test]
    fn test_retain_keeps_order_and_version() {
        let pack = sample();
        let keep: HashSet<String> = ["piyo".to_string(), "hoge".to_string()].into();
        let filtered = pack.retain(&keep);

        assert_eq!(filtered.version, PACK_FILE_VERSION);
        let paths: Vec<_> = filtered.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["hoge", "piyo"]);
    }
}
