use std::collections::HashMap;

use bytes::{BufMut, Bytes, BytesMut};

use super::{PackEntry, PackError, PackFile};
use crate::hash::HashAlgorithm;

/// Assembles a pack blob from in-memory files
///
/// Content is hashed with the builder's algorithm; files with identical
/// bytes point at the same payload range instead of being stored twice.
#[derive(Debug)]
pub struct PackBuilder {
    hash_algorithm: HashAlgorithm,
    entries: Vec<PackEntry>,
    payload: BytesMut,
    /// hash -> pos of already stored content
    stored: HashMap<String, u64>,
}

impl PackBuilder {
    pub fn new(hash_algorithm: HashAlgorithm) -> Self {
        Self {
            hash_algorithm,
            entries: Vec::new(),
            payload: BytesMut::new(),
            stored: HashMap::new(),
        }
    }

    pub fn add(&mut self, path: impl Into<String>, data: &[u8]) -> &PackEntry {
        let hash = self.hash_algorithm.digest_hex(data);
        let pos = match self.stored.get(&hash) {
            Some(pos) => *pos,
            None => {
                let pos = self.payload.len() as u64;
                self.payload.put_slice(data);
                self.stored.insert(hash.clone(), pos);
                pos
            }
        };

        self.entries.push(PackEntry {
            path: path.into(),
            hash,
            pos,
            size: data.len() as u64,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Header followed by payload
    pub fn finish(self) -> Result<(PackFile, Bytes), PackError> {
        let pack = PackFile::new(self.entries);
        let header = pack.encode()?;

        let mut out = BytesMut::with_capacity(header.len() + self.payload.len());
        out.put_slice(&header);
        out.put_slice(&self.payload);
        Ok((pack, out.freeze()))
    }
}
