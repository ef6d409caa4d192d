//! Content hashes
//!
//! A hash is a lowercase hex string whose length is fixed by the bucket's
//! hash algorithm. Anything that does not match that exact shape is treated
//! as a tag name and has to be resolved through the remote store first.

use std::fmt;
use std::str::FromStr;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Digest algorithms a manifest may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// 128-bit digest, 32 hex characters
    #[default]
    Md5,
    /// 256-bit digest, 64 hex characters
    Sha256,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown hash algorithm: {0}")]
pub struct UnknownHashAlgorithm(pub String);

impl HashAlgorithm {
    /// Number of hex characters in a hash of this algorithm
    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Sha256 => 64,
        }
    }

    /// Check whether `s` is a hash for this algorithm.
    ///
    /// Only lowercase hex of exactly [`Self::hex_len`] characters qualifies;
    /// everything else (including the empty string) is a tag.
    pub fn is_hash(&self, s: &str) -> bool {
        s.len() == self.hex_len() && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Lowercase hex digest of `data`
    pub fn digest_hex(&self, data: &[u8]) -> String {
        match self {
            HashAlgorithm::Md5 => hex::encode(Md5::digest(data)),
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = UnknownHashAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha256" => Ok(HashAlgorithm::Sha256),
            other => Err(UnknownHashAlgorithm(other.to_string())),
        }
    }
}

/// Remote location of a blob: `data/<first two chars>/<rest>`.
///
/// The caller must have validated `hash` already.
pub fn data_path(hash: &str) -> String {
    format!("data/{}/{}", &hash[0..2], &hash[2..])
}

/// Remote location of a tag
pub fn tag_path(name: &str) -> String {
    format!("tag/{}", name)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_md5_classification() {
        let alg = HashAlgorithm::Md5;
        assert!(alg.is_hash("0123456789abcdef0123456789abcdef"));
        assert!(alg.is_hash(&alg.digest_hex(b"hello")));

        // wrong length
        assert!(!alg.is_hash("0123456789abcdef0123456789abcde"));
        assert!(!alg.is_hash("0123456789abcdef0123456789abcdef0"));
        // uppercase and non-hex characters
        assert!(!alg.is_hash("0123456789ABCDEF0123456789abcdef"));
        assert!(!alg.is_hash("0123456789abcdef0123456789abcdeg"));
        // empty and ordinary tag names
        assert!(!alg.is_hash(""));
        assert!(!alg.is_hash("release-2024"));
    }

    #[test]
    fn test_sha256_classification() {
        let alg = HashAlgorithm::Sha256;
        let digest = alg.digest_hex(b"hello");
        assert_eq!(digest.len(), 64);
        assert!(alg.is_hash(&digest));
        // an md5-length hash is a tag under sha256
        assert!(!alg.is_hash(&HashAlgorithm::Md5.digest_hex(b"hello")));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            HashAlgorithm::Md5.digest_hex(b""),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }

    #[test]
    fn test_names_round_trip() {
        for alg in [HashAlgorithm::Md5, HashAlgorithm::Sha256] {
            assert_eq!(alg.name().parse::<HashAlgorithm>().unwrap(), alg);
        }
        assert!("crc32".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn test_paths() {
        assert_eq!(
            data_path("0123456789abcdef0123456789abcdef"),
            "data/01/23456789abcdef0123456789abcdef"
        );
        assert_eq!(tag_path("latest"), "tag/latest");
    }
}
