//! Shared test utilities for distribution integration tests
#![allow(dead_code)]

use std::sync::Arc;

use ::common::bucket::{Bucket, Content};
use ::common::crypto::{ContentAttribute, EncryptionKey};
use ::common::distribute::Distributor;
use ::common::hash::HashAlgorithm;
use ::common::store::{FetchConfig, Fetcher};
use ::common::testkit::MemoryRemote;
use tempfile::TempDir;

pub struct TestEnv {
    pub remote: Arc<MemoryRemote>,
    pub distributor: Distributor,
    pub dir: TempDir,
}

impl TestEnv {
    pub fn fetcher(&self) -> &Fetcher {
        self.distributor.fetcher()
    }

    pub fn target(&self) -> std::path::PathBuf {
        self.dir.path().join("target")
    }
}

pub fn test_key() -> EncryptionKey {
    EncryptionKey::from_slices(&[9u8; 32], &[4u8; 12]).unwrap()
}

/// Set up a memory remote, a cache in a temp dir and a distributor over both
pub fn setup_test_env() -> TestEnv {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(MemoryRemote::new());
    let config = FetchConfig::new(dir.path().join("cache")).with_encryption(Some(test_key()));
    let fetcher = Fetcher::new(remote.clone(), config);
    TestEnv {
        remote,
        distributor: Distributor::new(fetcher),
        dir,
    }
}

/// Upload `files` as plain blobs and return the bucket describing them.
/// Empty files are not uploaded, as publishers never store empty blobs.
pub fn publish(remote: &MemoryRemote, files: &[(&str, &[u8])]) -> Bucket {
    let contents = files.iter().map(|(path, data)| {
        let hash = if data.is_empty() {
            HashAlgorithm::Md5.digest_hex(data)
        } else {
            remote.put_blob(HashAlgorithm::Md5, data)
        };
        Content {
            path: path.to_string(),
            hash,
            size: data.len() as u64,
            attr: ContentAttribute::Plain,
        }
    });
    Bucket::from_contents(HashAlgorithm::Md5, contents).unwrap()
}

/// Upload `files` encrypted under [`test_key`]
pub fn publish_encrypted(remote: &MemoryRemote, files: &[(&str, &[u8])]) -> Bucket {
    let key = test_key();
    let contents = files.iter().map(|(path, data)| {
        let ciphertext = key.encrypt(data).unwrap();
        Content {
            path: path.to_string(),
            hash: remote.put_blob(HashAlgorithm::Md5, &ciphertext),
            size: data.len() as u64,
            attr: ContentAttribute::Encrypted,
        }
    });
    Bucket::from_contents(HashAlgorithm::Md5, contents).unwrap()
}

/// Store the bucket's manifest and point `tag` at it
pub fn publish_manifest(remote: &MemoryRemote, bucket: &Bucket, tag: &str) -> String {
    let hash = remote.put_blob(HashAlgorithm::Md5, &bucket.encode());
    remote.put_tag(tag, &hash);
    hash
}
