use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::crypto::ContentAttribute;
use crate::fs::is_entry_path;
use crate::hash::HashAlgorithm;

/// Errors raised while parsing or assembling a manifest
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("malformed manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    UnknownHashAlgorithm(#[from] crate::hash::UnknownHashAlgorithm),
    #[error("entry '{path}' has invalid {algorithm} hash: {hash}")]
    InvalidHash {
        path: String,
        hash: String,
        algorithm: HashAlgorithm,
    },
    #[error("invalid entry path: '{0}'")]
    InvalidPath(String),
    #[error("duplicate entry path: '{0}'")]
    DuplicatePath(String),
}

/// Descriptor of a single file in a bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// Relative, `/`-separated path; unique within a bucket
    pub path: String,
    /// Hash of the raw blob as stored remotely
    pub hash: String,
    /// Size in bytes of the final (transformed) content
    pub size: u64,
    pub attr: ContentAttribute,
}

/// On-the-wire shape of a manifest
#[derive(Debug, Serialize, Deserialize)]
struct ManifestDocument {
    #[serde(default = "default_hash_type")]
    hash_type: String,
    /// Attribute for entries that don't carry their own
    #[serde(default)]
    attr: ContentAttribute,
    #[serde(default)]
    contents: Vec<ContentRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentRecord {
    path: String,
    hash: String,
    size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attr: Option<ContentAttribute>,
}

fn default_hash_type() -> String {
    HashAlgorithm::default().name().to_string()
}

/// In-memory bucket manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    hash_algorithm: HashAlgorithm,
    /// Tag the manifest was resolved from, `None` if loaded by hash
    tag: Option<String>,
    contents: BTreeMap<String, Content>,
}

impl Bucket {
    /// Build a bucket from descriptors, validating paths and hashes
    pub fn from_contents(
        hash_algorithm: HashAlgorithm,
        contents: impl IntoIterator<Item = Content>,
    ) -> Result<Self, ManifestError> {
        let mut map = BTreeMap::new();
        for content in contents {
            validate_path(&content.path)?;
            if !hash_algorithm.is_hash(&content.hash) {
                return Err(ManifestError::InvalidHash {
                    path: content.path,
                    hash: content.hash,
                    algorithm: hash_algorithm,
                });
            }
            if map.contains_key(&content.path) {
                return Err(ManifestError::DuplicatePath(content.path));
            }
            map.insert(content.path.clone(), content);
        }

        Ok(Self {
            hash_algorithm,
            tag: None,
            contents: map,
        })
    }

    /// Parse a fetched manifest blob
    pub fn parse(data: &[u8]) -> Result<Self, ManifestError> {
        let doc: ManifestDocument = serde_json::from_slice(data)?;
        let hash_algorithm: HashAlgorithm = doc.hash_type.parse()?;
        let default_attr = doc.attr;

        Self::from_contents(
            hash_algorithm,
            doc.contents.into_iter().map(|record| Content {
                path: record.path,
                hash: record.hash,
                size: record.size,
                attr: record.attr.unwrap_or(default_attr),
            }),
        )
    }

    /// Serialize to the manifest wire format
    pub fn encode(&self) -> Vec<u8> {
        let doc = ManifestDocument {
            hash_type: self.hash_algorithm.name().to_string(),
            attr: ContentAttribute::default(),
            contents: self
                .contents
                .values()
                .map(|c| ContentRecord {
                    path: c.path.clone(),
                    hash: c.hash.clone(),
                    size: c.size,
                    attr: (c.attr != ContentAttribute::default()).then_some(c.attr),
                })
                .collect(),
        };
        // plain structs with string keys, cannot fail
        serde_json::to_vec_pretty(&doc).unwrap_or_default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    /// Entries ordered by path
    pub fn contents(&self) -> impl Iterator<Item = &Content> {
        self.contents.values()
    }

    pub fn get(&self, path: &str) -> Option<&Content> {
        self.contents.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.contents.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.contents.values().map(|c| c.size).sum()
    }

    /// New bucket holding only the entries whose path is in `keep`
    pub fn retain(&self, keep: &HashSet<String>) -> Bucket {
        Bucket {
            hash_algorithm: self.hash_algorithm,
            tag: self.tag.clone(),
            contents: self
                .contents
                .iter()
                .filter(|(path, _)| keep.contains(*path))
                .map(|(path, content)| (path.clone(), content.clone()))
                .collect(),
        }
    }
}

/// Entry paths must stay inside the sync target
fn validate_path(path: &str) -> Result<(), ManifestError> {
    if !is_entry_path(path) {
        return Err(ManifestError::InvalidPath(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    const H1: &str = "0123456789abcdef0123456789abcdef";
    const H2: &str = "fedcba9876543210fedcba9876543210";

    fn content(path: &str, hash: &str, size: u64) -> Content {
        Content {
            path: path.to_string(),
            hash: hash.to_string(),
            size,
            attr: ContentAttribute::Plain,
        }
    }

    #[test]
    fn test_parse_manifest() {
        let data = format!(
            r#"{{
                "hash_type": "md5",
                "attr": "encrypted",
                "contents": [
                    {{ "path": "a.txt", "hash": "{H1}", "size": 5 }},
                    {{ "path": "dir/b.bin", "hash": "{H2}", "size": 0, "attr": "plain" }}
                ]
            }}"#
        );
        let bucket = Bucket::parse(data.as_bytes()).unwrap();

        assert_eq!(bucket.hash_algorithm(), HashAlgorithm::Md5);
        assert_eq!(bucket.tag(), None);
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket.get("a.txt").unwrap().attr, ContentAttribute::Encrypted);
        assert_eq!(bucket.get("dir/b.bin").unwrap().attr, ContentAttribute::Plain);
        assert_eq!(bucket.total_size(), 5);
    }

    #[test]
    fn test_hash_type_defaults_to_md5() {
        let data = format!(r#"{{ "contents": [ {{ "path": "a", "hash": "{H1}", "size": 1 }} ] }}"#);
        let bucket = Bucket::parse(data.as_bytes()).unwrap();
        assert_eq!(bucket.hash_algorithm(), HashAlgorithm::Md5);
        assert_eq!(bucket.get("a").unwrap().attr, ContentAttribute::Plain);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Bucket::parse(b"not a manifest"),
            Err(ManifestError::Json(_))
        ));
        assert!(matches!(
            Bucket::parse(br#"{ "hash_type": "crc32", "contents": [] }"#),
            Err(ManifestError::UnknownHashAlgorithm(_))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_hash() {
        let data = r#"{ "contents": [ { "path": "a", "hash": "latest", "size": 1 } ] }"#;
        assert!(matches!(
            Bucket::parse(data.as_bytes()),
            Err(ManifestError::InvalidHash { .. })
        ));
    }

    #[test]
    fn test_rejects_escaping_paths() {
        for path in [
            "../etc/passwd",
            "/abs",
            "a/../../b",
            "",
            "./a",
            "a\\b",
            "a//b",
            "a/./b",
            "dir/",
        ] {
            let result = Bucket::from_contents(HashAlgorithm::Md5, [content(path, H1, 1)]);
            assert!(
                matches!(result, Err(ManifestError::InvalidPath(_))),
                "path {:?} should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_aliased_spellings_are_rejected() {
        // each of these would land on the same file as `a/b`
        let result = Bucket::from_contents(
            HashAlgorithm::Md5,
            [content("a/b", H1, 1), content("a//b", H1, 1), content("a/./b", H1, 1)],
        );
        assert!(matches!(result, Err(ManifestError::InvalidPath(p)) if p == "a//b"));

        let manifest = format!(
            r#"{{"hash_type":"md5","contents":[{{"path":"dir/","hash":"{}","size":1}}]}}"#,
            H1
        );
        assert!(matches!(
            Bucket::parse(manifest.as_bytes()),
            Err(ManifestError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_paths() {
        let result = Bucket::from_contents(
            HashAlgorithm::Md5,
            [content("a", H1, 1), content("a", H2, 2)],
        );
        assert!(matches!(result, Err(ManifestError::DuplicatePath(_))));
    }

    #[test]
    fn test_encode_parse() {
        let mut encrypted = content("secret.bin", H2, 9);
        encrypted.attr = ContentAttribute::Encrypted;
        let bucket =
            Bucket::from_contents(HashAlgorithm::Md5, [content("a.txt", H1, 5), encrypted])
                .unwrap();

        let parsed = Bucket::parse(&bucket.encode()).unwrap();
        assert_eq!(parsed, bucket);
    }

    #[test]
    fn test_retain_builds_new_bucket() {
        let bucket = Bucket::from_contents(
            HashAlgorithm::Md5,
            [content("a", H1, 1), content("b", H2, 2), content("c", H1, 3)],
        )
        .unwrap()
        .with_tag("latest");

        let keep: HashSet<String> = ["a".to_string(), "c".to_string(), "zzz".to_string()].into();
        let filtered = bucket.retain(&keep);

        assert_eq!(filtered.paths().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(filtered.tag(), Some("latest"));
        // the source is untouched
        assert_eq!(bucket.len(), 3);
    }
}
