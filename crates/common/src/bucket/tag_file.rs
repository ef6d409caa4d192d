use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::{ContentAttribute, EncryptionKey, TransformError};

#[derive(Debug, thiserror::Error)]
pub enum TagFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid key material: {0}")]
    Key(#[from] TransformError),
}

/// Descriptor published next to a tag
///
/// Carries the manifest hash the tag pointed at when it was cut, plus the
/// hex-encoded key and IV needed for encrypted entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagFile {
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub encrypt_key: String,
    #[serde(default)]
    pub encrypt_iv: String,
    #[serde(default)]
    pub attr: ContentAttribute,
    pub hash: String,
}

impl TagFile {
    pub fn from_reader(mut reader: impl Read) -> Result<Self, TagFileError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, TagFileError> {
        let data = std::fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Key material, or `None` if the tag file carries none
    pub fn encryption_key(&self) -> Result<Option<EncryptionKey>, TagFileError> {
        if self.encrypt_key.is_empty() && self.encrypt_iv.is_empty() {
            return Ok(None);
        }
        Ok(Some(EncryptionKey::from_hex(
            &self.encrypt_key,
            &self.encrypt_iv,
        )?))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_tag_file() {
        let json = format!(
            r#"{{
                "name": "release",
                "createdAt": "2024-03-01T12:00:00Z",
                "encryptKey": "{}",
                "encryptIv": "{}",
                "attr": "encrypted",
                "hash": "0123456789abcdef0123456789abcdef"
            }}"#,
            "11".repeat(32),
            "22".repeat(12)
        );
        let tag = TagFile::from_reader(Cursor::new(json)).unwrap();

        assert_eq!(tag.name, "release");
        assert_eq!(tag.attr, ContentAttribute::Encrypted);
        assert_eq!(tag.hash, "0123456789abcdef0123456789abcdef");
        let key = tag.encryption_key().unwrap().unwrap();
        assert_eq!(
            key,
            EncryptionKey::from_slices(&[0x11; 32], &[0x22; 12]).unwrap()
        );
    }

    #[test]
    fn test_tag_file_without_key() {
        let json = r#"{ "name": "t", "createdAt": "2024-03-01T12:00:00Z", "hash": "x" }"#;
        let tag = TagFile::from_reader(Cursor::new(json)).unwrap();
        assert_eq!(tag.attr, ContentAttribute::Plain);
        assert!(tag.encryption_key().unwrap().is_none());
    }

    #[test]
    fn test_tag_file_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tag.json");
        std::fs::write(
            &path,
            r#"{ "name": "t", "createdAt": "2024-03-01T12:00:00Z", "hash": "x", "encryptKey": "00" }"#,
        )
        .unwrap();

        let tag = TagFile::from_file(&path).unwrap();
        assert!(matches!(tag.encryption_key(), Err(TagFileError::Key(_))));
    }
}
