use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-entry instruction for turning raw blob bytes into final content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentAttribute {
    /// No transform
    #[default]
    Plain,
    /// Decrypt with the process key and IV
    Encrypted,
}

impl ContentAttribute {
    pub fn requires_key(&self) -> bool {
        matches!(self, ContentAttribute::Encrypted)
    }
}

impl fmt::Display for ContentAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentAttribute::Plain => write!(f, "plain"),
            ContentAttribute::Encrypted => write!(f, "encrypted"),
        }
    }
}
