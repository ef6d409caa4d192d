use crate::bucket::ManifestError;
use crate::crypto::TransformError;
use crate::hash::HashAlgorithm;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("cannot fetch data, {0} is not a hash")]
    InvalidHash(String),
    #[error("bad response status code {status} from {location}")]
    Status { status: u16, location: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("unsupported remote location: {0}")]
    UnsupportedRemote(String),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid tag name: '{0}'")]
    InvalidTag(String),
    #[error("tag '{tag}' resolved to '{value}', which is not a hash")]
    NotAHash { tag: String, value: String },
    #[error("tag lookup failed: {0}")]
    Fetch(#[from] FetchError),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("resolution error: {0}")]
    Resolve(#[from] ResolveError),
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("parse error: {0}")]
    Parse(#[from] ManifestError),
    #[error("manifest uses {found} hashes, expected {expected}")]
    AlgorithmMismatch {
        expected: HashAlgorithm,
        found: HashAlgorithm,
    },
}
