//! Content transforms for fetched blobs
//!
//! Blobs are cached exactly as the remote store serves them. The transform
//! selected by an entry's [`ContentAttribute`] is applied on the way out of
//! the cache, so one cached blob can serve any attribute variant:
//!
//! - **Plain**: bytes are returned unchanged
//! - **Encrypted**: bytes are AES-256-GCM ciphertext under the process-wide
//!   [`EncryptionKey`] (key + IV)

mod attribute;
mod secret;

pub use attribute::ContentAttribute;
pub use secret::{decode, encode, EncryptionKey, TransformError, IV_SIZE, KEY_SIZE};
