//! # Buckets
//!
//! A bucket is one revision of a distributed file tree: a mapping from
//! relative path to the content descriptor of the blob holding that file.
//!
//! - **[`Bucket`]**: parsed manifest, immutable once loaded
//! - **[`Content`]**: path, blob hash, final size and transform attribute
//! - **[`TagFile`]**: JSON sidecar naming a manifest hash plus the key
//!   material needed to read it
//!
//! Filtering never mutates a bucket in place. [`Bucket::retain`] builds a
//! new bucket from the surviving entries and keeps the tag.

mod manifest;
mod tag_file;

pub use manifest::{Bucket, Content, ManifestError};
pub use tag_file::{TagFile, TagFileError};
