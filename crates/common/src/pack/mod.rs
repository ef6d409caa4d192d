//! # Pack files
//!
//! A pack bundles many small files into one blob so they can be fetched
//! and cached as a single unit. The header lists every entry; the payload
//! follows immediately after it.
//!
//! ```text
//! magic    b"CFSP"
//! version  u32 LE
//! count    u32 LE
//! entry *  path_len u16 LE | path (utf-8) | hash_len u8 | hash | pos u64 LE | size u64 LE
//! payload  entry bytes, addressed by (pos, size) relative to the payload start
//! ```
//!
//! Decoding an encoded header yields the same entries, field for field and
//! in the same order. Entries with identical content share one payload range.

mod builder;
mod codec;

pub use builder::PackBuilder;
pub use codec::{PackEntry, PackError, PackFile, PACK_FILE_MAGIC, PACK_FILE_VERSION};
