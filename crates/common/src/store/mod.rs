//! Fetch/cache engine
//!
//! Blobs are addressed purely by hash. A fetch looks in the [`LocalCache`]
//! first and only falls back to the [`Remote`] store on a miss; downloaded
//! bytes are cached raw (before any transform) with an atomic write, so a
//! crash can never leave a partial entry under its final name.
//!
//! Remote layout, relative to the configured base:
//!
//! ```text
//! tag/<name>                     text body holding a manifest hash
//! data/<hash[0:2]>/<hash[2:]>    raw blob bytes
//! ```

mod cache;
mod config;
mod error;
mod fetcher;
mod remote;
mod resolver;

pub use cache::LocalCache;
pub use config::FetchConfig;
pub use error::{FetchError, LoadError, ResolveError};
pub use fetcher::Fetcher;
pub use remote::{remote_from_url, FileRemote, HttpRemote, Remote};
