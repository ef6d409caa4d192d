//! In-process test doubles for the remote store
//!
//! [`MemoryRemote`] keeps objects in memory and records every request, so
//! tests can assert exactly how often a blob was downloaded and can inject
//! failures or delays per path.
//!
//! # Example
//!
//! ```rust,ignore
//! use common::testkit::MemoryRemote;
//!
//! let remote = Arc::new(MemoryRemote::new());
//! let hash = remote.put_blob(HashAlgorithm::Md5, b"hello");
//! remote.fail_next(&data_path(&hash), 2);
//!
//! let fetcher = Fetcher::new(remote.clone(), FetchConfig::new(cache_dir));
//! // ... two failures, then the blob
//! assert_eq!(remote.blob_get_count(&hash), 3);
//! ```

mod memory;

pub use memory::MemoryRemote;
