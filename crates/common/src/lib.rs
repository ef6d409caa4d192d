/**
 * Hash classification and digests.
 *  Decides whether a location names an immutable
 *  blob or a mutable tag.
 */
pub mod hash;
/**
 * Reversible per-entry content transforms
 *  (plain passthrough or process key decryption).
 */
pub mod crypto;
/**
 * Bucket manifests and the tag files
 *  published alongside them.
 */
pub mod bucket;
/**
 * Binary pack container bundling many small
 *  files into one addressable blob.
 */
pub mod pack;
/**
 * Local cache, remote store transports and the
 *  fetch engine that ties them together.
 */
pub mod store;
/**
 * Bulk operations over a bucket: existence checks,
 *  cache population and directory sync.
 */
pub mod distribute;
/**
 * External filter command support for narrowing
 *  buckets and pack files to a subset of paths.
 */
pub mod filter;
/**
 * Atomic file writes shared by the cache and sync.
 */
pub mod fs;
/**
 * In-process test doubles for the remote store.
 */
pub mod testkit;

pub mod prelude {
    pub use crate::bucket::{Bucket, Content, ManifestError, TagFile};
    pub use crate::crypto::{ContentAttribute, EncryptionKey, TransformError};
    pub use crate::distribute::{DistributeError, Distributor};
    pub use crate::hash::HashAlgorithm;
    pub use crate::pack::{PackBuilder, PackEntry, PackError, PackFile};
    pub use crate::store::{
        FetchConfig, FetchError, Fetcher, LoadError, LocalCache, Remote, ResolveError,
    };
}
