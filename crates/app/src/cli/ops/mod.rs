pub mod exists;
pub mod fetch;
pub mod ls;
pub mod pack;
pub mod source;
pub mod sync;
pub mod version;

pub use exists::Exists;
pub use fetch::Fetch;
pub use ls::Ls;
pub use pack::Pack;
pub use sync::SyncBucket;
pub use version::Version;
