pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Exists, Fetch, Ls, Pack, SyncBucket, Version};
