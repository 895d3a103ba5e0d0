//! Persistent result cache keyed by query fingerprint.

pub mod error;
pub mod store;


pub use error::{CacheError, CacheResult};
pub use store::{CACHE_FORMAT_VERSION, CacheHandle, ResultCache};
