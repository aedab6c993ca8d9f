//! Core traits defined in `linkshare-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
