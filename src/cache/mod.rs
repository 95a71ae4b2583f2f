//! Cache module for storing weather responses to disk
//!
//! `CacheManager` persists JSON entries stamped with their key and write time;
//! `LocationCache` layers the per-location TTL policy on top. Unreadable
//! entries are always treated as cache misses.

mod location;
mod manager;

pub use location::{LocationCache, DEFAULT_TTL};
pub use manager::{CacheManager, CachedData};
