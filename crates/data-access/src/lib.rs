//! Data access for the dispersion visor.
//!
//! [`DataCache`] turns a `(domain, instance, variable)` triple into a
//! [`VisorData`]: the decoded payload, the coordinate field of its
//! domain/instance, and, for species variables, the expanded source
//! layer with default scenario vectors.
//!
//! # Architecture
//!
//! ```text
//! DataCache::load(d, i, v)
//!      │
//!      ├─► CacheStore hit ──────────────► cached entry (possibly None)
//!      │
//!      ├─► in-flight load for key ──────► await the shared fetch
//!      │
//!      └─► miss: LoadingStarted
//!               ├─► /api/data (v) ─► decode
//!               ├─► coordinate cache or /api/data (coordx, coordy)
//!               ├─► species? /api/sources ─► expand
//!               ├─► store Some(data) or None
//!               └─► LoadingEnded
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod loader;
pub mod service;

pub use cache::{store_for, CacheStore, LruStore, UnboundedStore};
pub use client::HttpApiClient;
pub use config::DataAccessConfig;
pub use error::LoadError;
pub use loader::VisorData;
pub use service::{CacheEntry, CacheEvent, CacheStats, DataCache};
