//! Time-series storage on an ordered key-value store.
//!
//! A [`TimeSeries`] is a named set of float columns indexed by timestamp.
//! Each one is stored as its own namespace in an embedded transactional
//! store, one entry per observation, and read back with range scans.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Engine                                                             │
//! │    - persist: catalog entry, then one batch of encoded rows         │
//! │    - range_query: seek to start, walk forward until past end        │
//! └─────────────────────────────────────────────────────────────────────┘
//!            │                                        │
//!            ▼                                        ▼
//! ┌──────────────────────────────┐   ┌──────────────────────────────────┐
//! │  Catalog ("collections")     │   │  Namespace per collection        │
//! │    - Key: collection name    │   │    - Key: timestamp → 12 bytes   │
//! │    - Value: bincode meta     │   │    - Value: f64 LE × columns     │
//! └──────────────────────────────┘   └──────────────────────────────────┘
//!            │                                        │
//!            └──────────────────┬─────────────────────┘
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  OrderedStore                                                       │
//! │    - LmdbStore: heed, one named database per namespace              │
//! │    - MemoryStore: copy-on-write snapshots                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use tbase::{Engine, TimeSeries, store::LmdbStore};
//!
//! let engine = Engine::new(LmdbStore::open("data/tbase")?);
//!
//! let mut series = TimeSeries::new("EBAY", ["Open", "High", "Low", "Close"]);
//! series.add_observation(date, vec![31.2, 31.9, 30.8, 31.5])?;
//! engine.persist(&series)?;
//!
//! let closes = engine.range_query("EBAY", Some(from), Some(to), &["Close"])?;
//! ```

pub mod catalog;
pub mod codec;
pub mod config;
mod engine;
mod error;
mod series;
pub mod store;

pub use catalog::CollectionMeta;
pub use config::StoreConfig;
pub use engine::Engine;
pub use error::{Error, ErrorKind, PersistPhase, Result};
pub use series::TimeSeries;
