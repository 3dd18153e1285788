//! Flat-file persistence for ChainScope
//!
//! - [`SnapshotStore`] - append-only snapshot log (one JSON object per line)
//!   and the derived one-minute candle file, rewritten whole on every rebuild

pub mod error;
pub mod snapshots;

pub use error::StorageError;
pub use snapshots::SnapshotStore;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;
