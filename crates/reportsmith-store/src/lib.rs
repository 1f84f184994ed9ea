//! Durable key-value storage with debounced write-behind fields
//!
//! Two layers:
//! - [`DurableStore`] — a keyed JSON-value store ([`JsonFileStore`] on disk,
//!   [`MemoryStore`] for tests and ephemeral sessions)
//! - [`PersistentField`] — a named slot whose in-memory value is
//!   authoritative and whose durable copy lags behind a quiescence window
//!
//! The in-memory value is visible to readers the moment a setter returns;
//! durable writes are an asynchronous side effect and never gate visibility.

pub mod durable;
pub mod error;
pub mod field;

pub use durable::{DurableStore, JsonFileStore, MemoryStore};
pub use error::StoreError;
pub use field::{FieldConfig, PersistentField};
