//! Persistence boundary.
//!
//! The engine reads and writes league state only through the [`Store`]
//! trait. [`MemoryStore`] is a complete in-process implementation with
//! snapshot rollback, used by tests and by callers that persist elsewhere.

mod memory;
mod types;

pub use memory::MemoryStore;
pub use types::{Store, StoreError, StoreResult};
