//! Tree store adapters.
//!
//! [`SqliteTreeStore`] is the durable backend the binaries share.
//! [`MemoryTreeStore`] holds the tree in process for tests.

mod memory;
mod sqlite;
mod tree;

pub use memory::MemoryTreeStore;
pub use sqlite::SqliteTreeStore;
