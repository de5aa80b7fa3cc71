//! Document store abstraction and implementations
//!
//! - [`FirestoreStore`](crate::adapters::firestore::FirestoreStore) - Firestore REST API
//! - [`LocalStore`] - JSON file on local disk
//! - [`MemoryStore`] - in-process, for tests and scratch runs
//!
//! Use [`create_store`] to build the backend selected in configuration.

pub mod factory;
pub mod local;
pub mod memory;
pub mod traits;

pub use factory::create_store;
pub use local::LocalStore;
pub use memory::{Collections, MemoryStore};
pub use traits::DocumentStore;
