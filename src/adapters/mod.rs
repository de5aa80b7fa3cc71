//! External system integrations for Bastion.
//!
//! - [`store`] - document store abstraction ([`DocumentStore`]) with local
//!   and in-memory backends, plus the backend factory
//! - [`firestore`] - Firestore REST implementation of the store
//! - [`sink`] - write-once artifact sinks for snapshot exports
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind async traits so the engine
//! can run against an in-memory store in tests:
//!
//! ```rust
//! use bastion::adapters::store::{DocumentStore, MemoryStore};
//! use bastion::domain::{fields_from_json, DocumentPath};
//! use serde_json::json;
//!
//! # async fn example() -> bastion::domain::Result<()> {
//! let store = MemoryStore::new();
//! let path = DocumentPath::parse("users/u1")?;
//! store.set(&path, &fields_from_json(json!({"name": "Aria"}))).await?;
//! assert!(store.get(&path).await?.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! [`DocumentStore`]: store::DocumentStore

pub mod firestore;
pub mod sink;
pub mod store;

