//! Firestore REST adapter
//!
//! [`FirestoreStore`] talks to Firestore (or its emulator) over the REST v1
//! API. Documents travel in the typed-value encoding handled by [`codec`].

pub mod auth;
pub mod client;
pub mod codec;
pub mod models;

pub use auth::TokenProvider;
pub use client::FirestoreStore;
