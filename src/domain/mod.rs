//! Domain models and types for Bastion.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed coordinates** ([`CollectionName`], [`DocumentId`], [`DocumentPath`])
//! - **Document content** ([`Fields`], [`FieldValue`])
//! - **Error types** ([`BastionError`], [`StoreError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Coordinates are validated on construction, so a malformed path is rejected
//! before any store call:
//!
//! ```rust
//! use bastion::domain::DocumentPath;
//!
//! assert!(DocumentPath::parse("users/u1").is_ok());
//! assert!(DocumentPath::parse("users").is_err());
//! ```

pub mod document;
pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use document::{fields_from_json, FieldValue, Fields};
pub use errors::{BastionError, DocumentFailure, StoreError};
pub use ids::{CollectionName, DocumentId, DocumentPath};
pub use result::Result;
