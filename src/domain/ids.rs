//! Domain identifier types with validation
//!
//! Newtype wrappers for store coordinates. A document is addressed by a
//! collection name and a document identifier; [`DocumentPath`] pairs the two.

use super::errors::BastionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn validate_segment(kind: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{kind} cannot be empty"));
    }
    if value.contains('/') {
        return Err(format!("{kind} cannot contain '/': {value}"));
    }
    if value == "." || value == ".." {
        return Err(format!("{kind} cannot be '.' or '..'"));
    }
    Ok(())
}

/// Collection name newtype wrapper
///
/// # Examples
///
/// ```
/// use bastion::domain::ids::CollectionName;
/// use std::str::FromStr;
///
/// let name = CollectionName::from_str("users").unwrap();
/// assert_eq!(name.as_str(), "users");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CollectionName(String);

impl CollectionName {
    /// Creates a new CollectionName, rejecting empty names and names with `/`
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        validate_segment("Collection name", &name)?;
        Ok(Self(name))
    }

    /// Returns the collection name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CollectionName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Document identifier newtype wrapper
///
/// # Examples
///
/// ```
/// use bastion::domain::ids::DocumentId;
/// use std::str::FromStr;
///
/// let id = DocumentId::from_str("TQAmmVfIpOeNiRflXKSeL1NX2ak2").unwrap();
/// assert_eq!(id.as_str(), "TQAmmVfIpOeNiRflXKSeL1NX2ak2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a new DocumentId, rejecting empty ids and ids with `/`
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        validate_segment("Document ID", &id)?;
        Ok(Self(id))
    }

    /// Returns the document ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Full coordinate of a document: `collection/id`
///
/// Only top-level collections are addressed; nested sub-collection paths
/// are rejected.
///
/// # Examples
///
/// ```
/// use bastion::domain::ids::DocumentPath;
///
/// let path = DocumentPath::parse("utils/schema_arma").unwrap();
/// assert_eq!(path.collection().as_str(), "utils");
/// assert_eq!(path.id().as_str(), "schema_arma");
/// assert_eq!(path.to_string(), "utils/schema_arma");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentPath {
    collection: CollectionName,
    id: DocumentId,
}

impl DocumentPath {
    /// Creates a path from its two components
    pub fn new(collection: CollectionName, id: DocumentId) -> Self {
        Self { collection, id }
    }

    /// Parses a `collection/id` string
    ///
    /// # Errors
    ///
    /// Returns [`BastionError::InvalidPath`] unless the input has exactly two
    /// valid segments.
    pub fn parse(path: &str) -> Result<Self, BastionError> {
        let trimmed = path.trim().trim_matches('/');
        let mut segments = trimmed.split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(collection), Some(id), None) => {
                let collection = CollectionName::new(collection)
                    .map_err(|e| BastionError::InvalidPath(format!("{path}: {e}")))?;
                let id = DocumentId::new(id)
                    .map_err(|e| BastionError::InvalidPath(format!("{path}: {e}")))?;
                Ok(Self { collection, id })
            }
            _ => Err(BastionError::InvalidPath(format!(
                "expected 'collection/id', got '{path}'"
            ))),
        }
    }

    /// Returns the collection component
    pub fn collection(&self) -> &CollectionName {
        &self.collection
    }

    /// Returns the document identifier component
    pub fn id(&self) -> &DocumentId {
        &self.id
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

impl FromStr for DocumentPath {
    type Err = BastionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
