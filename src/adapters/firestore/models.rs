//! Firestore REST wire models

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Service-account key file contents (the fields Bastion uses)
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Account e-mail, used as the assertion issuer
    pub client_email: String,

    /// PEM-encoded RSA private key
    pub private_key: SecretString,

    /// Key id, copied into the assertion header
    #[serde(default)]
    pub private_key_id: Option<String>,

    /// Project the key belongs to
    #[serde(default)]
    pub project_id: Option<String>,
}

/// OAuth2 token endpoint response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

/// A Firestore document resource
#[derive(Debug, Serialize, Deserialize)]
pub struct FirestoreDocument {
    /// Full resource name; absent on write requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Typed field map; absent for empty documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Value>,

    #[serde(
        default,
        rename = "createTime",
        skip_serializing_if = "Option::is_none"
    )]
    pub create_time: Option<String>,

    #[serde(
        default,
        rename = "updateTime",
        skip_serializing_if = "Option::is_none"
    )]
    pub update_time: Option<String>,
}

impl FirestoreDocument {
    /// Document id: the last segment of the resource name
    pub fn document_id(&self) -> Option<&str> {
        self.name
            .as_deref()
            .and_then(|name| name.rsplit('/').next())
            .filter(|id| !id.is_empty())
    }
}

/// Response of `GET .../documents/{collection}`
#[derive(Debug, Default, Deserialize)]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<FirestoreDocument>,

    #[serde(default, rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// Body of `POST .../documents:listCollectionIds`
#[derive(Debug, Serialize)]
pub struct ListCollectionIdsRequest {
    #[serde(rename = "pageSize")]
    pub page_size: usize,

    #[serde(rename = "pageToken", skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

/// Response of `POST .../documents:listCollectionIds`
#[derive(Debug, Default, Deserialize)]
pub struct ListCollectionIdsResponse {
    #[serde(default, rename = "collectionIds")]
    pub collection_ids: Vec<String>,

    #[serde(default, rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}
