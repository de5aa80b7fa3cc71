//! Firestore REST client
//!
//! Implements [`DocumentStore`] on top of the Firestore REST v1 API:
//!
//! - `get`: `GET {documents}/{collection}/{id}` (404 means absent)
//! - `set`: `PATCH {documents}/{collection}/{id}` without an update mask,
//!   which replaces the whole document
//! - `list_document_ids`: paginated `GET {documents}/{collection}` masked to
//!   `__name__`
//! - `list_collection_names`: paginated `POST {documents}:listCollectionIds`

use super::auth::TokenProvider;
use super::codec::{decode_fields, encode_fields};
use super::models::{
    FirestoreDocument, ListCollectionIdsRequest, ListCollectionIdsResponse, ListDocumentsResponse,
};
use crate::adapters::store::DocumentStore;
use crate::config::StoreConfig;
use crate::domain::{
    BastionError, CollectionName, DocumentId, DocumentPath, Fields, Result, StoreError,
};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use url::Url;

/// Firestore document store
pub struct FirestoreStore {
    client: Client,
    documents_url: Url,
    page_size: usize,
    auth: Option<TokenProvider>,
    description: String,
}

impl FirestoreStore {
    /// Create a new Firestore client
    ///
    /// No network call happens here; credentials are exchanged lazily on the
    /// first request.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid, the HTTP client cannot be
    /// built or the service-account key cannot be loaded.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)))
            .build()
            .map_err(|e| {
                BastionError::Store(StoreError::ConnectionFailed(format!(
                    "Failed to build HTTP client: {e}"
                )))
            })?;

        let mut documents_url = Url::parse(&config.base_url).map_err(|e| {
            BastionError::Configuration(format!("Invalid store.base_url: {e}"))
        })?;
        documents_url
            .path_segments_mut()
            .map_err(|_| {
                BastionError::Configuration("store.base_url cannot be a base URL".to_string())
            })?
            .pop_if_empty()
            .extend([
                "projects",
                config.project_id.as_str(),
                "databases",
                config.database_id.as_str(),
                "documents",
            ]);

        let auth = config
            .credential
            .as_ref()
            .map(|credential| {
                TokenProvider::from_credential(credential, config.token_url.clone(), client.clone())
            })
            .transpose()?;

        match &auth {
            Some(provider) => tracing::info!(
                project_id = %config.project_id,
                client_email = %provider.client_email(),
                "Firestore client configured with service account"
            ),
            None => tracing::warn!(
                project_id = %config.project_id,
                base_url = %config.base_url,
                "No credential configured, sending unauthenticated requests"
            ),
        }

        Ok(Self {
            client,
            documents_url,
            page_size: config.page_size,
            auth,
            description: format!(
                "firestore://{}/{}",
                config.project_id, config.database_id
            ),
        })
    }

    fn collection_url(&self, collection: &CollectionName) -> Url {
        let mut url = self.documents_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(collection.as_str());
        }
        url
    }

    fn document_url(&self, path: &DocumentPath) -> Url {
        let mut url = self.collection_url(path.collection());
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(path.id().as_str());
        }
        url
    }

    fn collection_ids_url(&self) -> Url {
        let mut url = self.documents_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop().push("documents:listCollectionIds");
        }
        url
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        match &self.auth {
            Some(provider) => Ok(request.bearer_auth(provider.access_token().await?)),
            None => Ok(request),
        }
    }
}

/// Map a non-success HTTP status to a store error
fn status_error(status: StatusCode, body: String) -> StoreError {
    match status.as_u16() {
        429 => StoreError::Throttled(body),
        code @ 500..=599 => StoreError::ServerError {
            status: code,
            message: body,
        },
        code => StoreError::ClientError {
            status: code,
            message: body,
        },
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BastionError::Store(status_error(status, body)))
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    response.json::<T>().await.map_err(|e| {
        BastionError::Store(StoreError::InvalidResponse(format!(
            "Failed to parse response body: {e}"
        )))
    })
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Fields>> {
        let url = self.document_url(path);
        tracing::debug!(document = %path, "Fetching document");

        let request = self.authorize(self.client.get(url)).await?;
        let response = request.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = ensure_success(response).await?;
        let document: FirestoreDocument = parse_json(response).await?;
        decode_fields(document.fields.as_ref()).map(Some)
    }

    async fn set(&self, path: &DocumentPath, fields: &Fields) -> Result<()> {
        let url = self.document_url(path);
        let body = FirestoreDocument {
            name: None,
            fields: Some(encode_fields(fields)),
            create_time: None,
            update_time: None,
        };

        tracing::debug!(document = %path, field_count = fields.len(), "Writing document");

        let request = self.authorize(self.client.patch(url).json(&body)).await?;
        let response = request.send().await?;
        ensure_success(response).await.map_err(|e| match e {
            BastionError::Store(err) => BastionError::Store(StoreError::WriteFailed {
                path: path.to_string(),
                message: err.to_string(),
            }),
            other => other,
        })?;
        Ok(())
    }

    async fn list_document_ids(&self, collection: &CollectionName) -> Result<Vec<DocumentId>> {
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.collection_url(collection);
            {
                let mut query = url.query_pairs_mut();
                query
                    .append_pair("pageSize", &self.page_size.to_string())
                    .append_pair("mask.fieldPaths", "__name__")
                    .append_pair("showMissing", "false");
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let request = self.authorize(self.client.get(url)).await?;
            let response = ensure_success(request.send().await?).await?;
            let page: ListDocumentsResponse = parse_json(response).await?;

            for document in &page.documents {
                let raw = document.document_id().ok_or_else(|| {
                    BastionError::Store(StoreError::InvalidResponse(
                        "document without a name in list response".to_string(),
                    ))
                })?;
                let id = DocumentId::new(raw)
                    .map_err(|e| BastionError::Store(StoreError::InvalidResponse(e)))?;
                ids.push(id);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(collection = %collection, count = ids.len(), "Listed documents");
        Ok(ids)
    }

    async fn list_collection_names(&self) -> Result<Vec<CollectionName>> {
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let body = ListCollectionIdsRequest {
                page_size: self.page_size,
                page_token: page_token.take(),
            };

            let request = self
                .authorize(self.client.post(self.collection_ids_url()).json(&body))
                .await?;
            let response = ensure_success(request.send().await?).await?;
            let page: ListCollectionIdsResponse = parse_json(response).await?;

            for raw in page.collection_ids {
                let name = CollectionName::new(raw)
                    .map_err(|e| BastionError::Store(StoreError::InvalidResponse(e)))?;
                names.push(name);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        names.sort();
        Ok(names)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}
