//! Service-account authentication
//!
//! Exchanges a signed RS256 assertion for an OAuth2 access token (the
//! JWT-bearer grant) and caches the token until shortly before it expires.

use super::models::{ServiceAccountKey, TokenResponse};
use crate::config::CredentialConfig;
use crate::domain::{BastionError, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use tokio::sync::Mutex;

/// OAuth2 scope granting Firestore access
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Access token provider for a single service account
pub struct TokenProvider {
    key: ServiceAccountKey,
    token_url: String,
    client: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// Build a provider from the configured credential source
    ///
    /// # Errors
    ///
    /// Returns [`BastionError::Authentication`] if the key file cannot be read
    /// or the key JSON is malformed.
    pub fn from_credential(
        credential: &CredentialConfig,
        token_url: impl Into<String>,
        client: Client,
    ) -> Result<Self> {
        let raw = match credential {
            CredentialConfig::File { path } => std::fs::read_to_string(path).map_err(|e| {
                BastionError::Authentication(format!(
                    "Failed to read service account key '{path}': {e}"
                ))
            })?,
            CredentialConfig::Embedded { json } => json.expose_secret().as_ref().to_string(),
        };

        let key: ServiceAccountKey = serde_json::from_str(&raw).map_err(|e| {
            BastionError::Authentication(format!("Invalid service account key: {e}"))
        })?;

        Ok(Self::new(key, token_url, client))
    }

    /// Build a provider from an already parsed key
    pub fn new(key: ServiceAccountKey, token_url: impl Into<String>, client: Client) -> Self {
        Self {
            key,
            token_url: token_url.into(),
            client,
            cached: Mutex::new(None),
        }
    }

    /// Service account e-mail, for logs
    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Return a valid access token, exchanging a new assertion when needed
    ///
    /// # Errors
    ///
    /// Returns [`BastionError::Authentication`] if signing or the token
    /// exchange fails.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at - ChronoDuration::seconds(REFRESH_MARGIN_SECS) > Utc::now() {
                return Ok(token.value.clone());
            }
        }

        let token = self.exchange().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: DATASTORE_SCOPE,
            aud: &self.token_url,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let pem = self.key.private_key.expose_secret();
        let signing_key = EncodingKey::from_rsa_pem(pem.as_ref().as_bytes())?;
        Ok(encode(&header, &claims, &signing_key)?)
    }

    async fn exchange(&self) -> Result<CachedToken> {
        let now = Utc::now();
        let assertion = self.sign_assertion(now)?;

        tracing::debug!(
            client_email = %self.key.client_email,
            token_url = %self.token_url,
            "Exchanging service account assertion for access token"
        );

        let response = self
            .client
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await
            .map_err(|e| BastionError::Authentication(format!("Token exchange failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BastionError::Authentication(format!(
                "Token exchange rejected with status {status}: {body}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            BastionError::Authentication(format!("Invalid token exchange response: {e}"))
        })?;

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + ChronoDuration::seconds(token.expires_in),
        })
    }
}
