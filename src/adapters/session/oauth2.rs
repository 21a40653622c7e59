//! OAuth2 client-credentials session strategy
//!
//! The provider keeps a single cached access token for the whole process.
//! Each session request reuses the cached token while `expires_at > now`;
//! otherwise a new token is fetched and the cached one is replaced as a whole
//! under the lock, so no caller ever observes a partially written token.
//!
//! Token-fetch failure fails the session request and with it the whole batch.

use super::{ClientSettings, Session, SessionAuth, SessionProvider};
use crate::config::{secret_string, OAuth2Config, SecretString};
use crate::domain::{RelayError, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use tokio::sync::Mutex;

/// An access token and the moment it stops being valid
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub access_token: SecretString,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: secret_string(access_token.into()),
            expires_at,
        }
    }

    /// Whether the token may still be used at `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Obtains access tokens from an authorization server
#[async_trait]
pub trait TokenFetcher: Send + Sync {
    /// Fetch a fresh token
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Authentication` if no token can be obtained
    async fn fetch_token(&self) -> Result<CachedToken>;
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default, deserialize_with = "lifetime_seconds")]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<f64>,
}

/// Reads `expires_in` given either as a number or as a numeric string
fn lifetime_seconds<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lifetime {
        Whole(i64),
        Fractional(f64),
        Text(String),
    }

    Ok(match Option::<Lifetime>::deserialize(deserializer)? {
        None => None,
        Some(Lifetime::Whole(seconds)) => Some(seconds),
        Some(Lifetime::Fractional(seconds)) => Some(seconds as i64),
        Some(Lifetime::Text(text)) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().map(|seconds| seconds as i64))
        }
    })
}

/// Fetches tokens with the client-credentials grant
pub struct ClientCredentialsFetcher {
    client: Client,
    config: OAuth2Config,
}

impl ClientCredentialsFetcher {
    /// Creates a fetcher that talks to `config.token_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: OAuth2Config, settings: &ClientSettings) -> Result<Self> {
        let token_settings = ClientSettings {
            headers: Default::default(),
            tls_verify: settings.tls_verify,
            timeout: settings.timeout,
        };
        Ok(Self {
            client: token_settings.build_client()?,
            config,
        })
    }

    fn form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("grant_type".to_string(), "client_credentials".to_string()),
            ("client_id".to_string(), self.config.client_id.clone()),
            (
                "client_secret".to_string(),
                self.config.client_secret.expose_secret().as_ref().to_string(),
            ),
        ];
        if let Some(ref scope) = self.config.scope {
            form.push(("scope".to_string(), scope.clone()));
        }
        for (key, value) in &self.config.extra {
            form.push((key.clone(), value.clone()));
        }
        form
    }
}

#[async_trait]
impl TokenFetcher for ClientCredentialsFetcher {
    async fn fetch_token(&self) -> Result<CachedToken> {
        tracing::debug!(
            token_url = %self.config.token_url,
            client_id = %self.config.client_id,
            "Requesting access token with client-credentials grant"
        );

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&self.form())
            .send()
            .await
            .map_err(|e| RelayError::Authentication(format!("Failed to request token: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RelayError::Authentication(format!(
                "Token request failed with status {status}: {error_text}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Authentication(format!("Failed to parse token response: {e}")))?;

        Ok(CachedToken::new(token.access_token, expiry(token.expires_in, token.expires_at)))
    }
}

/// Absolute expiry from the token response
///
/// A response without either field, or with a non-positive lifetime, expires
/// immediately so the next session request fetches again. Lifetimes beyond
/// what a timestamp can hold are clamped to the latest representable instant.
fn expiry(expires_in: Option<i64>, expires_at: Option<f64>) -> DateTime<Utc> {
    let now = Utc::now();
    if let Some(seconds) = expires_in {
        if seconds <= 0 {
            return now;
        }
        return TimeDelta::try_seconds(seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
    }
    if let Some(timestamp) = expires_at {
        if let Some(at) = DateTime::from_timestamp(timestamp as i64, 0) {
            return at;
        }
    }
    now
}

/// Session provider for the OAuth2 client-credentials flow
pub struct OAuth2SessionProvider {
    client: Client,
    fetcher: Arc<dyn TokenFetcher>,
    token: Mutex<Option<CachedToken>>,
}

impl OAuth2SessionProvider {
    pub fn new(client: Client, fetcher: Arc<dyn TokenFetcher>) -> Self {
        Self {
            client,
            fetcher,
            token: Mutex::new(None),
        }
    }

    /// Returns the cached token, fetching a new one if none is cached or it expired
    async fn current_token(&self) -> Result<CachedToken> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();

        if let Some(ref token) = *cached {
            if token.is_valid_at(now) {
                tracing::debug!(
                    expires_at = %token.expires_at,
                    seconds_remaining = (token.expires_at - now).num_seconds(),
                    "Reusing cached access token"
                );
                return Ok(token.clone());
            }
        }

        tracing::debug!("Updating access token");
        let fresh = self.fetcher.fetch_token().await?;
        tracing::debug!(
            expires_at = %fresh.expires_at,
            seconds_remaining = (fresh.expires_at - now).num_seconds(),
            "Access token updated"
        );
        *cached = Some(fresh.clone());
        Ok(fresh)
    }
}

#[async_trait]
impl SessionProvider for OAuth2SessionProvider {
    async fn make_session(&self) -> Result<Session> {
        let token = self.current_token().await?;
        Ok(Session::new(
            self.client.clone(),
            SessionAuth::Bearer(token.access_token),
        ))
    }
}
