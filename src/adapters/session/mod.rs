//! Outbound HTTP sessions
//!
//! A [`Session`] is a reqwest client pre-configured with the configured
//! default headers, the TLS verification flag and the credentials to attach
//! to every call. One session is made per batch and shared by all of the
//! batch's calls; it is released when dropped, on every exit path. The
//! client itself is built once per provider, so its connection pool is
//! reused across batches.
//!
//! Sessions come from a [`SessionProvider`]:
//!
//! - [`StaticSessionProvider`] - fixed basic credentials, or none
//! - [`OAuth2SessionProvider`] - bearer token from the client-credentials
//!   flow, cached and reused until it expires
//!
//! Use [`build_session_provider`] to pick the strategy from configuration.

pub mod basic;
pub mod oauth2;

pub use basic::StaticSessionProvider;
pub use oauth2::{CachedToken, ClientCredentialsFetcher, OAuth2SessionProvider, TokenFetcher};

use crate::config::{RelayConfig, SecretString};
use crate::domain::{RelayError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder};
use secrecy::ExposeSecret;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Produces ready-to-use sessions
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Make a session for one batch
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built or credentials cannot
    /// be obtained. No entity of the batch is processed in that case.
    async fn make_session(&self) -> Result<Session>;
}

/// Credentials attached to each request of a session
#[derive(Debug, Clone)]
pub enum SessionAuth {
    /// No Authorization header
    None,
    /// HTTP basic credentials
    Basic(String, SecretString),
    /// `Authorization: Bearer <token>`
    Bearer(SecretString),
}

/// Client settings shared by both strategies
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Headers sent with every request
    pub headers: BTreeMap<String, String>,
    /// TLS certificate verification
    pub tls_verify: bool,
    /// Request timeout (None = transport default)
    pub timeout: Option<Duration>,
}

impl ClientSettings {
    /// Extracts client settings from the relay configuration
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            headers: config.endpoint.headers.clone(),
            tls_verify: config.endpoint.tls_verify,
            timeout: config.endpoint.timeout_seconds.map(Duration::from_secs),
        }
    }

    /// Builds a reqwest client with these settings
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Configuration` for invalid header names or values
    /// and `RelayError::Connection` if the client cannot be built
    pub fn build_client(&self) -> Result<Client> {
        let mut builder = ClientBuilder::new().default_headers(header_map(&self.headers)?);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if !self.tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| RelayError::Connection(format!("Failed to build HTTP client: {e}")))
    }
}

/// Converts configured headers into a reqwest header map
///
/// # Errors
///
/// Returns `RelayError::Configuration` for invalid header names or values
pub fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| RelayError::Configuration(format!("Invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            RelayError::Configuration(format!("Invalid value for header '{name}': {e}"))
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

/// A configured HTTP client scoped to one batch
pub struct Session {
    client: Client,
    auth: SessionAuth,
}

impl Session {
    pub fn new(client: Client, auth: SessionAuth) -> Self {
        tracing::trace!("Session acquired");
        Self { client, auth }
    }

    /// Starts a request with the session's credentials applied
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.auth {
            SessionAuth::None => builder,
            SessionAuth::Basic(user, password) => {
                builder.basic_auth(user, Some(password.expose_secret().as_ref()))
            }
            SessionAuth::Bearer(token) => builder.bearer_auth(token.expose_secret().as_ref()),
        }
    }

    /// Credentials attached by this session
    pub fn auth(&self) -> &SessionAuth {
        &self.auth
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::trace!("Session released");
    }
}

/// Selects the session strategy for the configured authorization
///
/// # Errors
///
/// Returns an error if the configured headers are invalid or an HTTP client
/// cannot be built
pub fn build_session_provider(config: &RelayConfig) -> Result<Arc<dyn SessionProvider>> {
    let settings = ClientSettings::from_config(config);
    let client = settings.build_client()?;

    if !settings.tls_verify {
        tracing::warn!(
            "TLS certificate verification is DISABLED for outbound calls. \
            This should only be used in development/testing environments."
        );
    }

    match config.authorization {
        Some(ref authorization) if authorization.is_oauth2() => {
            let oauth2 = authorization.oauth2.clone().ok_or_else(|| {
                RelayError::Configuration(
                    "authorization.oauth2 is required when authorization.type is 'oauth2'"
                        .to_string(),
                )
            })?;
            tracing::info!(
                client_id = %oauth2.client_id,
                token_url = %oauth2.token_url,
                "Using OAuth2 client-credentials authorization"
            );
            let fetcher = ClientCredentialsFetcher::new(oauth2, &settings)?;
            Ok(Arc::new(OAuth2SessionProvider::new(
                client,
                Arc::new(fetcher),
            )))
        }
        Some(ref authorization) => {
            if authorization.basic.is_some() {
                tracing::info!("Using basic authorization");
            }
            Ok(Arc::new(StaticSessionProvider::new(
                client,
                authorization.basic.clone(),
            )))
        }
        None => Ok(Arc::new(StaticSessionProvider::new(client, None))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthorizationConfig;

    #[test]
    fn test_header_map_valid() {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let map = header_map(&headers).unwrap();
        assert_eq!(map.get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn test_header_map_invalid_name() {
        let mut headers = BTreeMap::new();
        headers.insert("bad header".to_string(), "x".to_string());
        assert!(matches!(
            header_map(&headers),
            Err(RelayError::Configuration(_))
        ));
    }

    #[test]
    fn test_provider_rejects_invalid_headers_up_front() {
        let mut config = RelayConfig::with_url("http://svc");
        config
            .endpoint
            .headers
            .insert("bad header".to_string(), "x".to_string());
        assert!(matches!(
            build_session_provider(&config),
            Err(RelayError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_sessions_reuse_provider_connections() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/item")
            .with_status(200)
            .expect(2)
            .create_async()
            .await;

        let provider = build_session_provider(&RelayConfig::with_url("http://svc")).unwrap();
        for _ in 0..2 {
            let session = provider.make_session().await.unwrap();
            let response = session
                .request(Method::GET, &format!("{}/item", server.url()))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status().as_u16(), 200);
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_provider_without_authorization_has_no_auth() {
        let config = RelayConfig::with_url("http://svc");
        let provider = build_session_provider(&config).unwrap();
        let session = provider.make_session().await.unwrap();
        assert!(matches!(session.auth(), SessionAuth::None));
    }

    #[tokio::test]
    async fn test_provider_with_basic_authorization() {
        let mut config = RelayConfig::with_url("http://svc");
        config.authorization = Some(
            serde_json::from_str::<AuthorizationConfig>(r#"{"basic": ["user", "pass"]}"#)
                .unwrap(),
        );
        let provider = build_session_provider(&config).unwrap();
        let session = provider.make_session().await.unwrap();
        assert!(matches!(session.auth(), SessionAuth::Basic(user, _) if user == "user"));
    }
}
