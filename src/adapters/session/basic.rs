//! Static session strategy
//!
//! Sessions carry fixed basic credentials (or none). Every session shares
//! the provider's HTTP client and with it the connection pool.

use super::{Session, SessionAuth, SessionProvider};
use crate::config::SecretString;
use crate::domain::Result;
use async_trait::async_trait;
use reqwest::Client;

/// Session provider with fixed credentials
pub struct StaticSessionProvider {
    client: Client,
    basic: Option<(String, SecretString)>,
}

impl StaticSessionProvider {
    pub fn new(client: Client, basic: Option<(String, SecretString)>) -> Self {
        Self { client, basic }
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn make_session(&self) -> Result<Session> {
        let auth = match self.basic {
            Some((ref user, ref password)) => SessionAuth::Basic(user.clone(), password.clone()),
            None => SessionAuth::None,
        };
        Ok(Session::new(self.client.clone(), auth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::session::ClientSettings;
    use crate::config::secret_string;
    use reqwest::Method;
    use std::collections::BTreeMap;

    fn client(headers: &[(&str, &str)]) -> Client {
        ClientSettings {
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            tls_verify: true,
            timeout: None,
        }
        .build_client()
        .unwrap()
    }

    #[tokio::test]
    async fn test_basic_credentials_and_headers_are_sent() {
        let mut server = mockito::Server::new_async().await;
        // "user:pass" base64-encoded
        let mock = server
            .mock("GET", "/item")
            .match_header("authorization", "Basic dXNlcjpwYXNz")
            .match_header("x-api-version", "2")
            .with_status(200)
            .create_async()
            .await;

        let provider = StaticSessionProvider::new(
            client(&[("X-Api-Version", "2")]),
            Some(("user".to_string(), secret_string("pass".to_string()))),
        );
        let session = provider.make_session().await.unwrap();
        let response = session
            .request(Method::GET, &format!("{}/item", server.url()))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_credentials_sends_no_authorization() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/item")
            .match_header("authorization", mockito::Matcher::Missing)
            .with_status(204)
            .create_async()
            .await;

        let provider = StaticSessionProvider::new(client(&[]), None);
        let session = provider.make_session().await.unwrap();
        session
            .request(Method::GET, &format!("{}/item", server.url()))
            .send()
            .await
            .unwrap();

        mock.assert_async().await;
    }
}
