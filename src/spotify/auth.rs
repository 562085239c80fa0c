use reqwest::header::ACCEPT;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info, warn};

use crate::error::{ApiError, Result};
use crate::spotify::client::SpotifyClient;

/// App credentials issued by the Spotify developer dashboard.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// The OAuth2 exchange used to mint a token.
///
/// `ClientCredentials` yields app-only access with no user identity.
/// `AuthorizationCode` consumes a one-time code obtained through the user's
/// consent redirect; the provider rejects a code that was already exchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    ClientCredentials,
    AuthorizationCode { code: String, redirect_uri: String },
}

impl Grant {
    pub fn authorization_code(code: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Grant::AuthorizationCode {
            code: code.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    pub fn grant_type(&self) -> &'static str {
        match self {
            Grant::ClientCredentials => "client_credentials",
            Grant::AuthorizationCode { .. } => "authorization_code",
        }
    }

    /// Form body sent to the accounts service for this grant.
    pub(crate) fn form<'a>(&'a self, credentials: &'a Credentials) -> Vec<(&'static str, &'a str)> {
        let mut form = vec![("grant_type", self.grant_type())];

        if let Grant::AuthorizationCode { code, redirect_uri } = self {
            form.push(("code", code.as_str()));
            form.push(("redirect_uri", redirect_uri.as_str()));
        }

        form.push(("client_id", credentials.client_id()));
        form.push(("client_secret", credentials.client_secret()));
        form
    }
}

/// Bearer credential returned by the accounts service.
///
/// Expiry is provider-defined and not tracked here: `expires_in` is kept only
/// as reported. Refreshing is left to the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
    pub refresh_token: Option<String>,
}

impl AccessToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: None,
            expires_in: None,
            scope: None,
            refresh_token: None,
        }
    }

    pub fn secret(&self) -> &str {
        &self.access_token
    }

    /// Reads a token endpoint body. `None` when there is no non-empty `access_token`.
    pub(crate) fn from_json(json: &Value) -> Option<Self> {
        let access_token = json["access_token"].as_str().filter(|t| !t.is_empty())?;

        Some(Self {
            access_token: access_token.to_string(),
            token_type: json["token_type"].as_str().map(str::to_string),
            expires_in: json["expires_in"].as_u64(),
            scope: json["scope"].as_str().map(str::to_string),
            refresh_token: json["refresh_token"].as_str().map(str::to_string),
        })
    }
}

impl From<&str> for AccessToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

impl SpotifyClient {
    /// Exchanges `credentials` and `grant` for a bearer token with a single POST
    /// to the accounts service. Nothing is cached and nothing is retried.
    pub async fn acquire_token(
        &self,
        credentials: &Credentials,
        grant: &Grant,
    ) -> Result<AccessToken> {
        let url = self.accounts_endpoint("/api/token");
        debug!("POST {} (grant_type={})", url, grant.grant_type());

        let response = self
            .http_client()
            .post(&url)
            .header(ACCEPT, "application/json")
            .form(&grant.form(credentials))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let token = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|json| AccessToken::from_json(&json));

        match token {
            Some(token) => {
                info!("Acquired Spotify access token via {}", grant.grant_type());
                Ok(token)
            }
            None => {
                warn!("Token request ({}) returned no access token", status);
                Err(ApiError::MissingToken { status, body })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_credentials_form() {
        let creds = Credentials::new("id", "secret");
        let form = Grant::ClientCredentials.form(&creds);
        assert_eq!(
            form,
            vec![
                ("grant_type", "client_credentials"),
                ("client_id", "id"),
                ("client_secret", "secret"),
            ]
        );
    }

    #[test]
    fn test_authorization_code_form() {
        let creds = Credentials::new("id", "secret");
        let grant = Grant::authorization_code("abc", "http://127.0.0.1:8080/callback");
        assert_eq!(
            grant.form(&creds),
            vec![
                ("grant_type", "authorization_code"),
                ("code", "abc"),
                ("redirect_uri", "http://127.0.0.1:8080/callback"),
                ("client_id", "id"),
                ("client_secret", "secret"),
            ]
        );
    }

    #[test]
    fn test_token_from_json_reads_optional_fields() {
        let token = AccessToken::from_json(&json!({
            "access_token": "BQD",
            "token_type": "Bearer",
            "expires_in": 3600
        }))
        .unwrap();

        assert_eq!(token.secret(), "BQD");
        assert_eq!(token.token_type.as_deref(), Some("Bearer"));
        assert_eq!(token.expires_in, Some(3600));
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn test_token_from_json_rejects_missing_or_empty() {
        assert!(AccessToken::from_json(&json!({"error": "invalid_client"})).is_none());
        assert!(AccessToken::from_json(&json!({"access_token": ""})).is_none());
        assert!(AccessToken::from_json(&json!({"access_token": 42})).is_none());
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let creds = format!("{:?}", Credentials::new("id", "s3cr3t"));
        let token = format!("{:?}", AccessToken::new("BQDtoken"));
        assert!(!creds.contains("s3cr3t"));
        assert!(!token.contains("BQDtoken"));
    }
}
