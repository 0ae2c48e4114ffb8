//! # Backend HTTP Client
//!
//! Thin reqwest wrapper shared by every endpoint module.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  endpoint(&["orders", "42"])                                            │
//! │     │   base url + api prefix + percent-encoded segments                │
//! │     ▼                                                                   │
//! │  http://localhost:8089/api/v1/orders/42                                 │
//! │     │                                                                   │
//! │     ▼   Authorization: Bearer <credential>   (when signed in)           │
//! │  send ──► 2xx ──► JSON body ──► T                                       │
//! │     │                                                                   │
//! │     ├──► 4xx/5xx ──► Rejected { status, message from body }             │
//! │     │                                                                   │
//! │     └──► no answer ──► Network                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The credential is forwarded verbatim. Acquiring and refreshing it is not
//! this crate's concern.

use std::fmt;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::BackendSettings;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Credential
// =============================================================================

/// An opaque bearer credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a token. Blank tokens are treated as "not signed in".
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Credential(token))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

// =============================================================================
// Backend Client
// =============================================================================

/// HTTP client for the PharmaCart backend.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base: Url,
    credential: Option<Credential>,
}

/// Error body shape returned by the backend.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl BackendClient {
    /// Creates a client for the configured backend.
    pub fn new(settings: &BackendSettings) -> ClientResult<Self> {
        let base = Url::parse(&format!(
            "{}{}",
            settings.url.trim_end_matches('/'),
            settings.api_prefix.trim_end_matches('/')
        ))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base.to_string()));
        }

        let http = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(BackendClient {
            http,
            base,
            credential: None,
        })
    }

    /// Returns a copy of this client that sends `credential`.
    pub fn with_credential(&self, credential: Option<Credential>) -> Self {
        BackendClient {
            http: self.http.clone(),
            base: self.base.clone(),
            credential,
        }
    }

    pub fn set_credential(&mut self, credential: Option<Credential>) {
        self.credential = credential;
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Full URL for an endpoint given as path segments, e.g.
    /// `["orders", "42"]`. Each segment is percent-encoded, so ids can never
    /// add path components of their own.
    pub fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Starts a request with the bearer header attached.
    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> ClientResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "Backend request");
        let builder = self.http.request(method, url);
        Ok(match &self.credential {
            Some(credential) => builder.bearer_auth(credential.expose()),
            None => builder,
        })
    }

    /// Sends and decodes a JSON response.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = Self::check(builder.send().await?).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Sends and discards the response body.
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> ClientResult<()> {
        Self::check(builder.send().await?).await?;
        Ok(())
    }

    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = backend_message(&text);
        debug!(status = status.as_u16(), ?message, "Backend rejected request");

        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Extracts the human-readable message from an error body.
///
/// JSON bodies use `message` (or `error`); a short plain-text body is used
/// as is.
fn backend_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message.or(parsed.error).filter(|m| !m.trim().is_empty()),
        Err(_) if !body.starts_with('{') && !body.starts_with('<') && body.len() <= 200 => {
            Some(body.to_string())
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_prefix() {
        let client = BackendClient::new(&BackendSettings {
            url: "http://localhost:8089/".to_string(),
            api_prefix: "/api/v1".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(
            client.endpoint(&["orders", "42"]).unwrap().as_str(),
            "http://localhost:8089/api/v1/orders/42"
        );
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let client = BackendClient::new(&BackendSettings::default()).unwrap();
        assert_eq!(
            client.endpoint(&["orders", "../admin/orders?x=1"]).unwrap().as_str(),
            "http://localhost:8089/api/v1/orders/..%2Fadmin%2Forders%3Fx=1"
        );
        assert_eq!(
            client.endpoint(&["reminders", "a b"]).unwrap().path(),
            "/api/v1/reminders/a%20b"
        );
    }

    #[test]
    fn test_endpoint_without_prefix() {
        let client = BackendClient::new(&BackendSettings {
            url: "http://localhost:8089".to_string(),
            api_prefix: String::new(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(client.endpoint(&["orders"]).unwrap().path(), "/orders");
    }

    #[test]
    fn test_credential_rejects_blank_and_hides_value() {
        assert!(Credential::new("  ").is_none());
        let credential = Credential::new("secret-token").unwrap();
        assert_eq!(credential.expose(), "secret-token");
        assert!(!format!("{:?}", credential).contains("secret"));
    }

    #[test]
    fn test_backend_message() {
        assert_eq!(
            backend_message(r#"{"message":"Out of stock"}"#).as_deref(),
            Some("Out of stock")
        );
        assert_eq!(
            backend_message(r#"{"error":"Forbidden"}"#).as_deref(),
            Some("Forbidden")
        );
        assert_eq!(backend_message(r#"{"message":""}"#), None);
        assert_eq!(backend_message("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(backend_message("<html>oops</html>"), None);
        assert_eq!(backend_message(""), None);
    }
}
