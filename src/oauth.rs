//! Token acquisition for the OAUTHBEARER exchange.
//!
//! One client-credentials grant (RFC 6749 section 4.4) per authentication
//! attempt: a single form-encoded POST to the configured token endpoint,
//! authenticated with the client id and secret as HTTP Basic credentials.
//! There is no caching and no refresh; a token lives exactly as long as the
//! attempt that fetched it.

use std::fmt;

use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::config::OauthBearerConfig;
use crate::error::{Error, Result};

const DEFAULT_TOKEN_PATH: &str = "/oauth2/token";
const GRANT_TYPE: &str = "client_credentials";

/// A bearer token as handed out by the authorization server.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// The raw token string, as it goes on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Token values must not leak through debug logging.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// A blocking client for the client-credentials grant.
///
/// The HTTP client is built once, at construction; [`fetch_token`] is the
/// only operation that touches the network.
///
/// [`fetch_token`]: TokenClient::fetch_token
pub struct TokenClient {
    http: HttpClient,
    client_id: String,
    client_secret: String,
    token_endpoint: String,
}

impl TokenClient {
    /// Build a token client from the OAUTHBEARER configuration.
    ///
    /// Fails with [`Error::Config`] when a required field is missing. No
    /// network traffic happens here.
    pub fn new(config: &OauthBearerConfig) -> Result<TokenClient> {
        let client_id = required(&config.client_id, "client_id")?;
        let client_secret = required(&config.client_secret, "client_secret")?;
        let server_url = required(&config.server_url, "server_url")?;
        let token_url = config.token_url.as_deref().unwrap_or(DEFAULT_TOKEN_PATH);
        Ok(TokenClient {
            // the token endpoint either answers 200 or the attempt is over,
            // so redirects are treated like any other non-200
            http: HttpClient::builder().redirect(Policy::none()).build()?,
            client_id,
            client_secret,
            token_endpoint: join_endpoint(&server_url, token_url),
        })
    }

    /// The resolved token endpoint URL.
    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    /// Exchange the client credentials for a bearer token.
    ///
    /// Any status other than 200, and any 200 reply without a non-empty
    /// `access_token`, fails with [`Error::AuthServer`].
    pub fn fetch_token(&self) -> Result<AccessToken> {
        debug!(endpoint = %self.token_endpoint, "requesting access token");
        let response = self
            .http
            .post(&self.token_endpoint)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", GRANT_TYPE)])
            .send()?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::AuthServer {
                status: status.as_u16(),
                message: reason_phrase(status),
            });
        }

        let body: serde_json::Value = response.json()?;
        let token = body
            .get("access_token")
            .and_then(|v| v.as_str())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::AuthServer {
                status: status.as_u16(),
                message: "reply carried no access_token".to_string(),
            })?;
        info!("received access token");
        Ok(AccessToken(token.to_string()))
    }
}

/// Join the server URL and the token path with exactly one `/` between
/// them. Nothing else is normalized.
fn join_endpoint(server_url: &str, token_url: &str) -> String {
    if token_url.starts_with('/') {
        format!("{}{}", server_url, token_url)
    } else {
        format!("{}/{}", server_url, token_url)
    }
}

fn reason_phrase(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("unknown status")
        .to_string()
}

fn required(field: &Option<String>, name: &str) -> Result<String> {
    match field.as_deref() {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(Error::Config(format!("OAUTHBEARER requires a {}", name))),
    }
}
