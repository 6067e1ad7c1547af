//! Configuration surface for the SASL mechanisms.
//!
//! Every field is optional; a mechanism family only takes part in selection
//! once its required fields are present and non-empty. The structs derive
//! [`serde::Deserialize`] so a host application can embed them in its own
//! configuration files.

use serde::Deserialize;

fn present(field: &Option<String>) -> bool {
    field.as_deref().map_or(false, |s| !s.is_empty())
}

/// Aggregate SASL configuration, one optional section per mechanism family.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaslConfig {
    /// GSSAPI (Kerberos) settings.
    pub gssapi: GssapiConfig,
    /// PLAIN settings.
    pub plain: PlainConfig,
    /// SCRAM-SHA-256 / SCRAM-SHA-512 settings.
    pub scram: ScramConfig,
    /// OAUTHBEARER settings.
    pub oauthbearer: OauthBearerConfig,
}

/// GSSAPI credentials.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct GssapiConfig {
    /// Kerberos principal to authenticate as.
    pub principal: Option<String>,
    /// Path to the keytab holding the principal's keys.
    pub keytab: Option<String>,
}

impl GssapiConfig {
    /// A principal is all the exchange needs to be announced.
    pub fn configured(&self) -> bool {
        present(&self.principal)
    }
}

/// PLAIN credentials.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlainConfig {
    /// Authorization identity. May be empty, which asks the server to derive
    /// it from the authentication identity.
    pub authzid: Option<String>,
    /// Authentication identity.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
}

impl PlainConfig {
    /// Username and password gate PLAIN; the authzid never does.
    pub fn configured(&self) -> bool {
        present(&self.username) && present(&self.password)
    }
}

/// SCRAM credentials.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScramConfig {
    /// Authentication identity.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Hash family: `"sha256"` or `"sha512"`.
    pub mechanism: Option<String>,
}

impl ScramConfig {
    pub fn configured(&self) -> bool {
        present(&self.username) && present(&self.password) && present(&self.mechanism)
    }
}

/// OAUTHBEARER client-credentials settings.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct OauthBearerConfig {
    /// OAuth2 client id.
    pub client_id: Option<String>,
    /// OAuth2 client secret.
    pub client_secret: Option<String>,
    /// Base URL of the authorization server, e.g. `https://auth.example.com`.
    pub server_url: Option<String>,
    /// Token endpoint path or URL suffix. Defaults to `/oauth2/token`.
    pub token_url: Option<String>,
}

impl OauthBearerConfig {
    /// The token path has a default, so only the client credentials and the
    /// server URL gate OAUTHBEARER.
    pub fn configured(&self) -> bool {
        present(&self.client_id) && present(&self.client_secret) && present(&self.server_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_enables_nothing() {
        let config = SaslConfig::default();
        assert!(!config.gssapi.configured());
        assert!(!config.plain.configured());
        assert!(!config.scram.configured());
        assert!(!config.oauthbearer.configured());
    }

    #[test]
    fn empty_strings_do_not_count_as_configured() {
        let config = PlainConfig {
            authzid: None,
            username: Some("".to_string()),
            password: Some("hunter2".to_string()),
        };
        assert!(!config.configured());
    }

    #[test]
    fn plain_does_not_require_an_authzid() {
        let config = PlainConfig {
            authzid: None,
            username: Some("user".to_string()),
            password: Some("hunter2".to_string()),
        };
        assert!(config.configured());
    }

    #[test]
    fn oauthbearer_does_not_require_a_token_url() {
        let config = OauthBearerConfig {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            server_url: Some("https://auth.example.com".to_string()),
            token_url: None,
        };
        assert!(config.configured());
    }

    #[test]
    fn deserializes_from_partial_json() {
        let config: SaslConfig = serde_json::from_str(
            r#"{
                "scram": {
                    "username": "admin",
                    "password": "hunter2",
                    "mechanism": "sha256"
                }
            }"#,
        )
        .unwrap();
        assert!(config.scram.configured());
        assert_eq!(config.scram.mechanism.as_deref(), Some("sha256"));
        assert!(!config.plain.configured());
        assert!(config.oauthbearer.token_url.is_none());
    }
}
