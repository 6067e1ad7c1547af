//! PLAIN: the cleartext mechanism of RFC 4616.
//!
//! The whole exchange is one message, `authzid NUL authcid NUL password`,
//! answered by a single confirmation frame. Run it over TLS or not at all.

use tracing::debug;

use crate::config::PlainConfig;
use crate::conn::SaslChannel;
use crate::error::{Error, Result};

const NUL: u8 = 0;

/// The PLAIN mechanism.
pub struct Plain {
    authzid: String,
    username: String,
    password: String,
}

impl Plain {
    /// Build from config, or `None` when username or password is missing.
    /// The authzid is optional; an absent one is sent as the empty string,
    /// leaving the server to derive it from the username.
    pub(crate) fn from_config(config: &PlainConfig) -> Option<Plain> {
        if !config.configured() {
            return None;
        }
        Some(Plain {
            authzid: config.authzid.clone().unwrap_or_default(),
            username: config.username.clone().unwrap_or_default(),
            password: config.password.clone().unwrap_or_default(),
        })
    }

    pub(crate) fn ident(&self) -> &'static str {
        "PLAIN"
    }

    pub(crate) fn authenticate<C: SaslChannel + ?Sized>(
        &self,
        peer: &str,
        channel: &mut C,
    ) -> Result<()> {
        let mut message =
            Vec::with_capacity(self.authzid.len() + self.username.len() + self.password.len() + 2);
        message.extend_from_slice(self.authzid.as_bytes());
        message.push(NUL);
        message.extend_from_slice(self.username.as_bytes());
        message.push(NUL);
        message.extend_from_slice(self.password.as_bytes());
        channel.write_bytes(&message)?;

        match channel.read_bytes()? {
            Some(_) => {
                debug!(peer, "PLAIN authentication successful");
                Ok(())
            }
            None => Err(Error::AuthenticationRejected(format!(
                "SASL PLAIN authentication failed for {}: unknown error",
                peer
            ))),
        }
    }
}
