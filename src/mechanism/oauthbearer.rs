//! OAUTHBEARER: bearer-token SASL per RFC 7628.
//!
//! Each attempt walks a straight line: fetch a token from the authorization
//! server, frame it into the initial response, send it, and read the
//! broker's verdict. Nothing is cached between attempts.

use tracing::debug;

use crate::config::OauthBearerConfig;
use crate::conn::SaslChannel;
use crate::error::{Error, Result};
use crate::oauth::TokenClient;

use super::GS2_HEADER;

/// Field separator of the initial response (ASCII SOH).
const SOH: u8 = 0x01;
/// Key/value prefix that carries the token.
const AUTH_KEY: &str = "auth=Bearer ";

/// What the broker's reply to the initial response means.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A reply frame arrived; the token was accepted.
    Success,
    /// No reply frame at all.
    Failed(String),
}

/// Encode the initial client response carrying `token` (RFC 7628
/// section 3.1): the GS2 header, then the auth key/value, each field
/// terminated by SOH and the whole message by a double SOH.
pub fn encode_initial_response(token: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(GS2_HEADER.len() + AUTH_KEY.len() + token.len() + 3);
    buf.extend_from_slice(GS2_HEADER.as_bytes());
    buf.push(SOH);
    buf.extend_from_slice(AUTH_KEY.as_bytes());
    buf.extend_from_slice(token.as_bytes());
    buf.push(SOH);
    buf.push(SOH);
    buf
}

/// Interpret the broker's reply. Any frame at all, even an empty one,
/// seals success; only a missing frame fails. End of stream reaches this
/// point as `None`, never as an error.
pub fn decode_server_outcome(reply: Option<&[u8]>) -> Outcome {
    match reply {
        Some(_) => Outcome::Success,
        None => Outcome::Failed("no response received on socket".to_string()),
    }
}

/// The OAUTHBEARER mechanism.
pub struct OauthBearer {
    tokens: TokenClient,
}

impl OauthBearer {
    /// Build from config, or `None` when the client credentials or server
    /// URL are missing. The HTTP client comes to life here; the first
    /// request waits until [`Mechanism::authenticate`].
    ///
    /// [`Mechanism::authenticate`]: super::Mechanism::authenticate
    pub(crate) fn from_config(config: &OauthBearerConfig) -> Result<Option<OauthBearer>> {
        if !config.configured() {
            return Ok(None);
        }
        Ok(Some(OauthBearer {
            tokens: TokenClient::new(config)?,
        }))
    }

    pub(crate) fn ident(&self) -> &'static str {
        "OAUTHBEARER"
    }

    pub(crate) fn authenticate<C: SaslChannel + ?Sized>(
        &self,
        peer: &str,
        channel: &mut C,
    ) -> Result<()> {
        let token = self.tokens.fetch_token()?;
        channel.write_bytes(&encode_initial_response(token.as_str()))?;
        let reply = channel.read_bytes()?;
        match decode_server_outcome(reply.as_deref()) {
            Outcome::Success => {
                debug!(peer, "OAUTHBEARER authentication successful");
                Ok(())
            }
            Outcome::Failed(reason) => Err(Error::AuthenticationRejected(format!(
                "SASL OAUTHBEARER authentication failed for {}: {}",
                peer, reason
            ))),
        }
    }
}
