//! The SASL mechanisms this crate can speak.
//!
//! Mechanisms form a closed set; each variant carries its validated
//! credentials. Selection order is fixed: GSSAPI, then PLAIN, then SCRAM,
//! then OAUTHBEARER. The first configured family wins, once, at
//! construction time.

mod gssapi;
mod oauthbearer;
mod plain;
mod scram;

pub use self::gssapi::Gssapi;
pub use self::oauthbearer::{decode_server_outcome, encode_initial_response, OauthBearer, Outcome};
pub use self::plain::Plain;
pub use self::scram::Scram;

use crate::config::SaslConfig;
use crate::conn::SaslChannel;
use crate::error::Result;

/// GS2 header announcing "no channel binding, no authorization identity"
/// (RFC 5801). Both SCRAM and OAUTHBEARER open with it.
pub(crate) const GS2_HEADER: &str = "n,,";

/// One configured SASL mechanism, ready to run its exchange.
pub enum Mechanism {
    /// Kerberos via GSSAPI.
    Gssapi(Gssapi),
    /// Cleartext username and password.
    Plain(Plain),
    /// Salted challenge-response, SHA-256 or SHA-512.
    Scram(Scram),
    /// OAuth2 bearer token.
    OauthBearer(OauthBearer),
}

impl Mechanism {
    /// Every mechanism configured in `config`, in selection order.
    ///
    /// All configured families are validated here, not just the winner, so
    /// a bad SCRAM mechanism name fails construction even when GSSAPI or
    /// PLAIN would be selected.
    pub(crate) fn from_config(config: &SaslConfig) -> Result<Vec<Mechanism>> {
        let mut mechanisms = Vec::new();
        if let Some(m) = Gssapi::from_config(&config.gssapi) {
            mechanisms.push(Mechanism::Gssapi(m));
        }
        if let Some(m) = Plain::from_config(&config.plain) {
            mechanisms.push(Mechanism::Plain(m));
        }
        if let Some(m) = Scram::from_config(&config.scram)? {
            mechanisms.push(Mechanism::Scram(m));
        }
        if let Some(m) = OauthBearer::from_config(&config.oauthbearer)? {
            mechanisms.push(Mechanism::OauthBearer(m));
        }
        Ok(mechanisms)
    }

    /// The mechanism name announced in the broker handshake.
    pub fn ident(&self) -> &'static str {
        match self {
            Mechanism::Gssapi(m) => m.ident(),
            Mechanism::Plain(m) => m.ident(),
            Mechanism::Scram(m) => m.ident(),
            Mechanism::OauthBearer(m) => m.ident(),
        }
    }

    /// Run the exchange against `peer` over `channel`.
    pub fn authenticate<C: SaslChannel + ?Sized>(&self, peer: &str, channel: &mut C) -> Result<()> {
        match self {
            Mechanism::Gssapi(m) => m.authenticate(peer, channel),
            Mechanism::Plain(m) => m.authenticate(peer, channel),
            Mechanism::Scram(m) => m.authenticate(peer, channel),
            Mechanism::OauthBearer(m) => m.authenticate(peer, channel),
        }
    }
}
