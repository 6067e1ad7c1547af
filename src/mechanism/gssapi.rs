//! GSSAPI (Kerberos) selection support.
//!
//! A configured principal takes first place in mechanism selection, but the
//! exchange itself needs a Kerberos implementation this crate does not
//! ship. Announcing the intent and then failing loudly beats silently
//! authenticating with a weaker mechanism than the operator asked for.

use crate::config::GssapiConfig;
use crate::conn::SaslChannel;
use crate::error::{Error, Result};

/// The GSSAPI mechanism.
pub struct Gssapi {
    principal: String,
    keytab: Option<String>,
}

impl Gssapi {
    /// Build from config, or `None` when no principal is set.
    pub(crate) fn from_config(config: &GssapiConfig) -> Option<Gssapi> {
        if !config.configured() {
            return None;
        }
        Some(Gssapi {
            principal: config.principal.clone().unwrap_or_default(),
            keytab: config.keytab.clone(),
        })
    }

    pub(crate) fn ident(&self) -> &'static str {
        "GSSAPI"
    }

    pub(crate) fn authenticate<C: SaslChannel + ?Sized>(
        &self,
        _peer: &str,
        _channel: &mut C,
    ) -> Result<()> {
        Err(Error::Config(format!(
            "GSSAPI is configured for {} but the exchange requires an external Kerberos library",
            self.principal
        )))
    }

    /// The keytab path, when one was configured.
    pub fn keytab(&self) -> Option<&str> {
        self.keytab.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conn::FramedStream;
    use crate::mock_stream::MockStream;

    #[test]
    fn a_principal_is_enough_to_participate() {
        let gssapi = Gssapi::from_config(&GssapiConfig {
            principal: Some("svc/broker@EXAMPLE.COM".to_string()),
            keytab: None,
        });
        assert!(gssapi.is_some());
        assert!(Gssapi::from_config(&GssapiConfig::default()).is_none());
    }

    #[test]
    fn the_exchange_fails_without_touching_the_channel() {
        let gssapi = Gssapi::from_config(&GssapiConfig {
            principal: Some("svc/broker@EXAMPLE.COM".to_string()),
            keytab: Some("/etc/krb5.keytab".to_string()),
        })
        .unwrap();
        assert_eq!(gssapi.keytab(), Some("/etc/krb5.keytab"));

        let mut channel = FramedStream::new(MockStream::default());
        let err = gssapi
            .authenticate("broker1:9092", &mut channel)
            .unwrap_err();
        assert!(err.to_string().contains("Kerberos"));
        assert!(channel.get_ref().written_buf.is_empty());
    }
}
