//! Mechanism selection and the handshake that announces it.

use tracing::debug;

use crate::config::SaslConfig;
use crate::conn::BrokerConnection;
use crate::error::{Error, Result};
use crate::mechanism::Mechanism;

/// Authenticates broker connections with the mechanism selected at
/// construction time.
///
/// Selection happens exactly once, in [`new`]: the first configured
/// mechanism in the fixed order GSSAPI, PLAIN, SCRAM, OAUTHBEARER. With
/// nothing configured the authenticator is disabled and [`authenticate`]
/// does nothing, so hosts can call it unconditionally on every new
/// connection.
///
/// [`new`]: SaslAuthenticator::new
/// [`authenticate`]: SaslAuthenticator::authenticate
pub struct SaslAuthenticator {
    mechanisms: Vec<Mechanism>,
}

impl SaslAuthenticator {
    /// Validate `config` and select a mechanism.
    ///
    /// Every configured family is validated, not just the winner. No I/O
    /// happens here: the OAUTHBEARER HTTP client is built, but nothing is
    /// sent until a connection is authenticated.
    pub fn new(config: SaslConfig) -> Result<SaslAuthenticator> {
        let mechanisms = Mechanism::from_config(&config)?;
        match mechanisms.first() {
            Some(m) => debug!(mechanism = m.ident(), "SASL mechanism selected"),
            None => debug!("SASL disabled, no mechanism configured"),
        }
        Ok(SaslAuthenticator { mechanisms })
    }

    fn selected(&self) -> Option<&Mechanism> {
        self.mechanisms.first()
    }

    /// Whether new connections will be authenticated.
    pub fn enabled(&self) -> bool {
        self.selected().is_some()
    }

    /// Authenticate `conn`, or return immediately when disabled.
    ///
    /// The handshake announces the selected mechanism first; the exchange
    /// only starts once the broker reports a zero error code and lists the
    /// mechanism as enabled. Every error leaves `conn` mid-exchange and
    /// unusable; callers drop the connection rather than retry on it.
    pub fn authenticate<C: BrokerConnection + ?Sized>(&self, conn: &mut C) -> Result<()> {
        let mechanism = match self.selected() {
            Some(m) => m,
            None => return Ok(()),
        };

        let ident = mechanism.ident();
        let response = conn.sasl_handshake(ident)?;
        if !response.accepts(ident) {
            return Err(Error::UnsupportedMechanism(ident.to_string()));
        }

        let peer = conn.peer();
        mechanism.authenticate(&peer, conn)?;
        debug!(peer, mechanism = ident, "connection authenticated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlainConfig;
    use crate::conn::{FramedStream, SaslChannel, SaslHandshakeResponse};
    use crate::mock_stream::MockStream;

    struct ScriptedConnection {
        channel: FramedStream<MockStream>,
        handshake: SaslHandshakeResponse,
        handshake_calls: usize,
    }

    impl ScriptedConnection {
        fn new(stream: MockStream, handshake: SaslHandshakeResponse) -> ScriptedConnection {
            ScriptedConnection {
                channel: FramedStream::new(stream),
                handshake,
                handshake_calls: 0,
            }
        }
    }

    impl SaslChannel for ScriptedConnection {
        fn write_bytes(&mut self, bytes: &[u8]) -> crate::error::Result<()> {
            self.channel.write_bytes(bytes)
        }

        fn read_bytes(&mut self) -> crate::error::Result<Option<Vec<u8>>> {
            self.channel.read_bytes()
        }
    }

    impl BrokerConnection for ScriptedConnection {
        fn peer(&self) -> String {
            "broker1:9092".to_string()
        }

        fn sasl_handshake(
            &mut self,
            _mechanism: &str,
        ) -> crate::error::Result<SaslHandshakeResponse> {
            self.handshake_calls += 1;
            Ok(self.handshake.clone())
        }
    }

    fn plain_config() -> SaslConfig {
        SaslConfig {
            plain: PlainConfig {
                authzid: None,
                username: Some("user".to_string()),
                password: Some("pencil".to_string()),
            },
            ..SaslConfig::default()
        }
    }

    fn accepting(mechanism: &str) -> SaslHandshakeResponse {
        SaslHandshakeResponse {
            error_code: 0,
            enabled_mechanisms: vec![mechanism.to_string()],
        }
    }

    #[test]
    fn disabled_authenticator_never_touches_the_connection() {
        let authenticator = SaslAuthenticator::new(SaslConfig::default()).unwrap();
        assert!(!authenticator.enabled());

        let mut conn = ScriptedConnection::new(MockStream::default(), accepting("PLAIN"));
        authenticator.authenticate(&mut conn).unwrap();
        assert_eq!(conn.handshake_calls, 0);
        assert!(conn.channel.get_ref().written_buf.is_empty());
    }

    #[test]
    fn authenticates_over_the_handshaken_connection() {
        let authenticator = SaslAuthenticator::new(plain_config()).unwrap();
        assert!(authenticator.enabled());

        let stream = MockStream::default().with_frame(b"\x00");
        let mut conn = ScriptedConnection::new(stream, accepting("PLAIN"));
        authenticator.authenticate(&mut conn).unwrap();
        assert_eq!(conn.handshake_calls, 1);
        assert_eq!(
            conn.channel.get_ref().written_buf,
            b"\x00\x00\x00\x0c\x00user\x00pencil".to_vec()
        );
    }

    #[test]
    fn an_unlisted_mechanism_stops_before_the_exchange() {
        let authenticator = SaslAuthenticator::new(plain_config()).unwrap();
        let mut conn = ScriptedConnection::new(MockStream::default(), accepting("GSSAPI"));
        let err = authenticator.authenticate(&mut conn).unwrap_err();
        assert_eq!(err.to_string(), "PLAIN is not supported.");
        assert!(conn.channel.get_ref().written_buf.is_empty());
    }

    #[test]
    fn a_handshake_error_code_stops_before_the_exchange() {
        let authenticator = SaslAuthenticator::new(plain_config()).unwrap();
        let handshake = SaslHandshakeResponse {
            error_code: 33,
            enabled_mechanisms: vec!["PLAIN".to_string()],
        };
        let mut conn = ScriptedConnection::new(MockStream::default(), handshake);
        let err = authenticator.authenticate(&mut conn).unwrap_err();
        assert!(matches!(err, Error::UnsupportedMechanism(_)));
        assert!(conn.channel.get_ref().written_buf.is_empty());
    }

    #[test]
    fn a_rejected_exchange_propagates() {
        let authenticator = SaslAuthenticator::new(plain_config()).unwrap();
        // the peer accepts the handshake but never answers the exchange
        let mut conn = ScriptedConnection::new(MockStream::default(), accepting("PLAIN"));
        let err = authenticator.authenticate(&mut conn).unwrap_err();
        assert!(matches!(err, Error::AuthenticationRejected(_)));
    }
}
