//! Pluggable SASL authentication for broker connections.
//!
//! A broker client authenticates each new connection before any
//! application traffic flows. This crate picks one SASL mechanism at
//! construction time from whatever is configured, announces it to the
//! broker through a handshake request, and then runs the mechanism's
//! exchange over the connection's length-prefixed byte channel.
//!
//! Four mechanism families are understood, tried in a fixed order:
//! GSSAPI, PLAIN, SCRAM (SHA-256/SHA-512), and OAUTHBEARER. The
//! OAUTHBEARER path fetches a bearer token from an OAuth2 token endpoint
//! (client-credentials grant, RFC 6749) on every attempt and frames it per
//! RFC 7628.
//!
//! # Usage
//!
//! Configure the credentials, build the authenticator once, and hand it
//! every new connection:
//!
//! ```
//! use broker_sasl::{SaslAuthenticator, SaslConfig};
//!
//! let mut config = SaslConfig::default();
//! config.plain.username = Some("svc-consumer".to_string());
//! config.plain.password = Some("hunter2".to_string());
//!
//! let authenticator = SaslAuthenticator::new(config).unwrap();
//! assert!(authenticator.enabled());
//! ```
//!
//! The connection side is a pair of small traits: [`SaslChannel`] for the
//! framed byte channel and [`BrokerConnection`] for the handshake on top
//! of it. [`FramedStream`] implements the channel half over anything
//! `Read + Write`; see `demos/` for a runnable token fetch.

pub mod authenticator;
pub mod config;
pub mod conn;
pub mod error;
pub mod mechanism;
pub mod oauth;

pub use crate::authenticator::SaslAuthenticator;
pub use crate::config::{GssapiConfig, OauthBearerConfig, PlainConfig, SaslConfig, ScramConfig};
pub use crate::conn::{BrokerConnection, FramedStream, SaslChannel, SaslHandshakeResponse};
pub use crate::error::{Error, Result};
pub use crate::mechanism::Mechanism;
pub use crate::oauth::{AccessToken, TokenClient};

#[cfg(test)]
mod mock_stream;
