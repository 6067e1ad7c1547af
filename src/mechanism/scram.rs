//! SCRAM: salted challenge-response authentication (RFC 5802), with the
//! SHA-256 and SHA-512 parameter sets of RFC 7677.
//!
//! The client proves knowledge of the password without sending it, and the
//! server proves it holds the derived keys by signing the same auth message
//! back. Four messages total, two in each direction.

use std::collections::HashMap;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use rand::Rng;
use sha2::{Digest, Sha256, Sha512};
use tracing::debug;

use crate::config::ScramConfig;
use crate::conn::SaslChannel;
use crate::error::{Error, Result};

use super::GS2_HEADER;

const CLIENT_KEY: &[u8] = b"Client Key";
const SERVER_KEY: &[u8] = b"Server Key";

/// Hash family of a SCRAM exchange.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScramHash {
    /// SCRAM-SHA-256.
    Sha256,
    /// SCRAM-SHA-512.
    Sha512,
}

impl ScramHash {
    fn from_name(name: &str) -> Result<ScramHash> {
        match name {
            "sha256" => Ok(ScramHash::Sha256),
            "sha512" => Ok(ScramHash::Sha512),
            other => Err(Error::Config(format!(
                "SCRAM mechanism {} is not supported (expected sha256 or sha512)",
                other
            ))),
        }
    }

    fn ident(self) -> &'static str {
        match self {
            ScramHash::Sha256 => "SCRAM-SHA-256",
            ScramHash::Sha512 => "SCRAM-SHA-512",
        }
    }

    fn hmac(self, key: &[u8], data: &[u8]) -> Vec<u8> {
        match self {
            ScramHash::Sha256 => {
                let mut mac =
                    Hmac::<Sha256>::new_from_slice(key).expect("HMAC can take key of any size");
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
            ScramHash::Sha512 => {
                let mut mac =
                    Hmac::<Sha512>::new_from_slice(key).expect("HMAC can take key of any size");
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
        }
    }

    fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            ScramHash::Sha256 => Sha256::digest(data).to_vec(),
            ScramHash::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    fn salted_password(self, password: &[u8], salt: &[u8], iterations: u32) -> Vec<u8> {
        match self {
            ScramHash::Sha256 => {
                let mut salted = vec![0; 32];
                pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut salted);
                salted
            }
            ScramHash::Sha512 => {
                let mut salted = vec![0; 64];
                pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut salted);
                salted
            }
        }
    }
}

/// The SCRAM mechanism.
pub struct Scram {
    username: String,
    password: String,
    hash: ScramHash,
}

impl Scram {
    /// Build from config, or `None` when any field is missing. An unknown
    /// hash name is an error rather than a silent `None`, so a typo cannot
    /// demote the connection to another mechanism.
    pub(crate) fn from_config(config: &ScramConfig) -> Result<Option<Scram>> {
        if !config.configured() {
            return Ok(None);
        }
        Ok(Some(Scram {
            username: config.username.clone().unwrap_or_default(),
            password: config.password.clone().unwrap_or_default(),
            hash: ScramHash::from_name(config.mechanism.as_deref().unwrap_or_default())?,
        }))
    }

    pub(crate) fn ident(&self) -> &'static str {
        self.hash.ident()
    }

    pub(crate) fn authenticate<C: SaslChannel + ?Sized>(
        &self,
        peer: &str,
        channel: &mut C,
    ) -> Result<()> {
        debug!(peer, mechanism = self.ident(), username = %self.username, "authenticating");
        self.exchange(&generate_nonce(), channel)?;
        debug!(peer, "SCRAM authentication successful");
        Ok(())
    }

    // Split from `authenticate` so tests can pin the nonce.
    fn exchange<C: SaslChannel + ?Sized>(&self, nonce: &str, channel: &mut C) -> Result<()> {
        let first_bare = format!("n={},r={}", encode_username(&self.username), nonce);
        channel.write_bytes(format!("{}{}", GS2_HEADER, first_bare).as_bytes())?;

        let server_first = read_reply(channel)?;
        let attrs = parse_attributes(&server_first);
        let server_nonce = required_attr(&attrs, "r")?;
        if !server_nonce.starts_with(nonce) {
            return Err(Error::FailedScramAuthentication(
                "invalid server nonce".to_string(),
            ));
        }
        let salt = STANDARD
            .decode(required_attr(&attrs, "s")?)
            .map_err(|_| Error::FailedScramAuthentication("server salt was not base64".to_string()))?;
        let iterations: u32 = required_attr(&attrs, "i")?.parse().map_err(|_| {
            Error::FailedScramAuthentication("server iteration count was not a number".to_string())
        })?;

        let salted_password = self
            .hash
            .salted_password(self.password.as_bytes(), &salt, iterations);
        let client_key = self.hash.hmac(&salted_password, CLIENT_KEY);
        let stored_key = self.hash.digest(&client_key);
        // "biws" is base64("n,,"), echoing the GS2 header
        let final_without_proof = format!("c=biws,r={}", server_nonce);
        let auth_message = format!("{},{},{}", first_bare, server_first, final_without_proof);
        let client_signature = self.hash.hmac(&stored_key, auth_message.as_bytes());
        let proof = STANDARD.encode(xor(&client_key, &client_signature));
        channel.write_bytes(format!("{},p={}", final_without_proof, proof).as_bytes())?;

        let server_final = read_reply(channel)?;
        let attrs = parse_attributes(&server_final);
        if let Some(e) = attrs.get("e") {
            return Err(Error::FailedScramAuthentication(e.to_string()));
        }
        let server_key = self.hash.hmac(&salted_password, SERVER_KEY);
        let server_signature = STANDARD.encode(self.hash.hmac(&server_key, auth_message.as_bytes()));
        if attrs.get("v").copied() != Some(server_signature.as_str()) {
            return Err(Error::FailedScramAuthentication(
                "invalid server signature".to_string(),
            ));
        }
        Ok(())
    }
}

fn read_reply<C: SaslChannel + ?Sized>(channel: &mut C) -> Result<String> {
    match channel.read_bytes()? {
        Some(bytes) => String::from_utf8(bytes).map_err(|_| {
            Error::FailedScramAuthentication("server message was not UTF-8".to_string())
        }),
        None => Err(Error::FailedScramAuthentication(
            "server did not reply".to_string(),
        )),
    }
}

/// Split `r=...,s=...,i=...` into its attribute pairs. Values may contain
/// `=`, so only the first one binds.
fn parse_attributes(message: &str) -> HashMap<&str, &str> {
    message
        .split(',')
        .filter_map(|part| part.split_once('='))
        .collect()
}

fn required_attr<'a>(attrs: &HashMap<&'a str, &'a str>, key: &str) -> Result<&'a str> {
    attrs.get(key).copied().ok_or_else(|| {
        Error::FailedScramAuthentication(format!("server message lacked the {} attribute", key))
    })
}

/// `=` and `,` would break the attribute framing, so usernames carry them
/// escaped (RFC 5802 section 5.1).
fn encode_username(username: &str) -> String {
    username.replace('=', "=3D").replace(',', "=2C")
}

fn xor(lhs: &[u8], rhs: &[u8]) -> Vec<u8> {
    lhs.iter().zip(rhs).map(|(l, r)| l ^ r).collect()
}

fn generate_nonce() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill(&mut bytes[..]);
    URL_SAFE_NO_PAD.encode(bytes)
}
