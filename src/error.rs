use std::error::Error as StdError;
use std::fmt;
use std::io::Error as IoError;
use std::result;

use bufstream::IntoInnerError as BufError;

pub type Result<T> = result::Result<T, Error>;

/// A set of errors that can occur while authenticating a broker connection.
#[derive(Debug)]
pub enum Error {
    /// An `io::Error` that occurred while trying to read or write to the
    /// broker's framed channel.
    Io(IoError),
    /// An error from `reqwest` while talking to the OAuth2 token endpoint.
    Http(reqwest::Error),
    /// The token endpoint answered with a non-200 status.
    AuthServer {
        /// HTTP status code of the reply.
        status: u16,
        /// The reason phrase associated with the status.
        message: String,
    },
    /// The broker's handshake reply did not accept the announced mechanism.
    UnsupportedMechanism(String),
    /// The peer rejected or abandoned the authentication exchange.
    AuthenticationRejected(String),
    /// The SCRAM exchange failed before the server proved itself.
    FailedScramAuthentication(String),
    // Unusable mechanism configuration.
    Config(String),
}

impl From<IoError> for Error {
    fn from(err: IoError) -> Error {
        Error::Io(err)
    }
}

impl<T> From<BufError<T>> for Error {
    fn from(err: BufError<T>) -> Error {
        Error::Io(err.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        Error::Http(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Io(ref e) => fmt::Display::fmt(e, f),
            Error::Http(ref e) => fmt::Display::fmt(e, f),
            Error::AuthServer {
                status,
                ref message,
            } => write!(f, "authentication server responded {} {}", status, message),
            Error::UnsupportedMechanism(ref ident) => write!(f, "{} is not supported.", ident),
            Error::AuthenticationRejected(ref msg) => f.write_str(msg),
            Error::FailedScramAuthentication(ref msg) => {
                write!(f, "SCRAM authentication failed: {}", msg)
            }
            Error::Config(ref msg) => f.write_str(msg),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Io(ref e) => Some(e),
            Error::Http(ref e) => Some(e),
            _ => None,
        }
    }
}
