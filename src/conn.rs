//! The framed byte channel the SASL exchanges run over.
//!
//! Brokers speak SASL in discrete messages: a signed 32-bit big-endian
//! length followed by that many payload bytes. A negative length is a null
//! frame. End of stream is a value here, not an error; exchanges decide for
//! themselves what a missing reply means.

use std::io::{self, Read, Write};

use bufstream::BufStream;
use tracing::trace;

use crate::error::{Error, Result};

/// A channel that can send and receive one SASL message at a time.
pub trait SaslChannel {
    /// Send one message.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Receive one message. `Ok(None)` means the peer closed the stream or
    /// sent a null frame.
    fn read_bytes(&mut self) -> Result<Option<Vec<u8>>>;
}

/// The broker's reply to a SASL handshake request.
///
/// The handshake request itself is part of the host protocol; this crate
/// only consumes the decoded reply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaslHandshakeResponse {
    /// Zero when the broker accepted the announced mechanism.
    pub error_code: i16,
    /// Mechanism names the broker is willing to speak.
    pub enabled_mechanisms: Vec<String>,
}

impl SaslHandshakeResponse {
    /// Whether the broker accepted `ident`: a zero error code and the ident
    /// listed among the enabled mechanisms.
    pub fn accepts(&self, ident: &str) -> bool {
        self.error_code == 0 && self.enabled_mechanisms.iter().any(|m| m == ident)
    }
}

/// A connection that can be authenticated.
///
/// The host client implements this on top of whatever protocol plumbing it
/// already has; [`crate::SaslAuthenticator::authenticate`] drives it.
pub trait BrokerConnection: SaslChannel {
    /// A display name for the peer, used in log and error text.
    fn peer(&self) -> String;

    /// Announce `mechanism` to the broker and return its decoded reply.
    fn sasl_handshake(&mut self, mechanism: &str) -> Result<SaslHandshakeResponse>;
}

/// Length-prefixed framing over any blocking transport.
pub struct FramedStream<T: Read + Write> {
    stream: BufStream<T>,
}

impl<T: Read + Write> FramedStream<T> {
    /// Wrap `stream` in a buffered, framed channel.
    pub fn new(stream: T) -> FramedStream<T> {
        FramedStream {
            stream: BufStream::new(stream),
        }
    }

    /// Get a reference to the underlying transport.
    pub fn get_ref(&self) -> &T {
        self.stream.get_ref()
    }

    /// Get a mutable reference to the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        self.stream.get_mut()
    }

    /// Flush buffered writes and hand the transport back, e.g. to resume the
    /// host protocol once authentication is done.
    pub fn into_inner(mut self) -> Result<T> {
        self.stream.flush()?;
        Ok(self.stream.into_inner()?)
    }

    fn read_exact_or_eof(&mut self, buf: &mut [u8]) -> Result<bool> {
        match self.stream.read_exact(buf) {
            Ok(()) => Ok(true),
            Err(ref e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

impl<T: Read + Write> SaslChannel for FramedStream<T> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let len = i32::try_from(bytes.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame too large"))?;
        self.stream.write_all(&len.to_be_bytes())?;
        self.stream.write_all(bytes)?;
        self.stream.flush()?;
        trace!(len, "sent frame");
        Ok(())
    }

    fn read_bytes(&mut self) -> Result<Option<Vec<u8>>> {
        let mut len_buf = [0; 4];
        if !self.read_exact_or_eof(&mut len_buf)? {
            trace!("stream closed before a frame arrived");
            return Ok(None);
        }
        let len = i32::from_be_bytes(len_buf);
        if len < 0 {
            return Ok(None);
        }
        let mut payload = vec![0; len as usize];
        if !self.read_exact_or_eof(&mut payload)? {
            trace!("stream closed mid-frame");
            return Ok(None);
        }
        trace!(len, "received frame");
        Ok(Some(payload))
    }
}
