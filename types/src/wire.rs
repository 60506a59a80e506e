//! Wire text protocol between clients, the service, and the host.
//!
//! All payloads are UTF-8 text. Client requests take the form `COMMAND:ARG`,
//! split on the first colon; the host command channel carries the literal
//! token [`DECLARE`]. Replies and draw outcomes have a stable `Display`
//! form that is the exact payload put on the wire.

use std::fmt;

use bytes::Bytes;
use thiserror::Error;

use crate::TICKET_DIGITS;

const BUY: &str = "BUY";
const RESULT: &str = "RESULT";

/// Host command token that triggers the draw.
pub const DECLARE: &str = "DECLARE";

/// Why a client payload could not be parsed into a [`Request`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("malformed request: expected COMMAND:ARG")]
    Malformed,
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
}

/// A parsed client request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// Register a ticket. The argument is carried verbatim; digit
    /// validation happens at registration so the reply can echo the
    /// offending candidate.
    Buy(String),
    /// Query the declared result. The argument, if any, is ignored.
    Result,
}

impl Request {
    /// Parse a client payload.
    ///
    /// The body must be UTF-8 `COMMAND:ARG`. `RESULT` accepts an empty
    /// argument; a missing colon or non-UTF-8 body is malformed.
    pub fn parse(body: &[u8]) -> Result<Self, RequestError> {
        let text = std::str::from_utf8(body).map_err(|_| RequestError::Malformed)?;
        let (command, arg) = text.split_once(':').ok_or(RequestError::Malformed)?;
        match command {
            BUY => Ok(Self::Buy(arg.to_string())),
            RESULT => Ok(Self::Result),
            other => Err(RequestError::UnknownCommand(other.to_string())),
        }
    }
}

/// The opaque command set accepted on the host channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostCommand {
    /// Perform the draw and fix the result.
    Declare,
}

impl HostCommand {
    /// Parse a host payload. Anything other than the literal `DECLARE`
    /// token is a host/service integration fault, left to the caller to
    /// reject.
    pub fn parse(body: &[u8]) -> Option<Self> {
        (body == DECLARE.as_bytes()).then_some(Self::Declare)
    }
}

/// Service reply to a single client request.
///
/// `Display` is the stable wire form; clients match on these strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    /// The number was new and has been recorded.
    Registered(u32),
    /// The number was already registered by someone.
    Duplicate(u32),
    /// The BUY argument was not exactly six decimal digits.
    InvalidTicket,
    /// The declared winning number.
    Winner(u32),
    /// RESULT before any declare.
    ResultsPending,
    /// Unrecognized command token.
    InvalidInput,
    /// The payload did not parse as `COMMAND:ARG`.
    Malformed,
}

impl Reply {
    /// Wire encoding of the reply.
    pub fn encode(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered(value) => {
                write!(f, "Lottery number {value:0TICKET_DIGITS$} registered.")
            }
            Self::Duplicate(value) => {
                write!(f, "Lottery number {value:0TICKET_DIGITS$} already selected.")
            }
            Self::InvalidTicket => {
                write!(f, "Invalid lottery number: expected exactly six digits.")
            }
            Self::Winner(value) => write!(f, "{value:0TICKET_DIGITS$}"),
            Self::ResultsPending => write!(f, "Results not declared"),
            Self::InvalidInput => write!(f, "Invalid input"),
            Self::Malformed => write!(f, "Malformed request: expected COMMAND:ARG"),
        }
    }
}

/// Outcome of a host-triggered draw.
///
/// `Display` is the payload returned on the host channel and posted to the
/// last known client sender; both deliveries carry identical text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawOutcome {
    /// The drawn winning number.
    Winner(u32),
    /// The registry was empty; a defined negative outcome, not a failure.
    Empty,
}

impl DrawOutcome {
    /// Wire encoding of the outcome.
    pub fn encode(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

impl fmt::Display for DrawOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Winner(value) => write!(f, "{value:0TICKET_DIGITS$}"),
            Self::Empty => write!(f, "Draw not possible: no lottery entries."),
        }
    }
}
