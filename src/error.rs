//! Error types for the wire codec.

/// Errors that can occur while decoding, encoding, or dispatching frames.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The leading byte of a frame matched no registered protocol.
    /// Raised before any length parsing; zero bytes are consumed.
    #[error("unknown protocol code: {0:#04x}")]
    UnknownProtocol(u8),

    /// The declared section lengths add up past the sane maximum.
    /// Fatal to the connection: there is no delimiter to resynchronize on.
    #[error("declared frame length {declared} exceeds maximum {max}")]
    FrameTooLarge { declared: usize, max: usize },

    /// The key/value header section could not be decoded.
    /// Recoverable per frame: fixed fields remain valid.
    #[error("header codec error: {0}")]
    Header(String),

    /// Dispatch found no processor for the command code. Non-fatal; the
    /// decode loop continues with the next frame.
    #[error("no processor registered for command code {0}")]
    NoProcessor(i16),

    /// The frame decoded but its header section is untrusted; dispatch
    /// refuses to run a processor against it. Carries the fixed fields so
    /// the caller can still correlate and log the frame.
    #[error("undecodable header section (command code {cmd_code}, request id {request_id})")]
    UntrustedHeader { cmd_code: i16, request_id: u64 },

    /// A malformed frame or an unencodable command.
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Wraps any displayable error as a protocol error.
    pub fn protocol(e: impl std::fmt::Display) -> Self {
        Self::Protocol(e.to_string())
    }
}
