//! The protocol facade contract and decode results.

use bytes::{Bytes, BytesMut};

use crate::command::RpcCommand;
use crate::dispatch::CommandHandler;
use crate::error::CodecError;

/// Largest frame length any decoder will accept. Declared lengths summing
/// past this are fatal to the connection: with no delimiter to scan for,
/// the stream cannot be resynchronized.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// One wire format behind a single polymorphic contract: decoder, encoder,
/// and command handler, keyed by a one-byte protocol code.
pub trait WireProtocol: Send + Sync {
    /// The protocol code this facade is registered under.
    fn code(&self) -> u8;

    /// Attempts to decode one frame from the unconsumed tail of a
    /// connection's byte stream. Pure: consumes nothing from `buf`; the
    /// caller advances by [`DecodedFrame::consumed`] on success.
    fn decode(&self, buf: &[u8]) -> Result<DecodeOutcome, CodecError>;

    /// Serializes a command into wire bytes. Declared section lengths are
    /// recomputed from the actual sections at encode time.
    fn encode(&self, cmd: &RpcCommand, dst: &mut BytesMut) -> Result<(), CodecError>;

    /// The command-code → processor table for this format.
    fn handler(&self) -> &CommandHandler;
}

/// Result of a decode attempt.
#[derive(Debug)]
pub enum DecodeOutcome {
    /// Not enough bytes for a whole frame. Nothing was consumed and no
    /// side effects occurred; the caller should read more and retry.
    Incomplete,
    /// One complete frame was decoded.
    Frame(DecodedFrame),
}

impl DecodeOutcome {
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Incomplete)
    }

    /// Unwraps the frame; panics on `Incomplete`. Test helper.
    pub fn expect_frame(self) -> DecodedFrame {
        match self {
            Self::Frame(frame) => frame,
            Self::Incomplete => panic!("expected a complete frame, got Incomplete"),
        }
    }
}

/// A fully decoded frame.
#[derive(Debug)]
pub struct DecodedFrame {
    pub command: RpcCommand,
    /// Exactly the frame length; bytes beyond it were not touched.
    pub consumed: usize,
    /// Owned copy of the full frame, decoupled from the connection's read
    /// buffer. Command sections are zero-copy slices of this.
    pub raw: Bytes,
    /// Set when the key/value header section failed to decode. The fixed
    /// fields on `command` are still valid for correlation and logging,
    /// and the frame counts as consumed either way.
    pub header_fault: Option<CodecError>,
}
