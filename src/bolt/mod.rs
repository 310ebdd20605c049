//! Bolt v1/v2 frame codec and facade.
//!
//! Both versions share one fixed-header shape; v2 inserts two extension
//! bytes after the base version byte, shifting every later offset by 2.

pub mod decode;
pub mod encode;

use bytes::BytesMut;

use crate::command::RpcCommand;
use crate::dispatch::CommandHandler;
use crate::error::CodecError;
use crate::protocol::{DecodeOutcome, WireProtocol, MAX_FRAME_LEN};

pub const PROTOCOL_CODE_V1: u8 = 1;
pub const PROTOCOL_CODE_V2: u8 = 2;

pub const PROTOCOL_VERSION_1: u8 = 1;
pub const PROTOCOL_VERSION_2: u8 = 2;

pub const REQUEST_HEADER_LEN_V1: usize = 22;
pub const REQUEST_HEADER_LEN_V2: usize = 24;
pub const RESPONSE_HEADER_LEN_V1: usize = 20;
pub const RESPONSE_HEADER_LEN_V2: usize = 22;

/// Content serialization byte for hessian2, the common default.
pub const CODEC_HESSIAN2: u8 = 1;

/// Bolt command codes.
pub mod cmd {
    pub const HEARTBEAT: i16 = 0;
    pub const RPC_REQUEST: i16 = 1;
    pub const RPC_RESPONSE: i16 = 2;
}

/// Which Bolt layout a facade speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoltVersion {
    V1,
    V2,
}

impl BoltVersion {
    pub fn protocol_code(self) -> u8 {
        match self {
            Self::V1 => PROTOCOL_CODE_V1,
            Self::V2 => PROTOCOL_CODE_V2,
        }
    }

    /// Extra fixed-header bytes v2 inserts after the version byte.
    pub fn ext_len(self) -> usize {
        match self {
            Self::V1 => 0,
            Self::V2 => 2,
        }
    }

    pub fn request_header_len(self) -> usize {
        REQUEST_HEADER_LEN_V1 + self.ext_len()
    }

    pub fn response_header_len(self) -> usize {
        RESPONSE_HEADER_LEN_V1 + self.ext_len()
    }

    /// Fewest bytes needed before the command type can be classified and
    /// any fixed header fully parsed (the response header is the shorter).
    pub fn least_len(self) -> usize {
        self.response_header_len()
    }
}

/// Facade bundling the Bolt decoder, encoder, and command handler for one
/// protocol code.
pub struct BoltProtocol {
    version: BoltVersion,
    handler: CommandHandler,
}

impl BoltProtocol {
    pub fn new(version: BoltVersion) -> Self {
        Self {
            version,
            handler: CommandHandler::new(),
        }
    }

    pub fn v1() -> Self {
        Self::new(BoltVersion::V1)
    }

    pub fn v2() -> Self {
        Self::new(BoltVersion::V2)
    }

    pub fn version(&self) -> BoltVersion {
        self.version
    }

    /// Mutable access for processor registration before the facade is
    /// shared.
    pub fn handler_mut(&mut self) -> &mut CommandHandler {
        &mut self.handler
    }
}

impl WireProtocol for BoltProtocol {
    fn code(&self) -> u8 {
        self.version.protocol_code()
    }

    fn decode(&self, buf: &[u8]) -> Result<DecodeOutcome, CodecError> {
        decode::decode_frame(self.version, buf, MAX_FRAME_LEN)
    }

    fn encode(&self, cmd: &RpcCommand, dst: &mut BytesMut) -> Result<(), CodecError> {
        encode::encode_command(self.version, cmd, dst)
    }

    fn handler(&self) -> &CommandHandler {
        &self.handler
    }
}
