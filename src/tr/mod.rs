//! Legacy TR frame codec and facade.
//!
//! Fixed 14-byte header, then three length-governed body sections:
//! connection-layer object, application class name, application object.

pub mod decode;
pub mod encode;

use bytes::BytesMut;

use crate::command::RpcCommand;
use crate::dispatch::CommandHandler;
use crate::error::CodecError;
use crate::protocol::{DecodeOutcome, WireProtocol, MAX_FRAME_LEN};

pub const PROTOCOL_CODE: u8 = 13;
pub const PROTOCOL_VERSION: u8 = 13;
pub const HEADER_LEN: usize = 14;

pub const FLAG_REQUEST: u8 = 0;
pub const FLAG_RESPONSE: u8 = 1;

pub const DIRECTION_ONEWAY: u8 = 1;
pub const DIRECTION_TWOWAY: u8 = 2;

pub const SERIALIZE_HESSIAN: u8 = 1;
pub const SERIALIZE_JAVA: u8 = 2;
pub const SERIALIZE_TOP: u8 = 3;
pub const SERIALIZE_HESSIAN2: u8 = 4;

/// Application class name reserved for connection heartbeats.
pub const HEARTBEAT_CLASS: &str = "com.taobao.remoting.impl.ConnectionHeartBeat";

/// TR command codes.
pub mod cmd {
    pub const HEARTBEAT: i16 = 0;
    pub const REQUEST: i16 = 13;
    pub const RESPONSE: i16 = 14;
}

/// Facade bundling the TR decoder, encoder, and command handler.
pub struct TrProtocol {
    handler: CommandHandler,
}

impl TrProtocol {
    pub fn new() -> Self {
        Self {
            handler: CommandHandler::new(),
        }
    }

    /// Mutable access for processor registration before the facade is
    /// shared.
    pub fn handler_mut(&mut self) -> &mut CommandHandler {
        &mut self.handler
    }
}

impl Default for TrProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl WireProtocol for TrProtocol {
    fn code(&self) -> u8 {
        PROTOCOL_CODE
    }

    fn decode(&self, buf: &[u8]) -> Result<DecodeOutcome, CodecError> {
        decode::decode_frame(buf, MAX_FRAME_LEN)
    }

    fn encode(&self, cmd: &RpcCommand, dst: &mut BytesMut) -> Result<(), CodecError> {
        encode::encode_command(cmd, dst)
    }

    fn handler(&self) -> &CommandHandler {
        &self.handler
    }
}
