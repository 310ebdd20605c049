//! Bolt response commands.

use std::collections::HashMap;

use bytes::Bytes;

use super::{CmdType, V2Ext};
use crate::bolt;

/// Response status codes carried in the fixed header.
pub mod status {
    pub const SUCCESS: u16 = 0;
    pub const ERROR: u16 = 1;
    pub const SERVER_EXCEPTION: u16 = 2;
    pub const UNKNOWN: u16 = 3;
    pub const SERVER_THREADPOOL_BUSY: u16 = 4;
    pub const CODEC_EXCEPTION: u16 = 6;
    pub const TIMEOUT: u16 = 7;
    pub const NO_PROCESSOR: u16 = 9;
}

/// A decoded (or to-be-encoded) Bolt response frame.
#[derive(Debug, Clone)]
pub struct ResponseCommand {
    pub protocol: u8,
    pub cmd_type: CmdType,
    pub cmd_code: i16,
    pub version: u8,
    /// Echo of the request's correlation id.
    pub request_id: u32,
    pub codec: u8,
    pub status: u16,
    pub class_name: String,
    pub header: HashMap<String, String>,
    pub content: Bytes,
    /// Present iff `protocol` is Bolt v2.
    pub v2: Option<V2Ext>,
    /// When the response was observed, milliseconds since the epoch.
    /// Not part of the wire header; excluded from equality.
    pub response_time_millis: i64,
}

/// Wire-level equality: `response_time_millis` never crosses the wire and
/// does not participate.
impl PartialEq for ResponseCommand {
    fn eq(&self, other: &Self) -> bool {
        self.protocol == other.protocol
            && self.cmd_type == other.cmd_type
            && self.cmd_code == other.cmd_code
            && self.version == other.version
            && self.request_id == other.request_id
            && self.codec == other.codec
            && self.status == other.status
            && self.class_name == other.class_name
            && self.header == other.header
            && self.content == other.content
            && self.v2 == other.v2
    }
}

impl ResponseCommand {
    /// A Bolt v1 heartbeat acknowledgement for the given request id.
    pub fn heartbeat_ack(request_id: u32) -> Self {
        Self {
            protocol: bolt::PROTOCOL_CODE_V1,
            cmd_type: CmdType::Response,
            cmd_code: bolt::cmd::HEARTBEAT,
            version: bolt::PROTOCOL_VERSION_1,
            request_id,
            codec: bolt::CODEC_HESSIAN2,
            status: status::SUCCESS,
            class_name: String::new(),
            header: HashMap::new(),
            content: Bytes::new(),
            v2: None,
            response_time_millis: 0,
        }
    }

    /// An RPC response skeleton with the given status.
    pub fn rpc(request_id: u32, status: u16) -> Self {
        Self {
            cmd_code: bolt::cmd::RPC_RESPONSE,
            status,
            ..Self::heartbeat_ack(request_id)
        }
    }
}
