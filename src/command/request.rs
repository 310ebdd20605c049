//! Bolt request commands.

use std::collections::HashMap;

use bytes::Bytes;

use super::CmdType;
use crate::bolt;

/// Extension bytes that Bolt v2 inserts into the fixed header right after
/// the base version byte. A layout superset of v1, not a behavioral
/// specialization, so it rides on the base struct as a tagged extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V2Ext {
    pub version1: u8,
    pub switch_code: u8,
}

/// A decoded (or to-be-encoded) Bolt request frame.
///
/// Immutable after construction; the encoder recomputes every declared
/// length from the actual sections, so none are stored here.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestCommand {
    /// Protocol code: [`bolt::PROTOCOL_CODE_V1`] or [`bolt::PROTOCOL_CODE_V2`].
    pub protocol: u8,
    pub cmd_type: CmdType,
    pub cmd_code: i16,
    pub version: u8,
    /// Caller-assigned correlation id, echoed by the matching response.
    pub request_id: u32,
    /// Serialization protocol of the content section.
    pub codec: u8,
    /// Milliseconds; negative means no timeout.
    pub timeout: i32,
    pub class_name: String,
    pub header: HashMap<String, String>,
    /// Opaque content bytes, sliced zero-copy off the owned frame buffer.
    pub content: Bytes,
    /// Present iff `protocol` is Bolt v2.
    pub v2: Option<V2Ext>,
}

impl RequestCommand {
    /// A Bolt v1 heartbeat request (command code 0, no sections).
    pub fn heartbeat(request_id: u32) -> Self {
        Self {
            protocol: bolt::PROTOCOL_CODE_V1,
            cmd_type: CmdType::Request,
            cmd_code: bolt::cmd::HEARTBEAT,
            version: bolt::PROTOCOL_VERSION_1,
            request_id,
            codec: bolt::CODEC_HESSIAN2,
            timeout: -1,
            class_name: String::new(),
            header: HashMap::new(),
            content: Bytes::new(),
            v2: None,
        }
    }

    /// A plain RPC request skeleton; caller fills sections as needed.
    pub fn rpc(request_id: u32) -> Self {
        Self {
            cmd_code: bolt::cmd::RPC_REQUEST,
            ..Self::heartbeat(request_id)
        }
    }
}
