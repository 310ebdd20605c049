//! Legacy TR commands.
//!
//! TR frames carry three opaque body sections after a fixed 14-byte header:
//! a connection-layer object, the application class name, and the
//! application object. Request/response semantics (command code, 64-bit
//! request id, header map, content) live *inside* the serialized application
//! object; the frame codec fills every wire-derivable field and leaves the
//! rest to the caller's serializer.

use std::collections::HashMap;

use bytes::Bytes;

use crate::tr;

/// Fields shared by every TR frame: the fixed header plus the three raw
/// body sections.
#[derive(Debug, Clone, PartialEq)]
pub struct TrCommand {
    /// Wire protocol version byte, always [`tr::PROTOCOL_VERSION`].
    pub protocol_version: u8,
    /// [`tr::FLAG_REQUEST`] or [`tr::FLAG_RESPONSE`].
    pub request_flag: u8,
    /// Serialization of the application object (hessian, java, ...).
    pub serialize_protocol: u8,
    /// [`tr::DIRECTION_ONEWAY`] or [`tr::DIRECTION_TWOWAY`]; unused on
    /// responses.
    pub direction: u8,
    pub reserved: u8,
    pub conn_class_content: Bytes,
    pub app_class_name: String,
    pub app_class_content: Bytes,
}

impl TrCommand {
    /// Whether the application object is the reserved heartbeat class.
    pub fn is_heartbeat(&self) -> bool {
        self.app_class_name == tr::HEARTBEAT_CLASS
    }
}

/// A TR request frame.
///
/// `cmd_code` is classified from the wire (heartbeat class name or the
/// request flag); the remaining fields are populated by whoever
/// deserializes the application object.
#[derive(Debug, Clone, PartialEq)]
pub struct TrRequestCommand {
    pub base: TrCommand,
    pub cmd_code: i16,
    pub request_id: i64,
    pub header: HashMap<String, String>,
    pub content: Bytes,
    pub target_app_name: String,
    pub target_service_name: String,
}

/// A TR response frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TrResponseCommand {
    pub base: TrCommand,
    pub cmd_code: i16,
    pub request_id: i64,
    pub header: HashMap<String, String>,
    pub content: Bytes,
}

impl TrRequestCommand {
    /// Wraps a decoded base frame, classifying the command code.
    pub fn from_base(base: TrCommand) -> Self {
        let cmd_code = if base.is_heartbeat() {
            tr::cmd::HEARTBEAT
        } else {
            tr::cmd::REQUEST
        };
        Self {
            base,
            cmd_code,
            request_id: 0,
            header: HashMap::new(),
            content: Bytes::new(),
            target_app_name: String::new(),
            target_service_name: String::new(),
        }
    }
}

impl TrResponseCommand {
    /// Wraps a decoded base frame, classifying the command code.
    pub fn from_base(base: TrCommand) -> Self {
        let cmd_code = if base.is_heartbeat() {
            tr::cmd::HEARTBEAT
        } else {
            tr::cmd::RESPONSE
        };
        Self {
            base,
            cmd_code,
            request_id: 0,
            header: HashMap::new(),
            content: Bytes::new(),
        }
    }
}
