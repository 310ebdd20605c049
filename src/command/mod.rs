//! RPC command model: the decoded form of every supported wire format.

pub mod request;
pub mod response;
pub mod tr;

pub use request::{RequestCommand, V2Ext};
pub use response::ResponseCommand;
pub use tr::{TrCommand, TrRequestCommand, TrResponseCommand};

/// Command type byte, shared by the Bolt family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmdType {
    /// A response to an earlier request.
    Response,
    /// A request expecting a correlated response.
    Request,
    /// A request that never receives a response.
    RequestOneway,
}

impl CmdType {
    /// Parses the on-wire command type byte.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Response),
            1 => Some(Self::Request),
            2 => Some(Self::RequestOneway),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::Response => 0,
            Self::Request => 1,
            Self::RequestOneway => 2,
        }
    }

    pub fn is_request(self) -> bool {
        matches!(self, Self::Request | Self::RequestOneway)
    }
}

/// Any decoded command, tagged by wire format.
///
/// Closed union: dispatch branches on the protocol code rather than on a
/// type hierarchy, so new formats register new facades without touching
/// the variants already here.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcCommand {
    /// Bolt v1/v2 request (v2 carries the extension bytes).
    Request(RequestCommand),
    /// Bolt v1/v2 response.
    Response(ResponseCommand),
    /// TR request.
    TrRequest(TrRequestCommand),
    /// TR response.
    TrResponse(TrResponseCommand),
}

impl RpcCommand {
    /// Protocol code of the wire format this command belongs to.
    pub fn protocol(&self) -> u8 {
        match self {
            Self::Request(c) => c.protocol,
            Self::Response(c) => c.protocol,
            Self::TrRequest(_) | Self::TrResponse(_) => crate::tr::PROTOCOL_CODE,
        }
    }

    /// Format-local command code. `0` is heartbeat in every format.
    pub fn cmd_code(&self) -> i16 {
        match self {
            Self::Request(c) => c.cmd_code,
            Self::Response(c) => c.cmd_code,
            Self::TrRequest(c) => c.cmd_code,
            Self::TrResponse(c) => c.cmd_code,
        }
    }

    /// Correlation id linking a request to its response. Widened to `u64`
    /// because TR carries 64-bit ids on the wire.
    pub fn request_id(&self) -> u64 {
        match self {
            Self::Request(c) => u64::from(c.request_id),
            Self::Response(c) => u64::from(c.request_id),
            Self::TrRequest(c) => c.request_id as u64,
            Self::TrResponse(c) => c.request_id as u64,
        }
    }

    /// Command code `0` is reserved for heartbeat in every format.
    pub fn is_heartbeat(&self) -> bool {
        self.cmd_code() == 0
    }

    /// Whether this command must never be answered with a response.
    pub fn is_oneway(&self) -> bool {
        match self {
            Self::Request(c) => c.cmd_type == CmdType::RequestOneway,
            Self::Response(_) | Self::TrResponse(_) => false,
            Self::TrRequest(c) => c.base.direction == crate::tr::DIRECTION_ONEWAY,
        }
    }
}
