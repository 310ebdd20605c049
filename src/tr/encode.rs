//! Encode TR commands to wire bytes.

use bytes::{BufMut, BytesMut};

use super::HEADER_LEN;
use crate::command::{RpcCommand, TrCommand};
use crate::error::CodecError;

/// Encodes any TR command. Request/response variants serialize from their
/// shared base frame; payload-internal fields travel inside the already
/// serialized application object.
pub fn encode_command(cmd: &RpcCommand, dst: &mut BytesMut) -> Result<(), CodecError> {
    match cmd {
        RpcCommand::TrRequest(req) => encode_base(&req.base, dst),
        RpcCommand::TrResponse(resp) => encode_base(&resp.base, dst),
        RpcCommand::Request(_) | RpcCommand::Response(_) => Err(CodecError::Protocol(
            "bolt command handed to the tr encoder".into(),
        )),
    }
}

/// Encodes the fixed header and three body sections, recomputing every
/// declared length from the actual sections.
pub fn encode_base(cmd: &TrCommand, dst: &mut BytesMut) -> Result<(), CodecError> {
    let conn_len = cmd.conn_class_content.len();
    if conn_len > u32::MAX as usize {
        return Err(CodecError::Protocol(format!(
            "connection object of {conn_len} bytes exceeds u32 length field"
        )));
    }
    let name_len = cmd.app_class_name.len();
    if name_len > usize::from(u8::MAX) {
        return Err(CodecError::Protocol(format!(
            "application class name of {name_len} bytes exceeds u8 length field"
        )));
    }
    let content_len = cmd.app_class_content.len();
    if content_len > u32::MAX as usize {
        return Err(CodecError::Protocol(format!(
            "application object of {content_len} bytes exceeds u32 length field"
        )));
    }

    dst.reserve(HEADER_LEN + conn_len + name_len + content_len);
    dst.put_u8(cmd.protocol_version);
    dst.put_u8(cmd.request_flag);
    dst.put_u8(cmd.serialize_protocol);
    dst.put_u8(cmd.direction);
    dst.put_u8(cmd.reserved);
    dst.put_u32(conn_len as u32);
    dst.put_u8(name_len as u8);
    dst.put_u32(content_len as u32);
    dst.put_slice(&cmd.conn_class_content);
    dst.put_slice(cmd.app_class_name.as_bytes());
    dst.put_slice(&cmd.app_class_content);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn overlong_class_name_rejected() {
        let cmd = TrCommand {
            protocol_version: crate::tr::PROTOCOL_VERSION,
            request_flag: crate::tr::FLAG_REQUEST,
            serialize_protocol: crate::tr::SERIALIZE_HESSIAN,
            direction: crate::tr::DIRECTION_TWOWAY,
            reserved: 0,
            conn_class_content: Bytes::new(),
            app_class_name: "x".repeat(300),
            app_class_content: Bytes::new(),
        };
        let mut buf = BytesMut::new();
        let err = encode_base(&cmd, &mut buf).unwrap_err();
        assert!(matches!(err, CodecError::Protocol(_)));
    }

    #[test]
    fn bolt_command_rejected() {
        let cmd = RpcCommand::Request(crate::command::RequestCommand::heartbeat(1));
        let mut buf = BytesMut::new();
        let err = encode_command(&cmd, &mut buf).unwrap_err();
        assert!(matches!(err, CodecError::Protocol(_)));
    }
}
