//! Encode Bolt commands to wire bytes.
//!
//! Section lengths are recomputed from the actual class name, encoded
//! header map, and content at encode time; any length fields a caller
//! remembers from decode are ignored, so header and body can never
//! desynchronize.

use bytes::{BufMut, BytesMut};

use super::BoltVersion;
use crate::command::{RequestCommand, ResponseCommand, RpcCommand, V2Ext};
use crate::error::CodecError;
use crate::headers;

/// Encodes any Bolt command under the given version's layout.
pub fn encode_command(
    version: BoltVersion,
    cmd: &RpcCommand,
    dst: &mut BytesMut,
) -> Result<(), CodecError> {
    match cmd {
        RpcCommand::Request(req) => encode_request(version, req, dst),
        RpcCommand::Response(resp) => encode_response(version, resp, dst),
        RpcCommand::TrRequest(_) | RpcCommand::TrResponse(_) => Err(CodecError::Protocol(
            "TR command handed to the bolt encoder".into(),
        )),
    }
}

pub fn encode_request(
    version: BoltVersion,
    cmd: &RequestCommand,
    dst: &mut BytesMut,
) -> Result<(), CodecError> {
    let ext = check_version(version, cmd.protocol, cmd.v2.as_ref())?;
    let (class_len, header_bytes, content_len) =
        sections(&cmd.class_name, &cmd.header, cmd.content.len())?;

    dst.reserve(version.request_header_len() + class_len + header_bytes.len() + content_len);
    dst.put_u8(cmd.protocol);
    dst.put_u8(cmd.cmd_type.as_byte());
    dst.put_i16(cmd.cmd_code);
    dst.put_u8(cmd.version);
    if let Some(ext) = ext {
        dst.put_u8(ext.version1);
        dst.put_u8(ext.switch_code);
    }
    dst.put_u32(cmd.request_id);
    dst.put_u8(cmd.codec);
    dst.put_i32(cmd.timeout);
    dst.put_u16(class_len as u16);
    dst.put_u16(header_bytes.len() as u16);
    dst.put_u32(content_len as u32);
    dst.put_slice(cmd.class_name.as_bytes());
    dst.put_slice(&header_bytes);
    dst.put_slice(&cmd.content);
    Ok(())
}

pub fn encode_response(
    version: BoltVersion,
    cmd: &ResponseCommand,
    dst: &mut BytesMut,
) -> Result<(), CodecError> {
    let ext = check_version(version, cmd.protocol, cmd.v2.as_ref())?;
    let (class_len, header_bytes, content_len) =
        sections(&cmd.class_name, &cmd.header, cmd.content.len())?;

    dst.reserve(version.response_header_len() + class_len + header_bytes.len() + content_len);
    dst.put_u8(cmd.protocol);
    dst.put_u8(cmd.cmd_type.as_byte());
    dst.put_i16(cmd.cmd_code);
    dst.put_u8(cmd.version);
    if let Some(ext) = ext {
        dst.put_u8(ext.version1);
        dst.put_u8(ext.switch_code);
    }
    dst.put_u32(cmd.request_id);
    dst.put_u8(cmd.codec);
    dst.put_u16(cmd.status);
    dst.put_u16(class_len as u16);
    dst.put_u16(header_bytes.len() as u16);
    dst.put_u32(content_len as u32);
    dst.put_slice(cmd.class_name.as_bytes());
    dst.put_slice(&header_bytes);
    dst.put_slice(&cmd.content);
    Ok(())
}

/// A command must agree with the facade encoding it: right protocol code,
/// extension bytes present exactly for v2.
fn check_version<'a>(
    version: BoltVersion,
    protocol: u8,
    v2: Option<&'a V2Ext>,
) -> Result<Option<&'a V2Ext>, CodecError> {
    if protocol != version.protocol_code() {
        return Err(CodecError::Protocol(format!(
            "command protocol {protocol} does not match bolt v{} encoder",
            match version {
                BoltVersion::V1 => 1,
                BoltVersion::V2 => 2,
            }
        )));
    }
    match (version, v2) {
        (BoltVersion::V1, None) => Ok(None),
        (BoltVersion::V2, Some(ext)) => Ok(Some(ext)),
        (BoltVersion::V1, Some(_)) => Err(CodecError::Protocol(
            "bolt v1 command carries v2 extension bytes".into(),
        )),
        (BoltVersion::V2, None) => Err(CodecError::Protocol(
            "bolt v2 command missing extension bytes".into(),
        )),
    }
}

/// Serializes the header map and bounds-checks every declared length field.
fn sections(
    class_name: &str,
    header: &std::collections::HashMap<String, String>,
    content_len: usize,
) -> Result<(usize, BytesMut, usize), CodecError> {
    let class_len = class_name.len();
    if class_len > usize::from(u16::MAX) {
        return Err(CodecError::Protocol(format!(
            "class name of {class_len} bytes exceeds u16 length field"
        )));
    }
    let mut header_bytes = BytesMut::new();
    headers::encode_header(&mut header_bytes, header);
    if header_bytes.len() > usize::from(u16::MAX) {
        return Err(CodecError::Protocol(format!(
            "encoded header of {} bytes exceeds u16 length field",
            header_bytes.len()
        )));
    }
    if content_len > u32::MAX as usize {
        return Err(CodecError::Protocol(format!(
            "content of {content_len} bytes exceeds u32 length field"
        )));
    }
    Ok((class_len, header_bytes, content_len))
}
