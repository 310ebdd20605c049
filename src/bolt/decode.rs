//! Decode Bolt frames from raw connection bytes.
//!
//! Mirrors the fixed offset tables in the crate docs: every multi-byte
//! integer is big-endian, and `frameLen = fixedHeaderLen + classLen +
//! headerLen + contentLen`. A decode call either consumes exactly one
//! frame or nothing at all.

use std::collections::HashMap;

use bytes::{Buf, Bytes};

use super::BoltVersion;
use crate::command::{CmdType, RequestCommand, ResponseCommand, RpcCommand, V2Ext};
use crate::error::CodecError;
use crate::headers;
use crate::protocol::{DecodeOutcome, DecodedFrame};

/// Attempts to decode one frame. `buf` is the unconsumed tail of the
/// connection's stream; nothing is consumed here, the caller advances by
/// `DecodedFrame::consumed`.
pub fn decode_frame(
    version: BoltVersion,
    buf: &[u8],
    max_frame: usize,
) -> Result<DecodeOutcome, CodecError> {
    // The command type byte sits inside the shorter (response) header;
    // until that many bytes exist nothing can be classified.
    if buf.len() < version.least_len() {
        return Ok(DecodeOutcome::Incomplete);
    }

    match CmdType::from_byte(buf[1]) {
        Some(CmdType::Request) => decode_request(version, buf, false, max_frame),
        Some(CmdType::RequestOneway) => decode_request(version, buf, true, max_frame),
        Some(CmdType::Response) => decode_response(version, buf, max_frame),
        None => Err(CodecError::Protocol(format!(
            "unknown bolt command type: {:#04x}",
            buf[1]
        ))),
    }
}

fn decode_request(
    version: BoltVersion,
    buf: &[u8],
    oneway: bool,
    max_frame: usize,
) -> Result<DecodeOutcome, CodecError> {
    let header_len_fixed = version.request_header_len();
    if buf.len() < header_len_fixed {
        return Ok(DecodeOutcome::Incomplete);
    }

    let mut meta = &buf[..header_len_fixed];
    meta.advance(2); // protocol code + command type, already classified
    let cmd_code = meta.get_i16();
    let version_byte = meta.get_u8();
    let v2 = match version {
        BoltVersion::V1 => None,
        BoltVersion::V2 => Some(V2Ext {
            version1: meta.get_u8(),
            switch_code: meta.get_u8(),
        }),
    };
    let request_id = meta.get_u32();
    let codec = meta.get_u8();
    let timeout = meta.get_i32();
    let class_len = meta.get_u16() as usize;
    let header_len = meta.get_u16() as usize;
    let content_len = meta.get_u32() as usize;

    let frame_len = header_len_fixed + class_len + header_len + content_len;
    if frame_len > max_frame {
        tracing::warn!(frame_len, max_frame, "oversized bolt request frame");
        return Err(CodecError::FrameTooLarge {
            declared: frame_len,
            max: max_frame,
        });
    }
    if buf.len() < frame_len {
        return Ok(DecodeOutcome::Incomplete);
    }

    // Owned copy: decouples the command's lifetime from the connection's
    // read buffer, which the caller may drain immediately.
    let raw = Bytes::copy_from_slice(&buf[..frame_len]);
    let (class_name, header, content, header_fault) =
        slice_sections(&raw, header_len_fixed, class_len, header_len);

    let command = RequestCommand {
        protocol: version.protocol_code(),
        cmd_type: if oneway {
            CmdType::RequestOneway
        } else {
            CmdType::Request
        },
        cmd_code,
        version: version_byte,
        request_id,
        codec,
        timeout,
        class_name,
        header,
        content,
        v2,
    };

    Ok(DecodeOutcome::Frame(DecodedFrame {
        command: RpcCommand::Request(command),
        consumed: frame_len,
        raw,
        header_fault,
    }))
}

fn decode_response(
    version: BoltVersion,
    buf: &[u8],
    max_frame: usize,
) -> Result<DecodeOutcome, CodecError> {
    let header_len_fixed = version.response_header_len();
    if buf.len() < header_len_fixed {
        return Ok(DecodeOutcome::Incomplete);
    }

    let mut meta = &buf[..header_len_fixed];
    meta.advance(2);
    let cmd_code = meta.get_i16();
    let version_byte = meta.get_u8();
    let v2 = match version {
        BoltVersion::V1 => None,
        BoltVersion::V2 => Some(V2Ext {
            version1: meta.get_u8(),
            switch_code: meta.get_u8(),
        }),
    };
    let request_id = meta.get_u32();
    let codec = meta.get_u8();
    let status = meta.get_u16();
    let class_len = meta.get_u16() as usize;
    let header_len = meta.get_u16() as usize;
    let content_len = meta.get_u32() as usize;

    let frame_len = header_len_fixed + class_len + header_len + content_len;
    if frame_len > max_frame {
        tracing::warn!(frame_len, max_frame, "oversized bolt response frame");
        return Err(CodecError::FrameTooLarge {
            declared: frame_len,
            max: max_frame,
        });
    }
    if buf.len() < frame_len {
        return Ok(DecodeOutcome::Incomplete);
    }

    let raw = Bytes::copy_from_slice(&buf[..frame_len]);
    let (class_name, header, content, header_fault) =
        slice_sections(&raw, header_len_fixed, class_len, header_len);

    let command = ResponseCommand {
        protocol: version.protocol_code(),
        cmd_type: CmdType::Response,
        cmd_code,
        version: version_byte,
        request_id,
        codec,
        status,
        class_name,
        header,
        content,
        v2,
        response_time_millis: 0,
    };

    Ok(DecodeOutcome::Frame(DecodedFrame {
        command: RpcCommand::Response(command),
        consumed: frame_len,
        raw,
        header_fault,
    }))
}

/// Slices the class/header/content sections off the owned frame buffer.
/// A header-codec failure is returned as a fault, not an error: the fixed
/// fields stay valid so the caller can still correlate the frame.
fn slice_sections(
    raw: &Bytes,
    header_index_base: usize,
    class_len: usize,
    header_len: usize,
) -> (
    String,
    HashMap<String, String>,
    Bytes,
    Option<CodecError>,
) {
    let header_index = header_index_base + class_len;
    let content_index = header_index + header_len;

    let class_name = if class_len > 0 {
        String::from_utf8_lossy(&raw[header_index_base..header_index]).into_owned()
    } else {
        String::new()
    };

    let mut header_fault = None;
    let header = if header_len > 0 {
        match headers::decode_header(&raw[header_index..content_index]) {
            Ok(map) => map,
            Err(e) => {
                tracing::debug!(error = %e, "bolt header section undecodable");
                header_fault = Some(e);
                HashMap::new()
            }
        }
    } else {
        HashMap::new()
    };

    let content = if content_index < raw.len() {
        raw.slice(content_index..)
    } else {
        Bytes::new()
    };

    (class_name, header, content, header_fault)
}
