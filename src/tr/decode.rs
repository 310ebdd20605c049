//! Decode TR frames.

use bytes::{Buf, Bytes};

use super::{FLAG_REQUEST, FLAG_RESPONSE, HEADER_LEN};
use crate::command::{RpcCommand, TrCommand, TrRequestCommand, TrResponseCommand};
use crate::error::CodecError;
use crate::protocol::{DecodeOutcome, DecodedFrame};

/// Attempts to decode one TR frame; same purity contract as the bolt
/// decoder.
pub fn decode_frame(buf: &[u8], max_frame: usize) -> Result<DecodeOutcome, CodecError> {
    if buf.len() < HEADER_LEN {
        return Ok(DecodeOutcome::Incomplete);
    }

    let mut meta = &buf[..HEADER_LEN];
    let protocol_version = meta.get_u8();
    let request_flag = meta.get_u8();
    let serialize_protocol = meta.get_u8();
    let direction = meta.get_u8();
    let reserved = meta.get_u8();
    let conn_len = meta.get_u32() as usize;
    let name_len = meta.get_u8() as usize;
    let content_len = meta.get_u32() as usize;

    let frame_len = HEADER_LEN + conn_len + name_len + content_len;
    if frame_len > max_frame {
        tracing::warn!(frame_len, max_frame, "oversized tr frame");
        return Err(CodecError::FrameTooLarge {
            declared: frame_len,
            max: max_frame,
        });
    }
    if buf.len() < frame_len {
        return Ok(DecodeOutcome::Incomplete);
    }

    let raw = Bytes::copy_from_slice(&buf[..frame_len]);
    let name_index = HEADER_LEN + conn_len;
    let content_index = name_index + name_len;

    let base = TrCommand {
        protocol_version,
        request_flag,
        serialize_protocol,
        direction,
        reserved,
        conn_class_content: raw.slice(HEADER_LEN..name_index),
        app_class_name: String::from_utf8_lossy(&raw[name_index..content_index]).into_owned(),
        app_class_content: raw.slice(content_index..),
    };

    let command = match request_flag {
        FLAG_REQUEST => RpcCommand::TrRequest(TrRequestCommand::from_base(base)),
        FLAG_RESPONSE => RpcCommand::TrResponse(TrResponseCommand::from_base(base)),
        other => {
            return Err(CodecError::Protocol(format!(
                "unknown tr request flag: {other:#04x}"
            )));
        }
    };

    Ok(DecodeOutcome::Frame(DecodedFrame {
        command,
        consumed: frame_len,
        raw,
        header_fault: None,
    }))
}
