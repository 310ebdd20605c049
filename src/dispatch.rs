//! Command dispatch: command-code → processor tables and the reserved
//! heartbeat fast path.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::command::{ResponseCommand, RpcCommand, TrResponseCommand};
use crate::error::CodecError;
use crate::protocol::DecodedFrame;
use crate::tr;

/// Business-logic handler for one command code.
///
/// The processor owns the response contract: a twoway request's response
/// must echo the incoming request id. Dispatch does not enforce the echo
/// mechanically; the end-to-end tests do.
#[async_trait::async_trait]
pub trait Processor: Send + Sync {
    /// Consumes a decoded command and produces the response to send back,
    /// or `None` when nothing should be written.
    ///
    /// `ctx` is the caller's opaque execution context, passed through
    /// unmodified.
    async fn process(
        &self,
        ctx: &(dyn Any + Send + Sync),
        cmd: RpcCommand,
    ) -> Result<Option<RpcCommand>, CodecError>;
}

/// Command-code → processor table for one protocol facade.
pub struct CommandHandler {
    processors: HashMap<i16, Arc<dyn Processor>>,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self {
            processors: HashMap::new(),
        }
    }

    /// Registers a processor for a command code, replacing any previous
    /// one. Code `0` is reserved for heartbeat and never consulted.
    pub fn register_processor(&mut self, cmd_code: i16, processor: Arc<dyn Processor>) {
        tracing::debug!(cmd_code, "registering processor");
        self.processors.insert(cmd_code, processor);
    }

    /// Dispatches one decoded frame.
    ///
    /// - Heartbeats (command code 0) bypass the processor table and are
    ///   acknowledged here.
    /// - Frames whose header section failed to decode are refused before
    ///   any processor runs; the error carries the fixed fields so the
    ///   caller can correlate.
    /// - Oneway requests never produce a response, whatever the processor
    ///   returned.
    /// - A missing processor is a non-fatal [`CodecError::NoProcessor`];
    ///   the decode loop continues with later frames.
    pub async fn handle(
        &self,
        ctx: &(dyn Any + Send + Sync),
        frame: DecodedFrame,
    ) -> Result<Option<RpcCommand>, CodecError> {
        let DecodedFrame {
            command,
            header_fault,
            ..
        } = frame;

        if let Some(fault) = header_fault {
            tracing::debug!(
                cmd_code = command.cmd_code(),
                request_id = command.request_id(),
                error = %fault,
                "refusing to dispatch frame with undecodable header",
            );
            return Err(CodecError::UntrustedHeader {
                cmd_code: command.cmd_code(),
                request_id: command.request_id(),
            });
        }

        if command.is_heartbeat() {
            return Ok(heartbeat_ack(&command));
        }

        let oneway = command.is_oneway();
        let processor = self
            .processors
            .get(&command.cmd_code())
            .cloned()
            .ok_or_else(|| {
                tracing::debug!(cmd_code = command.cmd_code(), "no processor registered");
                CodecError::NoProcessor(command.cmd_code())
            })?;

        let response = processor.process(ctx, command).await?;
        if oneway { Ok(None) } else { Ok(response) }
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the reserved heartbeat acknowledgement. Incoming acks and
/// oneway heartbeats produce nothing.
fn heartbeat_ack(cmd: &RpcCommand) -> Option<RpcCommand> {
    match cmd {
        RpcCommand::Request(req) => {
            if req.cmd_type == crate::command::CmdType::RequestOneway {
                return None;
            }
            let mut ack = ResponseCommand::heartbeat_ack(req.request_id);
            ack.protocol = req.protocol;
            ack.version = req.version;
            ack.codec = req.codec;
            ack.v2 = req.v2;
            Some(RpcCommand::Response(ack))
        }
        RpcCommand::TrRequest(req) => {
            if req.base.direction == tr::DIRECTION_ONEWAY {
                return None;
            }
            let mut base = req.base.clone();
            base.request_flag = tr::FLAG_RESPONSE;
            Some(RpcCommand::TrResponse(TrResponseCommand::from_base(base)))
        }
        RpcCommand::Response(_) | RpcCommand::TrResponse(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bolt::{self, decode::decode_frame, encode, BoltVersion};
    use crate::command::{CmdType, RequestCommand};
    use crate::protocol::{DecodeOutcome, MAX_FRAME_LEN};
    use bytes::{Bytes, BytesMut};

    /// Echoes request content back with the correlated request id.
    struct EchoProcessor;

    #[async_trait::async_trait]
    impl Processor for EchoProcessor {
        async fn process(
            &self,
            _ctx: &(dyn Any + Send + Sync),
            cmd: RpcCommand,
        ) -> Result<Option<RpcCommand>, CodecError> {
            let RpcCommand::Request(req) = cmd else {
                return Err(CodecError::Protocol("expected a request".into()));
            };
            let mut resp = ResponseCommand::rpc(
                req.request_id,
                crate::command::response::status::SUCCESS,
            );
            resp.content = req.content;
            Ok(Some(RpcCommand::Response(resp)))
        }
    }

    struct TrNoopProcessor;

    #[async_trait::async_trait]
    impl Processor for TrNoopProcessor {
        async fn process(
            &self,
            _ctx: &(dyn Any + Send + Sync),
            cmd: RpcCommand,
        ) -> Result<Option<RpcCommand>, CodecError> {
            let RpcCommand::TrRequest(req) = cmd else {
                return Err(CodecError::Protocol("expected a tr request".into()));
            };
            let mut base = req.base;
            base.request_flag = tr::FLAG_RESPONSE;
            Ok(Some(RpcCommand::TrResponse(TrResponseCommand::from_base(
                base,
            ))))
        }
    }

    fn decode_request(req: &RequestCommand) -> crate::protocol::DecodedFrame {
        let mut buf = BytesMut::new();
        encode::encode_request(BoltVersion::V1, req, &mut buf).unwrap();
        match decode_frame(BoltVersion::V1, &buf, MAX_FRAME_LEN).unwrap() {
            DecodeOutcome::Frame(frame) => frame,
            DecodeOutcome::Incomplete => panic!("frame should be complete"),
        }
    }

    #[tokio::test]
    async fn request_id_echoed_end_to_end() {
        let mut handler = CommandHandler::new();
        handler.register_processor(bolt::cmd::RPC_REQUEST, Arc::new(EchoProcessor));

        let mut req = RequestCommand::rpc(0xCAFE);
        req.content = Bytes::from_static(b"ping");
        let frame = decode_request(&req);

        let response = handler.handle(&(), frame).await.unwrap().unwrap();
        assert_eq!(response.request_id(), 0xCAFE);
        let RpcCommand::Response(resp) = response else {
            panic!("expected a response");
        };
        assert_eq!(&resp.content[..], b"ping");
    }

    #[tokio::test]
    async fn heartbeat_bypasses_processor_table() {
        // No processors registered at all: code 0 must still be answered.
        let handler = CommandHandler::new();
        let frame = decode_request(&RequestCommand::heartbeat(11));

        let ack = handler.handle(&(), frame).await.unwrap().unwrap();
        assert_eq!(ack.cmd_code(), bolt::cmd::HEARTBEAT);
        assert_eq!(ack.request_id(), 11);
        let RpcCommand::Response(resp) = ack else {
            panic!("expected a response");
        };
        assert_eq!(resp.status, crate::command::response::status::SUCCESS);
    }

    #[tokio::test]
    async fn missing_processor_is_nonfatal() {
        let handler = CommandHandler::new();
        let frame = decode_request(&RequestCommand::rpc(5));

        let err = handler.handle(&(), frame).await.unwrap_err();
        assert!(matches!(err, CodecError::NoProcessor(code) if code == bolt::cmd::RPC_REQUEST));

        // The handler (and its table) stays usable for later frames.
        let frame = decode_request(&RequestCommand::heartbeat(6));
        assert!(handler.handle(&(), frame).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn oneway_request_gets_no_response() {
        let mut handler = CommandHandler::new();
        handler.register_processor(bolt::cmd::RPC_REQUEST, Arc::new(EchoProcessor));

        let mut req = RequestCommand::rpc(77);
        req.cmd_type = CmdType::RequestOneway;
        let frame = decode_request(&req);

        assert!(handler.handle(&(), frame).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tr_oneway_request_gets_no_response() {
        let mut handler = CommandHandler::new();
        handler.register_processor(tr::cmd::REQUEST, Arc::new(TrNoopProcessor));

        let base = crate::command::TrCommand {
            protocol_version: tr::PROTOCOL_VERSION,
            request_flag: tr::FLAG_REQUEST,
            serialize_protocol: tr::SERIALIZE_HESSIAN,
            direction: tr::DIRECTION_ONEWAY,
            reserved: 0,
            conn_class_content: Bytes::new(),
            app_class_name: "com.acme.Notify".into(),
            app_class_content: Bytes::from_static(b"obj"),
        };
        let mut buf = BytesMut::new();
        crate::tr::encode::encode_base(&base, &mut buf).unwrap();
        let frame = crate::tr::decode::decode_frame(&buf, MAX_FRAME_LEN)
            .unwrap()
            .expect_frame();

        assert!(handler.handle(&(), frame).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tr_heartbeat_acked_without_processor() {
        let handler = CommandHandler::new();
        let base = crate::command::TrCommand {
            protocol_version: tr::PROTOCOL_VERSION,
            request_flag: tr::FLAG_REQUEST,
            serialize_protocol: tr::SERIALIZE_HESSIAN,
            direction: tr::DIRECTION_TWOWAY,
            reserved: 0,
            conn_class_content: Bytes::new(),
            app_class_name: tr::HEARTBEAT_CLASS.into(),
            app_class_content: Bytes::new(),
        };
        let mut buf = BytesMut::new();
        crate::tr::encode::encode_base(&base, &mut buf).unwrap();
        let frame = crate::tr::decode::decode_frame(&buf, MAX_FRAME_LEN)
            .unwrap()
            .expect_frame();

        let ack = handler.handle(&(), frame).await.unwrap().unwrap();
        let RpcCommand::TrResponse(resp) = ack else {
            panic!("expected a tr response");
        };
        assert_eq!(resp.base.request_flag, tr::FLAG_RESPONSE);
        assert_eq!(resp.cmd_code, tr::cmd::HEARTBEAT);
    }

    #[tokio::test]
    async fn header_fault_refused_before_processor() {
        let mut handler = CommandHandler::new();
        handler.register_processor(bolt::cmd::RPC_REQUEST, Arc::new(EchoProcessor));

        // Request with an undecodable 3-byte header section.
        let mut bytes = vec![
            1, 1, 0, 1, 1, 0, 0, 0, 21, 1, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 0,
        ];
        bytes.extend_from_slice(&[0xFF, 0xFF, 0xFF]);
        let frame = decode_frame(BoltVersion::V1, &bytes, MAX_FRAME_LEN)
            .unwrap()
            .expect_frame();
        assert!(frame.header_fault.is_some());

        let err = handler.handle(&(), frame).await.unwrap_err();
        assert!(matches!(
            err,
            CodecError::UntrustedHeader {
                cmd_code: 1,
                request_id: 21,
            }
        ));
    }
}
