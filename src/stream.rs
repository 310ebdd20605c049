//! Frame reader/writer adapters over async byte streams.
//!
//! The decode engine is pure over a caller-owned buffer; these adapters
//! own that buffer for one connection, re-invoking decode as reads land
//! so arbitrarily fragmented (or pipelined) frames come out whole. The
//! surrounding I/O loop, connection lifecycle, and write serialization
//! stay with the caller.

use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::command::RpcCommand;
use crate::error::CodecError;
use crate::protocol::{DecodeOutcome, DecodedFrame};
use crate::registry::ProtocolRegistry;

const READ_BUF_CAPACITY: usize = 16 * 1024;

/// Reads frames from an `AsyncRead` stream, one connection per reader.
pub struct FrameReader<R> {
    reader: R,
    registry: Arc<ProtocolRegistry>,
    buf: BytesMut,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R, registry: Arc<ProtocolRegistry>) -> Self {
        Self {
            reader,
            registry,
            buf: BytesMut::with_capacity(READ_BUF_CAPACITY),
        }
    }

    /// Reads until one complete frame decodes.
    ///
    /// Returns `Ok(None)` on a clean end of stream (no buffered partial
    /// frame); EOF mid-frame is a protocol error. Pipelined frames
    /// already buffered are returned without touching the socket.
    pub async fn read_frame(&mut self) -> Result<Option<DecodedFrame>, CodecError> {
        loop {
            match self.registry.decode(&self.buf)? {
                DecodeOutcome::Frame(frame) => {
                    self.buf.advance(frame.consumed);
                    return Ok(Some(frame));
                }
                DecodeOutcome::Incomplete => {
                    let n = self.reader.read_buf(&mut self.buf).await?;
                    if n == 0 {
                        if self.buf.is_empty() {
                            return Ok(None);
                        }
                        return Err(CodecError::Protocol(format!(
                            "connection closed mid-frame with {} bytes buffered",
                            self.buf.len()
                        )));
                    }
                }
            }
        }
    }
}

/// Writes commands to an `AsyncWrite` stream.
///
/// Each call encodes and flushes one whole frame; interleaving across
/// concurrent writers is the caller's problem to serialize.
pub struct FrameWriter<W> {
    writer: W,
    registry: Arc<ProtocolRegistry>,
    buf: BytesMut,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(writer: W, registry: Arc<ProtocolRegistry>) -> Self {
        Self {
            writer,
            registry,
            buf: BytesMut::new(),
        }
    }

    pub async fn write_frame(&mut self, cmd: &RpcCommand) -> Result<(), CodecError> {
        self.buf.clear();
        self.registry.encode(cmd, &mut self.buf)?;
        self.writer.write_all(&self.buf).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{RequestCommand, RpcCommand};
    use bytes::Bytes;
    use std::io::Cursor;

    fn registry() -> Arc<ProtocolRegistry> {
        Arc::new(ProtocolRegistry::with_defaults())
    }

    fn frame_bytes(cmd: &RpcCommand) -> Vec<u8> {
        let mut buf = BytesMut::new();
        registry().encode(cmd, &mut buf).unwrap();
        buf.to_vec()
    }

    #[tokio::test]
    async fn read_pipelined_frames() {
        let mut req = RequestCommand::rpc(1);
        req.content = Bytes::from_static(b"first");
        let mut data = frame_bytes(&RpcCommand::Request(req));
        data.extend_from_slice(&frame_bytes(&RpcCommand::Request(
            RequestCommand::heartbeat(2),
        )));

        let mut reader = FrameReader::new(Cursor::new(data), registry());
        let first = reader.read_frame().await.unwrap().unwrap();
        assert_eq!(first.command.request_id(), 1);
        let second = reader.read_frame().await.unwrap().unwrap();
        assert_eq!(second.command.request_id(), 2);
        assert!(reader.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_fragmented_frame() {
        let mut req = RequestCommand::rpc(42);
        req.class_name = "com.acme.EchoService".into();
        req.content = Bytes::from_static(b"fragmented payload");
        let data = frame_bytes(&RpcCommand::Request(req.clone()));

        let (client, server) = tokio::io::duplex(8);
        let writer_task = tokio::spawn(async move {
            let mut client = client;
            // Dribble the frame a few bytes at a time.
            for chunk in data.chunks(3) {
                client.write_all(chunk).await.unwrap();
                client.flush().await.unwrap();
                tokio::task::yield_now().await;
            }
            drop(client);
        });

        let mut reader = FrameReader::new(server, registry());
        let frame = reader.read_frame().await.unwrap().unwrap();
        assert_eq!(frame.command, RpcCommand::Request(req));
        assert!(reader.read_frame().await.unwrap().is_none());
        writer_task.await.unwrap();
    }

    #[tokio::test]
    async fn eof_mid_frame_is_an_error() {
        let data = frame_bytes(&RpcCommand::Request(RequestCommand::heartbeat(1)));
        let truncated = data[..data.len() - 1].to_vec();

        let mut reader = FrameReader::new(Cursor::new(truncated), registry());
        let err = reader.read_frame().await.unwrap_err();
        assert!(matches!(err, CodecError::Protocol(_)));
    }

    #[tokio::test]
    async fn write_then_read_round_trip() {
        let registry = registry();
        let mut out: Vec<u8> = Vec::new();
        {
            let mut writer = FrameWriter::new(&mut out, registry.clone());
            let mut req = RequestCommand::rpc(0xABCD);
            req.header.insert("service".into(), "acme".into());
            writer
                .write_frame(&RpcCommand::Request(req))
                .await
                .unwrap();
            writer
                .write_frame(&RpcCommand::Request(RequestCommand::heartbeat(7)))
                .await
                .unwrap();
        }

        let mut reader = FrameReader::new(Cursor::new(out), registry);
        let first = reader.read_frame().await.unwrap().unwrap();
        assert_eq!(first.command.request_id(), 0xABCD);
        let second = reader.read_frame().await.unwrap().unwrap();
        assert!(second.command.is_heartbeat());
        assert!(reader.read_frame().await.unwrap().is_none());
    }
}
