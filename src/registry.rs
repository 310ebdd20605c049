//! Protocol registry: the protocol-code → facade table.
//!
//! An explicitly owned value, not process-global state: construct one at
//! startup, hand it to the connection layer, and treat it as read-mostly.
//! Lookups take a consistent snapshot; registration and removal take the
//! exclusive section.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use bytes::BytesMut;

use crate::bolt::BoltProtocol;
use crate::command::RpcCommand;
use crate::error::CodecError;
use crate::protocol::{DecodeOutcome, DecodedFrame, WireProtocol};
use crate::tr::TrProtocol;

pub struct ProtocolRegistry {
    table: RwLock<HashMap<u8, Arc<dyn WireProtocol>>>,
}

impl ProtocolRegistry {
    /// An empty registry; every decode fails with `UnknownProtocol` until
    /// facades are registered.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
        }
    }

    /// A registry with Bolt v1, Bolt v2, and TR pre-registered (empty
    /// processor tables).
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(BoltProtocol::v1()));
        registry.register(Arc::new(BoltProtocol::v2()));
        registry.register(Arc::new(TrProtocol::new()));
        registry
    }

    /// Registers a facade under its protocol code, replacing any previous
    /// registration for that code.
    pub fn register(&self, protocol: Arc<dyn WireProtocol>) {
        let code = protocol.code();
        tracing::debug!(code, "registering protocol");
        self.table.write().unwrap().insert(code, protocol);
    }

    /// Removes and returns the facade registered under `code`.
    pub fn unregister(&self, code: u8) -> Option<Arc<dyn WireProtocol>> {
        tracing::debug!(code, "unregistering protocol");
        self.table.write().unwrap().remove(&code)
    }

    /// Snapshot lookup. The returned facade stays valid even if the code
    /// is re-registered concurrently.
    pub fn get(&self, code: u8) -> Option<Arc<dyn WireProtocol>> {
        self.table.read().unwrap().get(&code).cloned()
    }

    /// Decodes one frame, selecting the format by the leading protocol
    /// code byte. An unregistered code fails before any length parsing,
    /// with zero bytes consumed, so an unknown format can never be
    /// misread as a known one.
    pub fn decode(&self, buf: &[u8]) -> Result<DecodeOutcome, CodecError> {
        let Some(&code) = buf.first() else {
            return Ok(DecodeOutcome::Incomplete);
        };
        let protocol = self.get(code).ok_or_else(|| {
            tracing::warn!(code, "unknown protocol code");
            CodecError::UnknownProtocol(code)
        })?;
        protocol.decode(buf)
    }

    /// Encodes a command under the facade registered for its protocol.
    pub fn encode(&self, cmd: &RpcCommand, dst: &mut BytesMut) -> Result<(), CodecError> {
        let code = cmd.protocol();
        let protocol = self
            .get(code)
            .ok_or(CodecError::UnknownProtocol(code))?;
        protocol.encode(cmd, dst)
    }

    /// Dispatches a decoded frame through its protocol's command handler.
    pub async fn handle(
        &self,
        ctx: &(dyn Any + Send + Sync),
        frame: DecodedFrame,
    ) -> Result<Option<RpcCommand>, CodecError> {
        let code = frame.command.protocol();
        let protocol = self
            .get(code)
            .ok_or(CodecError::UnknownProtocol(code))?;
        protocol.handler().handle(ctx, frame).await
    }
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
