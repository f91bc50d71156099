// src/status/mod.rs
pub mod cache;
pub mod prober;
pub mod varint;

use thiserror::Error;

/// Everything that can go wrong during one probe. All variants are absorbed
/// at the refresh loop and collapse into the canonical offline result; the
/// classification only survives in the logs.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("stream closed before a complete frame was read")]
    StreamClosed,

    #[error("varint exceeds {} bytes", varint::MAX_VARINT_BYTES)]
    MalformedVarint,

    #[error("malformed status payload: {0}")]
    MalformedPayload(String),
}
