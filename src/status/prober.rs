// src/status/prober.rs
//
// One unauthenticated status round trip against the game server: handshake
// and status request out, one framed JSON document back.

use std::time::Duration;

use byteorder::{BigEndian, WriteBytesExt};
use log::debug;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::varint::{read_varint, write_varint};
use super::ProbeError;
use crate::models::status::StatusResult;

/// Protocol version sent in the handshake. The status exchange is
/// version-tolerant, so this is a fixed constant rather than configuration.
pub const PROTOCOL_VERSION: u32 = 762;

const HANDSHAKE_PACKET_ID: u8 = 0x00;
const NEXT_STATE_STATUS: u32 = 1;

/// Frame: length 1, packet id 0x00, empty body.
const STATUS_REQUEST: [u8; 2] = [0x01, 0x00];

/// Upper bound on the declared status document length. Real responses are a
/// few KB even with a favicon; anything near this is a corrupt or hostile
/// length prefix, not a status document.
const MAX_STATUS_PAYLOAD: usize = 1024 * 1024;

pub struct StatusProber {
    host: String,
    port: u16,
    timeout: Duration,
}

impl StatusProber {
    pub fn new(host: String, port: u16, timeout: Duration) -> Self {
        Self {
            host,
            port,
            timeout,
        }
    }

    /// Run one full probe. The entire exchange, connect included, is bounded
    /// by the configured timeout; the socket is dropped on every exit path.
    pub async fn probe(&self) -> Result<StatusResult, ProbeError> {
        match timeout(self.timeout, self.exchange()).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Connection(format!(
                "timed out after {:?}",
                self.timeout
            ))),
        }
    }

    async fn exchange(&self) -> Result<StatusResult, ProbeError> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| ProbeError::Connection(e.to_string()))?;

        let request = self.build_request();
        stream
            .write_all(&request)
            .await
            .map_err(|e| ProbeError::Connection(e.to_string()))?;
        debug!(
            "sent status handshake to {}:{} ({} bytes)",
            self.host,
            self.port,
            request.len()
        );

        let _frame_len = read_varint(&mut stream).await?;
        // Packet id is read but deliberately not validated; some servers
        // answer with nonstandard ids.
        let _packet_id = read_varint(&mut stream).await?;

        let json_len = read_varint(&mut stream).await? as usize;
        if json_len > MAX_STATUS_PAYLOAD {
            return Err(ProbeError::MalformedPayload(format!(
                "declared payload of {} bytes (max {})",
                json_len, MAX_STATUS_PAYLOAD
            )));
        }

        let mut payload = vec![0u8; json_len];
        stream.read_exact(&mut payload).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ProbeError::MalformedPayload(format!(
                    "payload shorter than declared length {}",
                    json_len
                ))
            } else {
                ProbeError::Connection(e.to_string())
            }
        })?;

        let document: Value = serde_json::from_slice(&payload)
            .map_err(|e| ProbeError::MalformedPayload(e.to_string()))?;

        Ok(Self::parse_status(&document))
    }

    /// Handshake frame followed by the status request, sent as one write.
    fn build_request(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(self.host.len() + 16);
        packet.push(HANDSHAKE_PACKET_ID);
        write_varint(&mut packet, PROTOCOL_VERSION);
        write_varint(&mut packet, self.host.len() as u32);
        packet.extend_from_slice(self.host.as_bytes());
        WriteBytesExt::write_u16::<BigEndian>(&mut packet, self.port)
            .expect("write to in-memory buffer");
        write_varint(&mut packet, NEXT_STATE_STATUS);

        let mut request = Vec::with_capacity(packet.len() + 1 + STATUS_REQUEST.len());
        write_varint(&mut request, packet.len() as u32);
        request.extend_from_slice(&packet);
        request.extend_from_slice(&STATUS_REQUEST);
        request
    }

    /// Pull the fields we serve out of the status document. Missing counts
    /// default to 0 and a missing version to "?"; extra fields are ignored.
    fn parse_status(document: &Value) -> StatusResult {
        let players = document.get("players");
        let players_online = players
            .and_then(|p| p.get("online"))
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32;
        let players_max = players
            .and_then(|p| p.get("max"))
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32;
        let version = document
            .get("version")
            .and_then(|v| v.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("?")
            .to_string();

        StatusResult {
            online: true,
            players_online,
            players_max,
            version,
        }
    }
}
