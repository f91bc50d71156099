// src/status/varint.rs
//
// Variable-length integer codec for the status protocol: 7 data bits per
// byte, low bits first, bit 7 set while more bytes follow.

use tokio::io::{AsyncRead, AsyncReadExt};

use super::ProbeError;

/// A u32 never needs more than 5 varint bytes; a longer run means the peer
/// is broken or hostile.
pub const MAX_VARINT_BYTES: usize = 5;

/// Append the varint encoding of `value` to `buf`.
pub fn write_varint(buf: &mut Vec<u8>, value: u32) {
    let mut remaining = value;
    loop {
        let byte = (remaining & 0x7F) as u8;
        remaining >>= 7;
        if remaining == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Read one varint from the stream, a byte at a time.
///
/// Returns `StreamClosed` if the source ends before a terminating byte and
/// `MalformedVarint` once the 5-byte bound is exceeded.
pub async fn read_varint<R>(reader: &mut R) -> Result<u32, ProbeError>
where
    R: AsyncRead + Unpin,
{
    let mut value: u32 = 0;
    for i in 0..MAX_VARINT_BYTES {
        let byte = reader.read_u8().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ProbeError::StreamClosed
            } else {
                ProbeError::Connection(e.to_string())
            }
        })?;

        value |= u32::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }

    Err(ProbeError::MalformedVarint)
}
