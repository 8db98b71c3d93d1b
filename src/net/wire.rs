//! Framing for byte transports: 4-byte LE length prefix + bincode payload.

use super::protocol::NetworkMessage;

const LEN_SIZE: usize = 4;

/// Largest accepted payload. A full deal is a few KiB.
pub const MAX_FRAME_LEN: u32 = 1024 * 1024;

/// Encode a message into a single frame.
pub fn encode_frame(msg: &NetworkMessage) -> Result<Vec<u8>, FrameEncodeError> {
    let payload = bincode::serialize(msg)?;
    let len = u32::try_from(payload.len()).map_err(|_| FrameEncodeError::TooLarge)?;
    if len > MAX_FRAME_LEN {
        return Err(FrameEncodeError::TooLarge);
    }
    let mut out = Vec::with_capacity(LEN_SIZE + payload.len());
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Error encoding a message into a frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameEncodeError {
    #[error("encode error: {0}")]
    Encode(#[from] bincode::Error),
    #[error("frame too large")]
    TooLarge,
}

/// Decode one frame from the front of `bytes`.
///
/// Returns the message and the number of bytes consumed, or `NeedMore` if
/// the frame is not complete yet.
pub fn decode_frame(bytes: &[u8]) -> Result<(NetworkMessage, usize), FrameDecodeError> {
    let len = frame_len(bytes)?;
    if bytes.len() < LEN_SIZE + len {
        return Err(FrameDecodeError::NeedMore);
    }
    let msg = bincode::deserialize(&bytes[LEN_SIZE..LEN_SIZE + len])?;
    Ok((msg, LEN_SIZE + len))
}

fn frame_len(bytes: &[u8]) -> Result<usize, FrameDecodeError> {
    let Some(prefix) = bytes.get(..LEN_SIZE) else {
        return Err(FrameDecodeError::NeedMore);
    };
    let len = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
    if len > MAX_FRAME_LEN {
        return Err(FrameDecodeError::TooLarge);
    }
    Ok(len as usize)
}

/// Error decoding a frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameDecodeError {
    #[error("need more bytes")]
    NeedMore,
    #[error("frame too large")]
    TooLarge,
    #[error("decode error: {0}")]
    Decode(#[from] bincode::Error),
}

/// Reassembles messages from a byte stream that may split or merge frames.
#[derive(Debug, Default)]
pub struct FrameReader {
    buf: Vec<u8>,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append received bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Bytes held for an incomplete frame.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Pop the next complete message.
    ///
    /// An undecodable frame is dropped and reported, and reading resumes at
    /// the following frame. An oversized length prefix leaves no way to
    /// resync, so the buffer is discarded.
    pub fn next_message(&mut self) -> Option<Result<NetworkMessage, FrameDecodeError>> {
        match decode_frame(&self.buf) {
            Ok((msg, used)) => {
                self.buf.drain(..used);
                Some(Ok(msg))
            }
            Err(FrameDecodeError::NeedMore) => None,
            Err(FrameDecodeError::TooLarge) => {
                self.buf.clear();
                Some(Err(FrameDecodeError::TooLarge))
            }
            Err(err @ FrameDecodeError::Decode(_)) => {
                let skip = frame_len(&self.buf).map_or(self.buf.len(), |len| LEN_SIZE + len);
                self.buf.drain(..skip);
                Some(Err(err))
            }
        }
    }
}
