//! Online play: wire protocol, framing, connection seam, and the
//! host-authoritative synchronizer.

pub mod protocol;
pub mod wire;
pub mod error;
pub mod connection;
pub mod sync;

pub use protocol::NetworkMessage;
pub use wire::{decode_frame, encode_frame, FrameDecodeError, FrameEncodeError, FrameReader, MAX_FRAME_LEN};
pub use error::{ConnectionError, ProtocolError, SyncError};
pub use connection::{Connection, FramedConnection, MemoryConnection};
pub use sync::{ConnectionStatus, NetworkSynchronizer, Notice};
