//! The data channel the synchronizer talks through.
//!
//! The transport itself (signaling, WebRTC, TCP, ...) lives outside the
//! crate. Embeddings hand the synchronizer a `Connection` and forward its
//! open/data/close/error events.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::Write;
use std::rc::Rc;

use super::error::ConnectionError;
use super::protocol::NetworkMessage;
use super::wire::encode_frame;

/// An ordered, reliable, message-oriented channel to the peer.
pub trait Connection {
    /// The remote party's signaling id.
    fn peer_id(&self) -> &str;

    /// Queue a message for the peer.
    fn send(&mut self, message: &NetworkMessage) -> Result<(), ConnectionError>;

    /// Close the channel. Further sends fail.
    fn close(&mut self);
}

/// In-process channel: sent messages collect in a shared outbox.
///
/// Clones share the outbox, so an embedding (or a test harness) keeps one
/// handle to drain and deliver while the synchronizer owns another.
#[derive(Clone, Debug)]
pub struct MemoryConnection {
    peer: String,
    outbox: Rc<RefCell<VecDeque<NetworkMessage>>>,
    open: Rc<Cell<bool>>,
}

impl MemoryConnection {
    pub fn new(peer: impl Into<String>) -> Self {
        Self {
            peer: peer.into(),
            outbox: Rc::default(),
            open: Rc::new(Cell::new(true)),
        }
    }

    /// Take every message sent so far, oldest first.
    pub fn drain(&self) -> Vec<NetworkMessage> {
        self.outbox.borrow_mut().drain(..).collect()
    }

    /// Messages waiting in the outbox.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.outbox.borrow().len()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.get()
    }
}

impl Connection for MemoryConnection {
    fn peer_id(&self) -> &str {
        &self.peer
    }

    fn send(&mut self, message: &NetworkMessage) -> Result<(), ConnectionError> {
        if !self.open.get() {
            return Err(ConnectionError::Closed);
        }
        self.outbox.borrow_mut().push_back(message.clone());
        Ok(())
    }

    fn close(&mut self) {
        self.open.set(false);
    }
}

/// A byte stream carrying length-prefixed frames.
#[derive(Debug)]
pub struct FramedConnection<W: Write> {
    peer: String,
    writer: W,
    open: bool,
}

impl<W: Write> FramedConnection<W> {
    pub fn new(peer: impl Into<String>, writer: W) -> Self {
        Self {
            peer: peer.into(),
            writer,
            open: true,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Connection for FramedConnection<W> {
    fn peer_id(&self) -> &str {
        &self.peer
    }

    fn send(&mut self, message: &NetworkMessage) -> Result<(), ConnectionError> {
        if !self.open {
            return Err(ConnectionError::Closed);
        }
        let frame = encode_frame(message).map_err(|e| ConnectionError::Channel(e.to_string()))?;
        self.writer
            .write_all(&frame)
            .and_then(|()| self.writer.flush())
            .map_err(|e| ConnectionError::Network(e.to_string()))
    }

    fn close(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::wire::FrameReader;

    #[test]
    fn test_memory_outbox_is_shared() {
        let handle = MemoryConnection::new("host-1");
        let mut conn = handle.clone();
        conn.send(&NetworkMessage::Ready).unwrap();
        conn.send(&NetworkMessage::NextRound { round: 1 }).unwrap();

        assert_eq!(handle.pending(), 2);
        assert_eq!(
            handle.drain(),
            vec![NetworkMessage::Ready, NetworkMessage::NextRound { round: 1 }]
        );
        assert_eq!(handle.pending(), 0);
    }

    #[test]
    fn test_memory_send_after_close_fails() {
        let mut conn = MemoryConnection::new("host-1");
        conn.close();
        assert!(!conn.is_open());
        assert_eq!(conn.send(&NetworkMessage::Ready), Err(ConnectionError::Closed));
    }

    #[test]
    fn test_framed_writes_decodable_frames() {
        let mut conn = FramedConnection::new("peer", Vec::new());
        conn.send(&NetworkMessage::Ready).unwrap();
        conn.send(&NetworkMessage::Restart).unwrap();

        let mut reader = FrameReader::new();
        reader.extend(conn.get_ref());
        assert!(matches!(reader.next_message(), Some(Ok(NetworkMessage::Ready))));
        assert!(matches!(reader.next_message(), Some(Ok(NetworkMessage::Restart))));
        assert_eq!(conn.peer_id(), "peer");
    }
}
