//! The TCP endpoints.
//!
//! [`Sender`] and [`Receiver`] implement the two directions of a TCP
//! connection's data transfer, decoupled from any packetization: segments
//! travel as in-memory [`SenderMessage`] values, acknowledgments as
//! [`ReceiverMessage`] values. A connection layer owning one of each, or a
//! test harness, moves the messages between peers.
//!
//! [`Sender`]: struct.Sender.html
//! [`Receiver`]: struct.Receiver.html
//! [`SenderMessage`]: struct.SenderMessage.html
//! [`ReceiverMessage`]: struct.ReceiverMessage.html

mod receiver;
mod sender;

pub use self::receiver::Receiver;
pub use self::sender::Sender;

use alloc::vec::Vec;

use crate::wire::SeqNum;

/// The largest payload carried in a single segment message.
pub const MAX_PAYLOAD_SIZE: usize = 1000;

/// A segment in the sender-to-receiver direction.
///
/// The `syn` and `fin` flags each occupy one position in sequence space,
/// before and after the payload respectively. `rst` occupies none.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SenderMessage {
    /// The sequence number of the first sequence-occupying element.
    pub seqno: SeqNum,
    /// Marks the beginning of the stream.
    pub syn: bool,
    /// The carried bytes.
    pub payload: Vec<u8>,
    /// Marks the end of the stream.
    pub fin: bool,
    /// Signals that the connection suffered an unrecoverable error.
    pub rst: bool,
}

impl SenderMessage {
    /// The number of sequence numbers this segment occupies.
    pub fn sequence_length(&self) -> u64 {
        self.payload.len() as u64 + u64::from(self.syn) + u64::from(self.fin)
    }
}

/// The acknowledgment in the receiver-to-sender direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReceiverMessage {
    /// The next sequence number the receiver expects, if any was established.
    pub ackno: Option<SeqNum>,
    /// How many more bytes the receiver is willing to buffer.
    pub window_size: u16,
    /// Signals that the connection suffered an unrecoverable error.
    pub rst: bool,
}
