use crate::storage::{Reassembler, Reader};
use crate::wire::SeqNum;

use super::{ReceiverMessage, SenderMessage};

/// The receiving endpoint of a TCP connection.
///
/// Translates arriving segments into reassembler inserts and reports the
/// state of the inbound stream back to the peer: the next needed sequence
/// number and the free buffer space. Until a SYN establishes the zero point
/// of the sequence space, data segments cannot be placed and are dropped.
#[derive(Debug)]
pub struct Receiver {
    reassembler: Reassembler,
    isn: Option<SeqNum>,
}

impl Receiver {
    /// Create a receiver feeding the given reassembler.
    pub fn new(reassembler: Reassembler) -> Receiver {
        Receiver { reassembler, isn: None }
    }

    /// Process one arriving segment.
    pub fn receive(&mut self, message: SenderMessage) {
        if message.rst {
            self.reassembler.reader().set_error();
            return;
        }
        if message.syn {
            self.isn = Some(message.seqno);
        }
        let isn = match self.isn {
            Some(isn) => isn,
            None => return,
        };

        // The first unassembled byte is the best guess for where this
        // segment sits in sequence space.
        let checkpoint = self.reassembler.stream().bytes_pushed() + 1;
        let mut seqno = message.seqno.unwrap(isn, checkpoint);
        if message.syn {
            // The SYN occupies the sequence number itself; payload bytes
            // start one past it.
            seqno += 1;
        } else if seqno == 0 {
            // A segment claiming the SYN's own sequence number without the
            // flag carries no stream data.
            return;
        }
        self.reassembler.insert(seqno - 1, &message.payload, message.fin);
    }

    /// Describe the current state of the inbound stream to the peer.
    pub fn send(&self) -> ReceiverMessage {
        let stream = self.reassembler.stream();
        let ackno = self.isn.map(|isn| {
            let mut next = stream.bytes_pushed() + 1;
            if stream.is_closed() {
                // The assembled FIN occupies one sequence number as well.
                next += 1;
            }
            SeqNum::wrap(next, isn)
        });
        let window_size = stream.available_capacity().min(u64::from(u16::max_value())) as u16;
        ReceiverMessage {
            ackno,
            window_size,
            rst: stream.has_error(),
        }
    }

    /// The number of bytes buffered out of order.
    pub fn bytes_pending(&self) -> u64 {
        self.reassembler.bytes_pending()
    }

    /// Borrow the reading half of the inbound stream.
    pub fn reader(&mut self) -> Reader<'_> {
        self.reassembler.reader()
    }
}
