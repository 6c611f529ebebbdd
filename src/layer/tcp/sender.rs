use alloc::collections::BTreeMap;

use crate::storage::{ByteStream, Writer};
use crate::time::{Duration, Instant};
use crate::wire::SeqNum;

use super::{ReceiverMessage, SenderMessage, MAX_PAYLOAD_SIZE};

/// The sending endpoint of a TCP connection.
///
/// Reads the outbound stream and cuts it into segments, keeping no more
/// in flight than the peer's advertised window allows. Every transmitted
/// segment stays tracked until it is acknowledged; one retransmission timer
/// covers the oldest outstanding segment, with exponential backoff on every
/// expiry while the peer has window space.
///
/// A window size of zero is treated as one, so a single byte keeps probing
/// the peer and its window updates keep flowing back. Retransmissions forced
/// by such probing neither double the timeout nor count as consecutive
/// retransmissions.
#[derive(Debug)]
pub struct Sender {
    input: ByteStream,
    isn: SeqNum,
    timer: Timer,
    window_size: u16,
    // Absolute sequence number expected in the next acknowledgment,
    // the checkpoint for unwrapping acknowledgment numbers.
    expected_ackno: u64,
    syn_sent: bool,
    fin_sent: bool,
}

impl Sender {
    /// Create a sender draining the given stream.
    ///
    /// Sequence numbers are anchored at `isn` and the retransmission timeout
    /// starts at `initial_rto`, doubling on backoff.
    pub fn new(input: ByteStream, isn: SeqNum, initial_rto: Duration) -> Sender {
        Sender {
            input,
            isn,
            timer: Timer::new(initial_rto),
            window_size: 1,
            expected_ackno: 0,
            syn_sent: false,
            fin_sent: false,
        }
    }

    /// Cut as many segments from the stream as the peer's window allows.
    ///
    /// Each produced segment is handed to `transmit` and tracked for
    /// retransmission.
    pub fn push<F>(&mut self, mut transmit: F)
    where
        F: FnMut(&SenderMessage),
    {
        if self.input.bytes_buffered() == 0 && !self.syn_sent {
            let mut message = SenderMessage {
                seqno: self.isn,
                syn: true,
                ..SenderMessage::default()
            };
            if self.input.is_finished() {
                message.fin = true;
                self.fin_sent = true;
            }
            if self.input.has_error() {
                message.rst = true;
            }
            transmit(&message);
            self.syn_sent = true;
            self.timer.track(0, message);
            return;
        }

        let mut in_flight = self.timer.sequence_numbers_in_flight();
        let window = u64::from(self.window_size).max(1);

        while in_flight < window && self.input.bytes_buffered() > 0 {
            let absolute = self.input.bytes_popped();
            let mut message = SenderMessage {
                seqno: SeqNum::wrap(absolute + 1, self.isn),
                ..SenderMessage::default()
            };
            let mut len = (self.input.bytes_buffered().min(window - in_flight) as usize)
                .min(MAX_PAYLOAD_SIZE);
            if !self.syn_sent {
                message.syn = true;
                message.seqno = self.isn;
                // The SYN occupies one of the window's sequence numbers.
                if len as u64 == window {
                    len -= 1;
                }
                self.syn_sent = true;
            }
            message.payload = self.input.reader().peek()[..len].to_vec();
            self.input.reader().pop(len as u64);
            if self.input.is_finished() && window - message.payload.len() as u64 > 0 {
                message.fin = true;
                self.fin_sent = true;
            }
            if self.input.has_error() {
                message.rst = true;
            }
            transmit(&message);
            let tracked_at = message.seqno.unwrap(self.isn, absolute);
            in_flight += message.sequence_length();
            self.expected_ackno = self.expected_ackno.max(tracked_at + 1);
            self.timer.track(tracked_at, message);
        }

        if self.input.is_finished() && !self.fin_sent && window > in_flight {
            let message = SenderMessage {
                seqno: SeqNum::wrap(self.input.bytes_popped() + 1, self.isn),
                fin: true,
                rst: self.input.has_error(),
                ..SenderMessage::default()
            };
            transmit(&message);
            let tracked_at = self.input.bytes_popped() + 1;
            self.timer.track(tracked_at, message);
            self.fin_sent = true;
        }
    }

    /// Produce a zero-length segment reporting the current sequence number.
    ///
    /// The segment occupies no sequence space and is not tracked; it exists
    /// so acknowledgments and resets can be sent outside the data flow.
    pub fn make_empty_message(&self) -> SenderMessage {
        let mut next = self.input.bytes_popped() + u64::from(self.syn_sent);
        if self.fin_sent {
            next += 1;
        }
        SenderMessage {
            seqno: SeqNum::wrap(next, self.isn),
            rst: self.input.has_error(),
            ..SenderMessage::default()
        }
    }

    /// Process an acknowledgment from the peer.
    pub fn receive(&mut self, message: &ReceiverMessage) {
        if message.rst {
            self.input.set_error();
            return;
        }
        self.window_size = message.window_size;
        let ackno = match message.ackno {
            Some(ackno) => ackno.unwrap(self.isn, self.expected_ackno),
            None => return,
        };
        let sent = self.input.bytes_popped() + u64::from(self.syn_sent) + u64::from(self.fin_sent);
        if ackno > sent {
            // Acknowledgment for something never sent.
            return;
        }
        self.expected_ackno = self.timer.acknowledge(ackno).max(self.expected_ackno);
    }

    /// Report `elapsed` milliseconds of passed time.
    ///
    /// Retransmits the oldest outstanding segment if the retransmission
    /// timer has expired.
    pub fn tick<F>(&mut self, elapsed: Duration, mut transmit: F)
    where
        F: FnMut(&SenderMessage),
    {
        let window_stalled = self.window_size == 0;
        self.timer.tick(elapsed, &mut transmit, window_stalled);
    }

    /// The number of sequence numbers sent but not yet acknowledged.
    pub fn sequence_numbers_in_flight(&self) -> u64 {
        self.timer.sequence_numbers_in_flight()
    }

    /// The number of consecutive retransmissions of the oldest segment.
    pub fn consecutive_retransmissions(&self) -> u64 {
        self.timer.retransmissions
    }

    /// Borrow the writing half of the outbound stream.
    pub fn writer(&mut self) -> Writer<'_> {
        self.input.writer()
    }

    /// Access the outbound stream.
    pub fn stream(&self) -> &ByteStream {
        &self.input
    }
}

/// The retransmission machinery: outstanding segments and the single timer.
#[derive(Debug)]
struct Timer {
    // Outstanding segments keyed by absolute sequence number.
    outstanding: BTreeMap<u64, SenderMessage>,
    initial_rto: Duration,
    rto: Duration,
    retransmissions: u64,
    running: bool,
    started_at: Instant,
    clock: Instant,
}

impl Timer {
    fn new(initial_rto: Duration) -> Timer {
        Timer {
            outstanding: BTreeMap::new(),
            initial_rto,
            rto: initial_rto,
            retransmissions: 0,
            running: false,
            started_at: Instant::default(),
            clock: Instant::default(),
        }
    }

    fn restart(&mut self) {
        self.running = true;
        self.started_at = self.clock;
    }

    fn track(&mut self, absolute: u64, message: SenderMessage) {
        self.outstanding.insert(absolute, message);
        if !self.running {
            self.rto = self.initial_rto;
            self.restart();
        }
    }

    fn sequence_numbers_in_flight(&self) -> u64 {
        self.outstanding.values().map(SenderMessage::sequence_length).sum()
    }

    // Drop every segment fully covered by `ackno`. Any progress restarts
    // the timer from the initial timeout. Returns the next absolute
    // sequence number the peer is expected to acknowledge.
    fn acknowledge(&mut self, ackno: u64) -> u64 {
        while let Some((&absolute, message)) = self.outstanding.iter().next() {
            let end = absolute + message.sequence_length();
            if end > ackno {
                return end;
            }
            self.outstanding.remove(&absolute);
            self.retransmissions = 0;
            self.rto = self.initial_rto;
            self.restart();
        }
        self.running = false;
        ackno
    }

    fn tick(&mut self, elapsed: Duration, transmit: &mut dyn FnMut(&SenderMessage), window_stalled: bool) {
        self.clock += elapsed;
        if !self.running || self.clock - self.started_at < self.rto {
            return;
        }
        if let Some(oldest) = self.outstanding.values().next() {
            transmit(oldest);
            if !window_stalled {
                self.retransmissions += 1;
                self.rto = self.rto * 2;
            }
            self.restart();
        }
    }
}
