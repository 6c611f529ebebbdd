//! The capacity-bounded byte stream and its capability handles.

use alloc::vec::Vec;

/// A capacity-bounded, in-order queue of bytes.
///
/// The stream is written at one end and read at the other. It never buffers
/// more than `capacity` bytes at once, but the total number of bytes pushed
/// over its lifetime is unbounded. Writes beyond the available capacity are
/// truncated silently; flow control has to happen upstream, by consulting
/// [`available_capacity`] before producing data.
///
/// The writing and reading halves are usually owned by different parties.
/// The [`writer`] and [`reader`] methods hand out scoped capability handles
/// so each party only sees its own half of the interface.
///
/// [`available_capacity`]: #method.available_capacity
/// [`writer`]: #method.writer
/// [`reader`]: #method.reader
#[derive(Debug)]
pub struct ByteStream {
    buffer: Vec<u8>,
    capacity: u64,
    pushed: u64,
    popped: u64,
    closed: bool,
    finished: bool,
    error: bool,
}

/// The writing capability of a [`ByteStream`].
///
/// [`ByteStream`]: struct.ByteStream.html
#[derive(Debug)]
pub struct Writer<'a> {
    stream: &'a mut ByteStream,
}

/// The reading capability of a [`ByteStream`].
///
/// [`ByteStream`]: struct.ByteStream.html
#[derive(Debug)]
pub struct Reader<'a> {
    stream: &'a mut ByteStream,
}

impl ByteStream {
    /// Create a stream that buffers at most `capacity` bytes at once.
    pub fn new(capacity: u64) -> ByteStream {
        ByteStream {
            buffer: Vec::new(),
            capacity,
            pushed: 0,
            popped: 0,
            closed: false,
            finished: false,
            error: false,
        }
    }

    /// Borrow the writing half.
    pub fn writer(&mut self) -> Writer<'_> {
        Writer { stream: self }
    }

    /// Borrow the reading half.
    pub fn reader(&mut self) -> Reader<'_> {
        Reader { stream: self }
    }

    /// The number of bytes currently buffered.
    pub fn bytes_buffered(&self) -> u64 {
        self.pushed - self.popped
    }

    /// The number of additional bytes the stream can accept right now.
    pub fn available_capacity(&self) -> u64 {
        self.capacity - self.bytes_buffered()
    }

    /// The cumulative number of bytes pushed over the stream's lifetime.
    pub fn bytes_pushed(&self) -> u64 {
        self.pushed
    }

    /// The cumulative number of bytes popped over the stream's lifetime.
    pub fn bytes_popped(&self) -> u64 {
        self.popped
    }

    /// Whether the writing side has signalled the end of the stream.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether the stream is closed and fully drained.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the stream has been marked as erroneous.
    pub fn has_error(&self) -> bool {
        self.error
    }

    /// Mark the stream as erroneous.
    ///
    /// The flag is sticky. It does not affect buffered data.
    pub fn set_error(&mut self) {
        self.error = true;
    }

    fn update_finished(&mut self) {
        if self.closed && self.bytes_buffered() == 0 {
            self.finished = true;
        }
    }
}

impl Writer<'_> {
    /// Append bytes to the stream, up to the available capacity.
    ///
    /// Bytes beyond the available capacity, and any bytes pushed after
    /// [`close`], are discarded.
    ///
    /// [`close`]: #method.close
    pub fn push(&mut self, data: &[u8]) {
        if data.is_empty() || self.stream.closed {
            return;
        }
        let room = self.stream.available_capacity().min(data.len() as u64) as usize;
        self.stream.buffer.extend_from_slice(&data[..room]);
        self.stream.pushed += room as u64;
    }

    /// Signal that nothing more will be written.
    pub fn close(&mut self) {
        self.stream.closed = true;
        self.stream.update_finished();
    }

    /// See [`ByteStream::is_closed`](struct.ByteStream.html#method.is_closed).
    pub fn is_closed(&self) -> bool {
        self.stream.closed
    }

    /// See [`ByteStream::available_capacity`](struct.ByteStream.html#method.available_capacity).
    pub fn available_capacity(&self) -> u64 {
        self.stream.available_capacity()
    }

    /// See [`ByteStream::bytes_pushed`](struct.ByteStream.html#method.bytes_pushed).
    pub fn bytes_pushed(&self) -> u64 {
        self.stream.pushed
    }

    /// See [`ByteStream::set_error`](struct.ByteStream.html#method.set_error).
    pub fn set_error(&mut self) {
        self.stream.set_error()
    }

    /// See [`ByteStream::has_error`](struct.ByteStream.html#method.has_error).
    pub fn has_error(&self) -> bool {
        self.stream.error
    }
}

impl Reader<'_> {
    /// View all currently buffered bytes without consuming them.
    pub fn peek(&self) -> &[u8] {
        &self.stream.buffer
    }

    /// Discard up to `len` buffered bytes from the front of the stream.
    pub fn pop(&mut self, len: u64) {
        let len = len.min(self.stream.bytes_buffered()) as usize;
        self.stream.buffer.drain(..len);
        self.stream.popped += len as u64;
        self.stream.update_finished();
    }

    /// See [`ByteStream::is_finished`](struct.ByteStream.html#method.is_finished).
    pub fn is_finished(&self) -> bool {
        self.stream.finished
    }

    /// See [`ByteStream::bytes_buffered`](struct.ByteStream.html#method.bytes_buffered).
    pub fn bytes_buffered(&self) -> u64 {
        self.stream.bytes_buffered()
    }

    /// See [`ByteStream::bytes_popped`](struct.ByteStream.html#method.bytes_popped).
    pub fn bytes_popped(&self) -> u64 {
        self.stream.popped
    }

    /// See [`ByteStream::set_error`](struct.ByteStream.html#method.set_error).
    pub fn set_error(&mut self) {
        self.stream.set_error()
    }

    /// See [`ByteStream::has_error`](struct.ByteStream.html#method.has_error).
    pub fn has_error(&self) -> bool {
        self.stream.error
    }
}
