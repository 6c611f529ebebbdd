//! Stream reassembly from byte ranges arriving out of order.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::mem;

use super::stream::{ByteStream, Reader, Writer};

/// Restores a contiguous byte stream from ranges arriving in any order.
///
/// Each incoming range is addressed by the absolute stream index of its first
/// byte. Bytes at the next expected index are pushed into the output stream
/// immediately; later ranges are buffered until the gap before them closes.
/// Buffering is limited to the output stream's window, the region between
/// the next expected index and the index that would overflow its capacity.
/// Bytes outside that window are dropped and must be sent again.
///
/// Overlapping and duplicate ranges are fine; every index carries the same
/// byte in all copies, so overlaps merge bytewise without conflict.
#[derive(Debug)]
pub struct Reassembler {
    output: ByteStream,
    next_index: u64,
    end_index: Option<u64>,
    // Buffered out-of-order ranges, keyed by first index.
    // Non-adjacent and non-overlapping after each insert.
    pending: BTreeMap<u64, Vec<u8>>,
}

impl Reassembler {
    /// Create a reassembler feeding the given stream.
    pub fn new(output: ByteStream) -> Reassembler {
        Reassembler {
            output,
            next_index: 0,
            end_index: None,
            pending: BTreeMap::new(),
        }
    }

    /// Accept a range of bytes starting at stream index `first_index`.
    ///
    /// `is_last` marks the range as ending at the final byte of the stream;
    /// once everything up to that byte has been assembled, the output stream
    /// is closed.
    pub fn insert(&mut self, first_index: u64, data: &[u8], is_last: bool) {
        if is_last {
            self.end_index = Some(first_index + data.len() as u64);
        }

        let available = self.output.available_capacity();
        if self.output.is_closed() || available == 0 {
            return;
        }

        let end = first_index + data.len() as u64;
        if first_index <= self.next_index {
            if end <= self.next_index {
                // Entirely stale. A stale range can still be the last one,
                // in which case the whole stream has been assembled already.
                if is_last {
                    self.finish();
                }
                return;
            }
            let skip = (self.next_index - first_index) as usize;
            let room = (data.len() - skip).min(available as usize);
            let chunk = &data[skip..skip + room];
            self.output.writer().push(chunk);
            self.next_index += chunk.len() as u64;
            self.drain_pending();
            if self.end_index == Some(self.next_index) {
                self.finish();
            }
        } else {
            // A range beyond the next expected index. Drop what falls
            // outside the window, buffer the rest for later.
            let window_end = self.next_index + available;
            if first_index >= window_end {
                return;
            }
            if let Some(existing) = self.pending.get(&first_index) {
                if existing.len() >= data.len() {
                    return;
                }
            }
            let room = (data.len() as u64).min(window_end - first_index) as usize;
            self.pending.insert(first_index, data[..room].to_vec());
            self.merge_pending();
        }
    }

    /// The number of bytes buffered but not yet part of the output stream.
    pub fn bytes_pending(&self) -> u64 {
        self.pending.values().map(|range| range.len() as u64).sum()
    }

    /// The stream index the next pushed byte will occupy.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Access the output stream.
    pub fn stream(&self) -> &ByteStream {
        &self.output
    }

    /// Borrow the reading half of the output stream.
    pub fn reader(&mut self) -> Reader<'_> {
        self.output.reader()
    }

    /// Borrow the writing half of the output stream.
    pub fn writer(&mut self) -> Writer<'_> {
        self.output.writer()
    }

    // Move newly contiguous pending ranges into the output stream.
    //
    // Pending ranges never extend past the stream's window, so these pushes
    // are never truncated.
    fn drain_pending(&mut self) {
        while let Some((&first_index, range)) = self.pending.iter().next() {
            let end = first_index + range.len() as u64;
            if end <= self.next_index {
                self.pending.remove(&first_index);
            } else if first_index <= self.next_index {
                let skip = (self.next_index - first_index) as usize;
                let pushed = (range.len() - skip) as u64;
                let range = self.pending.remove(&first_index).unwrap_or_default();
                self.output.writer().push(&range[skip..]);
                self.next_index += pushed;
            } else {
                break;
            }
        }
    }

    // Coalesce adjacent and overlapping pending ranges.
    fn merge_pending(&mut self) {
        let mut ranges = mem::take(&mut self.pending).into_iter();
        let mut current = match ranges.next() {
            Some(range) => range,
            None => return,
        };
        for (first_index, range) in ranges {
            let current_end = current.0 + current.1.len() as u64;
            if current_end >= first_index {
                let range_end = first_index + range.len() as u64;
                if range_end > current_end {
                    current.1.extend_from_slice(&range[(current_end - first_index) as usize..]);
                }
            } else {
                self.pending.insert(current.0, current.1);
                current = (first_index, range);
            }
        }
        self.pending.insert(current.0, current.1);
    }

    fn finish(&mut self) {
        self.output.writer().close();
        self.pending.clear();
    }
}
