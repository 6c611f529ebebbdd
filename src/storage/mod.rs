//! Stream storage independent of any particular protocol.
//!
//! [`ByteStream`] is a capacity-bounded, in-order byte queue with distinct
//! write and read capabilities. [`Reassembler`] sits in front of a stream and
//! restores its order from byte ranges that arrive out of order, as segments
//! of a transport protocol do.
//!
//! [`ByteStream`]: struct.ByteStream.html
//! [`Reassembler`]: struct.Reassembler.html

pub mod assembler;
pub mod stream;

pub use self::assembler::Reassembler;
pub use self::stream::{ByteStream, Reader, Writer};
