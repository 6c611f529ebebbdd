//! Zero-copy packet representations.
//!
//! Each protocol is represented on two levels:
//!
//! - An unsized byte wrapper (`ethernet_frame`, `arp_packet`, `ipv4_packet`)
//!   that reinterprets a byte slice in place and offers field accessors. The
//!   `new_checked` constructors validate lengths; the accessors themselves
//!   never panic on a checked buffer.
//! - A high-level `Repr` struct that owns the parsed header fields and can be
//!   emitted back into a buffer.
//!
//! The TCP module is different in kind: segments of the TCP state machines in
//! [`crate::layer::tcp`] travel as in-memory messages, so `tcp` only provides
//! the 32-bit sequence number arithmetic.

mod error;
pub mod arp;
pub mod ethernet;
pub mod ipv4;
pub mod tcp;

pub use self::error::{Error, Result};

pub use self::arp::{arp_packet, Operation as ArpOperation, Repr as ArpRepr};
pub use self::ethernet::{
    ethernet_frame, Address as EthernetAddress, EtherType, Repr as EthernetRepr,
};
pub use self::ipv4::{
    ipv4_packet, Address as Ipv4Address, Protocol as IpProtocol, Repr as Ipv4Repr,
};
pub use self::tcp::SeqNum;

mod field {
    pub(crate) type Field = core::ops::Range<usize>;
    pub(crate) type Rest = core::ops::RangeFrom<usize>;
}
