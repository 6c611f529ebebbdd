//! The Ethernet link layer.
//!
//! An [`Interface`] turns IPv4 datagrams into Ethernet frames and back. Next
//! hops are resolved to hardware addresses with ARP; datagrams for not yet
//! resolved hops wait inside the interface until a reply arrives.
//!
//! [`Interface`]: struct.Interface.html

mod interface;
mod neighbor;

pub use self::interface::{Interface, OutputPort};
pub use self::neighbor::NeighborCache;
