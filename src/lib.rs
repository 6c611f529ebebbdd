//! A user-space TCP/IP data plane.
//!
//! `brook` implements the data-carrying half of a TCP/IP stack as a library:
//! reliable, flow-controlled byte streams over an unreliable datagram service,
//! datagram delivery over Ethernet with address resolution, and datagram
//! forwarding between networks. There are no sockets, no threads and no
//! timers; the host environment owns the event loop and the clock, and drives
//! the stack by calling into it.
//!
//! The crate is split along the same lines as the protocols themselves:
//!
//! - [`storage`] holds the protocol-independent stream machinery: a
//!   capacity-bounded [`ByteStream`] and the [`Reassembler`] that restores
//!   stream order from segments arriving out of order.
//! - [`wire`] contains zero-copy representations of Ethernet, ARP and IPv4
//!   packets, and the 32-bit [`SeqNum`] arithmetic of TCP.
//! - [`layer`] contains the stateful endpoints: the TCP [`Receiver`] and
//!   [`Sender`], the Ethernet [`Interface`] and the IP [`Router`].
//! - [`time`] provides the millisecond clock representation shared by all
//!   time-dependent state machines.
//!
//! All time-dependent behavior is driven by explicit `tick` calls reporting
//! elapsed milliseconds, which makes every component fully deterministic and
//! testable without a live network or clock.
//!
//! [`ByteStream`]: storage/struct.ByteStream.html
//! [`Reassembler`]: storage/struct.Reassembler.html
//! [`SeqNum`]: wire/struct.SeqNum.html
//! [`Receiver`]: layer/tcp/struct.Receiver.html
//! [`Sender`]: layer/tcp/struct.Sender.html
//! [`Interface`]: layer/eth/struct.Interface.html
//! [`Router`]: layer/ip/struct.Router.html
#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod macros;

pub mod layer;
pub mod storage;
pub mod time;
pub mod wire;
