use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::{vec, vec::Vec};
use core::fmt;

use crate::time::{Duration, Instant};
use crate::wire::{
    arp_packet, ethernet_frame, ipv4_packet, ArpOperation, ArpRepr, EtherType, EthernetAddress,
    EthernetRepr, Ipv4Address, Ipv4Repr,
};

use super::neighbor::NeighborCache;

/// The transmitting side of a link device.
///
/// An implementation takes ownership of one fully serialized Ethernet frame
/// at a time. It is implemented for any `FnMut(Vec<u8>)` closure, which is
/// usually all a test or a simulated link needs.
pub trait OutputPort {
    /// Hand one serialized frame to the underlying device.
    fn transmit(&mut self, frame: Vec<u8>);
}

impl<F: FnMut(Vec<u8>)> OutputPort for F {
    fn transmit(&mut self, frame: Vec<u8>) {
        self(frame)
    }
}

/// A network interface connecting the IP layer to an Ethernet link.
///
/// Outgoing datagrams are framed and sent to the port once the hardware
/// address of their next hop is known; until then they wait inside the
/// interface while ARP resolves the hop. Incoming frames are filtered by
/// destination address, incoming ARP traffic is answered and harvested for
/// mappings, and incoming datagrams pile up in a queue for the network
/// layer to drain.
pub struct Interface {
    name: String,
    port: Box<dyn OutputPort>,
    hardware_addr: EthernetAddress,
    ip_addr: Ipv4Address,
    neighbors: NeighborCache,
    // Datagrams waiting for their next hop to resolve.
    waiting: Vec<(Vec<u8>, Ipv4Address)>,
    received: VecDeque<Vec<u8>>,
    now: Instant,
}

impl Interface {
    /// Create an interface with the given addresses, transmitting on `port`.
    pub fn new(
        name: &str,
        port: Box<dyn OutputPort>,
        hardware_addr: EthernetAddress,
        ip_addr: Ipv4Address,
    ) -> Interface {
        net_debug!("interface {} has link address {}, ip address {}",
                   name, hardware_addr, ip_addr);
        Interface {
            name: String::from(name),
            port,
            hardware_addr,
            ip_addr,
            neighbors: NeighborCache::new(),
            waiting: Vec::new(),
            received: VecDeque::new(),
            now: Instant::default(),
        }
    }

    /// The name of the interface.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The hardware address of the interface.
    pub fn hardware_addr(&self) -> EthernetAddress {
        self.hardware_addr
    }

    /// The IP address of the interface.
    pub fn ip_addr(&self) -> Ipv4Address {
        self.ip_addr
    }

    /// Send an IPv4 datagram, resolving `next_hop` on the way.
    ///
    /// If the hardware address of the hop is not cached, the datagram waits
    /// and an ARP request goes out in its place, unless one is already
    /// outstanding.
    pub fn send_datagram(&mut self, datagram: Vec<u8>, next_hop: Ipv4Address) {
        if let Some(hardware_addr) = self.neighbors.lookup(next_hop) {
            let frame = self.frame(hardware_addr, EtherType::Ipv4, &datagram);
            self.port.transmit(frame);
            return;
        }

        self.waiting.push((datagram, next_hop));
        if self.neighbors.is_requesting(next_hop, self.now) {
            return;
        }
        net_trace!("{}: who has {}?", self.name, next_hop);
        let request = ArpRepr {
            operation: ArpOperation::Request,
            source_hardware_addr: self.hardware_addr,
            source_protocol_addr: self.ip_addr,
            target_hardware_addr: EthernetAddress::default(),
            target_protocol_addr: next_hop,
        };
        let frame = self.frame_arp(EthernetAddress::BROADCAST, &request);
        self.port.transmit(frame);
        self.neighbors.set_requesting(next_hop, self.now);
    }

    /// Process one frame arriving from the link.
    ///
    /// Frames not addressed to this interface, and frames that do not parse,
    /// are dropped silently.
    pub fn recv_frame(&mut self, frame: &[u8]) {
        let frame = match ethernet_frame::new_checked(frame) {
            Ok(frame) => frame,
            Err(_) => return,
        };
        let dst_addr = frame.dst_addr();
        if dst_addr != self.hardware_addr && !dst_addr.is_broadcast() {
            return;
        }

        match frame.ethertype() {
            EtherType::Ipv4 => {
                // The whole header has to hold up, checksum included; a
                // corrupted datagram never reaches the network layer.
                if Ipv4Repr::parse(ipv4_packet::new_unchecked(frame.payload_slice())).is_ok() {
                    self.received.push_back(frame.payload_slice().to_vec());
                }
            }
            EtherType::Arp => {
                let repr = arp_packet::new_checked(frame.payload_slice())
                    .and_then(ArpRepr::parse);
                match repr {
                    Ok(repr) => self.process_arp(repr),
                    Err(_) => (),
                }
            }
            EtherType::Unknown(_) => (),
        }
    }

    /// Report `elapsed` time.
    ///
    /// Ages out neighbor mappings and gives up on datagrams whose address
    /// resolution went unanswered for its full lifetime.
    pub fn tick(&mut self, elapsed: Duration) {
        self.now += elapsed;
        let failed = self.neighbors.expire(self.now);
        if !failed.is_empty() {
            net_trace!("{}: giving up on {} unresolved hops", self.name, failed.len());
            self.waiting.retain(|(_, next_hop)| !failed.contains(next_hop));
        }
    }

    /// The queue of received IPv4 datagrams, to be drained by the caller.
    pub fn datagrams_received(&mut self) -> &mut VecDeque<Vec<u8>> {
        &mut self.received
    }

    fn process_arp(&mut self, repr: ArpRepr) {
        // Both requests and replies carry a usable sender mapping.
        self.neighbors.fill(repr.source_protocol_addr, repr.source_hardware_addr, self.now);
        self.neighbors.clear_request(repr.source_protocol_addr);

        let resolved = repr.source_protocol_addr;
        let (ready, waiting): (Vec<_>, Vec<_>) = core::mem::take(&mut self.waiting)
            .into_iter()
            .partition(|entry| entry.1 == resolved);
        self.waiting = waiting;
        for (datagram, next_hop) in ready {
            self.send_datagram(datagram, next_hop);
        }

        if repr.operation == ArpOperation::Request && repr.target_protocol_addr == self.ip_addr {
            let reply = ArpRepr {
                operation: ArpOperation::Reply,
                source_hardware_addr: self.hardware_addr,
                source_protocol_addr: self.ip_addr,
                target_hardware_addr: repr.source_hardware_addr,
                target_protocol_addr: repr.source_protocol_addr,
            };
            let frame = self.frame_arp(repr.source_hardware_addr, &reply);
            self.port.transmit(frame);
        }
    }

    fn frame(&self, dst_addr: EthernetAddress, ethertype: EtherType, payload: &[u8]) -> Vec<u8> {
        let mut buffer = vec![0; ethernet_frame::buffer_len(payload.len())];
        let frame = ethernet_frame::new_unchecked_mut(&mut buffer);
        let header = EthernetRepr { dst_addr, src_addr: self.hardware_addr, ethertype };
        header.emit(frame);
        frame.payload_mut_slice().copy_from_slice(payload);
        buffer
    }

    fn frame_arp(&self, dst_addr: EthernetAddress, repr: &ArpRepr) -> Vec<u8> {
        let mut payload = vec![0; repr.buffer_len()];
        repr.emit(arp_packet::new_unchecked_mut(&mut payload));
        self.frame(dst_addr, EtherType::Arp, &payload)
    }
}

impl fmt::Debug for Interface {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Interface")
            .field("name", &self.name)
            .field("hardware_addr", &self.hardware_addr)
            .field("ip_addr", &self.ip_addr)
            .field("waiting", &self.waiting.len())
            .field("received", &self.received.len())
            .finish()
    }
}
