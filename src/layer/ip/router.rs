use alloc::vec::Vec;

use crate::layer::{Error, Result};
use crate::layer::eth::Interface;
use crate::time::Duration;
use crate::wire::{ipv4_packet, Ipv4Address};

use super::route::{Route, Routes};

/// A router moving IPv4 datagrams between Ethernet interfaces.
///
/// The router owns its interfaces. Frames received by an interface queue up
/// inside it; each [`route`] call drains those queues and forwards every
/// datagram out the interface its longest matching prefix names, with the
/// time to live decremented and the header checksum rewritten. Datagrams
/// that match no route or arrive with an expended time to live are dropped,
/// without ICMP notifications to their senders.
///
/// [`route`]: #method.route
#[derive(Debug, Default)]
pub struct Router {
    interfaces: Vec<Interface>,
    routes: Routes,
}

impl Router {
    /// Create a router with no interfaces and an empty routing table.
    pub fn new() -> Router {
        Router::default()
    }

    /// Attach an interface, returning its index for use in routes.
    pub fn add_interface(&mut self, interface: Interface) -> usize {
        self.interfaces.push(interface);
        self.interfaces.len() - 1
    }

    /// Access an attached interface.
    pub fn interface_mut(&mut self, index: usize) -> Option<&mut Interface> {
        self.interfaces.get_mut(index)
    }

    /// Add a route sending `prefix`/`prefix_len` out of the interface at
    /// `interface`, addressed to `next_hop` unless directly attached.
    pub fn add_route(
        &mut self,
        prefix: Ipv4Address,
        prefix_len: u8,
        next_hop: Option<Ipv4Address>,
        interface: usize,
    ) -> Result<()> {
        if interface >= self.interfaces.len() {
            return Err(Error::NoInterface);
        }
        net_debug!("route {}/{} on interface {}", prefix, prefix_len, interface);
        self.routes.add_route(Route { prefix, prefix_len, next_hop, interface });
        Ok(())
    }

    /// Report `elapsed` time to every attached interface.
    pub fn tick(&mut self, elapsed: Duration) {
        for interface in &mut self.interfaces {
            interface.tick(elapsed);
        }
    }

    /// Forward every datagram queued in any attached interface.
    pub fn route(&mut self) {
        for index in 0..self.interfaces.len() {
            while let Some(datagram) = self.interfaces[index].datagrams_received().pop_front() {
                self.forward(datagram);
            }
        }
    }

    fn forward(&mut self, mut datagram: Vec<u8>) {
        let dst_addr = {
            // The queue is writable by the driver, so its contents cannot
            // be trusted to hold a full header.
            let packet = match ipv4_packet::new_checked_mut(&mut datagram) {
                Ok(packet) => packet,
                Err(_) => {
                    net_trace!("dropping malformed datagram");
                    return;
                }
            };
            let hop_limit = packet.hop_limit();
            if hop_limit <= 1 {
                net_trace!("dropping datagram to {}, time to live expended", packet.dst_addr());
                return;
            }
            packet.set_hop_limit(hop_limit - 1);
            packet.fill_checksum();
            packet.dst_addr()
        };

        let route = match self.routes.lookup(dst_addr) {
            Some(route) => route,
            None => {
                net_trace!("dropping datagram to {}, no route", dst_addr);
                return;
            }
        };
        let next_hop = route.next_hop.unwrap_or(dst_addr);
        self.interfaces[route.interface].send_datagram(datagram, next_hop);
    }
}
