use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::layer::Error;
use crate::layer::eth::Interface;
use crate::wire::{
    arp_packet, ethernet_frame, ipv4_packet, ArpOperation, ArpRepr, EtherType, EthernetAddress,
    EthernetRepr, IpProtocol, Ipv4Address, Ipv4Repr,
};

type Sink = Rc<RefCell<Vec<Vec<u8>>>>;

fn interface(index: u8) -> (Interface, Sink) {
    let sent: Sink = Rc::new(RefCell::new(Vec::new()));
    let port = {
        let sent = sent.clone();
        move |frame| sent.borrow_mut().push(frame)
    };
    let interface = Interface::new(
        &format!("eth{}", index),
        Box::new(port),
        EthernetAddress([2, 0, 0, 0, 0, index]),
        Ipv4Address([10, index, 0, 1]),
    );
    (interface, sent)
}

// A router with three interfaces: a default route via a gateway on eth0,
// a /16 via a gateway on eth1 and a directly attached /24 on eth2.
fn router() -> (Router, [Sink; 3]) {
    let (eth0, sink0) = interface(0);
    let (eth1, sink1) = interface(1);
    let (eth2, sink2) = interface(2);

    let mut router = Router::new();
    let eth0 = router.add_interface(eth0);
    let eth1 = router.add_interface(eth1);
    let eth2 = router.add_interface(eth2);
    router
        .add_route(Ipv4Address([0, 0, 0, 0]), 0, Some(Ipv4Address([10, 0, 0, 254])), eth0)
        .unwrap();
    router
        .add_route(Ipv4Address([172, 16, 0, 0]), 16, Some(Ipv4Address([10, 1, 0, 254])), eth1)
        .unwrap();
    router
        .add_route(Ipv4Address([10, 2, 0, 0]), 24, None, eth2)
        .unwrap();

    (router, [sink0, sink1, sink2])
}

fn datagram(dst_addr: Ipv4Address, hop_limit: u8) -> Vec<u8> {
    let repr = Ipv4Repr {
        src_addr: Ipv4Address([192, 0, 2, 1]),
        dst_addr,
        protocol: IpProtocol::Udp,
        payload_len: 4,
        hop_limit,
    };
    let mut buffer = vec![0; repr.buffer_len()];
    let packet = ipv4_packet::new_unchecked_mut(&mut buffer);
    repr.emit(packet);
    packet.payload_mut_slice().copy_from_slice(b"data");
    buffer
}

// The ARP request an unresolved forward emits betrays the chosen interface
// and next hop.
fn requested_hop(sink: &Sink) -> Ipv4Address {
    let sent = sink.borrow();
    let frame = ethernet_frame::new_checked(&sent[sent.len() - 1][..]).unwrap();
    assert_eq!(frame.ethertype(), EtherType::Arp);
    let repr = ArpRepr::parse(arp_packet::new_checked(frame.payload_slice()).unwrap()).unwrap();
    assert_eq!(repr.operation, ArpOperation::Request);
    repr.target_protocol_addr
}

// Teach an interface the mapping for `hop` by letting it receive a reply.
fn resolve(interface: &mut Interface, hop: Ipv4Address, mac: EthernetAddress) {
    let repr = ArpRepr {
        operation: ArpOperation::Reply,
        source_hardware_addr: mac,
        source_protocol_addr: hop,
        target_hardware_addr: interface.hardware_addr(),
        target_protocol_addr: interface.ip_addr(),
    };
    let mut payload = vec![0; repr.buffer_len()];
    repr.emit(arp_packet::new_unchecked_mut(&mut payload));
    let mut buffer = vec![0; ethernet_frame::buffer_len(payload.len())];
    let frame = ethernet_frame::new_unchecked_mut(&mut buffer);
    EthernetRepr {
        dst_addr: interface.hardware_addr(),
        src_addr: mac,
        ethertype: EtherType::Arp,
    }.emit(frame);
    frame.payload_mut_slice().copy_from_slice(&payload);
    interface.recv_frame(&buffer);
}

#[test]
fn add_route_rejects_bad_interface() {
    let (mut router, _) = router();
    let result = router.add_route(Ipv4Address([10, 9, 0, 0]), 16, None, 9);
    assert_eq!(result, Err(Error::NoInterface));
}

#[test]
fn forwards_via_longest_prefix() {
    let (mut router, sinks) = router();
    router.interface_mut(0).unwrap().datagrams_received()
        .push_back(datagram(Ipv4Address([172, 16, 5, 5]), 64));
    router.route();

    assert!(sinks[0].borrow().is_empty());
    assert!(sinks[2].borrow().is_empty());
    // eth1 tries to resolve its gateway, not the final destination.
    assert_eq!(requested_hop(&sinks[1]), Ipv4Address([10, 1, 0, 254]));
}

#[test]
fn directly_attached_routes_resolve_destination() {
    let (mut router, sinks) = router();
    let dst_addr = Ipv4Address([10, 2, 0, 9]);
    router.interface_mut(1).unwrap().datagrams_received()
        .push_back(datagram(dst_addr, 64));
    router.route();
    assert_eq!(requested_hop(&sinks[2]), dst_addr);
}

#[test]
fn unmatched_destination_falls_to_default_route() {
    let (mut router, sinks) = router();
    router.interface_mut(2).unwrap().datagrams_received()
        .push_back(datagram(Ipv4Address([8, 8, 8, 8]), 64));
    router.route();
    assert_eq!(requested_hop(&sinks[0]), Ipv4Address([10, 0, 0, 254]));
}

#[test]
fn forwarded_datagram_is_rewritten() {
    let (mut router, sinks) = router();
    let gateway_mac = EthernetAddress([2, 9, 9, 9, 9, 9]);
    resolve(router.interface_mut(1).unwrap(), Ipv4Address([10, 1, 0, 254]), gateway_mac);

    router.interface_mut(0).unwrap().datagrams_received()
        .push_back(datagram(Ipv4Address([172, 16, 5, 5]), 64));
    router.route();

    let sent = sinks[1].borrow();
    assert_eq!(sent.len(), 1);
    let frame = ethernet_frame::new_checked(&sent[0][..]).unwrap();
    assert_eq!(frame.dst_addr(), gateway_mac);
    assert_eq!(frame.ethertype(), EtherType::Ipv4);

    let packet = ipv4_packet::new_checked(frame.payload_slice()).unwrap();
    assert_eq!(packet.hop_limit(), 63);
    assert!(packet.verify_checksum());
    assert_eq!(packet.dst_addr(), Ipv4Address([172, 16, 5, 5]));
    assert_eq!(packet.payload_slice(), b"data");
}

#[test]
fn expended_hop_limit_drops_datagram() {
    let (mut router, sinks) = router();
    router.interface_mut(0).unwrap().datagrams_received()
        .push_back(datagram(Ipv4Address([172, 16, 5, 5]), 1));
    router.interface_mut(0).unwrap().datagrams_received()
        .push_back(datagram(Ipv4Address([172, 16, 5, 5]), 0));
    router.route();

    for sink in &sinks {
        assert!(sink.borrow().is_empty());
    }
}

#[test]
fn truncated_datagram_is_dropped() {
    let (mut router, sinks) = router();
    // Far too short for a header; pushed past the interface's own checks.
    router.interface_mut(0).unwrap().datagrams_received()
        .push_back(vec![0x45, 0x00]);
    router.route();
    for sink in &sinks {
        assert!(sink.borrow().is_empty());
    }
}

#[test]
fn routeless_datagram_is_dropped() {
    let (eth0, sink0) = interface(0);
    let mut router = Router::new();
    router.add_interface(eth0);
    // No routes at all, not even a default.
    router.interface_mut(0).unwrap().datagrams_received()
        .push_back(datagram(Ipv4Address([8, 8, 8, 8]), 64));
    router.route();
    assert!(sink0.borrow().is_empty());
}

#[test]
fn queues_of_all_interfaces_are_drained() {
    let (mut router, sinks) = router();
    for index in 0..3 {
        router.interface_mut(index).unwrap().datagrams_received()
            .push_back(datagram(Ipv4Address([172, 16, 1, 1]), 64));
    }
    router.route();
    // All three forwarded out eth1; one request plus two queued datagrams
    // suppressed behind it makes a single frame.
    assert_eq!(sinks[1].borrow().len(), 1);
    assert!(router.interface_mut(0).unwrap().datagrams_received().is_empty());
    assert!(router.interface_mut(2).unwrap().datagrams_received().is_empty());
}
