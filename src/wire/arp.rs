//! ARP packets, fixed to the Ethernet and IPv4 address pair.

use core::fmt;
use byteorder::{ByteOrder, NetworkEndian};

use crate::wire::{Error, Result};
use crate::wire::ethernet::{Address as EthernetAddress, EtherType};
use crate::wire::ipv4::Address as Ipv4Address;

enum_with_unknown! {
    /// ARP hardware type.
    pub enum Hardware(u16) {
        /// Hardware addresses are Ethernet addresses.
        Ethernet = 1,
    }
}

enum_with_unknown! {
    /// ARP operation type.
    pub enum Operation(u16) {
        /// A request for the hardware address of the target.
        Request = 1,
        /// A reply carrying the hardware address of the sender.
        Reply = 2,
    }
}

byte_wrapper! {
    /// A byte sequence identified as an ARP packet.
    pub struct arp_packet([u8]);
}

mod field {
    use crate::wire::field::Field;

    pub(crate) const HTYPE: Field = 0..2;
    pub(crate) const PTYPE: Field = 2..4;
    pub(crate) const HLEN: usize = 4;
    pub(crate) const PLEN: usize = 5;
    pub(crate) const OPER: Field = 6..8;

    // Fixed offsets for the only supported combination,
    // six-octet hardware and four-octet protocol addresses.
    pub(crate) const SHA: Field = 8..14;
    pub(crate) const SPA: Field = 14..18;
    pub(crate) const THA: Field = 18..24;
    pub(crate) const TPA: Field = 24..28;
}

impl arp_packet {
    /// Imbue a raw octet buffer with this structure.
    pub fn new_unchecked(data: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(data)
    }

    /// Imbue a mutable octet buffer with this structure.
    pub fn new_unchecked_mut(data: &mut [u8]) -> &mut Self {
        Self::__from_macro_new_unchecked_mut(data)
    }

    /// Validate the buffer length and imbue it with this structure.
    pub fn new_checked(data: &[u8]) -> Result<&Self> {
        Self::new_unchecked(data).check_len()?;
        Ok(Self::new_unchecked(data))
    }

    /// Ensure that no accessor method will panic.
    ///
    /// Returns `Err(Error::Truncated)` if the buffer is too short.
    pub fn check_len(&self) -> Result<()> {
        if self.0.len() < field::TPA.end {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Return the hardware type field.
    pub fn hardware_type(&self) -> Hardware {
        NetworkEndian::read_u16(&self.0[field::HTYPE]).into()
    }

    /// Return the protocol type field.
    pub fn protocol_type(&self) -> EtherType {
        NetworkEndian::read_u16(&self.0[field::PTYPE]).into()
    }

    /// Return the hardware address length field.
    pub fn hardware_len(&self) -> u8 {
        self.0[field::HLEN]
    }

    /// Return the protocol address length field.
    pub fn protocol_len(&self) -> u8 {
        self.0[field::PLEN]
    }

    /// Return the operation field.
    pub fn operation(&self) -> Operation {
        NetworkEndian::read_u16(&self.0[field::OPER]).into()
    }

    /// Return the sender hardware address field.
    pub fn source_hardware_addr(&self) -> EthernetAddress {
        EthernetAddress::from_bytes(&self.0[field::SHA])
    }

    /// Return the sender protocol address field.
    pub fn source_protocol_addr(&self) -> Ipv4Address {
        Ipv4Address::from_bytes(&self.0[field::SPA])
    }

    /// Return the target hardware address field.
    pub fn target_hardware_addr(&self) -> EthernetAddress {
        EthernetAddress::from_bytes(&self.0[field::THA])
    }

    /// Return the target protocol address field.
    pub fn target_protocol_addr(&self) -> Ipv4Address {
        Ipv4Address::from_bytes(&self.0[field::TPA])
    }

    /// Set the hardware type field.
    pub fn set_hardware_type(&mut self, value: Hardware) {
        NetworkEndian::write_u16(&mut self.0[field::HTYPE], value.into())
    }

    /// Set the protocol type field.
    pub fn set_protocol_type(&mut self, value: EtherType) {
        NetworkEndian::write_u16(&mut self.0[field::PTYPE], value.into())
    }

    /// Set the hardware address length field.
    pub fn set_hardware_len(&mut self, value: u8) {
        self.0[field::HLEN] = value
    }

    /// Set the protocol address length field.
    pub fn set_protocol_len(&mut self, value: u8) {
        self.0[field::PLEN] = value
    }

    /// Set the operation field.
    pub fn set_operation(&mut self, value: Operation) {
        NetworkEndian::write_u16(&mut self.0[field::OPER], value.into())
    }

    /// Set the sender hardware address field.
    pub fn set_source_hardware_addr(&mut self, value: EthernetAddress) {
        self.0[field::SHA].copy_from_slice(value.as_bytes())
    }

    /// Set the sender protocol address field.
    pub fn set_source_protocol_addr(&mut self, value: Ipv4Address) {
        self.0[field::SPA].copy_from_slice(value.as_bytes())
    }

    /// Set the target hardware address field.
    pub fn set_target_hardware_addr(&mut self, value: EthernetAddress) {
        self.0[field::THA].copy_from_slice(value.as_bytes())
    }

    /// Set the target protocol address field.
    pub fn set_target_protocol_addr(&mut self, value: Ipv4Address) {
        self.0[field::TPA].copy_from_slice(value.as_bytes())
    }
}

/// A high-level representation of an ARP packet for Ethernet and IPv4.
///
/// Other hardware or protocol combinations are rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repr {
    /// The operation, request or reply.
    pub operation: Operation,
    /// The hardware address of the packet sender.
    pub source_hardware_addr: EthernetAddress,
    /// The protocol address of the packet sender.
    pub source_protocol_addr: Ipv4Address,
    /// The hardware address of the packet target, ignored in requests.
    pub target_hardware_addr: EthernetAddress,
    /// The protocol address of the packet target.
    pub target_protocol_addr: Ipv4Address,
}

impl Repr {
    /// Parse an ARP packet and return a high-level representation.
    pub fn parse(packet: &arp_packet) -> Result<Repr> {
        packet.check_len()?;
        match (packet.hardware_type(), packet.protocol_type()) {
            (Hardware::Ethernet, EtherType::Ipv4) => (),
            _ => return Err(Error::Unrecognized),
        }
        if packet.hardware_len() != 6 || packet.protocol_len() != 4 {
            return Err(Error::Malformed);
        }
        match packet.operation() {
            Operation::Request | Operation::Reply => (),
            Operation::Unknown(_) => return Err(Error::Unrecognized),
        }
        Ok(Repr {
            operation: packet.operation(),
            source_hardware_addr: packet.source_hardware_addr(),
            source_protocol_addr: packet.source_protocol_addr(),
            target_hardware_addr: packet.target_hardware_addr(),
            target_protocol_addr: packet.target_protocol_addr(),
        })
    }

    /// Return the length of a buffer required to hold the packet.
    pub fn buffer_len(&self) -> usize {
        28
    }

    /// Emit a high-level representation into an ARP packet.
    pub fn emit(&self, packet: &mut arp_packet) {
        packet.set_hardware_type(Hardware::Ethernet);
        packet.set_protocol_type(EtherType::Ipv4);
        packet.set_hardware_len(6);
        packet.set_protocol_len(4);
        packet.set_operation(self.operation);
        packet.set_source_hardware_addr(self.source_hardware_addr);
        packet.set_source_protocol_addr(self.source_protocol_addr);
        packet.set_target_hardware_addr(self.target_hardware_addr);
        packet.set_target_protocol_addr(self.target_protocol_addr);
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.operation {
            Operation::Request =>
                write!(f, "ARP who has {}? tell {}",
                       self.target_protocol_addr, self.source_protocol_addr),
            Operation::Reply =>
                write!(f, "ARP {} is at {}",
                       self.source_protocol_addr, self.source_hardware_addr),
            Operation::Unknown(op) =>
                write!(f, "ARP op={}", op),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static PACKET_BYTES: [u8; 28] =
        [0x00, 0x01,
         0x08, 0x00,
         0x06,
         0x04,
         0x00, 0x01,
         0x11, 0x12, 0x13, 0x14, 0x15, 0x16,
         0x21, 0x22, 0x23, 0x24,
         0x31, 0x32, 0x33, 0x34, 0x35, 0x36,
         0x41, 0x42, 0x43, 0x44];

    fn packet_repr() -> Repr {
        Repr {
            operation: Operation::Request,
            source_hardware_addr: EthernetAddress([0x11, 0x12, 0x13, 0x14, 0x15, 0x16]),
            source_protocol_addr: Ipv4Address([0x21, 0x22, 0x23, 0x24]),
            target_hardware_addr: EthernetAddress([0x31, 0x32, 0x33, 0x34, 0x35, 0x36]),
            target_protocol_addr: Ipv4Address([0x41, 0x42, 0x43, 0x44]),
        }
    }

    #[test]
    fn deconstruct() {
        let packet = arp_packet::new_checked(&PACKET_BYTES[..]).unwrap();
        assert_eq!(packet.hardware_type(), Hardware::Ethernet);
        assert_eq!(packet.protocol_type(), EtherType::Ipv4);
        assert_eq!(packet.hardware_len(), 6);
        assert_eq!(packet.protocol_len(), 4);
        assert_eq!(packet.operation(), Operation::Request);
        assert_eq!(packet.source_hardware_addr(),
                   EthernetAddress([0x11, 0x12, 0x13, 0x14, 0x15, 0x16]));
        assert_eq!(packet.source_protocol_addr(), Ipv4Address([0x21, 0x22, 0x23, 0x24]));
        assert_eq!(packet.target_hardware_addr(),
                   EthernetAddress([0x31, 0x32, 0x33, 0x34, 0x35, 0x36]));
        assert_eq!(packet.target_protocol_addr(), Ipv4Address([0x41, 0x42, 0x43, 0x44]));
    }

    #[test]
    fn parse() {
        let packet = arp_packet::new_checked(&PACKET_BYTES[..]).unwrap();
        assert_eq!(Repr::parse(packet), Ok(packet_repr()));
    }

    #[test]
    fn parse_rejects_unknown_operation() {
        let mut bytes = PACKET_BYTES;
        bytes[7] = 0x09;
        let packet = arp_packet::new_checked(&bytes[..]).unwrap();
        assert_eq!(Repr::parse(packet), Err(Error::Unrecognized));
    }

    #[test]
    fn parse_rejects_wrong_address_len() {
        let mut bytes = PACKET_BYTES;
        bytes[4] = 0x08;
        let packet = arp_packet::new_checked(&bytes[..]).unwrap();
        assert_eq!(Repr::parse(packet), Err(Error::Malformed));
    }

    #[test]
    fn construct() {
        let mut bytes = vec![0xa5; 28];
        let packet = arp_packet::new_unchecked_mut(&mut bytes);
        packet_repr().emit(packet);
        assert_eq!(&bytes[..], &PACKET_BYTES[..]);
    }

    #[test]
    fn truncated() {
        assert_eq!(arp_packet::new_checked(&PACKET_BYTES[..27]).err(),
                   Some(Error::Truncated));
    }
}
