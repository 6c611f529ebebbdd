//! IPv4 packets and the internet checksum.

use core::fmt;
use byteorder::{ByteOrder, NetworkEndian};

use crate::wire::{Error, Result};

enum_with_unknown! {
    /// IP payload protocol type.
    pub enum Protocol(u8) {
        /// Internet Control Message Protocol.
        Icmp = 0x01,
        /// Transmission Control Protocol.
        Tcp = 0x06,
        /// User Datagram Protocol.
        Udp = 0x11,
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Protocol::Icmp => write!(f, "ICMP"),
            Protocol::Tcp => write!(f, "TCP"),
            Protocol::Udp => write!(f, "UDP"),
            Protocol::Unknown(id) => write!(f, "0x{:02x}", id),
        }
    }
}

/// A four-octet IPv4 address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Address(pub [u8; 4]);

impl Address {
    /// Construct an IPv4 address from a sequence of octets, in big-endian.
    ///
    /// # Panics
    /// The function panics if `data` is not four octets long.
    pub fn from_bytes(data: &[u8]) -> Address {
        let mut bytes = [0; 4];
        bytes.copy_from_slice(data);
        Address(bytes)
    }

    /// Construct an IPv4 address from its numeric network byte order form.
    pub fn from_network_integer(value: u32) -> Address {
        let mut bytes = [0; 4];
        NetworkEndian::write_u32(&mut bytes, value);
        Address(bytes)
    }

    /// Convert to the numeric representation in network byte order.
    ///
    /// The numeric form orders addresses the way prefixes do: all addresses
    /// sharing a `k`-bit prefix agree in the top `k` bits of their integer.
    pub fn to_network_integer(self) -> u32 {
        NetworkEndian::read_u32(&self.0)
    }

    /// Return an IPv4 address as a sequence of octets, in big-endian.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.0;
        write!(f, "{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

/// Internet checksum routines, RFC 1071.
pub mod checksum {
    use byteorder::{ByteOrder, NetworkEndian};

    fn propagate_carries(word: u32) -> u16 {
        let sum = (word >> 16) + (word & 0xffff);
        ((sum >> 16) as u16) + (sum as u16)
    }

    /// Compute an RFC 1071 compliant checksum (without the final complement).
    pub fn data(mut data: &[u8]) -> u16 {
        let mut accum = 0;

        while data.len() >= 2 {
            accum += u32::from(NetworkEndian::read_u16(data));
            data = &data[2..];
        }

        // Add the last remaining odd octet, if any.
        if let Some(&byte) = data.first() {
            accum += u32::from(byte) << 8;
        }

        propagate_carries(accum)
    }
}

byte_wrapper! {
    /// A byte sequence identified as an IPv4 packet.
    pub struct ipv4_packet([u8]);
}

mod field {
    use crate::wire::field::Field;

    pub(crate) const VER_IHL: usize = 0;
    pub(crate) const DSCP_ECN: usize = 1;
    pub(crate) const LENGTH: Field = 2..4;
    pub(crate) const IDENT: Field = 4..6;
    pub(crate) const FLG_OFF: Field = 6..8;
    pub(crate) const TTL: usize = 8;
    pub(crate) const PROTOCOL: usize = 9;
    pub(crate) const CHECKSUM: Field = 10..12;
    pub(crate) const SRC_ADDR: Field = 12..16;
    pub(crate) const DST_ADDR: Field = 16..20;
}

impl ipv4_packet {
    /// The length of a header without options.
    pub const HEADER_LEN: usize = field::DST_ADDR.end;

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

    /// Validate the buffer length and imbue it with this structure, mutably.
    pub fn new_checked_mut(data: &mut [u8]) -> Result<&mut Self> {
        Self::new_unchecked(data).check_len()?;
        Ok(Self::new_unchecked_mut(data))
    }

    /// Ensure that no accessor method will panic.
    ///
    /// Returns `Err(Error::Truncated)` if the buffer is shorter than the
    /// header length or the total length field, and `Err(Error::Malformed)`
    /// if the header length field is self-contradictory.
    pub fn check_len(&self) -> Result<()> {
        let len = self.0.len();
        if len < field::DST_ADDR.end {
            return Err(Error::Truncated);
        }
        let header_len = usize::from(self.header_len());
        if header_len < field::DST_ADDR.end || usize::from(self.total_len()) < header_len {
            return Err(Error::Malformed);
        }
        if len < header_len || len < usize::from(self.total_len()) {
            return Err(Error::Truncated);
        }
        Ok(())
    }

    /// Return the version field.
    pub fn version(&self) -> u8 {
        self.0[field::VER_IHL] >> 4
    }

    /// Return the header length, in octets.
    pub fn header_len(&self) -> u8 {
        (self.0[field::VER_IHL] & 0x0f) * 4
    }

    /// Return the total length field.
    pub fn total_len(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::LENGTH])
    }

    /// Return the fragment identification field.
    pub fn ident(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::IDENT])
    }

    /// Return the time to live field.
    pub fn hop_limit(&self) -> u8 {
        self.0[field::TTL]
    }

    /// Return the payload protocol field.
    pub fn protocol(&self) -> Protocol {
        self.0[field::PROTOCOL].into()
    }

    /// Return the header checksum field.
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::CHECKSUM])
    }

    /// Return the source address field.
    pub fn src_addr(&self) -> Address {
        Address::from_bytes(&self.0[field::SRC_ADDR])
    }

    /// Return the destination address field.
    pub fn dst_addr(&self) -> Address {
        Address::from_bytes(&self.0[field::DST_ADDR])
    }

    /// Set the version and header length fields.
    ///
    /// The header length is set to the minimum, no options.
    pub fn set_version_and_header_len(&mut self) {
        self.0[field::VER_IHL] = 0x45;
        self.0[field::DSCP_ECN] = 0;
    }

    /// Set the total length field.
    pub fn set_total_len(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::LENGTH], value)
    }

    /// Set the fragment identification field.
    pub fn set_ident(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::IDENT], value)
    }

    /// Set the flags and fragment offset fields.
    pub fn set_flags_and_fragment_offset(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::FLG_OFF], value)
    }

    /// Set the time to live field.
    pub fn set_hop_limit(&mut self, value: u8) {
        self.0[field::TTL] = value
    }

    /// Set the payload protocol field.
    pub fn set_protocol(&mut self, value: Protocol) {
        self.0[field::PROTOCOL] = value.into()
    }

    /// Set the header checksum field.
    pub fn set_checksum(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::CHECKSUM], value)
    }

    /// Set the source address field.
    pub fn set_src_addr(&mut self, value: Address) {
        self.0[field::SRC_ADDR].copy_from_slice(value.as_bytes())
    }

    /// Set the destination address field.
    pub fn set_dst_addr(&mut self, value: Address) {
        self.0[field::DST_ADDR].copy_from_slice(value.as_bytes())
    }

    /// Recompute the header checksum from the current header contents.
    pub fn fill_checksum(&mut self) {
        self.set_checksum(0);
        let checksum = {
            let header = &self.0[..usize::from(self.header_len())];
            !checksum::data(header)
        };
        self.set_checksum(checksum)
    }

    /// Validate the header checksum.
    pub fn verify_checksum(&self) -> bool {
        let header = &self.0[..usize::from(self.header_len())];
        checksum::data(header) == !0
    }

    /// Return the payload as a byte slice.
    pub fn payload_slice(&self) -> &[u8] {
        let range = usize::from(self.header_len())..usize::from(self.total_len());
        &self.0[range]
    }

    /// Return the payload as a mutable byte slice.
    pub fn payload_mut_slice(&mut self) -> &mut [u8] {
        let range = usize::from(self.header_len())..usize::from(self.total_len());
        &mut self.0[range]
    }
}

impl AsRef<[u8]> for ipv4_packet {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A high-level representation of an IPv4 header without options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repr {
    /// The source address.
    pub src_addr: Address,
    /// The destination address.
    pub dst_addr: Address,
    /// The protocol of the contained payload.
    pub protocol: Protocol,
    /// The length of the contained payload, in octets.
    pub payload_len: usize,
    /// The remaining number of hops, also known as time to live.
    pub hop_limit: u8,
}

impl Repr {
    /// Parse an IPv4 packet and return a high-level representation.
    pub fn parse(packet: &ipv4_packet) -> Result<Repr> {
        packet.check_len()?;
        if packet.version() != 4 {
            return Err(Error::Malformed);
        }
        if !packet.verify_checksum() {
            return Err(Error::WrongChecksum);
        }
        Ok(Repr {
            src_addr: packet.src_addr(),
            dst_addr: packet.dst_addr(),
            protocol: packet.protocol(),
            payload_len: packet.payload_slice().len(),
            hop_limit: packet.hop_limit(),
        })
    }

    /// Return the length of a buffer required to hold the packet.
    pub fn buffer_len(&self) -> usize {
        ipv4_packet::HEADER_LEN + self.payload_len
    }

    /// Emit a high-level representation into an IPv4 packet.
    ///
    /// Writes a header without options and fills in its checksum.
    pub fn emit(&self, packet: &mut ipv4_packet) {
        packet.set_version_and_header_len();
        packet.set_total_len((ipv4_packet::HEADER_LEN + self.payload_len) as u16);
        packet.set_ident(0);
        packet.set_flags_and_fragment_offset(0);
        packet.set_hop_limit(self.hop_limit);
        packet.set_protocol(self.protocol);
        packet.set_src_addr(self.src_addr);
        packet.set_dst_addr(self.dst_addr);
        packet.fill_checksum();
    }
}
