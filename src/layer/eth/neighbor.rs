use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::time::{Duration, Instant};
use crate::wire::{EthernetAddress, Ipv4Address};

/// A cache of protocol address to hardware address mappings.
///
/// Mappings are learned from the sender fields of any valid ARP packet and
/// expire a fixed time after they were last refreshed. The cache also tracks
/// the requests this node itself has sent, so that an unanswered request
/// suppresses duplicates for a while instead of flooding the link.
#[derive(Debug, Default)]
pub struct NeighborCache {
    entries: BTreeMap<Ipv4Address, Neighbor>,
    requests: BTreeMap<Ipv4Address, Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Neighbor {
    hardware_addr: EthernetAddress,
    refreshed_at: Instant,
}

impl NeighborCache {
    /// How long a learned mapping stays usable without a refresh.
    pub const ENTRY_LIFETIME: Duration = Duration::from_millis(30_000);

    /// How long an unanswered request suppresses further requests.
    pub const REQUEST_LIFETIME: Duration = Duration::from_millis(5_000);

    /// Create an empty cache.
    pub fn new() -> NeighborCache {
        NeighborCache::default()
    }

    /// Find the hardware address mapped to `addr`.
    pub fn lookup(&self, addr: Ipv4Address) -> Option<EthernetAddress> {
        self.entries.get(&addr).map(|neighbor| neighbor.hardware_addr)
    }

    /// Learn or refresh a mapping.
    pub fn fill(&mut self, addr: Ipv4Address, hardware_addr: EthernetAddress, now: Instant) {
        net_trace!("learned neighbor {} at {}", addr, hardware_addr);
        let neighbor = Neighbor { hardware_addr, refreshed_at: now };
        self.entries.insert(addr, neighbor);
    }

    /// Whether a recent request for `addr` is still outstanding.
    pub fn is_requesting(&self, addr: Ipv4Address, now: Instant) -> bool {
        match self.requests.get(&addr) {
            Some(&sent_at) => now - sent_at < Self::REQUEST_LIFETIME,
            None => false,
        }
    }

    /// Record that a request for `addr` was sent.
    pub fn set_requesting(&mut self, addr: Ipv4Address, now: Instant) {
        self.requests.insert(addr, now);
    }

    /// Forget the outstanding request for `addr`, if any.
    pub fn clear_request(&mut self, addr: Ipv4Address) {
        self.requests.remove(&addr);
    }

    /// Drop aged-out entries and requests.
    ///
    /// Returns the addresses whose requests went unanswered past their
    /// lifetime; anything queued behind those requests has no way forward.
    pub fn expire(&mut self, now: Instant) -> Vec<Ipv4Address> {
        let expired = self.requests
            .iter()
            .filter(|&(_, &sent_at)| now - sent_at > Self::REQUEST_LIFETIME)
            .map(|(&addr, _)| addr)
            .collect::<Vec<_>>();
        for addr in &expired {
            self.requests.remove(addr);
        }
        self.entries.retain(|_, neighbor| now - neighbor.refreshed_at <= Self::ENTRY_LIFETIME);
        expired
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const NEIGHBOR_IP: Ipv4Address = Ipv4Address([10, 0, 0, 2]);
    const NEIGHBOR_MAC: EthernetAddress = EthernetAddress([2, 0, 0, 0, 0, 2]);

    #[test]
    fn fill_and_lookup() {
        let mut cache = NeighborCache::new();
        assert_eq!(cache.lookup(NEIGHBOR_IP), None);
        cache.fill(NEIGHBOR_IP, NEIGHBOR_MAC, Instant::from_millis(0));
        assert_eq!(cache.lookup(NEIGHBOR_IP), Some(NEIGHBOR_MAC));
    }

    #[test]
    fn entries_age_out() {
        let mut cache = NeighborCache::new();
        cache.fill(NEIGHBOR_IP, NEIGHBOR_MAC, Instant::from_millis(0));

        cache.expire(Instant::from_millis(30_000));
        assert_eq!(cache.lookup(NEIGHBOR_IP), Some(NEIGHBOR_MAC));

        cache.expire(Instant::from_millis(30_001));
        assert_eq!(cache.lookup(NEIGHBOR_IP), None);
    }

    #[test]
    fn refresh_restarts_lifetime() {
        let mut cache = NeighborCache::new();
        cache.fill(NEIGHBOR_IP, NEIGHBOR_MAC, Instant::from_millis(0));
        cache.fill(NEIGHBOR_IP, NEIGHBOR_MAC, Instant::from_millis(20_000));
        cache.expire(Instant::from_millis(40_000));
        assert_eq!(cache.lookup(NEIGHBOR_IP), Some(NEIGHBOR_MAC));
    }

    #[test]
    fn requests_suppress_and_expire() {
        let mut cache = NeighborCache::new();
        cache.set_requesting(NEIGHBOR_IP, Instant::from_millis(0));
        assert!(cache.is_requesting(NEIGHBOR_IP, Instant::from_millis(4_999)));
        assert!(!cache.is_requesting(NEIGHBOR_IP, Instant::from_millis(5_000)));

        let expired = cache.expire(Instant::from_millis(5_001));
        assert_eq!(expired, vec![NEIGHBOR_IP]);
        assert!(cache.expire(Instant::from_millis(5_001)).is_empty());
    }
}
