use alloc::vec::Vec;

use crate::wire::Ipv4Address;

/// A forwarding rule for one destination prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// The matched prefix. Bits past `prefix_len` are ignored.
    pub prefix: Ipv4Address,
    /// The number of leading significant bits of `prefix`, `0..=32`.
    pub prefix_len: u8,
    /// The next hop, or `None` when the network is directly attached and
    /// datagrams go straight to their destination.
    pub next_hop: Option<Ipv4Address>,
    /// The index of the interface to send out on.
    pub interface: usize,
}

impl Route {
    fn matches(&self, addr: Ipv4Address) -> bool {
        // A shift by the full width is undefined, so the default route is
        // handled on its own.
        if self.prefix_len == 0 {
            return true;
        }
        let shift = 32 - u32::from(self.prefix_len);
        (self.prefix.to_network_integer() >> shift) == (addr.to_network_integer() >> shift)
    }
}

/// A routing table with longest prefix match lookup.
///
/// The table is a flat list searched in full on every lookup. Routers with
/// large tables want a trie here; for the handful of routes this layer is
/// built for, the list wins on simplicity.
#[derive(Debug, Default)]
pub struct Routes {
    storage: Vec<Route>,
}

impl Routes {
    /// Create an empty routing table.
    pub fn new() -> Routes {
        Routes::default()
    }

    /// Append a route.
    ///
    /// Routes never replace each other; among routes matching the same
    /// address the longest prefix wins, ties going to the earliest entry.
    pub fn add_route(&mut self, route: Route) {
        debug_assert!(route.prefix_len <= 32);
        self.storage.push(route);
    }

    /// Find the route with the longest prefix matching `addr`.
    pub fn lookup(&self, addr: Ipv4Address) -> Option<Route> {
        let mut best: Option<Route> = None;
        for route in &self.storage {
            if !route.matches(addr) {
                continue;
            }
            let best = best.get_or_insert(*route);
            if best.prefix_len < route.prefix_len {
                *best = *route;
            }
        }
        best
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn route(prefix: [u8; 4], prefix_len: u8, interface: usize) -> Route {
        Route {
            prefix: Ipv4Address(prefix),
            prefix_len,
            next_hop: None,
            interface,
        }
    }

    #[test]
    fn empty_table() {
        let routes = Routes::new();
        assert_eq!(routes.lookup(Ipv4Address([10, 0, 0, 1])), None);
    }

    #[test]
    fn prefix_match() {
        let mut routes = Routes::new();
        routes.add_route(route([192, 168, 0, 0], 16, 0));

        assert_eq!(routes.lookup(Ipv4Address([192, 168, 3, 4])).map(|r| r.interface), Some(0));
        assert_eq!(routes.lookup(Ipv4Address([192, 169, 3, 4])), None);
    }

    #[test]
    fn longest_prefix_wins() {
        let mut routes = Routes::new();
        routes.add_route(route([10, 0, 0, 0], 8, 0));
        routes.add_route(route([10, 1, 0, 0], 16, 1));
        routes.add_route(route([10, 1, 2, 0], 24, 2));

        let chosen = |addr: [u8; 4]| routes.lookup(Ipv4Address(addr)).map(|r| r.interface);
        assert_eq!(chosen([10, 9, 9, 9]), Some(0));
        assert_eq!(chosen([10, 1, 9, 9]), Some(1));
        assert_eq!(chosen([10, 1, 2, 9]), Some(2));
        assert_eq!(chosen([11, 0, 0, 1]), None);
    }

    #[test]
    fn order_independent() {
        let mut routes = Routes::new();
        routes.add_route(route([10, 1, 0, 0], 16, 1));
        routes.add_route(route([10, 0, 0, 0], 8, 0));
        assert_eq!(routes.lookup(Ipv4Address([10, 1, 0, 1])).map(|r| r.interface), Some(1));
    }

    #[test]
    fn default_route_matches_everything() {
        let mut routes = Routes::new();
        routes.add_route(route([0, 0, 0, 0], 0, 0));
        routes.add_route(route([10, 0, 0, 0], 8, 1));

        assert_eq!(routes.lookup(Ipv4Address([8, 8, 8, 8])).map(|r| r.interface), Some(0));
        assert_eq!(routes.lookup(Ipv4Address([10, 0, 0, 1])).map(|r| r.interface), Some(1));
    }

    #[test]
    fn host_route() {
        let mut routes = Routes::new();
        routes.add_route(route([10, 0, 0, 7], 32, 3));
        assert_eq!(routes.lookup(Ipv4Address([10, 0, 0, 7])).map(|r| r.interface), Some(3));
        assert_eq!(routes.lookup(Ipv4Address([10, 0, 0, 8])), None);
    }
}
