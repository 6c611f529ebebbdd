//! The IP network layer.
//!
//! A [`Router`] owns a set of Ethernet interfaces and moves IPv4 datagrams
//! between them, choosing the outgoing interface and next hop by longest
//! prefix match in a [`Routes`] table.
//!
//! [`Router`]: struct.Router.html
//! [`Routes`]: struct.Routes.html

mod route;
mod router;
#[cfg(test)]
mod tests;

pub use self::route::{Route, Routes};
pub use self::router::Router;
