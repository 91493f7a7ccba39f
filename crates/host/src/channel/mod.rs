// Transport registration for the dispatcher: the socket the three
// intercepted methods are served on.

pub mod server;
pub mod unix;

pub use server::{ChannelServer, DenyAllSystem, LegacySystem};
