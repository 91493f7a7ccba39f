// privbridge-host: the privileged side of the bridge.

pub mod actions;
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod identity;
pub mod runtime;
pub mod startup;
pub mod store;
