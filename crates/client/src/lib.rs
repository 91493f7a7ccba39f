// privbridge-client: typed facade over the bridge channel.

pub mod client;

pub use client::BridgeClient;
