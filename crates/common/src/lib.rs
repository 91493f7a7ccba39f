// privbridge-common: wire codec and shared types for the privbridge workspace

pub mod document;
pub mod protocol;
