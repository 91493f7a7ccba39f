pub mod command;
pub mod envelope;
