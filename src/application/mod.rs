//! Application layer - wires configuration, infrastructure and the generator

pub mod generate;

pub use generate::*;
