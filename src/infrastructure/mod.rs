//! Infrastructure layer - concrete implementations of domain ports

pub mod openapi;
pub mod output;
pub mod strategies;
pub mod templates;

pub use output::*;
pub use templates::*;
