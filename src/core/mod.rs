//! Core building blocks shared by every part of apiforge: the error type, run
//! configuration and case conversion helpers.

pub mod config;
pub mod error;
pub mod utils;

pub use config::{GeneratorConfig, OptionKind, OptionSpec, OptionValue, ResolvedOptions};
pub use error::{Error, Result};
