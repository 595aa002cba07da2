//! apiforge generates client libraries from OpenAPI documents.
//!
//! The [`generation`] module holds the target-independent engine: identifier
//! allocation, schema and operation resolution and the [`GeneratorRunner`]
//! state machine. Targets differ only in their [`TargetStrategy`] value and
//! their template set, both supplied by [`infrastructure`].
//!
//! [`GeneratorRunner`]: generation::GeneratorRunner
//! [`TargetStrategy`]: generation::TargetStrategy
#![deny(unsafe_code)]

pub mod application;
pub mod core;
pub mod generation;
pub mod infrastructure;

pub use application::GenerateUseCase;
pub use core::{Error, GeneratorConfig, Result};
