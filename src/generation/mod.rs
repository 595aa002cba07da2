//! Generation domain module - turns an API description into rendered files
//!
//! Resolution happens in two passes over a run-scoped [`RunContext`]: names
//! are reserved first, then schemas and operations are resolved against the
//! reserved names. Post-processing publishes run-wide values as globals and
//! the [`GeneratorRunner`] renders every planned file through the
//! [`TemplateRenderer`] and [`OutputSink`] ports.

pub mod context;
pub mod model;
pub mod naming;
pub mod operation;
pub mod orchestrator;
pub mod post_processor;
pub mod preprocess;
pub mod registry;
pub mod sanitizers;
pub mod schema;
pub mod security;
pub mod strategy;
pub mod traits;
pub mod types;

pub use context::*;
pub use model::*;
pub use orchestrator::*;
pub use strategy::TargetStrategy;
pub use traits::*;
pub use types::*;
