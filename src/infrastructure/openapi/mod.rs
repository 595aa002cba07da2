//! Input document model and loading

pub mod file_loader;
pub mod types;

pub use file_loader::{load_spec, parse_spec};
pub use types::*;
