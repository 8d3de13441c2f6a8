//! CLI command implementations

pub mod types;
pub mod validate;
