//! Data models

pub mod artifact;
pub mod transaction;
pub mod prediction;

pub use artifact::*;
pub use transaction::*;
pub use prediction::*;
