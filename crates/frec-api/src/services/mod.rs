//! Business logic services.

pub mod enhancement;

pub use enhancement::{enhance_case, EnhancementOutcome};
