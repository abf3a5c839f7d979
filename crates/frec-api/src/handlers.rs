//! Request handlers.

pub mod cases;
pub mod enhance;
pub mod health;
pub mod models;

pub use cases::*;
pub use enhance::*;
pub use health::*;
pub use models::*;
