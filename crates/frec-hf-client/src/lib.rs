//! Client for the HuggingFace model inference API.
//!
//! Sends image bytes to a hosted model endpoint with a bounded retry loop:
//! a 503 means the model is still loading and is worth waiting for, any
//! other non-200 aborts immediately, and transport errors get a short
//! pause before the next attempt. Callers treat every error as a signal
//! to fall back to local enhancement.

pub mod client;
pub mod error;

pub use client::{HfClient, HfConfig, REMOTE_CONFIDENCE};
pub use error::{HfError, HfResult};
