//! Shared domain models for the face reconstruction backend.
//!
//! This crate defines the Case and Result records persisted in the document
//! store, the fixed set of enhancement profiles, and the data-URI image
//! encoding used on the wire and in storage.

pub mod case;
pub mod image_data;
pub mod profile;
pub mod result;
pub mod statistics;

pub use case::{CaseId, CaseRecord, CaseStatus};
pub use image_data::{ImageData, ImageDataError};
pub use profile::EnhancementProfile;
pub use result::{EnhancementResult, ResultId, ResultStatus, FORENSIC_GRADE_THRESHOLD};
pub use statistics::CaseStatistics;
