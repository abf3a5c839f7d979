//! Enhancement profiles.
//!
//! A fixed set of named configurations selecting which hosted model the
//! enhancement client targets. Unknown names map to the default profile
//! rather than failing the request.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named enhancement configuration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum EnhancementProfile {
    #[default]
    Restoration,
    SuperResolution,
    ForensicEnhancement,
    IdentityPreservation,
}

impl EnhancementProfile {
    /// All profiles, in the order they are advertised by `/api/models`.
    pub const ALL: [EnhancementProfile; 4] = [
        EnhancementProfile::Restoration,
        EnhancementProfile::SuperResolution,
        EnhancementProfile::ForensicEnhancement,
        EnhancementProfile::IdentityPreservation,
    ];

    /// Parse a query-parameter value, falling back to the default profile
    /// for unknown names.
    pub fn parse_or_default(name: &str) -> Self {
        match name {
            "restoration" => EnhancementProfile::Restoration,
            "super_resolution" => EnhancementProfile::SuperResolution,
            "forensic_enhancement" => EnhancementProfile::ForensicEnhancement,
            "identity_preservation" => EnhancementProfile::IdentityPreservation,
            _ => EnhancementProfile::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnhancementProfile::Restoration => "restoration",
            EnhancementProfile::SuperResolution => "super_resolution",
            EnhancementProfile::ForensicEnhancement => "forensic_enhancement",
            EnhancementProfile::IdentityPreservation => "identity_preservation",
        }
    }

    /// Hosted model id this profile targets.
    pub fn model(&self) -> &'static str {
        match self {
            EnhancementProfile::Restoration => "microsoft/DiT-XL-2-256",
            EnhancementProfile::SuperResolution => "stabilityai/stable-diffusion-xl-base-1.0",
            EnhancementProfile::ForensicEnhancement => "runwayml/stable-diffusion-v1-5",
            EnhancementProfile::IdentityPreservation => "microsoft/DiT-XL-2-256",
        }
    }

    /// Human-readable description advertised by `/api/models`.
    pub fn description(&self) -> &'static str {
        match self {
            EnhancementProfile::Restoration => {
                "High-fidelity face restoration with identity preservation"
            }
            EnhancementProfile::SuperResolution => "Ultra-high resolution enhancement",
            EnhancementProfile::ForensicEnhancement => {
                "Government-grade forensic face reconstruction"
            }
            EnhancementProfile::IdentityPreservation => {
                "Maximum identity consistency for forensic analysis"
            }
        }
    }
}

impl fmt::Display for EnhancementProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
