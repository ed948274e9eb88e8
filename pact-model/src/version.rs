//! Pact specification versions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported pact specification versions.
///
/// Ordered so that version reconciliation can keep the maximum version
/// requested across all contributions to a contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PactSpecVersion {
    /// Pact specification v3
    V3,
    /// Pact specification v4
    V4,
}

impl PactSpecVersion {
    /// The newest specification version this crate supports.
    pub const NEWEST: Self = Self::V4;

    /// The version string written into pact file metadata.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V3 => "3.0.0",
            Self::V4 => "4.0.0",
        }
    }
}

impl Default for PactSpecVersion {
    fn default() -> Self {
        Self::V3
    }
}

impl fmt::Display for PactSpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
