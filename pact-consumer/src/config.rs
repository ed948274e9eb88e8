//! Harness configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Consumer test harness configuration.
///
/// The pact directory is the process-wide default for written contracts;
/// a test class may override it with its own directory. Set once at harness
/// construction, read-only thereafter.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Default directory for written pact files
    pub pact_dir: PathBuf,
    /// Delay between test-body completion and endpoint validation, letting
    /// the endpoint's request log settle before it is inspected
    pub settle_delay: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            pact_dir: PathBuf::from("target/pacts"),
            settle_delay: Duration::from_millis(100),
        }
    }
}

impl HarnessConfig {
    /// Create a config with a custom default pact directory.
    #[must_use]
    pub fn with_pact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pact_dir = dir.into();
        self
    }

    /// Create a config with a custom settle delay.
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.pact_dir, PathBuf::from("target/pacts"));
        assert_eq!(config.settle_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_builders() {
        let config = HarnessConfig::default()
            .with_pact_dir("build/contracts")
            .with_settle_delay(Duration::ZERO);
        assert_eq!(config.pact_dir, PathBuf::from("build/contracts"));
        assert_eq!(config.settle_delay, Duration::ZERO);
    }
}
