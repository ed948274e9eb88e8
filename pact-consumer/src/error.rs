//! Harness error types.
//!
//! One taxonomy enum covers the failure classes of the harness:
//! configuration errors (surfaced before the test body runs), endpoint
//! startup/shutdown errors, post-body validation mismatches, class-teardown
//! coverage failures and pact file write failures. No error is retried or
//! recovered locally; everything propagates to the host test runner.

use pact_model::ModelError;
use thiserror::Error;

/// Errors raised by the consumer test harness.
#[derive(Error, Debug)]
pub enum ConsumerError {
    /// No contract-producer fragment matched the lookup
    #[error(
        "No pact fragment was found on test class {class} for provider '{provider}'"
    )]
    NoPactFragment {
        /// Test class searched
        class: String,
        /// Provider name the lookup was scoped to
        provider: String,
    },

    /// A fragment's builder shape does not match the resolved provider type
    #[error(
        "Fragment '{fragment}' does not conform to the required shape: expected a {expected} builder"
    )]
    FragmentSignature {
        /// Offending fragment, qualified with its class name
        fragment: String,
        /// Shape required by the resolved provider type
        expected: &'static str,
    },

    /// Multiple providers configured and the injected value names none of them
    #[error(
        "Multiple providers are set up for this test. The injected {kind} value must name \
         its target provider"
    )]
    AmbiguousParameter {
        /// Parameter kind requested by the test body
        kind: String,
    },

    /// The provider named in a parameter disambiguation was not resolved
    #[error("Did not find a provider with name '{name}' for the injected parameter")]
    UnknownProvider {
        /// Provider name given in the disambiguation marker
        name: String,
    },

    /// The requested parameter kind cannot be produced for the provider
    #[error("Could not inject a {kind} parameter for provider '{provider}'")]
    UnsupportedParameter {
        /// Parameter kind requested by the test body
        kind: String,
        /// Provider the parameter was resolved against
        provider: String,
    },

    /// The mock endpoint failed to start or never became ready
    #[error("Mock server for provider '{provider}' failed to start: {message}")]
    Startup {
        /// Provider whose endpoint failed
        provider: String,
        /// Failure detail from the endpoint
        message: String,
    },

    /// The mock endpoint failed while stopping after a passing test body
    #[error("Mock server for provider '{provider}' failed to stop: {message}")]
    Shutdown {
        /// Provider whose endpoint failed
        provider: String,
        /// Failure detail from the endpoint
        message: String,
    },

    /// Observed interactions did not match the expected ones
    #[error("Mock server validation failed for provider '{provider}': {mismatches}")]
    Validation {
        /// Provider whose endpoint reported the mismatch
        provider: String,
        /// Mismatch details from the endpoint
        mismatches: String,
    },

    /// The test body returned an error or panicked
    #[error("Test body failed: {0}")]
    TestBody(String),

    /// Declared fragments that no test exercised, reported at class teardown
    #[error(
        "The following pact fragments were not executed during the test: {fragments}\n\
         If these are currently a work in progress, mark them as disabled"
    )]
    UnexecutedFragments {
        /// Class-qualified names of the unexecuted fragments
        fragments: String,
    },

    /// One or more pact files failed to write at class teardown
    #[error("Failed to write pact files: {failures}")]
    Write {
        /// Per-entry failure details
        failures: String,
    },

    /// Serialization or filesystem error from the pact model
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ConsumerError {
    /// Check if this is a configuration error, surfaced before the test body
    /// runs.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NoPactFragment { .. }
                | Self::FragmentSignature { .. }
                | Self::AmbiguousParameter { .. }
                | Self::UnknownProvider { .. }
                | Self::UnsupportedParameter { .. }
        )
    }
}
