//! Consumer-driven contract test orchestration.
//!
//! Drives consumer contract tests against mock provider endpoints and
//! collects the resulting pacts:
//!
//! - Provider resolution merging class-level and test-level declarations
//! - Pact construction from registered fragments, built at most once per
//!   provider per test
//! - Mock endpoint lifecycle around the test body, with post-body
//!   validation gating persistence
//! - Class-wide aggregation by (consumer, provider) and JSON write-out
//! - Coverage audit of declared fragments against executed ones
//!
//! The mock endpoint itself, placeholder resolution and the pact writer are
//! collaborator seams; [`harness::PactConsumerHarness`] wires defaults for
//! all but the endpoint factory.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod audit;
pub mod cache;
pub mod config;
pub mod error;
pub mod expression;
pub mod harness;
pub mod mock;
pub mod params;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod scope;

pub use cache::DEFAULT_PROVIDER_NAME;
pub use config::HarnessConfig;
pub use error::ConsumerError;
pub use expression::{EnvResolver, ExpressionResolver, MapResolver};
pub use harness::{ClassRunner, PactConsumerHarness, TestContext};
pub use mock::{
    MockServer, MockServerError, MockServerFactory, MockServerHandle, MockServerState,
    ValidationOutcome,
};
pub use params::{ParameterKind, ParameterValue};
pub use provider::{MockServerConfig, ProviderConfig, ProviderSelection, ProviderType};
pub use registry::{PactFragment, TestClassSpec, TestSpec};
pub use scope::{ClassScope, ResolvedProvider, TestScope};
