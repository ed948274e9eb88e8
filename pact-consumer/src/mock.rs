//! Mock endpoint collaborator interface and lifecycle handle.
//!
//! The mock server itself is an external collaborator; the harness only
//! drives its lifecycle: create, start, wait until ready, run the test body,
//! stop, validate. [`MockServerHandle`] wraps one server per provider per
//! test scope and tracks the `Created -> Started -> Stopped` state machine.

use crate::cache::lookup_pact;
use crate::error::ConsumerError;
use crate::expression::ExpressionResolver;
use crate::provider::ProviderConfig;
use crate::registry::TestClassSpec;
use crate::scope::TestScope;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

/// Error reported by the mock endpoint collaborator.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct MockServerError {
    /// Failure detail
    message: String,
}

impl MockServerError {
    /// Create an error with the given detail.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of validating the endpoint's observed interactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// All expected interactions observed, no unexpected ones
    Ok,
    /// Expected and observed interactions differ
    Mismatch(Vec<String>),
}

impl ValidationOutcome {
    /// Check if validation passed.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// External mock endpoint standing in for a provider during the test body.
pub trait MockServer: Send + Sync {
    /// Start serving. No-op side effects must not occur before this call.
    ///
    /// # Errors
    ///
    /// Returns [`MockServerError`] when the endpoint cannot start.
    fn start(&self) -> Result<(), MockServerError>;

    /// Block until the endpoint is ready to accept requests.
    ///
    /// # Errors
    ///
    /// Returns [`MockServerError`] on a startup failure or timeout; both are
    /// fatal to the test.
    fn wait_until_ready(&self) -> Result<(), MockServerError>;

    /// Stop serving.
    ///
    /// # Errors
    ///
    /// Returns [`MockServerError`] when shutdown fails.
    fn stop(&self) -> Result<(), MockServerError>;

    /// Compare the interactions observed while serving with the expected
    /// ones.
    fn validate(&self) -> ValidationOutcome;

    /// Base URL of the running endpoint.
    fn url(&self) -> String;
}

/// Creates mock endpoints from a pact and an endpoint configuration.
pub trait MockServerFactory: Send + Sync {
    /// Create an endpoint serving the given pact. Creation must have no
    /// network side effect; serving begins at [`MockServer::start`].
    ///
    /// # Errors
    ///
    /// Returns [`MockServerError`] when the endpoint cannot be created.
    fn create(
        &self,
        pact: &pact_model::Pact,
        config: &crate::provider::MockServerConfig,
    ) -> Result<Box<dyn MockServer>, MockServerError>;
}

/// Lifecycle state of a mock endpoint handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockServerState {
    /// Created, not yet serving
    Created,
    /// Serving requests
    Started,
    /// Stopped; observed interactions may be validated
    Stopped,
}

/// Handle wrapping one mock endpoint for one provider within a test scope.
pub struct MockServerHandle {
    provider_name: String,
    server: Box<dyn MockServer>,
    state: Mutex<MockServerState>,
}

impl std::fmt::Debug for MockServerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockServerHandle")
            .field("provider_name", &self.provider_name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl MockServerHandle {
    /// Wrap a newly created endpoint.
    #[must_use]
    pub fn new(provider_name: impl Into<String>, server: Box<dyn MockServer>) -> Self {
        Self {
            provider_name: provider_name.into(),
            server,
            state: Mutex::new(MockServerState::Created),
        }
    }

    /// The provider this endpoint stands in for.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> MockServerState {
        *self.state.lock()
    }

    /// Start the endpoint. Idempotent once started.
    ///
    /// # Errors
    ///
    /// Returns [`MockServerError`] when the endpoint fails to start.
    pub fn start(&self) -> Result<(), MockServerError> {
        let mut state = self.state.lock();
        if *state == MockServerState::Created {
            self.server.start()?;
            *state = MockServerState::Started;
        }
        Ok(())
    }

    /// Block until the endpoint is ready.
    ///
    /// # Errors
    ///
    /// Returns [`MockServerError`] on startup failure or timeout.
    pub fn wait_until_ready(&self) -> Result<(), MockServerError> {
        self.server.wait_until_ready()
    }

    /// Stop the endpoint. Idempotent; only a started endpoint is stopped.
    ///
    /// # Errors
    ///
    /// Returns [`MockServerError`] when shutdown fails.
    pub fn stop(&self) -> Result<(), MockServerError> {
        let mut state = self.state.lock();
        if *state == MockServerState::Started {
            self.server.stop()?;
        }
        *state = MockServerState::Stopped;
        Ok(())
    }

    /// Validate the endpoint's observed interactions.
    #[must_use]
    pub fn validate(&self) -> ValidationOutcome {
        self.server.validate()
    }

    /// Base URL of the endpoint.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }
}

/// Return the endpoint handle for a provider, creating it on first access.
///
/// Creation builds the provider's pact first (cached, built at most once)
/// and wraps the endpoint the factory produces; nothing touches the network
/// until the handle is started.
///
/// # Errors
///
/// Propagates pact lookup configuration errors and reports factory failures
/// as startup errors for the provider.
pub fn setup_mock_server(
    config: &ProviderConfig,
    selector: Option<&str>,
    scope: &TestScope,
    class: &TestClassSpec,
    test_name: &str,
    resolver: &dyn ExpressionResolver,
    factory: &dyn MockServerFactory,
) -> Result<Arc<MockServerHandle>, ConsumerError> {
    scope.mock_server_or_create(&config.provider_name, || {
        let pact = lookup_pact(config, selector, scope, class, test_name, resolver)?;
        let server = factory
            .create(&pact, &config.mock_server)
            .map_err(|err| ConsumerError::Startup {
                provider: config.provider_name.clone(),
                message: err.to_string(),
            })?;
        Ok(Arc::new(MockServerHandle::new(
            config.provider_name.clone(),
            server,
        )))
    })
}
