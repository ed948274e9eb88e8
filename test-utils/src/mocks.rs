//! Scripted mock endpoint doubles.
//!
//! [`ScriptedMockServerFactory`] produces endpoints whose lifecycle calls are
//! recorded in a shared event log and whose failures are scripted per
//! provider, so tests can assert both ordering and error handling without a
//! real network listener.

use pact_consumer::{
    MockServer, MockServerConfig, MockServerError, MockServerFactory, ValidationOutcome,
};
use pact_model::Pact;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Scripted behavior of one provider's endpoint.
#[derive(Debug, Clone)]
pub struct ScriptedBehavior {
    /// Fail endpoint creation with this message
    pub fail_create: Option<String>,
    /// Fail `start` with this message
    pub fail_start: Option<String>,
    /// Fail `wait_until_ready` with this message
    pub fail_ready: Option<String>,
    /// Fail `stop` with this message
    pub fail_stop: Option<String>,
    /// Mismatch details reported by `validate`; empty means validation passes
    pub mismatches: Vec<String>,
    /// Base URL reported by the endpoint
    pub url: String,
}

impl Default for ScriptedBehavior {
    fn default() -> Self {
        Self {
            fail_create: None,
            fail_start: None,
            fail_ready: None,
            fail_stop: None,
            mismatches: Vec::new(),
            url: "http://127.0.0.1:9000".to_string(),
        }
    }
}

impl ScriptedBehavior {
    /// Behavior that passes every lifecycle call.
    #[must_use]
    pub fn passing() -> Self {
        Self::default()
    }

    /// Behavior whose validation reports the given mismatches.
    #[must_use]
    pub fn mismatching(mismatches: Vec<String>) -> Self {
        Self {
            mismatches,
            ..Self::default()
        }
    }

    /// Behavior whose `start` fails with the given message.
    #[must_use]
    pub fn failing_start(message: impl Into<String>) -> Self {
        Self {
            fail_start: Some(message.into()),
            ..Self::default()
        }
    }
}

#[derive(Default)]
struct FactoryState {
    behaviors: Mutex<HashMap<String, ScriptedBehavior>>,
    events: Mutex<Vec<String>>,
    created_pacts: Mutex<Vec<Pact>>,
}

impl FactoryState {
    fn record(&self, operation: &str, provider: &str) {
        self.events.lock().push(format!("{operation} {provider}"));
    }
}

/// Factory producing scripted endpoints and recording every lifecycle call.
///
/// Clones share the same event log and scripts, so a test can keep one clone
/// for assertions after handing another to the harness.
#[derive(Clone, Default)]
pub struct ScriptedMockServerFactory {
    state: Arc<FactoryState>,
}

impl ScriptedMockServerFactory {
    /// Create a factory where every endpoint passes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the behavior of the named provider's endpoint.
    pub fn script(&self, provider: impl Into<String>, behavior: ScriptedBehavior) {
        self.state.behaviors.lock().insert(provider.into(), behavior);
    }

    /// Snapshot of the recorded lifecycle events, in call order. Each event
    /// is `"<operation> <provider>"`.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.state.events.lock().clone()
    }

    /// The pacts endpoints were created with, in creation order.
    #[must_use]
    pub fn created_pacts(&self) -> Vec<Pact> {
        self.state.created_pacts.lock().clone()
    }
}

impl MockServerFactory for ScriptedMockServerFactory {
    fn create(
        &self,
        pact: &Pact,
        _config: &MockServerConfig,
    ) -> Result<Box<dyn MockServer>, MockServerError> {
        let provider = pact.provider.name.clone();
        let behavior = self
            .state
            .behaviors
            .lock()
            .get(&provider)
            .cloned()
            .unwrap_or_default();

        self.state.record("create", &provider);
        if let Some(message) = behavior.fail_create {
            return Err(MockServerError::new(message));
        }
        self.state.created_pacts.lock().push(pact.clone());

        Ok(Box::new(ScriptedMockServer {
            provider,
            behavior,
            state: self.state.clone(),
        }))
    }
}

struct ScriptedMockServer {
    provider: String,
    behavior: ScriptedBehavior,
    state: Arc<FactoryState>,
}

impl ScriptedMockServer {
    fn scripted_call(&self, operation: &str, failure: Option<&String>) -> Result<(), MockServerError> {
        self.state.record(operation, &self.provider);
        match failure {
            Some(message) => Err(MockServerError::new(message.clone())),
            None => Ok(()),
        }
    }
}

impl MockServer for ScriptedMockServer {
    fn start(&self) -> Result<(), MockServerError> {
        self.scripted_call("start", self.behavior.fail_start.as_ref())
    }

    fn wait_until_ready(&self) -> Result<(), MockServerError> {
        self.scripted_call("ready", self.behavior.fail_ready.as_ref())
    }

    fn stop(&self) -> Result<(), MockServerError> {
        self.scripted_call("stop", self.behavior.fail_stop.as_ref())
    }

    fn validate(&self) -> ValidationOutcome {
        self.state.record("validate", &self.provider);
        if self.behavior.mismatches.is_empty() {
            ValidationOutcome::Ok
        } else {
            ValidationOutcome::Mismatch(self.behavior.mismatches.clone())
        }
    }

    fn url(&self) -> String {
        self.behavior.url.clone()
    }
}
