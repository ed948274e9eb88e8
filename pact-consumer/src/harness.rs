//! Harness orchestration.
//!
//! [`PactConsumerHarness`] owns the collaborator seams (mock server factory,
//! expression resolver, pact writer) and the process-wide configuration. The
//! host test runner drives it through explicit lifecycle calls:
//! [`PactConsumerHarness::begin_class`] opens the class scope,
//! [`ClassRunner::run_test`] wraps one test body with endpoint setup and
//! teardown, and [`ClassRunner::finish`] writes the aggregated pacts and
//! runs the coverage audit.

use crate::aggregate;
use crate::audit;
use crate::cache::lookup_pact;
use crate::config::HarnessConfig;
use crate::error::ConsumerError;
use crate::expression::{EnvResolver, ExpressionResolver};
use crate::mock::{MockServerFactory, MockServerHandle, ValidationOutcome, setup_mock_server};
use crate::params::{ParamEnv, ParameterKind, ParameterValue, resolve_parameter, supports_parameter};
use crate::registry::{TestClassSpec, TestSpec};
use crate::resolver::resolve_providers;
use crate::scope::{ClassScope, ResolvedProvider, TestScope};
use pact_model::{Interaction, JsonFileWriter, Pact, PactWriter};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Consumer-driven contract test harness.
pub struct PactConsumerHarness {
    config: HarnessConfig,
    factory: Arc<dyn MockServerFactory>,
    resolver: Arc<dyn ExpressionResolver>,
    writer: Arc<dyn PactWriter>,
}

impl PactConsumerHarness {
    /// Create a harness using the given mock server factory, default
    /// configuration, environment-backed placeholder resolution and the JSON
    /// file writer.
    #[must_use]
    pub fn new(factory: Arc<dyn MockServerFactory>) -> Self {
        Self {
            config: HarnessConfig::default(),
            factory,
            resolver: Arc::new(EnvResolver),
            writer: Arc::new(JsonFileWriter::new()),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: HarnessConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the placeholder resolver.
    #[must_use]
    pub fn with_expression_resolver(mut self, resolver: Arc<dyn ExpressionResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the pact writer.
    #[must_use]
    pub fn with_writer(mut self, writer: Arc<dyn PactWriter>) -> Self {
        self.writer = writer;
        self
    }

    /// Open the class scope and return the runner for its tests.
    #[must_use]
    pub fn begin_class(&self, class: TestClassSpec) -> ClassRunner<'_> {
        debug!(class = %class.name, "beginning test class");
        ClassRunner {
            harness: self,
            class,
            scope: ClassScope::open(),
            aborted: AtomicBool::new(false),
        }
    }
}

/// Runs the tests of one class against a shared class scope.
pub struct ClassRunner<'a> {
    harness: &'a PactConsumerHarness,
    class: TestClassSpec,
    scope: Arc<ClassScope>,
    aborted: AtomicBool,
}

impl ClassRunner<'_> {
    /// The class scope shared by every test of this runner.
    #[must_use]
    pub fn class_scope(&self) -> &Arc<ClassScope> {
        &self.scope
    }

    /// Record that the class run aborted; write-out and the coverage audit
    /// are skipped at [`ClassRunner::finish`].
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    /// Run one test body with full endpoint lifecycle around it.
    ///
    /// Synchronous providers get their endpoint started and readiness-waited
    /// before the body runs. After a passing body each endpoint is given the
    /// settle delay, stopped and validated; validated pacts are forwarded to
    /// the aggregation map. A failing or panicking body stops the endpoints
    /// but forwards nothing.
    ///
    /// # Errors
    ///
    /// Configuration and startup errors surface before the body runs; body
    /// failures, shutdown errors and validation mismatches after it.
    pub fn run_test<F>(&self, test: &TestSpec, body: F) -> Result<(), ConsumerError>
    where
        F: FnOnce(&TestContext<'_>) -> anyhow::Result<()>,
    {
        let scope = TestScope::open(self.scope.clone());
        let providers: Vec<ResolvedProvider> = scope
            .providers_or_init(|| resolve_providers(&self.class, test))
            .to_vec();

        if let Err(err) = self.start_endpoints(&scope, &providers, test) {
            stop_endpoints(&scope);
            return Err(err);
        }

        let ctx = TestContext {
            harness: self.harness,
            class: &self.class,
            test_name: &test.name,
            scope: &scope,
            providers: &providers,
        };
        let outcome = catch_unwind(AssertUnwindSafe(|| body(&ctx)));
        let body_result = match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(ConsumerError::TestBody(format!("{err:#}"))),
            Err(payload) => Err(ConsumerError::TestBody(panic_message(payload.as_ref()))),
        };

        if let Err(err) = body_result {
            // The contract produced by a failing test is discarded; the
            // endpoints are still cleaned up.
            stop_endpoints(&scope);
            return Err(err);
        }

        self.settle_and_forward(&scope, &providers, test)
    }

    /// Write every aggregated pact and audit fragment coverage.
    ///
    /// Skipped entirely when the class run was aborted.
    ///
    /// # Errors
    ///
    /// Returns write failures first, then coverage failures.
    pub fn finish(self) -> Result<(), ConsumerError> {
        if self.aborted.load(Ordering::SeqCst) {
            debug!(class = %self.class.name, "class run aborted, skipping write-out and audit");
            return Ok(());
        }

        let directory = self
            .class
            .pact_directory
            .clone()
            .unwrap_or_else(|| self.harness.config.pact_dir.clone());
        aggregate::flush(&self.scope, &directory, self.harness.writer.as_ref())?;
        audit::audit_coverage(&self.class, &self.scope)
    }

    fn start_endpoints(
        &self,
        scope: &TestScope,
        providers: &[ResolvedProvider],
        test: &TestSpec,
    ) -> Result<(), ConsumerError> {
        for (config, selector) in providers {
            if config.provider_type.or_default().is_asynchronous() {
                continue;
            }
            let handle = setup_mock_server(
                config,
                selector.as_deref(),
                scope,
                &self.class,
                &test.name,
                self.harness.resolver.as_ref(),
                self.harness.factory.as_ref(),
            )?;
            handle.start().map_err(|err| ConsumerError::Startup {
                provider: config.provider_name.clone(),
                message: err.to_string(),
            })?;
            handle
                .wait_until_ready()
                .map_err(|err| ConsumerError::Startup {
                    provider: config.provider_name.clone(),
                    message: err.to_string(),
                })?;
        }
        Ok(())
    }

    fn settle_and_forward(
        &self,
        scope: &TestScope,
        providers: &[ResolvedProvider],
        test: &TestSpec,
    ) -> Result<(), ConsumerError> {
        let result = self.forward_contracts(scope, providers, test);
        if result.is_err() {
            // An earlier provider's failure must not leave later providers'
            // endpoints serving.
            stop_endpoints(scope);
        }
        result
    }

    fn forward_contracts(
        &self,
        scope: &TestScope,
        providers: &[ResolvedProvider],
        test: &TestSpec,
    ) -> Result<(), ConsumerError> {
        for (config, selector) in providers {
            let version = config.pact_version.unwrap_or_default();
            if config.provider_type.or_default().is_asynchronous() {
                // Message contracts are built, not served: forward
                // unconditionally.
                let pact = lookup_pact(
                    config,
                    selector.as_deref(),
                    scope,
                    &self.class,
                    &test.name,
                    self.harness.resolver.as_ref(),
                )?;
                aggregate::contribute(&self.scope, pact, version);
                continue;
            }

            let handle = setup_mock_server(
                config,
                selector.as_deref(),
                scope,
                &self.class,
                &test.name,
                self.harness.resolver.as_ref(),
                self.harness.factory.as_ref(),
            )?;

            // Give the endpoint's request log a moment to settle before
            // inspecting it.
            std::thread::sleep(self.harness.config.settle_delay);
            handle.stop().map_err(|err| ConsumerError::Shutdown {
                provider: config.provider_name.clone(),
                message: err.to_string(),
            })?;
            match handle.validate() {
                ValidationOutcome::Ok => {
                    let pact = lookup_pact(
                        config,
                        selector.as_deref(),
                        scope,
                        &self.class,
                        &test.name,
                        self.harness.resolver.as_ref(),
                    )?;
                    aggregate::contribute(&self.scope, pact, version);
                }
                ValidationOutcome::Mismatch(details) => {
                    return Err(ConsumerError::Validation {
                        provider: config.provider_name.clone(),
                        mismatches: details.join("; "),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Stop every endpoint created within the scope, warning on failures.
fn stop_endpoints(scope: &TestScope) {
    for handle in scope.mock_servers() {
        if let Err(err) = handle.stop() {
            warn!(provider = %handle.provider_name(), %err, "failed to stop mock server during cleanup");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "test body panicked".to_string())
}

/// View of the running test handed to the test body for parameter
/// resolution.
pub struct TestContext<'a> {
    harness: &'a PactConsumerHarness,
    class: &'a TestClassSpec,
    test_name: &'a str,
    scope: &'a TestScope,
    providers: &'a [ResolvedProvider],
}

impl TestContext<'_> {
    fn env(&self) -> ParamEnv<'_> {
        ParamEnv {
            providers: self.providers,
            scope: self.scope,
            class: self.class,
            test_name: self.test_name,
            resolver: self.harness.resolver.as_ref(),
            factory: self.harness.factory.as_ref(),
        }
    }

    /// Display name of the running test.
    #[must_use]
    pub fn test_name(&self) -> &str {
        self.test_name
    }

    /// The providers resolved for this test.
    #[must_use]
    pub fn providers(&self) -> &[ResolvedProvider] {
        self.providers
    }

    /// Check whether the given parameter kind can be injected here.
    #[must_use]
    pub fn supports(&self, kind: ParameterKind) -> bool {
        supports_parameter(kind, self.providers)
    }

    /// Resolve a parameter value, optionally disambiguated by provider name.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for ambiguous or unknown provider
    /// targets or a kind the provider mix cannot produce.
    pub fn resolve(
        &self,
        kind: ParameterKind,
        for_provider: Option<&str>,
    ) -> Result<ParameterValue, ConsumerError> {
        resolve_parameter(&self.env(), kind, for_provider)
    }

    /// The mock endpoint handle (single provider).
    ///
    /// # Errors
    ///
    /// Returns a configuration error with multiple providers or a provider
    /// mix without a synchronous endpoint.
    pub fn mock_server(&self) -> Result<Arc<MockServerHandle>, ConsumerError> {
        match self.resolve(ParameterKind::MockServer, None)? {
            ParameterValue::MockServer(handle) => Ok(handle),
            _ => Err(self.not_injectable(ParameterKind::MockServer)),
        }
    }

    /// The mock endpoint handle for the named provider.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the name matches no resolved
    /// provider.
    pub fn mock_server_for(&self, provider: &str) -> Result<Arc<MockServerHandle>, ConsumerError> {
        match self.resolve(ParameterKind::MockServer, Some(provider))? {
            ParameterValue::MockServer(handle) => Ok(handle),
            _ => Err(self.not_injectable(ParameterKind::MockServer)),
        }
    }

    /// Base URL of the mock endpoint (single provider).
    ///
    /// # Errors
    ///
    /// Same conditions as [`TestContext::mock_server`].
    pub fn mock_server_url(&self) -> Result<String, ConsumerError> {
        Ok(self.mock_server()?.url())
    }

    /// The built request/response contract (single provider).
    ///
    /// # Errors
    ///
    /// Returns configuration and lookup errors.
    pub fn pact(&self) -> Result<Pact, ConsumerError> {
        match self.resolve(ParameterKind::RequestResponsePact, None)? {
            ParameterValue::RequestResponsePact(pact) => Ok(pact),
            _ => Err(self.not_injectable(ParameterKind::RequestResponsePact)),
        }
    }

    /// The built message contract (single provider).
    ///
    /// # Errors
    ///
    /// Returns configuration and lookup errors.
    pub fn message_pact(&self) -> Result<Pact, ConsumerError> {
        match self.resolve(ParameterKind::MessagePact, None)? {
            ParameterValue::MessagePact(pact) => Ok(pact),
            _ => Err(self.not_injectable(ParameterKind::MessagePact)),
        }
    }

    /// The built message contract for the named provider.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the name matches no resolved
    /// provider.
    pub fn message_pact_for(&self, provider: &str) -> Result<Pact, ConsumerError> {
        match self.resolve(ParameterKind::MessagePact, Some(provider))? {
            ParameterValue::MessagePact(pact) => Ok(pact),
            _ => Err(self.not_injectable(ParameterKind::MessagePact)),
        }
    }

    /// The interaction list; with several asynchronous providers this is the
    /// concatenation of all their contributions.
    ///
    /// # Errors
    ///
    /// Returns configuration and lookup errors.
    pub fn interactions(&self) -> Result<Vec<Interaction>, ConsumerError> {
        match self.resolve(ParameterKind::Interactions, None)? {
            ParameterValue::Interactions(interactions) => Ok(interactions),
            _ => Err(self.not_injectable(ParameterKind::Interactions)),
        }
    }

    fn not_injectable(&self, kind: ParameterKind) -> ConsumerError {
        ConsumerError::UnsupportedParameter {
            kind: kind.to_string(),
            provider: self
                .providers
                .first()
                .map(|(config, _)| config.provider_name.clone())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockServer, MockServerError};
    use crate::provider::{MockServerConfig, ProviderSelection, ProviderType};
    use crate::registry::PactFragment;
    use pact_model::{HttpInteraction, PactSpecVersion, Request, Response};
    use parking_lot::Mutex;

    /// Records lifecycle events so ordering can be asserted.
    #[derive(Default)]
    struct EventLog {
        events: Mutex<Vec<String>>,
    }

    impl EventLog {
        fn push(&self, event: impl Into<String>) {
            self.events.lock().push(event.into());
        }

        fn snapshot(&self) -> Vec<String> {
            self.events.lock().clone()
        }
    }

    struct LoggingServer {
        log: Arc<EventLog>,
        mismatches: Vec<String>,
    }

    impl MockServer for LoggingServer {
        fn start(&self) -> Result<(), MockServerError> {
            self.log.push("start");
            Ok(())
        }

        fn wait_until_ready(&self) -> Result<(), MockServerError> {
            self.log.push("ready");
            Ok(())
        }

        fn stop(&self) -> Result<(), MockServerError> {
            self.log.push("stop");
            Ok(())
        }

        fn validate(&self) -> ValidationOutcome {
            self.log.push("validate");
            if self.mismatches.is_empty() {
                ValidationOutcome::Ok
            } else {
                ValidationOutcome::Mismatch(self.mismatches.clone())
            }
        }

        fn url(&self) -> String {
            "http://127.0.0.1:8080".to_string()
        }
    }

    struct LoggingFactory {
        log: Arc<EventLog>,
        mismatches: Vec<String>,
    }

    impl MockServerFactory for LoggingFactory {
        fn create(
            &self,
            _pact: &Pact,
            _config: &MockServerConfig,
        ) -> Result<Box<dyn MockServer>, MockServerError> {
            self.log.push("create");
            Ok(Box::new(LoggingServer {
                log: self.log.clone(),
                mismatches: self.mismatches.clone(),
            }))
        }
    }

    fn token_class() -> TestClassSpec {
        TestClassSpec::new("TokenContractTest")
            .with_provider(
                ProviderSelection::for_provider("token-service")
                    .with_type(ProviderType::Synchronous)
                    .with_version(PactSpecVersion::V3),
            )
            .with_fragment(PactFragment::request(
                "token_pact",
                "auth-edge",
                "token-service",
                |builder| {
                    builder
                        .interaction(HttpInteraction::new(
                            "get token",
                            Request::new("POST", "/token"),
                            Response::new(200),
                        ))
                        .build()
                },
            ))
    }

    fn harness(log: &Arc<EventLog>, mismatches: Vec<String>) -> PactConsumerHarness {
        PactConsumerHarness::new(Arc::new(LoggingFactory {
            log: log.clone(),
            mismatches,
        }))
        .with_config(HarnessConfig::default().with_settle_delay(std::time::Duration::ZERO))
    }

    #[test]
    fn test_endpoint_started_before_body_and_validated_after() {
        let log = Arc::new(EventLog::default());
        let harness = harness(&log, Vec::new());
        let runner = harness.begin_class(token_class());

        runner
            .run_test(&TestSpec::new("issues a token"), |ctx| {
                log.push("body");
                assert!(ctx.mock_server_url()?.starts_with("http://"));
                Ok(())
            })
            .unwrap();

        assert_eq!(
            log.snapshot(),
            vec!["create", "start", "ready", "body", "stop", "validate"]
        );
        assert_eq!(runner.class_scope().pending_pacts(), 1);
    }

    #[test]
    fn test_failing_body_discards_contribution_but_stops_endpoint() {
        let log = Arc::new(EventLog::default());
        let harness = harness(&log, Vec::new());
        let runner = harness.begin_class(token_class());

        let err = runner
            .run_test(&TestSpec::new("fails"), |_ctx| {
                anyhow::bail!("request assertion failed")
            })
            .unwrap_err();

        assert!(matches!(err, ConsumerError::TestBody(_)));
        assert!(log.snapshot().contains(&"stop".to_string()));
        assert_eq!(runner.class_scope().pending_pacts(), 0);
    }

    #[test]
    fn test_panicking_body_treated_as_failure() {
        let log = Arc::new(EventLog::default());
        let harness = harness(&log, Vec::new());
        let runner = harness.begin_class(token_class());

        let err = runner
            .run_test(&TestSpec::new("panics"), |_ctx| {
                panic!("boom");
            })
            .unwrap_err();

        assert!(matches!(err, ConsumerError::TestBody(message) if message.contains("boom")));
        assert_eq!(runner.class_scope().pending_pacts(), 0);
    }

    #[test]
    fn test_validation_mismatch_blocks_persistence() {
        let log = Arc::new(EventLog::default());
        let harness = harness(&log, vec!["expected POST /token, saw none".to_string()]);
        let runner = harness.begin_class(token_class());

        let err = runner
            .run_test(&TestSpec::new("never calls"), |_ctx| Ok(()))
            .unwrap_err();

        assert!(matches!(err, ConsumerError::Validation { .. }));
        assert_eq!(runner.class_scope().pending_pacts(), 0);
    }

    #[test]
    fn test_aborted_class_skips_finish() {
        let log = Arc::new(EventLog::default());
        let harness = harness(&log, Vec::new());
        let runner = harness.begin_class(
            // A never-executed fragment that would normally fail the audit.
            token_class(),
        );
        runner.abort();
        runner.finish().unwrap();
    }
}
