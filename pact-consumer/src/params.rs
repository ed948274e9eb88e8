//! Parameter injection for test bodies.
//!
//! A test body may request values resolved by the harness: the mock endpoint
//! handle, the built request/response or message contract, or the full
//! interaction list. With several providers under test, a request must name
//! its target provider — except for the interaction list, which concatenates
//! the contributions of every asynchronous provider.

use crate::cache::lookup_pact;
use crate::error::ConsumerError;
use crate::expression::ExpressionResolver;
use crate::mock::{MockServerFactory, MockServerHandle, setup_mock_server};
use crate::registry::TestClassSpec;
use crate::scope::{ResolvedProvider, TestScope};
use pact_model::{Interaction, Pact};
use std::fmt;
use std::sync::Arc;

/// Kind of value a test body can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// The started mock endpoint handle
    MockServer,
    /// The built request/response contract
    RequestResponsePact,
    /// The built message contract
    MessagePact,
    /// The interaction list of the built contract(s)
    Interactions,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MockServer => "mock server",
            Self::RequestResponsePact => "request/response pact",
            Self::MessagePact => "message pact",
            Self::Interactions => "interaction list",
        };
        f.write_str(name)
    }
}

/// A resolved parameter value.
#[derive(Debug, Clone)]
pub enum ParameterValue {
    /// Mock endpoint handle
    MockServer(Arc<MockServerHandle>),
    /// Request/response contract
    RequestResponsePact(Pact),
    /// Message contract
    MessagePact(Pact),
    /// Interaction list
    Interactions(Vec<Interaction>),
}

/// Check whether the given kind can be injected for this provider mix.
#[must_use]
pub fn supports_parameter(kind: ParameterKind, providers: &[ResolvedProvider]) -> bool {
    if providers
        .iter()
        .any(|(config, _)| config.provider_type.or_default().is_asynchronous())
    {
        matches!(
            kind,
            ParameterKind::Interactions | ParameterKind::MessagePact
        )
    } else if !providers.is_empty() {
        matches!(
            kind,
            ParameterKind::MockServer | ParameterKind::RequestResponsePact
        )
    } else {
        false
    }
}

/// Everything parameter resolution needs from the surrounding test run.
pub(crate) struct ParamEnv<'a> {
    pub providers: &'a [ResolvedProvider],
    pub scope: &'a TestScope,
    pub class: &'a TestClassSpec,
    pub test_name: &'a str,
    pub resolver: &'a dyn ExpressionResolver,
    pub factory: &'a dyn MockServerFactory,
}

/// Resolve a parameter value, disambiguating by provider name when several
/// providers are under test.
pub(crate) fn resolve_parameter(
    env: &ParamEnv<'_>,
    kind: ParameterKind,
    for_provider: Option<&str>,
) -> Result<ParameterValue, ConsumerError> {
    match (env.providers, for_provider) {
        ([single], None) => resolve_for_provider(env, single, kind),
        (providers, Some(name)) => {
            let provider = providers
                .iter()
                .find(|(config, _)| config.provider_name == name)
                .ok_or_else(|| ConsumerError::UnknownProvider {
                    name: name.to_string(),
                })?;
            resolve_for_provider(env, provider, kind)
        }
        (providers, None) if kind == ParameterKind::Interactions => {
            // The interaction list is the one aggregate view: concatenate
            // every asynchronous provider's contribution in resolution
            // order.
            let mut interactions = Vec::new();
            for provider in providers
                .iter()
                .filter(|(config, _)| config.provider_type.or_default().is_asynchronous())
            {
                if let ParameterValue::Interactions(mut list) =
                    resolve_for_provider(env, provider, kind)?
                {
                    interactions.append(&mut list);
                }
            }
            Ok(ParameterValue::Interactions(interactions))
        }
        _ => Err(ConsumerError::AmbiguousParameter {
            kind: kind.to_string(),
        }),
    }
}

fn resolve_for_provider(
    env: &ParamEnv<'_>,
    (config, selector): &ResolvedProvider,
    kind: ParameterKind,
) -> Result<ParameterValue, ConsumerError> {
    let selector = selector.as_deref();
    let pact = lookup_pact(
        config,
        selector,
        env.scope,
        env.class,
        env.test_name,
        env.resolver,
    )?;

    if config.provider_type.or_default().is_asynchronous() {
        match kind {
            ParameterKind::Interactions => Ok(ParameterValue::Interactions(pact.interactions)),
            ParameterKind::MessagePact => Ok(ParameterValue::MessagePact(pact)),
            ParameterKind::MockServer | ParameterKind::RequestResponsePact => {
                Err(unsupported(kind, config.provider_name.as_str()))
            }
        }
    } else {
        match kind {
            ParameterKind::MockServer => {
                let handle = setup_mock_server(
                    config,
                    selector,
                    env.scope,
                    env.class,
                    env.test_name,
                    env.resolver,
                    env.factory,
                )?;
                Ok(ParameterValue::MockServer(handle))
            }
            ParameterKind::RequestResponsePact => Ok(ParameterValue::RequestResponsePact(pact)),
            ParameterKind::MessagePact | ParameterKind::Interactions => {
                Err(unsupported(kind, config.provider_name.as_str()))
            }
        }
    }
}

fn unsupported(kind: ParameterKind, provider: &str) -> ConsumerError {
    ConsumerError::UnsupportedParameter {
        kind: kind.to_string(),
        provider: provider.to_string(),
    }
}
