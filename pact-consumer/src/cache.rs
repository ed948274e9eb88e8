//! Pact lookup: per-provider cache plus builder invocation.
//!
//! `lookup_pact` is idempotent per provider name within a test scope: the
//! first call selects the fragment, checks its shape against the resolved
//! provider type, invokes it with a seeded builder and caches the result;
//! later calls return the cached document unchanged.

use crate::error::ConsumerError;
use crate::expression::{ExpressionResolver, substitute};
use crate::provider::{ProviderConfig, ProviderType};
use crate::registry::{FragmentFn, PactFragment, TestClassSpec};
use crate::scope::TestScope;
use pact_model::contract::TEST_NAME_COMMENT;
use pact_model::{MessagePactBuilder, Pact, PactBuilder, PactSpecVersion};
use tracing::debug;

/// Provider name used for seeding a builder when nothing names the provider.
pub const DEFAULT_PROVIDER_NAME: &str = "default";

/// Look up the pact for a provider, building it on first access.
///
/// # Errors
///
/// Returns a configuration error when no fragment matches the lookup or the
/// matched fragment's builder shape does not fit the provider type.
pub fn lookup_pact(
    config: &ProviderConfig,
    selector: Option<&str>,
    scope: &TestScope,
    class: &TestClassSpec,
    test_name: &str,
    resolver: &dyn ExpressionResolver,
) -> Result<Pact, ConsumerError> {
    scope.pact_or_build(&config.provider_name, || {
        build_pact(config, selector, scope, class, test_name, resolver)
    })
}

fn build_pact(
    config: &ProviderConfig,
    selector: Option<&str>,
    scope: &TestScope,
    class: &TestClassSpec,
    test_name: &str,
    resolver: &dyn ExpressionResolver,
) -> Result<Pact, ConsumerError> {
    let fragment = find_fragment(config, selector, class, resolver).ok_or_else(|| {
        ConsumerError::NoPactFragment {
            class: class.name.clone(),
            provider: config.provider_name.clone(),
        }
    })?;

    let provider_type = config.provider_type.or_default();
    check_shape(fragment, provider_type, class)?;

    let consumer = substitute(&fragment.consumer, resolver);
    let declared_provider = substitute(&fragment.provider, resolver);
    let provider_name = if declared_provider.is_empty() {
        if config.provider_name.is_empty() {
            DEFAULT_PROVIDER_NAME.to_string()
        } else {
            config.provider_name.clone()
        }
    } else {
        declared_provider
    };

    debug!(
        fragment = %fragment.name,
        test = %test_name,
        "invoking fragment to build pact"
    );

    let version = config.pact_version.unwrap_or_default();
    let mut pact = match &fragment.builder {
        FragmentFn::Request(build) => build(PactBuilder::new(consumer, provider_name, version)),
        FragmentFn::Message(build) => {
            build(MessagePactBuilder::new(consumer, provider_name, version))
        }
    };

    // Traceability metadata only; added when the newest spec version was
    // explicitly requested.
    if config.pact_version == Some(PactSpecVersion::NEWEST) {
        pact.annotate_interactions(
            TEST_NAME_COMMENT,
            &format!("{}.{}", class.name, test_name),
        );
    }

    scope.class().mark_executed(&fragment.name);
    Ok(pact)
}

/// Fragment search order: exact name when selected; else the first fragment
/// whose declared provider (substituted) is empty or matches the known
/// provider name; else the first fragment registered at all.
fn find_fragment<'a>(
    config: &ProviderConfig,
    selector: Option<&str>,
    class: &'a TestClassSpec,
    resolver: &dyn ExpressionResolver,
) -> Option<&'a PactFragment> {
    match selector {
        Some(name) => {
            debug!(fragment = name, provider = %config.provider_name, "looking for named fragment");
            class.fragment_named(name)
        }
        None if !config.provider_name.is_empty() => {
            debug!(provider = %config.provider_name, "looking for first fragment for provider");
            class.fragment_for_provider(&config.provider_name, resolver)
        }
        None => {
            debug!("looking for first fragment");
            class.first_fragment()
        }
    }
}

fn check_shape(
    fragment: &PactFragment,
    provider_type: ProviderType,
    class: &TestClassSpec,
) -> Result<(), ConsumerError> {
    let matches = match provider_type {
        ProviderType::Asynchronous => matches!(fragment.builder, FragmentFn::Message(_)),
        ProviderType::Synchronous | ProviderType::Unspecified => {
            matches!(fragment.builder, FragmentFn::Request(_))
        }
    };
    if matches {
        Ok(())
    } else {
        Err(ConsumerError::FragmentSignature {
            fragment: format!("{}.{}", class.name, fragment.name),
            expected: if provider_type.is_asynchronous() {
                "message"
            } else {
                "request/response"
            },
        })
    }
}
