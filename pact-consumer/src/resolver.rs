//! Provider resolution.
//!
//! Turns the class-level and method-level provider declarations into the
//! ordered list of (provider configuration, fragment selector) pairs the
//! rest of the harness operates on. Resolution is a pure function over the
//! two optional declarations plus the fragment registry; it performs no I/O
//! and cannot fail — absent declarations degrade to defaults, and a fragment
//! name that matches nothing surfaces later, at pact lookup.

use crate::provider::{ProviderConfig, ProviderSelection};
use crate::registry::{TestClassSpec, TestSpec};
use crate::scope::ResolvedProvider;
use tracing::{debug, warn};

/// Resolve the providers under test for one test method.
///
/// Merge rules, in priority order:
/// 1. Both class and method declarations present: configs merge with the
///    method taking precedence. A method-level fragment list emits one pair
///    per named fragment, the provider name rebound from that fragment's own
///    declaration; with no method list the class list is used; with neither,
///    a single pair uses the method's single fragment name or the class's as
///    fallback.
/// 2. Only a class declaration: the same per-name expansion against the
///    class list, or a single pair.
/// 3. Only a method declaration: symmetric.
/// 4. Neither: a single default pair; lookup degrades to the first
///    registered fragment downstream.
#[must_use]
pub fn resolve_providers(class: &TestClassSpec, test: &TestSpec) -> Vec<ResolvedProvider> {
    let class_sel = class.provider.as_ref();
    let method_sel = test.provider.as_ref();

    let providers = match (class_sel, method_sel) {
        (Some(class_decl), Some(method_decl)) => {
            debug!(class = %class.name, test = %test.name, "merging class and method provider declarations");
            let merged = method_decl.merge(class_decl);
            if !method_decl.pact_fragments.is_empty() {
                expand_fragment_list(class, &merged, &method_decl.pact_fragments)
            } else if !class_decl.pact_fragments.is_empty() {
                expand_fragment_list(class, &merged, &class_decl.pact_fragments)
            } else {
                let selector = method_decl
                    .pact_fragment
                    .clone()
                    .or_else(|| class_decl.pact_fragment.clone());
                vec![(ProviderConfig::from(&merged), selector)]
            }
        }
        (Some(class_decl), None) => single_level(class, class_decl),
        (None, Some(method_decl)) => single_level(class, method_decl),
        (None, None) => {
            warn!(
                class = %class.name,
                "no provider declaration found on test class or method, using defaults"
            );
            vec![(ProviderConfig::default(), None)]
        }
    };

    debug!(class = %class.name, test = %test.name, count = providers.len(), "resolved providers");
    providers
}

fn single_level(class: &TestClassSpec, declaration: &ProviderSelection) -> Vec<ResolvedProvider> {
    if declaration.pact_fragments.is_empty() {
        vec![(
            ProviderConfig::from(declaration),
            declaration.pact_fragment.clone(),
        )]
    } else {
        expand_fragment_list(
            class,
            declaration,
            &declaration.pact_fragments,
        )
    }
}

fn expand_fragment_list(
    class: &TestClassSpec,
    declaration: &ProviderSelection,
    names: &[String],
) -> Vec<ResolvedProvider> {
    let base = ProviderConfig::from(declaration);
    names
        .iter()
        .map(|name| {
            let provider_name = provider_name_from_fragment(class, name);
            (base.for_provider(provider_name), Some(name.clone()))
        })
        .collect()
}

/// The provider name declared by the named fragment, or empty when the name
/// matches no registered fragment (the miss surfaces at pact lookup).
fn provider_name_from_fragment(class: &TestClassSpec, fragment_name: &str) -> String {
    class
        .fragment_named(fragment_name)
        .map(|fragment| fragment.provider.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderType;
    use crate::registry::PactFragment;
    use pact_model::PactSpecVersion;

    fn class_with_fragments() -> TestClassSpec {
        TestClassSpec::new("TokenContractTest")
            .with_fragment(PactFragment::request(
                "token_pact",
                "auth-edge",
                "token-service",
                |builder| builder.build(),
            ))
            .with_fragment(PactFragment::message(
                "revocation_pact",
                "auth-edge",
                "revocation-service",
                |builder| builder.build(),
            ))
    }

    #[test]
    fn test_merge_precedence_method_over_class() {
        let class = class_with_fragments().with_provider(
            ProviderSelection::for_provider("token-service").with_version(PactSpecVersion::V3),
        );
        let test = TestSpec::new("issues a token").with_provider(
            ProviderSelection::new().with_version(PactSpecVersion::V4),
        );

        let resolved = resolve_providers(&class, &test);
        assert_eq!(resolved.len(), 1);
        let (config, selector) = &resolved[0];
        assert_eq!(config.provider_name, "token-service");
        assert_eq!(config.pact_version, Some(PactSpecVersion::V4));
        assert!(selector.is_none());
    }

    #[test]
    fn test_method_fragment_list_expands_with_rebound_names() {
        let class = class_with_fragments()
            .with_provider(ProviderSelection::new().with_type(ProviderType::Asynchronous));
        let test = TestSpec::new("both contracts").with_provider(
            ProviderSelection::new().with_fragments(["token_pact", "revocation_pact"]),
        );

        let resolved = resolve_providers(&class, &test);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].0.provider_name, "token-service");
        assert_eq!(resolved[0].1.as_deref(), Some("token_pact"));
        assert_eq!(resolved[1].0.provider_name, "revocation-service");
        assert_eq!(resolved[1].1.as_deref(), Some("revocation_pact"));
        // Both inherit the merged provider type.
        assert_eq!(resolved[0].0.provider_type, ProviderType::Asynchronous);
    }

    #[test]
    fn test_class_fragment_list_used_when_method_has_none() {
        let class = class_with_fragments().with_provider(
            ProviderSelection::new().with_fragments(["revocation_pact"]),
        );
        let test = TestSpec::new("revocations")
            .with_provider(ProviderSelection::new().with_version(PactSpecVersion::V4));

        let resolved = resolve_providers(&class, &test);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].0.provider_name, "revocation-service");
        assert_eq!(resolved[0].0.pact_version, Some(PactSpecVersion::V4));
    }

    #[test]
    fn test_single_fragment_method_fallback_to_class() {
        let class = class_with_fragments().with_provider(
            ProviderSelection::for_provider("token-service").with_fragment("token_pact"),
        );
        let test = TestSpec::new("issues a token").with_provider(ProviderSelection::new());

        let resolved = resolve_providers(&class, &test);
        assert_eq!(resolved[0].1.as_deref(), Some("token_pact"));
    }

    #[test]
    fn test_class_only_declaration() {
        let class = class_with_fragments()
            .with_provider(ProviderSelection::for_provider("token-service"));
        let test = TestSpec::new("issues a token");

        let resolved = resolve_providers(&class, &test);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].0.provider_name, "token-service");
    }

    #[test]
    fn test_method_only_declaration_with_list() {
        let class = class_with_fragments();
        let test = TestSpec::new("both contracts").with_provider(
            ProviderSelection::new().with_fragments(["token_pact", "revocation_pact"]),
        );

        let resolved = resolve_providers(&class, &test);
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_no_declarations_resolves_to_default() {
        let class = class_with_fragments();
        let test = TestSpec::new("whatever");

        let resolved = resolve_providers(&class, &test);
        assert_eq!(resolved.len(), 1);
        assert!(resolved[0].0.provider_name.is_empty());
        assert!(resolved[0].1.is_none());
    }

    #[test]
    fn test_unknown_fragment_name_resolves_to_empty_provider() {
        let class = class_with_fragments();
        let test = TestSpec::new("bad list")
            .with_provider(ProviderSelection::new().with_fragments(["missing_pact"]));

        let resolved = resolve_providers(&class, &test);
        assert_eq!(resolved.len(), 1);
        assert!(resolved[0].0.provider_name.is_empty());
        assert_eq!(resolved[0].1.as_deref(), Some("missing_pact"));
    }
}
