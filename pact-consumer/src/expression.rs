//! Placeholder substitution for participant names.
//!
//! Declared consumer and provider names may contain `${name}` placeholders.
//! Substitution is best-effort: unresolved placeholders are left as their
//! literal text, so a declaration without placeholders passes through
//! unchanged.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    // Pattern is a compile-time literal, so this cannot fail.
    #[allow(clippy::unwrap_used)]
    let pattern = Regex::new(r"\$\{([^}]+)\}").unwrap();
    pattern
});

/// Resolves placeholder names to values.
pub trait ExpressionResolver: Send + Sync {
    /// Resolve a placeholder name, returning `None` when unknown.
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Resolver backed by process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvResolver;

impl ExpressionResolver for EnvResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Resolver backed by an explicit map, for programmatic configuration.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    values: HashMap<String, String>,
}

impl MapResolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a placeholder binding.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl ExpressionResolver for MapResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Substitute every `${name}` placeholder in `input`.
///
/// Placeholders the resolver cannot resolve are kept as their literal text.
#[must_use]
pub fn substitute(input: &str, resolver: &dyn ExpressionResolver) -> String {
    PLACEHOLDER
        .replace_all(input, |captures: &regex::Captures<'_>| {
            let name = &captures[1];
            resolver
                .resolve(name)
                .unwrap_or_else(|| captures[0].to_string())
        })
        .into_owned()
}
