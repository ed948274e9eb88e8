//! Contract-producer fragment registry and test metadata.
//!
//! Fragments are the registered routines that build a pact when invoked with
//! a seeded builder. The registry is built once from static declarations and
//! exposes typed lookup by name or provider, replacing runtime introspection:
//! the builder variant a fragment registers with is its declared signature
//! shape.

use crate::expression::{ExpressionResolver, substitute};
use crate::provider::ProviderSelection;
use pact_model::{MessagePactBuilder, Pact, PactBuilder};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Routine building a request/response contract from a seeded builder.
pub type RequestFragmentFn = Arc<dyn Fn(PactBuilder) -> Pact + Send + Sync>;

/// Routine building a message contract from a seeded builder.
pub type MessageFragmentFn = Arc<dyn Fn(MessagePactBuilder) -> Pact + Send + Sync>;

/// A fragment's builder routine, tagged with its signature shape.
#[derive(Clone)]
pub enum FragmentFn {
    /// Request/response shape: `fn(PactBuilder) -> Pact`
    Request(RequestFragmentFn),
    /// Message shape: `fn(MessagePactBuilder) -> Pact`
    Message(MessageFragmentFn),
}

impl FragmentFn {
    /// Human-readable name of the signature shape.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Request(_) => "request/response",
            Self::Message(_) => "message",
        }
    }
}

impl fmt::Debug for FragmentFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FragmentFn").field(&self.shape()).finish()
    }
}

/// A registered contract-producer routine.
#[derive(Debug, Clone)]
pub struct PactFragment {
    /// Fragment name, unique within its class
    pub name: String,
    /// Declared consumer name; may contain `${...}` placeholders
    pub consumer: String,
    /// Declared provider name; empty matches any provider
    pub provider: String,
    /// Whether the fragment is marked skipped/disabled
    pub disabled: bool,
    /// The builder routine
    pub builder: FragmentFn,
}

impl PactFragment {
    /// Register a request/response fragment.
    #[must_use]
    pub fn request<F>(
        name: impl Into<String>,
        consumer: impl Into<String>,
        provider: impl Into<String>,
        builder: F,
    ) -> Self
    where
        F: Fn(PactBuilder) -> Pact + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            consumer: consumer.into(),
            provider: provider.into(),
            disabled: false,
            builder: FragmentFn::Request(Arc::new(builder)),
        }
    }

    /// Register a message fragment.
    #[must_use]
    pub fn message<F>(
        name: impl Into<String>,
        consumer: impl Into<String>,
        provider: impl Into<String>,
        builder: F,
    ) -> Self
    where
        F: Fn(MessagePactBuilder) -> Pact + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            consumer: consumer.into(),
            provider: provider.into(),
            disabled: false,
            builder: FragmentFn::Message(Arc::new(builder)),
        }
    }

    /// Mark the fragment as skipped: it is excluded from the coverage audit.
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Test class metadata: provider declaration, fragment registry, overrides.
#[derive(Debug, Clone)]
pub struct TestClassSpec {
    /// Class name, used in diagnostics and interaction tagging
    pub name: String,
    /// Class-level provider declaration
    pub provider: Option<ProviderSelection>,
    /// Ordered registry of contract-producer fragments
    pub fragments: Vec<PactFragment>,
    /// Class-level pact directory override
    pub pact_directory: Option<PathBuf>,
}

impl TestClassSpec {
    /// Create a class spec with an empty registry.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: None,
            fragments: Vec::new(),
            pact_directory: None,
        }
    }

    /// Attach the class-level provider declaration.
    #[must_use]
    pub fn with_provider(mut self, provider: ProviderSelection) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Register a fragment; registration order is lookup order.
    #[must_use]
    pub fn with_fragment(mut self, fragment: PactFragment) -> Self {
        self.fragments.push(fragment);
        self
    }

    /// Override the directory written pacts go to for this class.
    #[must_use]
    pub fn with_pact_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pact_directory = Some(dir.into());
        self
    }

    /// Find the fragment with exactly the given name.
    #[must_use]
    pub fn fragment_named(&self, name: &str) -> Option<&PactFragment> {
        self.fragments.iter().find(|f| f.name == name)
    }

    /// Find the first fragment whose declared provider (after placeholder
    /// substitution) is empty or equal to `provider`.
    #[must_use]
    pub fn fragment_for_provider(
        &self,
        provider: &str,
        resolver: &dyn ExpressionResolver,
    ) -> Option<&PactFragment> {
        self.fragments.iter().find(|f| {
            let declared = substitute(&f.provider, resolver);
            declared.is_empty() || declared == provider
        })
    }

    /// The first registered fragment, if any.
    #[must_use]
    pub fn first_fragment(&self) -> Option<&PactFragment> {
        self.fragments.first()
    }
}

/// Per-test metadata.
#[derive(Debug, Clone)]
pub struct TestSpec {
    /// Display name of the test, used in diagnostics and interaction tagging
    pub name: String,
    /// Method-level provider declaration
    pub provider: Option<ProviderSelection>,
}

impl TestSpec {
    /// Create a test spec with no provider declaration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: None,
        }
    }

    /// Attach the method-level provider declaration.
    #[must_use]
    pub fn with_provider(mut self, provider: ProviderSelection) -> Self {
        self.provider = Some(provider);
        self
    }
}
