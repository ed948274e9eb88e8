//! Provider declarations and resolved configurations.
//!
//! A [`ProviderSelection`] is the raw declaration attached to a test class or
//! a single test. Class-level and method-level declarations merge
//! field-by-field with the method level taking precedence; the merged result
//! resolves to one or more [`ProviderConfig`] values (one per named fragment
//! when a fragment list is declared).

use pact_model::PactSpecVersion;

/// Kind of provider a contract targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderType {
    /// Request/response provider served by a mock endpoint during the test
    Synchronous,
    /// Message provider; contracts are built, never served
    Asynchronous,
    /// Not declared; treated as synchronous at use
    #[default]
    Unspecified,
}

impl ProviderType {
    /// Resolve `Unspecified` to the default synchronous kind.
    #[must_use]
    pub const fn or_default(self) -> Self {
        match self {
            Self::Unspecified => Self::Synchronous,
            other => other,
        }
    }

    /// Check if this is an asynchronous (message) provider.
    #[must_use]
    pub const fn is_asynchronous(self) -> bool {
        matches!(self, Self::Asynchronous)
    }
}

/// Mock endpoint configuration carried through declaration merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockServerConfig {
    /// Interface the endpoint binds to
    pub host_interface: String,
    /// Port to bind; 0 requests an ephemeral port
    pub port: u16,
    /// Whether the endpoint serves TLS
    pub tls: bool,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            host_interface: "127.0.0.1".to_string(),
            port: 0,
            tls: false,
        }
    }
}

impl MockServerConfig {
    /// Create a config binding the given port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Create a config binding the given interface.
    #[must_use]
    pub fn with_host_interface(mut self, host_interface: impl Into<String>) -> Self {
        self.host_interface = host_interface.into();
        self
    }

    /// Create a config serving TLS.
    #[must_use]
    pub const fn with_tls(mut self) -> Self {
        self.tls = true;
        self
    }
}

/// Raw provider declaration attached to a test class or test method.
#[derive(Debug, Clone, Default)]
pub struct ProviderSelection {
    /// Declared provider name
    pub provider_name: Option<String>,
    /// Declared provider kind
    pub provider_type: ProviderType,
    /// Requested pact specification version
    pub pact_version: Option<PactSpecVersion>,
    /// Single named fragment to build the pact from
    pub pact_fragment: Option<String>,
    /// Named fragments, each producing its own provider pair
    pub pact_fragments: Vec<String>,
    /// Mock endpoint configuration override
    pub mock_server: Option<MockServerConfig>,
}

impl ProviderSelection {
    /// Create an empty declaration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a declaration naming a provider.
    #[must_use]
    pub fn for_provider(name: impl Into<String>) -> Self {
        Self {
            provider_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the provider kind.
    #[must_use]
    pub const fn with_type(mut self, provider_type: ProviderType) -> Self {
        self.provider_type = provider_type;
        self
    }

    /// Set the requested pact specification version.
    #[must_use]
    pub const fn with_version(mut self, version: PactSpecVersion) -> Self {
        self.pact_version = Some(version);
        self
    }

    /// Select a single named fragment.
    #[must_use]
    pub fn with_fragment(mut self, name: impl Into<String>) -> Self {
        self.pact_fragment = Some(name.into());
        self
    }

    /// Select several named fragments, one provider pair per name.
    #[must_use]
    pub fn with_fragments<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pact_fragments = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the mock endpoint configuration.
    #[must_use]
    pub fn with_mock_server(mut self, config: MockServerConfig) -> Self {
        self.mock_server = Some(config);
        self
    }

    /// Merge with a lower-priority declaration, keeping this declaration's
    /// fields wherever both are set.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            provider_name: self.provider_name.clone().or_else(|| other.provider_name.clone()),
            provider_type: match self.provider_type {
                ProviderType::Unspecified => other.provider_type,
                set => set,
            },
            pact_version: self.pact_version.or(other.pact_version),
            pact_fragment: self.pact_fragment.clone().or_else(|| other.pact_fragment.clone()),
            pact_fragments: if self.pact_fragments.is_empty() {
                other.pact_fragments.clone()
            } else {
                self.pact_fragments.clone()
            },
            mock_server: self.mock_server.clone().or_else(|| other.mock_server.clone()),
        }
    }
}

/// Resolved provider configuration, ready for pact lookup and endpoint setup.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider name; empty when resolution degraded to defaults
    pub provider_name: String,
    /// Provider kind
    pub provider_type: ProviderType,
    /// Requested pact specification version
    pub pact_version: Option<PactSpecVersion>,
    /// Mock endpoint configuration
    pub mock_server: MockServerConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_name: String::new(),
            provider_type: ProviderType::Unspecified,
            pact_version: None,
            mock_server: MockServerConfig::default(),
        }
    }
}

impl From<&ProviderSelection> for ProviderConfig {
    fn from(selection: &ProviderSelection) -> Self {
        Self {
            provider_name: selection.provider_name.clone().unwrap_or_default(),
            provider_type: selection.provider_type,
            pact_version: selection.pact_version,
            mock_server: selection.mock_server.clone().unwrap_or_default(),
        }
    }
}

impl ProviderConfig {
    /// Copy of this config bound to a different provider name.
    #[must_use]
    pub fn for_provider(&self, name: impl Into<String>) -> Self {
        Self {
            provider_name: name.into(),
            ..self.clone()
        }
    }
}
