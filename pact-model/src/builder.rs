//! Consumer-side pact builders.
//!
//! The harness seeds a builder with the resolved consumer and provider names
//! and the requested specification version, then hands it to the registered
//! contract-producer routine. The routine records its interactions and calls
//! [`PactBuilder::build`] (or [`MessagePactBuilder::build`]) to produce the
//! contract document.

use crate::contract::{HttpInteraction, Interaction, MessageInteraction, Pact};
use crate::version::PactSpecVersion;

/// Builder for request/response contracts.
#[derive(Debug, Clone)]
pub struct PactBuilder {
    consumer: String,
    provider: String,
    version: PactSpecVersion,
    interactions: Vec<Interaction>,
}

impl PactBuilder {
    /// Create a builder seeded with participant names and spec version.
    #[must_use]
    pub fn new(
        consumer: impl Into<String>,
        provider: impl Into<String>,
        version: PactSpecVersion,
    ) -> Self {
        Self {
            consumer: consumer.into(),
            provider: provider.into(),
            version,
            interactions: Vec::new(),
        }
    }

    /// The consumer name this builder was seeded with.
    #[must_use]
    pub fn consumer(&self) -> &str {
        &self.consumer
    }

    /// The provider name this builder was seeded with.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// The specification version requested for the contract.
    #[must_use]
    pub const fn version(&self) -> PactSpecVersion {
        self.version
    }

    /// Record a request/response interaction.
    #[must_use]
    pub fn interaction(mut self, interaction: HttpInteraction) -> Self {
        self.interactions.push(Interaction::Http(interaction));
        self
    }

    /// Produce the contract document.
    #[must_use]
    pub fn build(self) -> Pact {
        let mut pact = Pact::new(self.consumer, self.provider);
        pact.interactions = self.interactions;
        pact
    }
}

/// Builder for message (asynchronous) contracts.
#[derive(Debug, Clone)]
pub struct MessagePactBuilder {
    consumer: String,
    provider: String,
    version: PactSpecVersion,
    messages: Vec<Interaction>,
}

impl MessagePactBuilder {
    /// Create a builder seeded with participant names and spec version.
    #[must_use]
    pub fn new(
        consumer: impl Into<String>,
        provider: impl Into<String>,
        version: PactSpecVersion,
    ) -> Self {
        Self {
            consumer: consumer.into(),
            provider: provider.into(),
            version,
            messages: Vec::new(),
        }
    }

    /// The consumer name this builder was seeded with.
    #[must_use]
    pub fn consumer(&self) -> &str {
        &self.consumer
    }

    /// The provider name this builder was seeded with.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// The specification version requested for the contract.
    #[must_use]
    pub const fn version(&self) -> PactSpecVersion {
        self.version
    }

    /// Record a message interaction.
    #[must_use]
    pub fn message(mut self, message: MessageInteraction) -> Self {
        self.messages.push(Interaction::Message(message));
        self
    }

    /// Produce the contract document.
    #[must_use]
    pub fn build(self) -> Pact {
        let mut pact = Pact::new(self.consumer, self.provider);
        pact.interactions = self.messages;
        pact
    }
}
