//! Pact contract types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Interaction comment key carrying the originating test name.
pub const TEST_NAME_COMMENT: &str = "testname";

/// A pact contract between a consumer and a provider.
///
/// Holds the ordered sequence of interactions agreed between the two
/// participants. Interactions contributed by several tests for the same
/// consumer/provider pair are appended in contribution order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pact {
    /// Consumer participant
    pub consumer: Participant,
    /// Provider participant
    pub provider: Participant,
    /// Contract interactions, in the order they were recorded
    pub interactions: Vec<Interaction>,
}

impl Pact {
    /// Create an empty pact between the given participants.
    #[must_use]
    pub fn new(consumer: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            consumer: Participant::new(consumer),
            provider: Participant::new(provider),
            interactions: Vec::new(),
        }
    }

    /// The (consumer name, provider name) identity of this contract.
    #[must_use]
    pub fn identity(&self) -> (String, String) {
        (self.consumer.name.clone(), self.provider.name.clone())
    }

    /// Append interactions from another contribution.
    ///
    /// No de-duplication is performed; order of the appended interactions is
    /// preserved.
    pub fn merge_interactions(&mut self, interactions: Vec<Interaction>) {
        self.interactions.extend(interactions);
    }

    /// Attach a comment to every interaction in the contract.
    pub fn annotate_interactions(&mut self, key: &str, value: &str) {
        for interaction in &mut self.interactions {
            interaction
                .comments_mut()
                .insert(key.to_string(), value.to_string());
        }
    }
}

/// A participant in a contract (consumer or provider).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    /// Participant name
    pub name: String,
}

impl Participant {
    /// Create a new participant.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An interaction in a contract.
///
/// Request/response interactions are served by a mock endpoint during the
/// test body; message interactions describe asynchronous contracts that are
/// built but never served.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Interaction {
    /// Synchronous HTTP request/response interaction
    Http(HttpInteraction),
    /// Asynchronous message interaction
    Message(MessageInteraction),
}

impl Interaction {
    /// Human-readable description of the interaction.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Http(i) => &i.description,
            Self::Message(i) => &i.description,
        }
    }

    /// Mutable access to the interaction's comments.
    pub fn comments_mut(&mut self) -> &mut BTreeMap<String, String> {
        match self {
            Self::Http(i) => &mut i.comments,
            Self::Message(i) => &mut i.comments,
        }
    }

    /// The interaction's comments.
    #[must_use]
    pub fn comments(&self) -> &BTreeMap<String, String> {
        match self {
            Self::Http(i) => &i.comments,
            Self::Message(i) => &i.comments,
        }
    }
}

/// An HTTP request/response interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpInteraction {
    /// Interaction description
    pub description: String,
    /// Provider state (precondition)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_state: Option<String>,
    /// Expected request
    pub request: Request,
    /// Expected response
    pub response: Response,
    /// Free-form comments (e.g. the originating test name)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub comments: BTreeMap<String, String>,
}

impl HttpInteraction {
    /// Create an interaction with the given description, request and response.
    #[must_use]
    pub fn new(description: impl Into<String>, request: Request, response: Response) -> Self {
        Self {
            description: description.into(),
            provider_state: None,
            request,
            response,
            comments: BTreeMap::new(),
        }
    }

    /// Set the provider state precondition.
    #[must_use]
    pub fn given(mut self, state: impl Into<String>) -> Self {
        self.provider_state = Some(state.into());
        self
    }
}

/// An asynchronous message interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageInteraction {
    /// Interaction description
    pub description: String,
    /// Provider state (precondition)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_state: Option<String>,
    /// Message contents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<serde_json::Value>,
    /// Message metadata (content type, routing keys, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    /// Free-form comments (e.g. the originating test name)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub comments: BTreeMap<String, String>,
}

impl MessageInteraction {
    /// Create a message interaction with the given description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            provider_state: None,
            contents: None,
            metadata: BTreeMap::new(),
            comments: BTreeMap::new(),
        }
    }

    /// Set the provider state precondition.
    #[must_use]
    pub fn given(mut self, state: impl Into<String>) -> Self {
        self.provider_state = Some(state.into());
        self
    }

    /// Set the message contents.
    #[must_use]
    pub fn with_contents(mut self, contents: serde_json::Value) -> Self {
        self.contents = Some(contents);
        self
    }

    /// Add a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// HTTP request in an interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Request {
    /// HTTP method
    pub method: String,
    /// Request path
    pub path: String,
    /// Request headers
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Request body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl Request {
    /// Create a request with the given method and path.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the request body.
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// HTTP response in an interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Response body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl Response {
    /// Create a response with the given status code.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the response body.
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}
