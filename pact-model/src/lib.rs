//! Pact contract document model.
//!
//! Provides the types shared by the consumer test harness:
//! - Contract documents (pacts) with HTTP and message interactions
//! - Consumer-side builders seeded with participant names and spec version
//! - Pact specification versions with ordering for version reconciliation
//! - The on-disk pact file writer

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod contract;
pub mod error;
pub mod version;
pub mod writer;

pub use builder::{MessagePactBuilder, PactBuilder};
pub use contract::{HttpInteraction, Interaction, MessageInteraction, Pact, Participant, Request, Response};
pub use error::ModelError;
pub use version::PactSpecVersion;
pub use writer::{JsonFileWriter, PactWriter, pact_file_name};
