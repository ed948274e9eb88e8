//! On-disk pact file writer.
//!
//! File names are derived deterministically from the contract identity so
//! that a (consumer, provider) pair always maps to the same file.

use crate::contract::{Pact, Participant};
use crate::error::ModelError;
use crate::version::PactSpecVersion;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Writer for persisted contract documents.
pub trait PactWriter: Send + Sync {
    /// Write the pact at the given specification version into `directory`.
    ///
    /// Returns the path of the written file.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when serialization or the filesystem write
    /// fails.
    fn write(
        &self,
        pact: &Pact,
        version: PactSpecVersion,
        directory: &Path,
    ) -> Result<PathBuf, ModelError>;
}

/// Deterministic file name for a contract: `{consumer}-{provider}.json`.
#[must_use]
pub fn pact_file_name(pact: &Pact) -> String {
    format!("{}-{}.json", pact.consumer.name, pact.provider.name)
}

/// Writes pact files as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileWriter;

impl JsonFileWriter {
    /// Create a new JSON file writer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// On-disk pact file envelope.
#[derive(Serialize)]
struct PactFile<'a> {
    consumer: &'a Participant,
    provider: &'a Participant,
    interactions: &'a [crate::contract::Interaction],
    metadata: Metadata,
}

/// Pact file metadata block.
#[derive(Serialize)]
struct Metadata {
    #[serde(rename = "pactSpecification")]
    pact_specification: SpecVersion,
}

/// Specification version entry in the metadata block.
#[derive(Serialize)]
struct SpecVersion {
    version: String,
}

impl PactWriter for JsonFileWriter {
    fn write(
        &self,
        pact: &Pact,
        version: PactSpecVersion,
        directory: &Path,
    ) -> Result<PathBuf, ModelError> {
        let file = PactFile {
            consumer: &pact.consumer,
            provider: &pact.provider,
            interactions: &pact.interactions,
            metadata: Metadata {
                pact_specification: SpecVersion {
                    version: version.to_string(),
                },
            },
        };

        fs::create_dir_all(directory)?;
        let path = directory.join(pact_file_name(pact));
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}
