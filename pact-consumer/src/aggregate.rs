//! Pact aggregation and write-out.
//!
//! Contributions from individual test methods merge into the class-wide
//! aggregation map keyed by (consumer, provider): interactions append in
//! contribution order and the stored version is the maximum ever requested.
//! The merge is commutative in outcome — append order may vary under
//! concurrent tests, but the final version is deterministic.

use crate::error::ConsumerError;
use crate::scope::{AggregationEntry, ClassScope};
use pact_model::{Pact, PactSpecVersion, PactWriter};
use std::collections::btree_map::Entry;
use std::path::Path;
use tracing::{debug, error};

/// Merge one test's pact into the class aggregation map.
pub fn contribute(class_scope: &ClassScope, pact: Pact, version: PactSpecVersion) {
    let key = pact.identity();
    class_scope.with_pacts_to_write(|pacts| match pacts.entry(key) {
        Entry::Occupied(mut occupied) => {
            let entry = occupied.get_mut();
            entry.pact.merge_interactions(pact.interactions);
            entry.version = entry.version.max(version);
        }
        Entry::Vacant(vacant) => {
            vacant.insert(AggregationEntry { pact, version });
        }
    });
}

/// Write every aggregated pact into `directory`.
///
/// Each entry is attempted regardless of earlier failures; failures are
/// collected and reported together.
///
/// # Errors
///
/// Returns [`ConsumerError::Write`] listing every entry that failed.
pub fn flush(
    class_scope: &ClassScope,
    directory: &Path,
    writer: &dyn PactWriter,
) -> Result<(), ConsumerError> {
    let entries = class_scope.with_pacts_to_write(std::mem::take);

    let mut failures = Vec::new();
    for ((consumer, provider), entry) in entries {
        debug!(
            consumer = %consumer,
            provider = %provider,
            version = %entry.version,
            directory = %directory.display(),
            "writing pact file"
        );
        if let Err(err) = writer.write(&entry.pact, entry.version, directory) {
            error!(consumer = %consumer, provider = %provider, %err, "pact write failed");
            failures.push(format!("{consumer} -> {provider}: {err}"));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(ConsumerError::Write {
            failures: failures.join(", "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pact_model::{HttpInteraction, Interaction, JsonFileWriter, ModelError, Request, Response};
    use std::path::PathBuf;

    fn pact_with_interactions(count: usize) -> Pact {
        let mut pact = Pact::new("auth-edge", "token-service");
        for i in 0..count {
            pact.interactions.push(Interaction::Http(HttpInteraction::new(
                format!("interaction {i}"),
                Request::new("GET", format!("/resource/{i}")),
                Response::new(200),
            )));
        }
        pact
    }

    #[test]
    fn test_aggregation_monotone_version_and_summed_interactions() {
        let scope = ClassScope::open();
        contribute(&scope, pact_with_interactions(2), PactSpecVersion::V3);
        contribute(&scope, pact_with_interactions(3), PactSpecVersion::V4);
        contribute(&scope, pact_with_interactions(1), PactSpecVersion::V3);

        scope.with_pacts_to_write(|pacts| {
            assert_eq!(pacts.len(), 1);
            let entry = pacts
                .get(&("auth-edge".to_string(), "token-service".to_string()))
                .unwrap();
            assert_eq!(entry.version, PactSpecVersion::V4);
            assert_eq!(entry.pact.interactions.len(), 6);
        });
    }

    #[test]
    fn test_distinct_identities_stay_separate() {
        let scope = ClassScope::open();
        contribute(&scope, Pact::new("auth-edge", "token-service"), PactSpecVersion::V3);
        contribute(&scope, Pact::new("auth-edge", "session-core"), PactSpecVersion::V3);

        assert_eq!(scope.pending_pacts(), 2);
    }

    #[test]
    fn test_flush_writes_every_entry() {
        let scope = ClassScope::open();
        contribute(&scope, pact_with_interactions(1), PactSpecVersion::V3);
        contribute(&scope, Pact::new("auth-edge", "session-core"), PactSpecVersion::V4);

        let dir = tempfile::tempdir().unwrap();
        flush(&scope, dir.path(), &JsonFileWriter::new()).unwrap();

        assert!(dir.path().join("auth-edge-token-service.json").exists());
        assert!(dir.path().join("auth-edge-session-core.json").exists());
        assert_eq!(scope.pending_pacts(), 0);
    }

    struct FailingWriter {
        fail_for_provider: String,
    }

    impl PactWriter for FailingWriter {
        fn write(
            &self,
            pact: &Pact,
            version: PactSpecVersion,
            directory: &Path,
        ) -> Result<PathBuf, ModelError> {
            if pact.provider.name == self.fail_for_provider {
                Err(ModelError::Io(std::io::Error::other("disk full")))
            } else {
                JsonFileWriter::new().write(pact, version, directory)
            }
        }
    }

    #[test]
    fn test_one_write_failure_does_not_block_others() {
        let scope = ClassScope::open();
        contribute(&scope, Pact::new("auth-edge", "token-service"), PactSpecVersion::V3);
        contribute(&scope, Pact::new("auth-edge", "session-core"), PactSpecVersion::V3);

        let dir = tempfile::tempdir().unwrap();
        let writer = FailingWriter {
            fail_for_provider: "session-core".to_string(),
        };
        let err = flush(&scope, dir.path(), &writer).unwrap_err();

        assert!(matches!(err, ConsumerError::Write { .. }));
        assert!(err.to_string().contains("session-core"));
        // The healthy entry was still written.
        assert!(dir.path().join("auth-edge-token-service.json").exists());
    }
}
