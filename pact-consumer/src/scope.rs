//! Lifecycle-bound stores for test classes and test methods.
//!
//! A [`ClassScope`] lives from class start to class teardown and holds the
//! state shared by every test in the class: the executed-fragment set and the
//! pact aggregation map. A [`TestScope`] is opened fresh for each test method
//! and holds the resolved provider list, the per-provider pact cache and the
//! per-provider mock endpoint handles.
//!
//! All maps use insert-if-absent and merge-on-conflict disciplines under
//! short-lived locks so that concurrently running test methods cannot lose
//! updates.

use crate::mock::MockServerHandle;
use crate::provider::ProviderConfig;
use once_cell::sync::OnceCell;
use pact_model::{Pact, PactSpecVersion};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Identity of an aggregated contract: (consumer name, provider name).
pub type AggregationKey = (String, String);

/// A resolved provider paired with its optional fragment selector.
pub type ResolvedProvider = (ProviderConfig, Option<String>);

/// Aggregated contract awaiting write-out.
#[derive(Debug, Clone)]
pub struct AggregationEntry {
    /// Merged contract document
    pub pact: Pact,
    /// Maximum specification version requested by any contribution
    pub version: PactSpecVersion,
}

/// Class-lifetime store, shared by all tests of a class.
#[derive(Debug, Default)]
pub struct ClassScope {
    executed_fragments: Mutex<HashSet<String>>,
    pacts_to_write: Mutex<BTreeMap<AggregationKey, AggregationEntry>>,
}

impl ClassScope {
    /// Open a fresh class scope.
    #[must_use]
    pub fn open() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record a fragment as executed.
    pub fn mark_executed(&self, fragment: &str) {
        self.executed_fragments.lock().insert(fragment.to_string());
    }

    /// Snapshot of the executed-fragment set.
    #[must_use]
    pub fn executed_fragments(&self) -> HashSet<String> {
        self.executed_fragments.lock().clone()
    }

    /// Run `f` with exclusive access to the aggregation map.
    pub(crate) fn with_pacts_to_write<R>(
        &self,
        f: impl FnOnce(&mut BTreeMap<AggregationKey, AggregationEntry>) -> R,
    ) -> R {
        f(&mut self.pacts_to_write.lock())
    }

    /// Number of contracts currently awaiting write-out.
    #[must_use]
    pub fn pending_pacts(&self) -> usize {
        self.pacts_to_write.lock().len()
    }
}

/// Per-test store, opened fresh for each test method.
#[derive(Debug)]
pub struct TestScope {
    class: Arc<ClassScope>,
    providers: OnceCell<Vec<ResolvedProvider>>,
    pacts: Mutex<BTreeMap<String, Pact>>,
    mock_servers: Mutex<BTreeMap<String, Arc<MockServerHandle>>>,
}

impl TestScope {
    /// Open a test scope attached to its class scope.
    #[must_use]
    pub fn open(class: Arc<ClassScope>) -> Self {
        Self {
            class,
            providers: OnceCell::new(),
            pacts: Mutex::new(BTreeMap::new()),
            mock_servers: Mutex::new(BTreeMap::new()),
        }
    }

    /// The owning class scope.
    #[must_use]
    pub fn class(&self) -> &Arc<ClassScope> {
        &self.class
    }

    /// The resolved provider list, computing it on first access.
    pub fn providers_or_init(
        &self,
        init: impl FnOnce() -> Vec<ResolvedProvider>,
    ) -> &[ResolvedProvider] {
        self.providers.get_or_init(init)
    }

    /// The cached pact for a provider, if already built.
    #[must_use]
    pub fn pact_for(&self, provider_name: &str) -> Option<Pact> {
        self.pacts.lock().get(provider_name).cloned()
    }

    /// Return the cached pact for a provider, building and caching it when
    /// absent.
    ///
    /// The build closure runs while the cache lock is held, which is what
    /// guarantees at most one invocation per provider name even when test
    /// parameters race with endpoint setup.
    ///
    /// # Errors
    ///
    /// Propagates the build closure's error; nothing is cached on failure.
    pub fn pact_or_build<E>(
        &self,
        provider_name: &str,
        build: impl FnOnce() -> Result<Pact, E>,
    ) -> Result<Pact, E> {
        let mut pacts = self.pacts.lock();
        if let Some(pact) = pacts.get(provider_name) {
            return Ok(pact.clone());
        }
        let pact = build()?;
        pacts.insert(provider_name.to_string(), pact.clone());
        Ok(pact)
    }

    /// The mock endpoint handle for a provider, if already created.
    #[must_use]
    pub fn mock_server_for(&self, provider_name: &str) -> Option<Arc<MockServerHandle>> {
        self.mock_servers.lock().get(provider_name).cloned()
    }

    /// Return the endpoint handle for a provider, creating and caching it
    /// when absent.
    ///
    /// # Errors
    ///
    /// Propagates the create closure's error; nothing is cached on failure.
    pub fn mock_server_or_create<E>(
        &self,
        provider_name: &str,
        create: impl FnOnce() -> Result<Arc<MockServerHandle>, E>,
    ) -> Result<Arc<MockServerHandle>, E> {
        let mut servers = self.mock_servers.lock();
        if let Some(handle) = servers.get(provider_name) {
            return Ok(handle.clone());
        }
        let handle = create()?;
        servers.insert(provider_name.to_string(), handle.clone());
        Ok(handle)
    }

    /// All endpoint handles created within this scope.
    #[must_use]
    pub fn mock_servers(&self) -> Vec<Arc<MockServerHandle>> {
        self.mock_servers.lock().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executed_set_deduplicates() {
        let class = ClassScope::open();
        class.mark_executed("token_pact");
        class.mark_executed("token_pact");
        assert_eq!(class.executed_fragments().len(), 1);
    }

    #[test]
    fn test_pact_built_at_most_once() {
        let class = ClassScope::open();
        let scope = TestScope::open(class);
        let mut builds = 0;

        for _ in 0..2 {
            let pact = scope
                .pact_or_build::<()>("token-service", || {
                    builds += 1;
                    Ok(Pact::new("auth-edge", "token-service"))
                })
                .unwrap();
            assert_eq!(pact.provider.name, "token-service");
        }

        assert_eq!(builds, 1);
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let class = ClassScope::open();
        let scope = TestScope::open(class);

        let failed: Result<Pact, &str> = scope.pact_or_build("token-service", || Err("boom"));
        assert!(failed.is_err());
        assert!(scope.pact_for("token-service").is_none());
    }

    #[test]
    fn test_providers_computed_once() {
        let class = ClassScope::open();
        let scope = TestScope::open(class);
        let mut calls = 0;

        for _ in 0..2 {
            scope.providers_or_init(|| {
                calls += 1;
                Vec::new()
            });
        }

        assert_eq!(calls, 1);
    }
}
