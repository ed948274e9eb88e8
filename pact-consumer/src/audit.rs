//! Coverage audit for declared contract-producer fragments.

use crate::error::ConsumerError;
use crate::registry::TestClassSpec;
use crate::scope::ClassScope;

/// Check that every declared, non-disabled fragment was executed by some test
/// in the class.
///
/// # Errors
///
/// Returns [`ConsumerError::UnexecutedFragments`] listing every offender by
/// its class-qualified name.
pub fn audit_coverage(
    class: &TestClassSpec,
    class_scope: &ClassScope,
) -> Result<(), ConsumerError> {
    let executed = class_scope.executed_fragments();
    let offenders: Vec<String> = class
        .fragments
        .iter()
        .filter(|fragment| !fragment.disabled && !executed.contains(&fragment.name))
        .map(|fragment| format!("{}.{}", class.name, fragment.name))
        .collect();

    if offenders.is_empty() {
        Ok(())
    } else {
        Err(ConsumerError::UnexecutedFragments {
            fragments: offenders.join(", "),
        })
    }
}
