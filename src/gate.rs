//! Dependency gate: pure activation-eligibility predicate.
//!
//! No side effects, no I/O; the available-service set is only a membership
//! oracle and is never mutated here.

use std::collections::HashSet;

/// True iff every required service name is present in the available set.
/// An empty requirement set is trivially satisfied.
pub fn is_satisfied(required: &[String], available: &HashSet<String>) -> bool {
    required.iter().all(|dep| available.contains(dep))
}

/// The required service names absent from the available set, in declaration
/// order, for error reporting.
pub fn unmet(required: &[String], available: &HashSet<String>) -> Vec<String> {
    required
        .iter()
        .filter(|dep| !available.contains(*dep))
        .cloned()
        .collect()
}
