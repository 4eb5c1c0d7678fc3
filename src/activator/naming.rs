//! Implementation-name derivation.
//!
//! Human-readable convention tying a declared agent name to its
//! implementation type: `agent_dev` maps to `AgentDev`. Kept as the
//! convention for populating the registry, not as a runtime symbol-
//! resolution mechanism.

/// Deterministic transform: split on underscore, capitalize each segment,
/// concatenate. An empty segment (doubled underscore) contributes `_`.
pub fn implementation_name(agent_name: &str) -> String {
    agent_name.split('_').map(capitalize).collect()
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return "_".to_string();
    };
    first
        .to_uppercase()
        .chain(chars.flat_map(char::to_lowercase))
        .collect()
}
