//! Entry descriptor canonicalization and sanitization.
//!
//! A manifest entry like `agents/agent_dev.rs` canonicalizes to the dotted
//! module path `agents.agent_dev`. The allow-list filter then keeps only
//! ASCII alphanumerics, underscores, and dots; a byte-exact mismatch between
//! the filtered and canonical forms means the raw entry carried disallowed
//! characters (path traversal, shell metacharacters, separator escapes) and
//! must never reach module resolution.

/// Source-file suffix stripped during canonicalization.
pub const SOURCE_SUFFIX: &str = ".rs";

/// Canonical dotted form of a raw entry descriptor.
pub fn canonical_module_path(entry: &str) -> String {
    let trimmed = entry.strip_suffix(SOURCE_SUFFIX).unwrap_or(entry);
    trimmed.replace('/', ".")
}

/// Allow-list filter: ASCII alphanumerics, `_`, and `.` survive.
pub fn sanitize(path: &str) -> String {
    path.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
        .collect()
}

/// Canonicalize and verify an entry descriptor. `None` means the entry
/// contained disallowed characters or a traversal segment; the filter
/// comparison is byte-exact, not best-effort.
pub fn safe_module_path(entry: &str) -> Option<String> {
    let canonical = canonical_module_path(entry);
    if sanitize(&canonical) != canonical {
        return None;
    }
    // A traversal segment (`..`) canonicalizes to consecutive dots; empty
    // components are never valid in a dotted module path.
    if canonical.is_empty() || canonical.split('.').any(str::is_empty) {
        return None;
    }
    Some(canonical)
}
