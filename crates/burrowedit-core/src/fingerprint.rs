//! Sensitive-setting fingerprinting
//!
//! A small fixed set of dump lines can cost the operator their own way
//! back in: the identity name, the identity secret, and any raw
//! passthrough rule pointed at port 22. Those lines are digested so the
//! session can warn when an edit changed them, without diffing the rest
//! of the file.

use crate::validator::NormalizedDump;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

static SENSITIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // raw passthrough on the ssh port
        r"^\s*passthrough\b.*\b22\b",
        // identity name declaration
        r"^\s*name\s+\S",
        // identity secret declaration
        r"^\s*secret\s+\S",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("sensitive pattern compiles"))
    .collect()
});

/// Digest over the sensitive lines of a dump, in original line order.
///
/// `None` when nothing sensitive is present, never an empty-input
/// digest, so "no sensitive settings" and "sensitive settings changed"
/// can never be confused.
pub fn fingerprint(dump: &NormalizedDump) -> Option<String> {
    let mut matched = String::new();
    for line in dump.lines() {
        if SENSITIVE_PATTERNS.iter().any(|re| re.is_match(line)) {
            matched.push_str(line);
            matched.push('\n');
        }
    }
    if matched.is_empty() {
        return None;
    }

    let mut hasher = Sha256::new();
    hasher.update(matched.as_bytes());
    Some(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dump(text: &str) -> NormalizedDump {
        NormalizedDump::new(text)
    }

    #[test]
    fn no_sensitive_lines_means_no_fingerprint() {
        let d = dump("listen 9600\nmtu 1420\nlog info\n");
        assert_eq!(fingerprint(&d), None);
    }

    #[test]
    fn stable_under_reordering_of_nonsensitive_lines() {
        let a = dump("listen 9600\nname alpha\nmtu 1420\nsecret hunter2\n");
        let b = dump("mtu 1420\nname alpha\nlisten 9600\nsecret hunter2\n");
        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert!(fingerprint(&a).is_some());
    }

    #[test]
    fn changes_under_single_character_secret_edit() {
        let a = dump("name alpha\nsecret hunter2\n");
        let b = dump("name alpha\nsecret hunter3\n");
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn passthrough_to_port_22_is_sensitive() {
        let without = dump("listen 9600\n");
        let with = dump("listen 9600\npassthrough tcp 127.0.0.1 22\n");
        assert_eq!(fingerprint(&without), None);
        assert!(fingerprint(&with).is_some());
    }

    #[test]
    fn passthrough_to_other_ports_is_not_sensitive() {
        let d = dump("passthrough tcp 127.0.0.1 8080\n");
        assert_eq!(fingerprint(&d), None);
    }

    #[test]
    fn sensitive_line_order_matters() {
        // swapped sensitive lines are a different configuration
        let a = dump("name alpha\nsecret hunter2\n");
        let b = dump("secret hunter2\nname alpha\n");
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }
}
