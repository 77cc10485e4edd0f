use std::collections::BTreeSet;

/// Point-in-time copy of the keys a bridge reports as held.
pub type KeySnapshot = BTreeSet<String>;

/// Canonical key spelling shared by programs and bridges: first letter
/// uppercase, the rest lowercase (`w` -> `W`, `UP` -> `Up`).
pub fn normalize_key_name(name: &str) -> String {
    let name = name.trim();
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out = first.to_uppercase().collect::<String>();
    out.push_str(&chars.as_str().to_lowercase());
    out
}
