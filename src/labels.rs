// src/labels.rs
use once_cell::sync::Lazy;
use std::collections::HashMap;

// Fallback display labels for the synthetic report rows. The surrounding
// product translates these keys through its own localization layer; the CLI
// uses this table instead.
static DEFAULT_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("noCategory", "No category"),
        ("otherCanton", "Other canton"),
        ("unmatchedProfileCategory", "Unknown profile category"),
        ("total", "Total"),
    ])
});

/// Resolves a label key to its display string. Unknown keys fall back to the
/// key itself, so titles that are already display strings pass through.
pub fn default_label_lookup(key: &str) -> String {
    DEFAULT_LABELS
        .get(key)
        .map(|label| (*label).to_string())
        .unwrap_or_else(|| key.to_string())
}
