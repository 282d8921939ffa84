use dashmap::DashMap;
use once_cell::sync::Lazy;

// Process-lifetime counters keyed by base name. Counts are never reused, even
// after the named clip is deleted.
static SPLIT_COUNTERS: Lazy<DashMap<String, u64>> = Lazy::new(DashMap::new);
static COPY_COUNTERS: Lazy<DashMap<String, u64>> = Lazy::new(DashMap::new);

/// Strip a generated `" (N)"` or `" (copy N)"` suffix so that derived names
/// chain from the original base instead of stacking suffixes.
pub fn base_name(name: &str) -> &str {
    let Some(open) = name.rfind(" (") else {
        return name;
    };
    let Some(inner) = name[open + 2..].strip_suffix(')') else {
        return name;
    };
    let counter = inner.strip_prefix("copy ").unwrap_or(inner);
    if !counter.is_empty() && counter.bytes().all(|b| b.is_ascii_digit()) {
        &name[..open]
    } else {
        name
    }
}

fn next(counters: &DashMap<String, u64>, base: &str) -> u64 {
    let mut entry = counters.entry(base.to_string()).or_insert(0);
    *entry += 1;
    *entry
}

/// Name for a clip part produced by a split: `"Drums"` -> `"Drums (1)"`,
/// `"Drums (2)"`, ...
pub fn split_name(name: &str) -> String {
    let base = base_name(name);
    format!("{} ({})", base, next(&SPLIT_COUNTERS, base))
}

/// Name for a pasted or duplicated clip: `"Drums"` -> `"Drums (copy 1)"`, ...
pub fn copy_name(name: &str) -> String {
    let base = base_name(name);
    format!("{} (copy {})", base, next(&COPY_COUNTERS, base))
}
