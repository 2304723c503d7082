//! Key normalization for flat sources.
//!
//! Environment variable names and flag names are lowercased, runs of `.` and
//! `_` collapse into a single `_`, and the result is split on `_` into path
//! segments.

/// Normalize a raw source key into its canonical `_`-delimited form.
///
/// Returns `None` when a prefix is configured and the key does not start with
/// it. When kept, the prefix is removed from the front of the key.
pub fn normalize(key: &str, prefix: Option<&str>) -> Option<String> {
    let collapsed = collapse(&key.to_lowercase());

    let mut field = collapsed.as_str();
    field = field.strip_prefix("--").unwrap_or(field);
    field = field.strip_prefix('_').unwrap_or(field);
    field = field.strip_suffix('_').unwrap_or(field);

    match prefix.filter(|p| !p.is_empty()) {
        None => Some(field.to_string()),
        Some(prefix) => {
            let subject = if field.is_empty() { key } else { field };
            if !subject.starts_with(prefix) {
                return None;
            }
            // An empty field matched via the raw key has nothing to strip.
            Some(field.strip_prefix(prefix).unwrap_or(field).to_string())
        }
    }
}

/// Split a normalized key into path segments.
pub fn segments(normalized: &str) -> Vec<&str> {
    normalized.split('_').collect()
}

fn collapse(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut in_run = false;
    for ch in key.chars() {
        if ch == '.' || ch == '_' {
            if !in_run {
                out.push('_');
            }
            in_run = true;
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}
