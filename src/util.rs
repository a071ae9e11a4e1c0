use serde::Serialize;

/// Get the serde-serialized name of a unit enum variant.
/// Uses serde's own rules (rename_all, rename, etc.) as the single source of truth.
/// Returns `None` for non-string variants (data-carrying variants).
pub fn serde_variant_name<T: Serialize>(val: &T) -> Option<String> {
    match serde_json::to_value(val) {
        Ok(serde_json::Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Get serde-serialized names for all variants of an enum.
/// Filters out any non-string variants (data-carrying variants).
pub fn serde_variant_names<T: Serialize>(variants: &[T]) -> Vec<String> {
    variants.iter().filter_map(serde_variant_name).collect()
}

/// Deserialize a string into an enum variant using serde's own rules.
/// Single source of truth: uses the same rename/rename_all config as normal deserialization.
pub fn from_serde_str<T: for<'de> serde::Deserialize<'de>>(s: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
}

/// Remove one layer of matching single or double quotes and surrounding whitespace.
pub fn strip_quotes(raw: &str) -> &str {
    let trimmed = raw.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.trim();
        }
    }
    trimmed
}

/// Canonical form for enumerated tokens: unquoted, uppercase, `_`-separated.
/// `"mobile data"` and `mobile-data` both become `MOBILE_DATA`.
pub fn normalize_choice(raw: &str) -> String {
    strip_quotes(raw)
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Format a set of choices as `{A, B, C}`.
pub fn format_choices(choices: &[String]) -> String {
    format!("{{{}}}", choices.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("  \"Mom\" "), "Mom");
        assert_eq!(strip_quotes("'Bohemian Rhapsody'"), "Bohemian Rhapsody");
        assert_eq!(strip_quotes("\"unbalanced'"), "\"unbalanced'");
        assert_eq!(strip_quotes("plain"), "plain");
    }

    #[test]
    fn test_normalize_choice() {
        assert_eq!(normalize_choice("wifi"), "WIFI");
        assert_eq!(normalize_choice("'mobile data'"), "MOBILE_DATA");
        assert_eq!(normalize_choice(" Mobile-Data "), "MOBILE_DATA");
        assert_eq!(normalize_choice("on"), "ON");
    }
}
