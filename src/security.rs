//! Property key and path safety checks.
//!
//! Used by clone, merge, unflatten, path get/set and the object filter to
//! keep prototype-style keys and traversal strings out of structures.

/// Keys that can reach an object's prototype chain.
const DANGEROUS_KEYS: [&str; 3] = ["__proto__", "constructor", "prototype"];

/// Substrings (lowercased) that mark a key as a traversal attempt.
const TRAVERSAL_PATTERNS: [&str; 7] = ["..", "/", "\\", "\0", "%2e", "%2f", "%5c"];

/// True for `__proto__`, `constructor`, `prototype` and any `__`-prefixed key.
pub fn is_dangerous_key(key: &str) -> bool {
    DANGEROUS_KEYS.contains(&key) || key.starts_with("__")
}

/// True when `key` is non-empty, not dangerous and free of traversal patterns.
pub fn is_safe_key(key: &str) -> bool {
    if key.is_empty() || is_dangerous_key(key) {
        return false;
    }
    let lowered = key.to_ascii_lowercase();
    !TRAVERSAL_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
}

/// True when every `separator`-delimited segment of `path` is a safe key.
///
/// Rejects empty paths and leading, trailing or doubled separators.
pub fn is_safe_path(path: &str, separator: &str) -> bool {
    if path.is_empty() || separator.is_empty() {
        return false;
    }
    path.split(separator).all(is_safe_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dangerous_keys() {
        assert!(is_dangerous_key("__proto__"));
        assert!(is_dangerous_key("constructor"));
        assert!(is_dangerous_key("prototype"));
        assert!(is_dangerous_key("__secret"));
        assert!(!is_dangerous_key("name"));
        assert!(!is_dangerous_key("_private"));
    }

    #[test]
    fn test_safe_keys() {
        assert!(is_safe_key("user"));
        assert!(is_safe_key("first_name"));
        assert!(!is_safe_key(""));
        assert!(!is_safe_key("__proto__"));
        assert!(!is_safe_key("../etc"));
        assert!(!is_safe_key("a/b"));
        assert!(!is_safe_key("a\\b"));
        assert!(!is_safe_key("nul\0byte"));
        assert!(!is_safe_key("%2E%2E"));
    }

    #[test]
    fn test_safe_paths() {
        assert!(is_safe_path("a", "."));
        assert!(is_safe_path("user.address.city", "."));
        assert!(!is_safe_path("", "."));
        assert!(!is_safe_path(".a", "."));
        assert!(!is_safe_path("a.", "."));
        assert!(!is_safe_path("a..b", "."));
        assert!(!is_safe_path("a.__proto__.b", "."));
        assert!(!is_safe_path("constructor.prototype", "."));
    }

    #[test]
    fn test_safe_paths_custom_separator() {
        assert!(is_safe_path("a_b", "_"));
        assert!(is_safe_path("a::b", "::"));
        assert!(!is_safe_path("a::::b", "::"));
        assert!(!is_safe_path("a.b", ""));
    }
}
