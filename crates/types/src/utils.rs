//! Shared limits and helpers

/// Maximum number of keys in a merged environment
pub const MAX_ENVIRONMENT_KEYS: usize = 10_000;

/// Maximum length of an environment key in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum length of an environment value in bytes
pub const MAX_VALUE_LENGTH: usize = 4096;

/// Maximum number of provider instances bound on a client
pub const MAX_CLIENT_PROVIDERS: usize = 50;

/// Maximum number of sources per load
pub const MAX_SOURCES: usize = 10;

/// Characters never allowed in a key
pub const INVALID_KEY_CHARS: &[char] = &[' ', '\t', '\n', '\r', '='];

/// Check a key for emptiness and forbidden characters.
///
/// Returns the reason when the key is rejected.
pub fn check_key(key: &str) -> Option<&'static str> {
    if key.trim().is_empty() {
        return Some("key cannot be empty");
    }
    if key.contains(INVALID_KEY_CHARS) {
        return Some("key contains invalid characters");
    }
    None
}

/// Generate a correlation ID for load tracing
pub fn generate_load_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Shorten a string for single-line display, appending `...`
pub fn truncate_display(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_key() {
        assert_eq!(check_key("DATABASE_URL"), None);
        assert_eq!(check_key("app.name"), None);
        assert!(check_key("").is_some());
        assert!(check_key("   ").is_some());
        assert!(check_key("BAD KEY").is_some());
        assert!(check_key("A=B").is_some());
    }

    #[test]
    fn test_truncate_display() {
        assert_eq!(truncate_display("short", 10), "short");
        assert_eq!(truncate_display("a description that is long", 10), "a descr...");
    }

    #[test]
    fn test_load_ids_are_unique() {
        assert_ne!(generate_load_id(), generate_load_id());
    }
}
