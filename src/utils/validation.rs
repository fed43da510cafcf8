//! Centralized validation and helper functions.

/// Compute a signature hash of a canonical serialization.
///
/// Two states with the same canonical form always share a signature, so
/// comparing signatures is enough to decide whether anything changed.
///
/// # Examples
///
/// ```
/// use catalog_resolver::utils::validation::compute_signature;
///
/// assert_eq!(compute_signature("{}"), compute_signature("{}"));
/// assert_ne!(compute_signature("{}"), compute_signature("{\"a\":\"1\"}"));
/// ```
#[must_use]
pub fn compute_signature(canonical: &str) -> String {
    let digest = md5::compute(canonical.as_bytes());
    format!("{digest:x}")
}

/// Validate that a string looks like a package identifier (`name` or `@scope/name`).
///
/// # Examples
///
/// ```
/// use catalog_resolver::utils::validation::is_valid_package_name;
///
/// assert!(is_valid_package_name("react"));
/// assert!(is_valid_package_name("@types/node"));
/// assert!(!is_valid_package_name("@types"));
/// assert!(!is_valid_package_name("a/b"));
/// ```
#[must_use]
pub fn is_valid_package_name(name: &str) -> bool {
    fn valid_part(part: &str) -> bool {
        !part.is_empty()
            && !part.starts_with('.')
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
    }

    match name.strip_prefix('@') {
        Some(scoped) => match scoped.split_once('/') {
            Some((scope, pkg)) => valid_part(scope) && valid_part(pkg),
            None => false,
        },
        None => valid_part(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_md5_hex() {
        let sig = compute_signature("catalog");
        assert_eq!(sig.len(), 32);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_package_names() {
        assert!(is_valid_package_name("lodash.merge"));
        assert!(is_valid_package_name("@scope/pkg-name"));
        assert!(!is_valid_package_name(""));
        assert!(!is_valid_package_name("@/pkg"));
        assert!(!is_valid_package_name(".hidden"));
        assert!(!is_valid_package_name("has space"));
    }
}
