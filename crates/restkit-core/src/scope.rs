//! Scope-name derivation for throttle classes without a declared scope.

/// Suffix removed from throttle class names.
pub const THROTTLE_SUFFIX: &str = "RateThrottle";

/// Converts a throttle class name into its scope name.
///
/// The `RateThrottle` suffix is stripped, an underscore is inserted before
/// every upper-case letter that is not the first character, and the result
/// is lower-cased.
///
/// # Examples
///
/// ```
/// use restkit_core::derive_scope_name;
///
/// assert_eq!(derive_scope_name("AnonRateThrottle"), "anon");
/// assert_eq!(derive_scope_name("UserBurstRateThrottle"), "user_burst");
/// assert_eq!(derive_scope_name("Sustained"), "sustained");
/// ```
pub fn derive_scope_name(class_name: &str) -> String {
    let base = class_name
        .strip_suffix(THROTTLE_SUFFIX)
        .unwrap_or(class_name);

    let mut scope = String::with_capacity(base.len() + 4);
    for (i, c) in base.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            scope.push('_');
        }
        scope.extend(c.to_lowercase());
    }
    scope
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_classes() {
        assert_eq!(derive_scope_name("AnonRateThrottle"), "anon");
        assert_eq!(derive_scope_name("UserRateThrottle"), "user");
    }

    #[test]
    fn test_multi_word_class() {
        assert_eq!(derive_scope_name("LoginAttemptRateThrottle"), "login_attempt");
    }

    #[test]
    fn test_acronyms_split_per_letter() {
        assert_eq!(derive_scope_name("APIRateThrottle"), "a_p_i");
    }

    #[test]
    fn test_derivation_is_stable() {
        let first = derive_scope_name("BurstRateThrottle");
        let second = derive_scope_name("BurstRateThrottle");
        assert_eq!(first, second);
        assert_eq!(first, "burst");
    }

    #[test]
    fn test_lowercase_input_unchanged() {
        assert_eq!(derive_scope_name("burst"), "burst");
    }
}
