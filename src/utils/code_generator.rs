//! Short code generation and validation utilities.
//!
//! Codes are drawn uniformly from a 62-symbol alphabet (digits, uppercase,
//! lowercase) using a cryptographically secure generator. Generation alone does not
//! guarantee uniqueness; callers check the store and rely on its unique constraint.

use crate::error::AppError;
use rand::Rng;

/// Symbols a short code may contain. Codes are case-sensitive.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Length of generated codes (62^6 is roughly 56 billion codes).
pub const DEFAULT_CODE_LENGTH: usize = 6;

pub const MIN_CODE_LENGTH: usize = 3;
pub const MAX_CODE_LENGTH: usize = 10;

/// Reserved codes that cannot be used as custom short codes.
///
/// Compared case-insensitively. These would shadow service routes or look like
/// official pages.
pub const RESERVED_CODES: &[&str] = &[
    "api", "admin", "www", "app", "mail", "email", "support", "help", "about", "contact",
    "terms", "privacy", "login", "register", "signup", "dashboard", "account", "profile",
    "settings", "home", "index", "health", "status", "metrics", "docs", "documentation",
    "faq", "blog", "news", "static", "assets", "cdn", "media", "images", "js", "css",
    "fonts", "favicon", "robots", "sitemap",
];

/// Generates a random short code of `length` symbols from [`ALPHABET`].
///
/// Uses the thread-local CSPRNG seeded from the operating system.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(6);
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> String {
    debug_assert!(length > 0, "code length must be positive");

    let mut rng = rand::rng();
    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Returns true if `code` has the shape of a short code: 3-10 ASCII alphanumerics.
pub fn is_valid_code_format(code: &str) -> bool {
    (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code.len())
        && code.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Validates a short code taken from a request path.
///
/// # Errors
///
/// Returns [`AppError::Validation`] unless the code is 3-10 ASCII alphanumerics.
pub fn validate_short_code_param(code: &str) -> Result<(), AppError> {
    if is_valid_code_format(code) {
        return Ok(());
    }

    let detail = if code.chars().all(|c| c.is_ascii_alphanumeric()) {
        format!(
            "Short code must be between {} and {} characters long",
            MIN_CODE_LENGTH, MAX_CODE_LENGTH
        )
    } else {
        "Short code can only contain letters and numbers".to_string()
    };

    Err(AppError::validation("Validation Error", vec![detail]))
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 3-10 characters
/// - Allowed characters: ASCII letters and digits
/// - Cannot be a reserved keyword (case-insensitive)
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code.len()) {
        return Err(AppError::validation(
            "Validation Error",
            vec![format!(
                "Custom code must be between {} and {} characters long",
                MIN_CODE_LENGTH, MAX_CODE_LENGTH
            )],
        ));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::validation(
            "Validation Error",
            vec!["Custom code can only contain letters and numbers".to_string()],
        ));
    }

    let lower = code.to_ascii_lowercase();
    if RESERVED_CODES.contains(&lower.as_str()) {
        return Err(AppError::validation(
            "Validation Error",
            vec![format!(
                "'{}' is a reserved keyword and cannot be used",
                code
            )],
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_generate_code_has_requested_length() {
        assert_eq!(generate_code(DEFAULT_CODE_LENGTH).len(), 6);
        assert_eq!(generate_code(10).len(), 10);
        assert_eq!(generate_code(1).len(), 1);
    }

    #[test]
    fn test_generate_code_uses_alphabet_only() {
        for _ in 0..100 {
            let code = generate_code(DEFAULT_CODE_LENGTH);
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_generate_code_produces_unique_codes() {
        let codes: HashSet<String> = (0..1000)
            .map(|_| generate_code(DEFAULT_CODE_LENGTH))
            .collect();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_generate_code_covers_alphabet() {
        let mut seen: HashMap<char, usize> = HashMap::new();
        for _ in 0..2000 {
            for c in generate_code(DEFAULT_CODE_LENGTH).chars() {
                *seen.entry(c).or_default() += 1;
            }
        }

        // 12000 draws over 62 symbols; every symbol shows up.
        assert_eq!(seen.len(), 62);
    }

    #[test]
    fn test_alphabet_is_distinct_alphanumerics() {
        let unique: HashSet<&u8> = ALPHABET.iter().collect();
        assert_eq!(unique.len(), 62);
        assert!(ALPHABET.iter().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_code_format() {
        assert!(is_valid_code_format("abc"));
        assert!(is_valid_code_format("AbC123xyz0"));
        assert!(!is_valid_code_format("ab"));
        assert!(!is_valid_code_format("abcdefghijk"));
        assert!(!is_valid_code_format("abc-12"));
        assert!(!is_valid_code_format(""));
    }

    #[test]
    fn test_validate_short_code_param() {
        assert!(validate_short_code_param("abc123").is_ok());

        let err = validate_short_code_param("ab").unwrap_err();
        assert!(err.to_body().details[0].contains("between 3 and 10"));

        let err = validate_short_code_param("a.b.c").unwrap_err();
        assert!(err.to_body().details[0].contains("letters and numbers"));
    }

    #[test]
    fn test_validate_custom_code_accepts_mixed_case() {
        assert!(validate_custom_code("Promo2025").is_ok());
        assert!(validate_custom_code("abc").is_ok());
    }

    #[test]
    fn test_validate_custom_code_length() {
        let err = validate_custom_code("ab").unwrap_err();
        assert!(err.to_body().details[0].contains("between 3 and 10"));

        assert!(validate_custom_code("abcdefghijk").is_err());
    }

    #[test]
    fn test_validate_custom_code_rejects_symbols() {
        assert!(validate_custom_code("my-link").is_err());
        assert!(validate_custom_code("my link").is_err());
        assert!(validate_custom_code("héllo").is_err());
    }

    #[test]
    fn test_validate_custom_code_rejects_reserved_keywords() {
        for &reserved in RESERVED_CODES {
            if reserved.len() < MIN_CODE_LENGTH {
                continue;
            }
            assert!(
                validate_custom_code(reserved).is_err(),
                "Reserved code '{}' should be invalid",
                reserved
            );
        }

        assert!(validate_custom_code("ADMIN").is_err());
        assert!(validate_custom_code("Health").is_err());
    }
}
