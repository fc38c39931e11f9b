// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Input validation and sanitization for public-facing fields.
//!
//! Everything here is pure string processing; the API layer calls these
//! before any service touches storage, so the layers below can assume
//! normalized data.

/// Characters stripped from names to block markup/header injection.
/// Whitespace (including CR/LF) is collapsed afterwards, not stripped.
const INJECTION_CHARS: &[char] = &[
    '<', '>', '"', '\'', ';', '(', ')', '&', '\0', '{', '}', '[', ']',
];

/// Maximum accepted length for first/last names after sanitization.
pub const MAX_NAME_LEN: usize = 100;

/// Strip HTML tags and injection characters, collapse whitespace runs.
pub fn sanitize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for ch in raw.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if in_tag => {}
            _ if INJECTION_CHARS.contains(&ch) => {}
            _ => out.push(ch),
        }
    }
    // Collapse internal whitespace and trim the edges.
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sanitize and bounds-check a name field. Returns the cleaned value.
pub fn validate_name(raw: &str, field: &str) -> Result<String, String> {
    let cleaned = sanitize_name(raw);
    if cleaned.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if cleaned.chars().count() > MAX_NAME_LEN {
        return Err(format!("{field} must be at most {MAX_NAME_LEN} characters"));
    }
    Ok(cleaned)
}

/// Validate email shape and normalize to lowercase.
///
/// Deliberately conservative: exactly one `@`, non-empty local part, and
/// a domain containing a dot with non-empty labels. Full RFC 5321 parsing
/// is not attempted.
pub fn validate_email(raw: &str) -> Result<String, String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || email.len() > 254 {
        return Err("Invalid email address".to_string());
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let Some(domain) = parts.next() else {
        return Err("Invalid email address".to_string());
    };
    if local.is_empty() || domain.contains('@') {
        return Err("Invalid email address".to_string());
    }
    if email.chars().any(char::is_whitespace) {
        return Err("Invalid email address".to_string());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err("Invalid email address".to_string());
    }
    Ok(email)
}

/// Username: 3-50 chars from `[A-Za-z0-9_-]`.
pub fn validate_username(raw: &str) -> Result<String, String> {
    let username = raw.trim();
    if !(3..=50).contains(&username.chars().count()) {
        return Err("Username must be between 3 and 50 characters".to_string());
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(
            "Username may only contain letters, digits, underscores, and hyphens".to_string(),
        );
    }
    Ok(username.to_string())
}

/// Password policy: at least 8 chars with an uppercase letter, a
/// lowercase letter, and a digit.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain an uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain a digit".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_html_tags() {
        assert_eq!(sanitize_name("<script>alert(1)</script>John"), "alert1John");
        assert_eq!(sanitize_name("Jane <b>Doe</b>"), "Jane Doe");
    }

    #[test]
    fn sanitize_strips_injection_chars() {
        assert_eq!(sanitize_name("O'Brien; DROP--"), "OBrien DROP--");
        assert_eq!(sanitize_name("Jane{}[]Doe"), "JaneDoe");
    }

    #[test]
    fn sanitize_treats_line_breaks_as_whitespace() {
        // CR/LF become separators, not deletions.
        assert_eq!(sanitize_name("a\r\nb"), "a b");
        assert_eq!(sanitize_name("a\nb\rc"), "a b c");
    }

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(sanitize_name("  Mary   Jane  "), "Mary Jane");
    }

    #[test]
    fn name_bounds() {
        assert!(validate_name("", "first_name").is_err());
        assert!(validate_name("<>", "first_name").is_err());
        assert!(validate_name(&"a".repeat(101), "first_name").is_err());
        assert_eq!(validate_name("John", "first_name").unwrap(), "John");
    }

    #[test]
    fn email_accepts_and_lowercases() {
        assert_eq!(
            validate_email(" John.Doe@Example.COM ").unwrap(),
            "john.doe@example.com"
        );
    }

    #[test]
    fn email_rejects_malformed() {
        for bad in [
            "",
            "plain",
            "@example.com",
            "user@",
            "user@nodot",
            "user@.com",
            "user@com.",
            "a b@example.com",
            "user@@example.com",
        ] {
            assert!(validate_email(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn username_pattern_and_length() {
        assert_eq!(validate_username("john_doe-1").unwrap(), "john_doe-1");
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(51)).is_err());
        assert!(validate_username("john doe").is_err());
        assert!(validate_username("john@doe").is_err());
    }

    #[test]
    fn password_strength() {
        assert!(validate_password_strength("Passw0rd").is_ok());
        assert!(validate_password_strength("short1A").is_err());
        assert!(validate_password_strength("alllower1").is_err());
        assert!(validate_password_strength("ALLUPPER1").is_err());
        assert!(validate_password_strength("NoDigitsHere").is_err());
    }
}
