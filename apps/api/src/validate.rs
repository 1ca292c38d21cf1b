//! Field validation shared by the auth, profile, newsletter and contact
//! handlers. Mirrors the checks the clients perform before submitting.

/// Checks an email for the `local@domain.tld` shape: exactly one `@`,
/// a non-empty local part, a dot in the domain, and no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let local = match parts.next() {
        Some(l) if !l.is_empty() => l,
        _ => return false,
    };
    let domain = match parts.next() {
        Some(d) if !d.is_empty() => d,
        _ => return false,
    };
    if local.contains('@') || domain.contains('@') {
        return false;
    }
    // domain needs a dot with something on both sides
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Returns the trimmed value, or an error naming the missing field.
pub fn required_field<'a>(value: &'a str, field: &str) -> Result<&'a str, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(format!("{field} is required"))
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_address() {
        assert!(is_valid_email("alice@example.com"));
    }

    #[test]
    fn test_accepts_subdomain() {
        assert!(is_valid_email("bob.smith@mail.example.co.uk"));
    }

    #[test]
    fn test_rejects_missing_at() {
        assert!(!is_valid_email("alice.example.com"));
    }

    #[test]
    fn test_rejects_missing_local_part() {
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_rejects_missing_domain() {
        assert!(!is_valid_email("alice@"));
    }

    #[test]
    fn test_rejects_domain_without_dot() {
        assert!(!is_valid_email("alice@localhost"));
    }

    #[test]
    fn test_rejects_trailing_dot_domain() {
        assert!(!is_valid_email("alice@example."));
    }

    #[test]
    fn test_rejects_whitespace() {
        assert!(!is_valid_email("alice smith@example.com"));
        assert!(!is_valid_email(" alice@example.com"));
    }

    #[test]
    fn test_rejects_double_at() {
        assert!(!is_valid_email("alice@@example.com"));
    }

    #[test]
    fn test_required_field_trims() {
        assert_eq!(required_field("  hello ", "name"), Ok("hello"));
    }

    #[test]
    fn test_required_field_rejects_blank() {
        let err = required_field("   ", "name").unwrap_err();
        assert_eq!(err, "name is required");
    }
}
