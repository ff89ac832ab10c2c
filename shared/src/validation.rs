//! Input validation helpers for account fields

/// Validate username format (3-32 characters, lowercase alphanumeric plus
/// dot, dash and underscore)
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters");
    }
    if username.len() > 32 {
        return Err("Username must be at most 32 characters");
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '_'))
    {
        return Err("Username must be lowercase alphanumeric, dot, dash or underscore");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate a display name is present and not just whitespace
pub fn validate_display_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name must not be empty");
    }
    if name.len() > 128 {
        return Err("Name must be at most 128 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("somchai").is_ok());
        assert!(validate_username("farm-gate_01").is_ok());
        assert!(validate_username("a.b.c").is_ok());
    }

    #[test]
    fn test_validate_username_invalid() {
        assert!(validate_username("ab").is_err()); // Too short
        assert!(validate_username(&"a".repeat(33)).is_err()); // Too long
        assert!(validate_username("Somchai").is_err()); // Uppercase
        assert!(validate_username("som chai").is_err()); // Space
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("Somchai J.").is_ok());
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name(&"x".repeat(129)).is_err());
    }
}
