//! Username validation applied before account creation.

use thiserror::Error;

/// Why a requested username was rejected. Display forms are short camel
/// case fragments because they are embedded in player-facing strings
/// ("Error creating user: usernameTooShort").
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("usernameTooShort")]
    TooShort,

    #[error("usernameTooLong")]
    TooLong,

    #[error("usernameInvalidCharacters")]
    InvalidCharacters,

    #[error("usernameReserved")]
    Reserved,
}

const MIN_LEN: usize = 2;
const MAX_LEN: usize = 64;

/// Names players cannot claim; matched case-insensitively.
const RESERVED: &[&str] = &["admin", "sysop", "system", "server", "me", "you"];

/// Validate a requested username: 2..=64 characters, ASCII alphanumerics
/// plus `_`, `-` and `.`, not a reserved name. Returns the name
/// unchanged on success (case is preserved; lookups fold case).
pub fn validate_username(username: &str) -> Result<&str, UsernameError> {
    let len = username.chars().count();
    if len < MIN_LEN {
        return Err(UsernameError::TooShort);
    }
    if len > MAX_LEN {
        return Err(UsernameError::TooLong);
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(UsernameError::InvalidCharacters);
    }
    if RESERVED
        .iter()
        .any(|r| r.eq_ignore_ascii_case(username))
    {
        return Err(UsernameError::Reserved);
    }
    Ok(username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("Bob_the-2nd.").is_ok());
    }

    #[test]
    fn rejects_short_long_and_strange() {
        assert_eq!(validate_username("a"), Err(UsernameError::TooShort));
        let long = "x".repeat(65);
        assert_eq!(validate_username(&long), Err(UsernameError::TooLong));
        assert_eq!(
            validate_username("al ice"),
            Err(UsernameError::InvalidCharacters)
        );
        assert_eq!(
            validate_username("al/ice"),
            Err(UsernameError::InvalidCharacters)
        );
    }

    #[test]
    fn rejects_reserved_names_case_insensitively() {
        assert_eq!(validate_username("Admin"), Err(UsernameError::Reserved));
        assert_eq!(validate_username("SYSTEM"), Err(UsernameError::Reserved));
    }
}
