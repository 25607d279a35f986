/// Input validators - protect the stores against malformed and hostile input
/// Features:
/// 1. DoS Protection: Input length limits
/// 2. Email validation against a practical RFC 5322 pattern
/// 3. Username charset restrictions (no `@`, which marks an email identifier)
/// 4. Password strength requirements

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 30;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    static ref USERNAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9._-]+$").unwrap();
}

/// Validates an email address and returns it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email".to_string(), MIN_EMAIL_LENGTH));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    if has_suspicious_email_patterns(trimmed) {
        return Err(ValidationError::SuspiciousContent("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates a username and returns it trimmed
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("username".to_string()));
    }

    if trimmed.chars().count() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::TooShort("username".to_string(), MIN_USERNAME_LENGTH));
    }

    if trimmed.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong("username".to_string(), MAX_USERNAME_LENGTH));
    }

    if !USERNAME_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("username".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates password strength
///
/// Requirements:
/// - 8 to 128 characters (bcrypt limitation and DoS prevention)
/// - At least one digit, one lowercase and one uppercase letter
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("password".to_string(), MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password".to_string(), MAX_PASSWORD_LENGTH));
    }

    let has_digit = password.chars().any(|c| c.is_numeric());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());

    if !has_digit || !has_lowercase || !has_uppercase {
        return Err(ValidationError::WeakPassword);
    }

    Ok(())
}

/// Validates free text such as post titles and bodies, returning it trimmed
pub fn is_valid_text(field: &str, value: &str, max_length: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }

    if trimmed.chars().count() > max_length {
        return Err(ValidationError::TooLong(field.to_string(), max_length));
    }

    if trimmed.contains('\0') {
        return Err(ValidationError::SuspiciousContent(field.to_string()));
    }

    Ok(trimmed.to_string())
}

/// Detects suspicious patterns in email addresses that might indicate phishing
fn has_suspicious_email_patterns(email: &str) -> bool {
    // Extremely long local part (before @)
    if let Some(at_pos) = email.find('@') {
        if email[..at_pos].len() > 64 {
            return true;
        }
    }

    if email.matches('@').count() != 1 {
        return true;
    }

    email.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("test.email@domain.co.uk").is_ok());
        assert_eq!(is_valid_email("  user@ex.com ").unwrap(), "user@ex.com");
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(is_valid_email("invalid").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
    }

    #[test]
    fn test_email_length_limits() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(is_valid_email(&too_long).is_err());
        assert!(is_valid_email("a@b").is_err());
    }

    #[test]
    fn test_email_with_sql_like_words_is_accepted() {
        let addresses = [
            "broadcast@example.com",
            "sleepy@example.com",
            "wasp_fan@example.com",
            "pete--smith@example.com",
            "concatto@example.com",
            "union.jack@example.com",
        ];

        for address in addresses {
            assert_eq!(is_valid_email(address), Ok(address.to_string()), "{}", address);
        }
    }

    #[test]
    fn test_email_with_quotes_and_spaces_is_rejected() {
        assert_eq!(
            is_valid_email("user' OR '1'='1@example.com"),
            Err(ValidationError::InvalidFormat("email".to_string()))
        );
        assert!(is_valid_email("user; DROP TABLE@example.com").is_err());
    }

    #[test]
    fn test_valid_username() {
        assert_eq!(is_valid_username("ursula_le-guin.1").unwrap(), "ursula_le-guin.1");
    }

    #[test]
    fn test_username_rejects_at_sign() {
        assert_eq!(
            is_valid_username("user@ex.com"),
            Err(ValidationError::InvalidFormat("username".to_string()))
        );
    }

    #[test]
    fn test_username_length_limits() {
        assert!(is_valid_username("ab").is_err());
        assert!(is_valid_username(&"a".repeat(31)).is_err());
        assert!(is_valid_username("   ").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(is_valid_password("ValidPassword123").is_ok());
        assert!(is_valid_password("Short1").is_err());
        assert!(is_valid_password(&("a".repeat(MAX_PASSWORD_LENGTH) + "A1")).is_err());
        assert_eq!(is_valid_password("NoDigitsPassword"), Err(ValidationError::WeakPassword));
        assert_eq!(is_valid_password("NOLOWERCASE1"), Err(ValidationError::WeakPassword));
        assert_eq!(is_valid_password("nouppercase1"), Err(ValidationError::WeakPassword));
    }

    #[test]
    fn test_text_validation() {
        assert_eq!(is_valid_text("title", "  Hello ", 10).unwrap(), "Hello");
        assert!(is_valid_text("title", "", 10).is_err());
        assert!(is_valid_text("title", &"x".repeat(11), 10).is_err());
        assert!(is_valid_text("content", "nul\0byte", 100).is_err());
    }
}
