//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a required identifier or name carries visible content.
///
/// # Examples
///
/// ```ignore
/// validate_identifier("dota")  // Ok
/// validate_identifier(" 42 ")  // Ok - trimmed later
/// validate_identifier("   ")   // Err - blank
/// ```
pub fn validate_identifier(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("field_blank");
        err.message = Some("Field must not be blank".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a contact phone number: at least five digits, with `+` and
/// common separators allowed around them.
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < 5 {
        let mut err = ValidationError::new("phone_too_short");
        err.message = Some("Phone number must contain at least 5 digits".into());
        return Err(err);
    }

    if !value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'))
    {
        let mut err = ValidationError::new("phone_format");
        err.message =
            Some("Phone number may only contain digits, +, spaces, dashes and parentheses".into());
        return Err(err);
    }

    Ok(())
}
