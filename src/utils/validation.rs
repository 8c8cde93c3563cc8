use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::ValidationError;

pub const MIN_PHONE_DIGITS: usize = 10;
pub const MIN_COVER_LETTER_CHARS: usize = 20;

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '.'));
    if digits < MIN_PHONE_DIGITS || !allowed {
        let mut err = ValidationError::new("phone");
        err.message = Some(Cow::from("Phone number must be at least 10 digits"));
        return Err(err);
    }
    Ok(())
}

pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some(Cow::from("Must be a positive number"));
        return Err(err);
    }
    Ok(())
}

/// Counts characters after trimming, since the trimmed text is what gets stored.
pub fn validate_cover_letter(letter: &str) -> Result<(), ValidationError> {
    if letter.trim().chars().count() < MIN_COVER_LETTER_CHARS {
        let mut err = ValidationError::new("cover_letter");
        err.message = Some(Cow::from("Cover letter must be at least 20 characters"));
        return Err(err);
    }
    Ok(())
}
