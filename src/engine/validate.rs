use crate::limits::*;
use crate::model::*;

use super::EngineError;

pub(crate) fn validate_name(name: &str) -> Result<(), EngineError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::Validation("client name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(EngineError::Validation("client name too long"));
    }
    Ok(())
}

/// Phones are free-form but limited to digits and the usual separators.
pub(crate) fn validate_phone(phone: &str) -> Result<(), EngineError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(EngineError::Validation("client phone is required"));
    }
    if phone.len() > MAX_PHONE_LEN {
        return Err(EngineError::Validation("client phone too long"));
    }
    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
    {
        return Err(EngineError::Validation("client phone contains invalid characters"));
    }
    if !phone.chars().any(|c| c.is_ascii_digit()) {
        return Err(EngineError::Validation("client phone has no digits"));
    }
    Ok(())
}

pub(crate) fn validate_new_booking(booking: &NewBooking) -> Result<(), EngineError> {
    validate_name(&booking.name)?;
    validate_phone(&booking.phone)
}

pub(crate) fn validate_edit(edit: &BookingEdit) -> Result<(), EngineError> {
    validate_name(&edit.name)?;
    validate_phone(&edit.phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_rejected() {
        assert!(matches!(validate_name("  "), Err(EngineError::Validation(_))));
        assert!(validate_name("Anna").is_ok());
    }

    #[test]
    fn overlong_name_rejected() {
        let long = "a".repeat(MAX_NAME_LEN + 1);
        assert!(validate_name(&long).is_err());
    }

    #[test]
    fn phone_formats() {
        assert!(validate_phone("1234567890").is_ok());
        assert!(validate_phone("+48 600-100-200").is_ok());
        assert!(validate_phone("(22) 555 01 01").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("+ -").is_err());
        assert!(validate_phone("12ab34").is_err());
        assert!(validate_phone(&"1".repeat(MAX_PHONE_LEN + 1)).is_err());
    }
}
