//! Client identity validation.
//!
//! Phone numbers follow Brazilian numbering: area code plus 8 or 9 digits,
//! i.e. 10 or 11 digits total after stripping mask characters. Validation
//! runs before any network call so a typo never burns a round-trip.

/// Why a client identity was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    EmptyName,
    PhoneTooShort,
    PhoneTooLong,
}

impl std::fmt::Display for IdentityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::PhoneTooShort => write!(f, "phone must have at least 10 digits"),
            Self::PhoneTooLong => write!(f, "phone must have at most 11 digits"),
        }
    }
}

impl std::error::Error for IdentityError {}

/// Strip mask characters, keeping digits only: `"(69) 99999-1234"` →
/// `"69999991234"`.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validate a client login identity. Returns the normalized phone on
/// success so callers send exactly what was validated.
pub fn validate_client_identity(name: &str, phone: &str) -> Result<String, IdentityError> {
    if name.trim().is_empty() {
        return Err(IdentityError::EmptyName);
    }
    let digits = normalize_phone(phone);
    if digits.len() < 10 {
        return Err(IdentityError::PhoneTooShort);
    }
    if digits.len() > 11 {
        return Err(IdentityError::PhoneTooLong);
    }
    Ok(digits)
}
