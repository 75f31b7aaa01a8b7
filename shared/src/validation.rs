//! Validation utilities for the PestCheck platform
//!
//! Pre-flight checks run client-side before a payload is sent, so a farmer
//! on a slow rural connection gets instant feedback instead of a 400.

use rust_decimal::Decimal;

// ============================================================================
// Location Validations
// ============================================================================

/// Validate latitude is within the WGS84 range
pub fn validate_latitude(latitude: Decimal) -> Result<(), &'static str> {
    if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    Ok(())
}

/// Validate longitude is within the WGS84 range
pub fn validate_longitude(longitude: Decimal) -> Result<(), &'static str> {
    if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

/// Validate a coordinate pair
pub fn validate_coordinates(latitude: Decimal, longitude: Decimal) -> Result<(), &'static str> {
    validate_latitude(latitude)?;
    validate_longitude(longitude)?;
    Ok(())
}

// ============================================================================
// Report Validations
// ============================================================================

/// Validate the farmer-facing 0-5 damage level
pub fn validate_report_level(level: u8) -> Result<(), &'static str> {
    if level > 5 {
        return Err("Damage level must be between 0 and 5");
    }
    Ok(())
}

/// Validate a crop type string is usable as a form value
pub fn validate_crop_type(crop_type: &str) -> Result<(), &'static str> {
    if crop_type.trim().is_empty() {
        return Err("Crop type is required");
    }
    if crop_type.len() > 64 {
        return Err("Crop type must be at most 64 characters");
    }
    Ok(())
}

/// Validate farm size in hectares
pub fn validate_farm_size(size: Decimal) -> Result<(), &'static str> {
    if size <= Decimal::ZERO {
        return Err("Farm size must be positive");
    }
    Ok(())
}

// ============================================================================
// Account Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate username (3-30 characters, alphanumeric plus underscore)
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters");
    }
    if username.len() > 30 {
        return Err("Username must be at most 30 characters");
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err("Username must be alphanumeric");
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_inside_range_pass() {
        assert!(validate_coordinates(Decimal::from(14), Decimal::from(121)).is_ok());
        assert!(validate_coordinates(Decimal::from(-90), Decimal::from(180)).is_ok());
    }

    #[test]
    fn coordinates_outside_range_fail() {
        assert!(validate_latitude(Decimal::from(91)).is_err());
        assert!(validate_longitude(Decimal::from(-181)).is_err());
    }

    #[test]
    fn report_level_bounds() {
        for level in 0..=5 {
            assert!(validate_report_level(level).is_ok());
        }
        assert!(validate_report_level(6).is_err());
    }

    #[test]
    fn usernames() {
        assert!(validate_username("somchai_99").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn crop_type_must_be_present() {
        assert!(validate_crop_type("rice").is_ok());
        assert!(validate_crop_type("  ").is_err());
    }
}
