use std::sync::LazyLock;

use regex::Regex;

/// Accepted plate shape after normalization: 2-3 dash-separated groups of
/// letters/digits, e.g. `123-12-123`, `12-345-67`, `AB-1234`.
static PLATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{2,3}(?:-[A-Z0-9]{2,4}){1,2}$").expect("valid regex"));

/// A validated, normalized license plate.
///
/// Normalization is trim + uppercase; the separator is always `-`. This is
/// the secondary lookup key for tickets, so every plate entering the system
/// goes through [`LicensePlate::parse`] first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicensePlate(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid license plate format: {0}")]
pub struct InvalidPlate(pub String);

impl LicensePlate {
    pub fn parse(raw: &str) -> Result<Self, InvalidPlate> {
        let normalized = raw.trim().to_uppercase();
        if PLATE_PATTERN.is_match(&normalized) {
            Ok(LicensePlate(normalized))
        } else {
            Err(InvalidPlate(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for LicensePlate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numeric_plate_forms() {
        for plate in ["123-12-123", "123-123-123", "12-345-67"] {
            assert!(LicensePlate::parse(plate).is_ok(), "{plate} should parse");
        }
    }

    #[test]
    fn accepts_letter_and_digit_plates() {
        assert!(LicensePlate::parse("AB-1234").is_ok());
        assert!(LicensePlate::parse("XYZ-99-AB").is_ok());
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        let plate = LicensePlate::parse("  ab-1234 ").unwrap();
        assert_eq!(plate.as_str(), "AB-1234");
    }

    #[test]
    fn rejects_malformed_plates() {
        for plate in ["", "ABCDEFG", "A-1", "12_345_67", "1234-5678-9012-3456", "AB 1234"] {
            assert!(LicensePlate::parse(plate).is_err(), "{plate} should be rejected");
        }
    }
}
