//! Parsed MRZ record types

use crate::date::MrzDate;
use crate::sex::Sex;

/// Holder name split into surname and given names
///
/// In the MRZ the surname and given names are separated by `<<` and
/// the individual given names by single fillers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MrzName {
    /// Primary identifier (surname), interior fillers as spaces
    pub surname: String,
    /// Secondary identifiers in document order
    pub given_names: Vec<String>,
}

impl MrzName {
    /// Name in `GIVEN ... SURNAME` reading order
    pub fn full(&self) -> String {
        let mut parts: Vec<&str> = self.given_names.iter().map(String::as_str).collect();
        parts.push(&self.surname);
        parts.join(" ")
    }
}

/// Nationality with the code resolved against the ICAO table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nationality {
    /// Code as printed (`D`, `NLD`, `XXX`, ...)
    pub code: String,
    /// Display name from the table
    pub name: &'static str,
}

impl std::fmt::Display for Nationality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// One printed check digit and its verification result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckDigit {
    /// Character as printed on the document
    pub value: char,
    /// Whether the covered field recomputes to this digit
    pub valid: bool,
}

/// Verification results for all five TD3 check digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckDigitReport {
    /// Covers the document number field
    pub document_number: CheckDigit,
    /// Covers the date of birth field
    pub birth_date: CheckDigit,
    /// Covers the date of expiry field
    pub expiry_date: CheckDigit,
    /// Covers the personal number field
    pub personal_number: CheckDigit,
    /// Composite digit over document number, both dates, personal
    /// number and their check digits
    pub composite: CheckDigit,
}

impl CheckDigitReport {
    /// True when every one of the five digits verified
    pub fn all_valid(&self) -> bool {
        self.document_number.valid
            && self.birth_date.valid
            && self.expiry_date.valid
            && self.personal_number.valid
            && self.composite.valid
    }
}

/// A fully parsed TD3 (passport) machine readable zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MrzRecord {
    /// Document code, `P` for passports
    pub document_code: char,
    /// Issuer-assigned type character from position 1, if any
    pub document_type: Option<char>,
    /// Issuing state or organization code, kept verbatim
    pub issuing_state: String,
    /// Holder name
    pub name: MrzName,
    /// Document number with fillers stripped
    pub document_number: String,
    /// Holder nationality
    pub nationality: Nationality,
    /// Date of birth with century resolved
    pub birth_date: MrzDate,
    /// Holder sex
    pub sex: Sex,
    /// Date of expiry with century resolved
    pub expiry_date: MrzDate,
    /// Personal number with fillers stripped, empty when unused
    pub personal_number: String,
    /// Per-field and composite check digit results
    pub check_digits: CheckDigitReport,
}

impl MrzRecord {
    /// True when all five check digits verified
    pub fn is_valid(&self) -> bool {
        self.check_digits.all_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digit(valid: bool) -> CheckDigit {
        CheckDigit { value: '0', valid }
    }

    #[test]
    fn test_all_valid_requires_every_digit() {
        let mut report = CheckDigitReport {
            document_number: digit(true),
            birth_date: digit(true),
            expiry_date: digit(true),
            personal_number: digit(true),
            composite: digit(true),
        };
        assert!(report.all_valid());

        report.expiry_date = digit(false);
        assert!(!report.all_valid());
    }

    #[test]
    fn test_full_name_order() {
        let name = MrzName {
            surname: "DE BRUIJN".to_string(),
            given_names: vec!["WILLEKE".to_string(), "LISELOTTE".to_string()],
        };
        assert_eq!(name.full(), "WILLEKE LISELOTTE DE BRUIJN");
    }
}
