//! MRZ date fields and century resolution
//!
//! TD3 dates carry a two-digit year, so the century has to be inferred.
//! The rule here: take the last two digits of the current year plus 15
//! as a pivot; two-digit years above the pivot fall in the 1900s,
//! everything else in the 2000s. The 15-year window keeps passports
//! with the usual 10-year validity in the 2000s while birth years up
//! to ~100 years back resolve to the 1900s.

use chrono::{Datelike, Utc};

use crate::error::{Error, Result};

/// A date from an MRZ field with the century resolved
///
/// Fields are taken verbatim from the document; no calendar validation
/// is applied beyond requiring six digits (the check digit guards
/// against transcription errors).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MrzDate {
    /// Four-digit year
    pub year: u16,
    /// Month as printed (01-12 on a well-formed document)
    pub month: u8,
    /// Day as printed
    pub day: u8,
    /// The six digits as printed
    pub raw: String,
}

impl MrzDate {
    /// Parse a six-digit `YYMMDD` field, resolving the century against
    /// the current year
    pub fn from_field(raw: &str, field: &'static str) -> Result<Self> {
        Self::from_field_at(raw, field, Utc::now().year())
    }

    /// Parse against an explicit "current" year
    ///
    /// Split out so century boundaries are testable without a clock.
    pub fn from_field_at(raw: &str, field: &'static str, current_year: i32) -> Result<Self> {
        if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidDate {
                field,
                raw: raw.to_string(),
            });
        }

        let d = raw.as_bytes();
        let yy = u16::from(d[0] - b'0') * 10 + u16::from(d[1] - b'0');
        let month = (d[2] - b'0') * 10 + (d[3] - b'0');
        let day = (d[4] - b'0') * 10 + (d[5] - b'0');

        let year = if u32::from(yy) > century_pivot(current_year) {
            1900 + yy
        } else {
            2000 + yy
        };

        Ok(Self {
            year,
            month,
            day,
            raw: raw.to_string(),
        })
    }
}

impl std::fmt::Display for MrzDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Last two digits of `current_year + 15`
fn century_pivot(current_year: i32) -> u32 {
    ((current_year + 15).rem_euclid(100)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_century_pivot() {
        assert_eq!(century_pivot(2026), 41);
        assert_eq!(century_pivot(2085), 0);
        assert_eq!(century_pivot(1999), 14);
    }

    #[test]
    fn test_year_above_pivot_is_1900s() {
        // Pivot for 2026 is 41
        let date = MrzDate::from_field_at("650310", "birth", 2026).unwrap();
        assert_eq!(date.year, 1965);
        assert_eq!(date.month, 3);
        assert_eq!(date.day, 10);
        assert_eq!(date.raw, "650310");
    }

    #[test]
    fn test_year_at_or_below_pivot_is_2000s() {
        let date = MrzDate::from_field_at("240309", "expiry", 2026).unwrap();
        assert_eq!(date.year, 2024);

        // Exactly at the pivot resolves to the 2000s
        let date = MrzDate::from_field_at("410101", "expiry", 2026).unwrap();
        assert_eq!(date.year, 2041);

        // One past the pivot flips back a century
        let date = MrzDate::from_field_at("420101", "birth", 2026).unwrap();
        assert_eq!(date.year, 1942);
    }

    #[test]
    fn test_year_zero() {
        let date = MrzDate::from_field_at("000229", "birth", 2026).unwrap();
        assert_eq!(date.year, 2000);
    }

    #[test]
    fn test_non_numeric_rejected() {
        let err = MrzDate::from_field_at("9O0101", "birth", 2026).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidDate {
                field: "birth",
                raw: "9O0101".to_string(),
            }
        );
    }

    #[test]
    fn test_filler_date_rejected() {
        assert!(MrzDate::from_field_at("<<<<<<", "expiry", 2026).is_err());
    }

    #[test]
    fn test_display() {
        let date = MrzDate::from_field_at("650310", "birth", 2026).unwrap();
        assert_eq!(date.to_string(), "1965-03-10");
    }
}
