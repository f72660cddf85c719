//! TD3 (passport) MRZ parsing
//!
//! A TD3 MRZ is two 44-character lines, handled here as a single
//! 88-character string (line 2 concatenated after line 1):
//!
//! ```text
//! offset  width  field
//!      0      1  document code ('P')
//!      1      1  document variant ('<' when unused)
//!      2      3  issuing state or organization
//!      5     39  name (surname << given names)
//!     44      9  document number
//!     53      1  check digit over document number
//!     54      3  nationality
//!     57      6  date of birth (YYMMDD)
//!     63      1  check digit over date of birth
//!     64      1  sex
//!     65      6  date of expiry (YYMMDD)
//!     71      1  check digit over date of expiry
//!     72     14  personal number
//!     86      1  check digit over personal number
//!     87      1  composite check digit
//! ```

use chrono::{Datelike, Utc};
use tracing::debug;

use crate::checkdigit;
use crate::countries::country_name;
use crate::date::MrzDate;
use crate::error::{Error, Result};
use crate::record::{CheckDigit, CheckDigitReport, MrzName, MrzRecord, Nationality};
use crate::sex::Sex;

/// Length of the two concatenated TD3 lines
pub const TD3_LEN: usize = 88;

/// Field padding character
pub const FILLER: char = '<';

/// Parse an 88-character TD3 MRZ
///
/// Structural problems (wrong length, non-passport code, unknown
/// nationality, malformed name or date) return an error. Failed check
/// digits do not: they are reported per field on
/// [`MrzRecord::check_digits`] so callers can decide how much to
/// trust a misread line.
pub fn parse(mrz: &str) -> Result<MrzRecord> {
    parse_at(mrz, Utc::now().year())
}

/// Parse against an explicit "current" year for century resolution
///
/// [`parse`] uses the system clock; this entry point exists so date
/// handling is reproducible in tests and batch reprocessing.
pub fn parse_at(mrz: &str, current_year: i32) -> Result<MrzRecord> {
    let length = mrz.chars().count();
    if length != TD3_LEN {
        return Err(Error::InvalidLength {
            expected: TD3_LEN,
            actual: length,
        });
    }

    // Reject non-ASCII up front so fixed-offset byte slicing below is
    // safe. Stray ASCII (lowercase, punctuation) is left to the check
    // digits, which fail on anything outside the MRZ alphabet.
    if let Some((position, _)) = mrz.char_indices().find(|(_, c)| !c.is_ascii()) {
        return Err(Error::InvalidCharacter { position });
    }

    let document_code = char_at(mrz, 0);
    if document_code != 'P' {
        return Err(Error::NotAPassport(document_code));
    }

    let document_type = match char_at(mrz, 1) {
        FILLER => None,
        c => Some(c),
    };

    let issuing_state = strip_filler(&mrz[2..5]);
    let name = parse_name(&mrz[5..44])?;

    let document_number_raw = &mrz[44..53];
    let document_number = strip_filler(document_number_raw);
    let digit_document = char_at(mrz, 53);

    let nationality_code = strip_filler(&mrz[54..57]);
    let nationality = Nationality {
        name: country_name(&nationality_code)
            .ok_or_else(|| Error::UnknownNationality(nationality_code.clone()))?,
        code: nationality_code,
    };

    let birth_raw = &mrz[57..63];
    let birth_date = MrzDate::from_field_at(birth_raw, "birth", current_year)?;
    let digit_birth = char_at(mrz, 63);

    let sex = Sex::from(char_at(mrz, 64));

    let expiry_raw = &mrz[65..71];
    let expiry_date = MrzDate::from_field_at(expiry_raw, "expiry", current_year)?;
    let digit_expiry = char_at(mrz, 71);

    let personal_raw = &mrz[72..86];
    let personal_number = strip_filler(personal_raw);
    let digit_personal = char_at(mrz, 86);

    // The composite digit covers the lower line minus nationality and
    // sex: document number, both dates, personal number, and their
    // four check digits.
    let digit_composite = char_at(mrz, 87);
    let composite_field = format!(
        "{document_number_raw}{digit_document}{birth_raw}{digit_birth}\
         {expiry_raw}{digit_expiry}{personal_raw}{digit_personal}"
    );

    let check_digits = CheckDigitReport {
        document_number: CheckDigit {
            value: digit_document,
            valid: checkdigit::verify(document_number_raw, digit_document),
        },
        birth_date: CheckDigit {
            value: digit_birth,
            valid: checkdigit::verify(birth_raw, digit_birth),
        },
        expiry_date: CheckDigit {
            value: digit_expiry,
            valid: checkdigit::verify(expiry_raw, digit_expiry),
        },
        personal_number: CheckDigit {
            value: digit_personal,
            valid: checkdigit::verify(personal_raw, digit_personal),
        },
        composite: CheckDigit {
            value: digit_composite,
            valid: checkdigit::verify(&composite_field, digit_composite),
        },
    };

    debug!(
        issuing_state = %issuing_state,
        nationality = %nationality.code,
        checks_valid = check_digits.all_valid(),
        "Parsed TD3 MRZ"
    );

    Ok(MrzRecord {
        document_code,
        document_type,
        issuing_state,
        name,
        document_number,
        nationality,
        birth_date,
        sex,
        expiry_date,
        personal_number,
        check_digits,
    })
}

/// Replace fillers with spaces and trim, so interior fillers read as
/// word separators
fn strip_filler(field: &str) -> String {
    field.replace(FILLER, " ").trim().to_string()
}

/// Split the 39-character name field on the `<<` separator
fn parse_name(field: &str) -> Result<MrzName> {
    let mut segments = field
        .split("<<")
        .map(strip_filler)
        .filter(|s| !s.is_empty());

    let (Some(surname), Some(given)) = (segments.next(), segments.next()) else {
        return Err(Error::MalformedName(field.to_string()));
    };

    // Anything after the second segment is padding noise on a
    // misprinted document; the first two are authoritative.
    Ok(MrzName {
        surname,
        given_names: given.split(' ').map(str::to_string).collect(),
    })
}

/// Byte `index` as a char; callers have already verified the input is
/// all ASCII
fn char_at(mrz: &str, index: usize) -> char {
    mrz.as_bytes()[index] as char
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    // Dutch specimen passport, lines concatenated
    const SPECIMEN: &str = "P<NLDDE<BRUIJN<<WILLEKE<LISELOTTE<<<<<<<<<<<\
                            SPECI20142NLD6503101F2403096999999990<<<<<84";

    #[test]
    fn test_parse_specimen() {
        let record = parse_at(SPECIMEN, 2026).unwrap();

        assert_eq!(record.document_code, 'P');
        assert_eq!(record.document_type, None);
        assert_eq!(record.issuing_state, "NLD");
        assert_eq!(record.name.surname, "DE BRUIJN");
        assert_eq!(
            record.name.given_names,
            vec!["WILLEKE".to_string(), "LISELOTTE".to_string()]
        );
        assert_eq!(record.document_number, "SPECI2014");
        assert_eq!(record.nationality.code, "NLD");
        assert_eq!(record.nationality.name, "Netherlands, Kingdom of the");
        assert_eq!(record.birth_date.to_string(), "1965-03-10");
        assert_eq!(record.sex, Sex::Female);
        assert_eq!(record.expiry_date.to_string(), "2024-03-09");
        assert_eq!(record.personal_number, "999999990");
        assert!(record.is_valid());
    }

    #[test]
    fn test_all_five_check_digits_reported() {
        let record = parse_at(SPECIMEN, 2026).unwrap();
        let report = record.check_digits;

        assert_eq!(report.document_number.value, '2');
        assert_eq!(report.birth_date.value, '1');
        assert_eq!(report.expiry_date.value, '6');
        assert_eq!(report.personal_number.value, '8');
        assert_eq!(report.composite.value, '4');
        assert!(report.all_valid());
    }

    #[test]
    fn test_failed_check_digit_does_not_abort() {
        // Print the wrong digit over the date of birth
        let line = SPECIMEN.replace("6503101", "6503105");
        let record = parse_at(&line, 2026).unwrap();

        assert!(!record.check_digits.birth_date.valid);
        assert_eq!(record.check_digits.birth_date.value, '5');
        // Composite covers the printed digit, so it fails too
        assert!(!record.check_digits.composite.valid);
        assert!(record.check_digits.document_number.valid);
        assert!(!record.is_valid());
    }

    #[test]
    fn test_lowercase_fails_checks_but_parses() {
        let mut bytes = SPECIMEN.as_bytes().to_vec();
        bytes[44] = b's';
        let line = String::from_utf8(bytes).unwrap();

        let record = parse_at(&line, 2026).unwrap();
        assert!(!record.check_digits.document_number.valid);
        assert!(!record.check_digits.composite.valid);
    }

    #[test]
    fn test_invalid_length() {
        let err = parse_at(&SPECIMEN[..87], 2026).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidLength {
                expected: 88,
                actual: 87
            }
        );

        let long = format!("{SPECIMEN}<");
        assert!(matches!(
            parse_at(&long, 2026),
            Err(Error::InvalidLength { actual: 89, .. })
        ));
    }

    #[test]
    fn test_non_ascii_rejected() {
        let line = SPECIMEN.replacen('W', "É", 1);
        assert!(matches!(
            parse_at(&line, 2026),
            Err(Error::InvalidCharacter { position: 16 })
        ));
    }

    #[test]
    fn test_not_a_passport() {
        let line = SPECIMEN.replacen('P', "V", 1);
        assert_eq!(parse_at(&line, 2026).unwrap_err(), Error::NotAPassport('V'));
    }

    #[test]
    fn test_document_type() {
        // Position 1 is not covered by any check digit
        let mut bytes = SPECIMEN.as_bytes().to_vec();
        bytes[1] = b'D';
        let line = String::from_utf8(bytes).unwrap();

        let record = parse_at(&line, 2026).unwrap();
        assert_eq!(record.document_type, Some('D'));
        assert!(record.is_valid());
    }

    #[test]
    fn test_unknown_nationality() {
        // ICAO's fictional Utopia is deliberately absent from the table
        let line = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<\
                    L898902C36UTO7408122F1204159ZE184226B<<<<<10";
        assert_eq!(
            parse_at(line, 2026).unwrap_err(),
            Error::UnknownNationality("UTO".to_string())
        );
    }

    #[test]
    fn test_malformed_name() {
        // Single fillers only: surname and given names never separate
        let line = "P<NLDDE<BRUIJN<WILLEKE<LISELOTTE<<<<<<<<<<<<\
                    SPECI20142NLD6503101F2403096999999990<<<<<84";
        assert!(matches!(
            parse_at(line, 2026),
            Err(Error::MalformedName(_))
        ));
    }

    #[test]
    fn test_empty_personal_number() {
        // Personal number unused: all fillers, check digit 0, and the
        // composite recomputed accordingly
        let line = "P<NLDDE<BRUIJN<<WILLEKE<LISELOTTE<<<<<<<<<<<\
                    SPECI20142NLD6503101F2403096<<<<<<<<<<<<<<08";
        let record = parse_at(line, 2026).unwrap();

        assert_eq!(record.personal_number, "");
        assert!(record.check_digits.personal_number.valid);
        assert!(record.is_valid());
    }

    #[test]
    fn test_filler_date_is_invalid_date() {
        let line = "P<NLDDE<BRUIJN<<WILLEKE<LISELOTTE<<<<<<<<<<<\
                    SPECI20142NLD<<<<<<1F2403096999999990<<<<<84";
        assert!(matches!(
            parse_at(line, 2026),
            Err(Error::InvalidDate { field: "birth", .. })
        ));
    }

    proptest! {
        /// A single digit substitution in the date of birth always
        /// trips both the field digit and the composite: the weights
        /// 7, 3, 1 are coprime to 10.
        #[test]
        fn prop_digit_substitution_detected(pos in 0usize..6, new in 0u8..10) {
            let index = 57 + pos;
            let mut bytes = SPECIMEN.as_bytes().to_vec();
            let original = bytes[index] - b'0';
            prop_assume!(original != new);
            bytes[index] = b'0' + new;

            let line = String::from_utf8(bytes).unwrap();
            let record = parse_at(&line, 2026).unwrap();
            prop_assert!(!record.check_digits.birth_date.valid);
            prop_assert!(!record.check_digits.composite.valid);
        }
    }
}
