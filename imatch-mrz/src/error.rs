//! Error types for imatch-mrz

/// Result type alias for MRZ parsing
pub type Result<T> = std::result::Result<T, Error>;

/// MRZ parse errors
///
/// Structural errors abort the parse; a failed check digit does not
/// (the per-field results are reported on the parsed record instead).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Input is not exactly one TD3 line
    #[error("Invalid MRZ length: expected {expected} characters, got {actual}")]
    InvalidLength {
        expected: usize,
        actual: usize,
    },

    /// Input contains a byte outside printable ASCII
    #[error("Invalid character in MRZ at position {position}")]
    InvalidCharacter {
        position: usize,
    },

    /// Document code is not the passport code `P`
    #[error("Not a passport MRZ: document code '{0}'")]
    NotAPassport(char),

    /// Name field has no surname/given-names separator
    #[error("Malformed name field: {0:?}")]
    MalformedName(String),

    /// Nationality code is not in the ICAO table
    #[error("Unknown nationality code: {0:?}")]
    UnknownNationality(String),

    /// Date field contains non-numeric characters
    #[error("Invalid {field} date: {raw:?}")]
    InvalidDate {
        field: &'static str,
        raw: String,
    },
}
