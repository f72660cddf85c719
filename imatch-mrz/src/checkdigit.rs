//! ICAO 9303 check digit algorithm
//!
//! From Doc 9303 Part 3 (Specifications Common to all MRTDs):
//! 1. Map each character to a value: digits keep their value,
//!    letters map to A=10 ... Z=35, the filler `<` counts as 0
//! 2. Multiply the values by the repeating weight sequence 7, 3, 1
//! 3. Sum the products
//! 4. The check digit is the sum modulo 10

use tracing::trace;

/// Repeating weight sequence applied left to right.
const WEIGHTS: [u32; 3] = [7, 3, 1];

/// Value of a single MRZ character, or `None` if the character is not
/// part of the MRZ alphabet (`0-9`, `A-Z`, `<`).
fn char_value(c: u8) -> Option<u32> {
    match c {
        b'0'..=b'9' => Some(u32::from(c - b'0')),
        b'A'..=b'Z' => Some(u32::from(c - b'A') + 10),
        b'<' => Some(0),
        _ => None,
    }
}

/// Calculate the ICAO 9303 check digit for a field
///
/// # Algorithm
///
/// ```text
/// 1. value('0'..'9') = 0..9, value('A'..'Z') = 10..35, value('<') = 0
/// 2. digit = sum(value[i] * weight[i % 3]) % 10   with weights [7, 3, 1]
/// ```
///
/// Returns `None` when the field contains a character outside the MRZ
/// alphabet.
///
/// # Examples
///
/// ```
/// use imatch_mrz::checkdigit;
///
/// // Date-of-birth example from Doc 9303 Part 3
/// assert_eq!(checkdigit::calculate("520727"), Some(3));
/// ```
pub fn calculate(field: &str) -> Option<u32> {
    let mut sum: u32 = 0;

    for (i, c) in field.bytes().enumerate() {
        let value = char_value(c)?;
        sum += value * WEIGHTS[i % 3];
    }

    let digit = sum % 10;

    trace!(
        field = field,
        sum = sum,
        digit = digit,
        "Calculated check digit"
    );

    Some(digit)
}

/// Verify a field against its printed check digit
///
/// The printed digit must be `0`-`9`; anything else (including the
/// filler `<`) fails verification, as does a field with characters
/// outside the MRZ alphabet.
pub fn verify(field: &str, printed: char) -> bool {
    let Some(expected) = printed.to_digit(10) else {
        return false;
    };

    calculate(field) == Some(expected)
}
