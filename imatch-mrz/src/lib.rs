//! # imatch-mrz
//!
//! ICAO Doc 9303 machine readable zone parsing for TD3 (passport)
//! documents.
//!
//! This crate provides the MRZ primitives:
//! - Fixed-offset TD3 field extraction
//! - The 7-3-1 check digit algorithm and all five digit checks
//! - Century resolution for two-digit years
//! - Nationality lookup against the ICAO code table
//!
//! ## Example
//!
//! ```
//! use imatch_mrz::parse;
//!
//! let line = "P<NLDDE<BRUIJN<<WILLEKE<LISELOTTE<<<<<<<<<<<\
//!             SPECI20142NLD6503101F2403096999999990<<<<<84";
//! let record = parse(line)?;
//!
//! assert_eq!(record.name.surname, "DE BRUIJN");
//! assert_eq!(record.nationality.name, "Netherlands, Kingdom of the");
//! assert!(record.is_valid());
//! # Ok::<(), imatch_mrz::Error>(())
//! ```

pub mod checkdigit;
pub mod countries;
pub mod date;
pub mod error;
pub mod parser;
pub mod record;
pub mod sex;

pub use date::MrzDate;
pub use error::{Error, Result};
pub use parser::{FILLER, TD3_LEN, parse, parse_at};
pub use record::{CheckDigit, CheckDigitReport, MrzName, MrzRecord, Nationality};
pub use sex::Sex;
