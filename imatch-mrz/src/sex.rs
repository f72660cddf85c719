//! Sex field decoding

/// Sex as recorded in the MRZ
///
/// Any character other than `M` or `F` (typically the filler `<` or
/// `X`) maps to [`Sex::Unspecified`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    Male,
    Female,
    Unspecified,
}

impl From<char> for Sex {
    fn from(c: char) -> Self {
        match c {
            'M' => Self::Male,
            'F' => Self::Female,
            _ => Self::Unspecified,
        }
    }
}

impl Sex {
    /// Single-letter abbreviation (`M`, `F`, or `X`)
    pub fn abbreviation(&self) -> char {
        match self {
            Self::Male => 'M',
            Self::Female => 'F',
            Self::Unspecified => 'X',
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Unspecified => "Unspecified",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_char() {
        assert_eq!(Sex::from('M'), Sex::Male);
        assert_eq!(Sex::from('F'), Sex::Female);
        assert_eq!(Sex::from('<'), Sex::Unspecified);
        assert_eq!(Sex::from('X'), Sex::Unspecified);
    }

    #[test]
    fn test_abbreviation() {
        assert_eq!(Sex::Female.abbreviation(), 'F');
        assert_eq!(Sex::Unspecified.abbreviation(), 'X');
    }
}
