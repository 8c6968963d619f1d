use std::fmt;
use std::str::FromStr;

/// Number of digits in a Polish NIP.
pub const NIP_LENGTH: usize = 10;

/// Canonical Polish Tax Identification Number (NIP).
///
/// Always exactly ten ASCII digits. No checksum is verified: the CEIDG
/// registry decides whether a well-formed NIP actually exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nip(String);

/// Shape validation failure for a candidate NIP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NipFormatError {
    /// No digits at all in the input.
    Empty,
    /// Digits were found, but not exactly ten of them.
    WrongLength { digits: usize },
}

impl fmt::Display for NipFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NipFormatError::Empty => write!(f, "NIP contains no digits"),
            NipFormatError::WrongLength { digits } => write!(
                f,
                "NIP must be exactly {} digits, got {}",
                NIP_LENGTH, digits
            ),
        }
    }
}

impl std::error::Error for NipFormatError {}

impl Nip {
    /// Normalizes a raw NIP by dropping every non-digit character
    /// (spaces, hyphens, country prefixes like `PL`) and checks the length.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ceidg_lookup_api::nip::Nip;
    ///
    /// let nip = Nip::parse("123-456-78-90").unwrap();
    /// assert_eq!(nip.as_str(), "1234567890");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, NipFormatError> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

        match digits.len() {
            0 => Err(NipFormatError::Empty),
            NIP_LENGTH => Ok(Nip(digits)),
            n => Err(NipFormatError::WrongLength { digits: n }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Free-function form of [`Nip::parse`].
pub fn normalize(raw: &str) -> Result<Nip, NipFormatError> {
    Nip::parse(raw)
}

impl FromStr for Nip {
    type Err = NipFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Nip::parse(s)
    }
}

impl fmt::Display for Nip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Nip {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
