//! Medical specialty value object

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InvalidSpecialtyError;

/// All available specialties
pub const ALL_SPECIALTIES: &[Specialty] = &[
    Specialty::PrimaryCare,
    Specialty::Cardiology,
    Specialty::Neurology,
    Specialty::Oncology,
    Specialty::Radiology,
    Specialty::Urology,
];

/// Medical specialty guiding transcription and note generation.
/// The backend expects the upper-case wire code from `as_str`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Specialty {
    #[default]
    PrimaryCare,
    Cardiology,
    Neurology,
    Oncology,
    Radiology,
    Urology,
}

impl Specialty {
    /// Get the human-readable label for this specialty
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PrimaryCare => "Primary Care",
            Self::Cardiology => "Cardiology",
            Self::Neurology => "Neurology",
            Self::Oncology => "Oncology",
            Self::Radiology => "Radiology",
            Self::Urology => "Urology",
        }
    }

    /// Get the wire code sent to the API
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryCare => "PRIMARY_CARE",
            Self::Cardiology => "CARDIOLOGY",
            Self::Neurology => "NEUROLOGY",
            Self::Oncology => "ONCOLOGY",
            Self::Radiology => "RADIOLOGY",
            Self::Urology => "UROLOGY",
        }
    }
}

impl FromStr for Specialty {
    type Err = InvalidSpecialtyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "PRIMARY_CARE" => Ok(Self::PrimaryCare),
            "CARDIOLOGY" => Ok(Self::Cardiology),
            "NEUROLOGY" => Ok(Self::Neurology),
            "ONCOLOGY" => Ok(Self::Oncology),
            "RADIOLOGY" => Ok(Self::Radiology),
            "UROLOGY" => Ok(Self::Urology),
            _ => Err(InvalidSpecialtyError { input: s.to_string() }),
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
