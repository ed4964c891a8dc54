use std::error;
use std::fmt;
use std::fmt::{Display, Formatter};

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised during peptide mass calculation and fragment ion generation.
///
/// All variants reflect invalid input rather than transient conditions, are
/// raised synchronously at the point of detection and are not retryable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The sequence contains a character absent from the residue mass table.
    UnknownResidue(char),
    /// A modification site string is neither a sequence position nor a
    /// recognized terminus spelling.
    UnknownModificationSite(String),
    /// A named neutral loss is absent from the fixed-mass table.
    UnknownNeutralLoss(String),
    /// An ion type handle with no generator mapping.
    InvalidIonType(String),
    /// A numeric modification site that cannot be coerced to a plain integer.
    InvalidModificationSite(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownResidue(residue) => {
                write!(f, "Invalid residue detected: {}", residue)
            }
            Error::UnknownModificationSite(site) => {
                write!(f, "Unknown modification site: {}", site)
            }
            Error::UnknownNeutralLoss(name) => {
                write!(f, "Unknown neutral loss: {}", name)
            }
            Error::InvalidIonType(handle) => {
                write!(f, "Invalid ion type specified: {}", handle)
            }
            Error::InvalidModificationSite(site) => {
                write!(f, "Modification site is not an integer or terminus: {}", site)
            }
        }
    }
}

impl error::Error for Error {}
