use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::chemistry::tables::MassTables;
use crate::error::{Error, Result};

/// A theoretical fragment ion: its singly- or multiply-charged mass, its
/// annotation label and its 1-based backbone position. Ions are value
/// objects, two ions with equal fields are interchangeable.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, Encode, Decode)]
pub struct Ion {
    pub mass: f64,
    pub label: String,
    pub position: usize,
}

impl Ion {
    pub fn new(mass: f64, label: String, position: usize) -> Self {
        Ion {
            mass,
            label,
            position,
        }
    }
}

impl Display for Ion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.4} ({})", self.label, self.mass, self.position)
    }
}

/// The supported fragment ion families.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "lowercase")]
pub enum IonType {
    Precursor,
    Imm,
    B,
    Y,
    A,
    C,
    Z,
    X,
}

impl IonType {
    /// Returns the `IonType` corresponding to the given numeric code.
    ///
    /// # Example
    ///
    /// ```
    /// use fragms::data::ion::IonType;
    ///
    /// assert_eq!(IonType::from_code(3).unwrap(), IonType::B);
    /// assert!(IonType::from_code(99).is_err());
    /// ```
    pub fn from_code(code: i64) -> Result<IonType> {
        match code {
            1 => Ok(IonType::Precursor),
            2 => Ok(IonType::Imm),
            3 => Ok(IonType::B),
            4 => Ok(IonType::Y),
            5 => Ok(IonType::A),
            6 => Ok(IonType::C),
            7 => Ok(IonType::Z),
            8 => Ok(IonType::X),
            _ => Err(Error::InvalidIonType(code.to_string())),
        }
    }

    /// Returns the numeric code corresponding to the `IonType`.
    pub fn code(&self) -> i64 {
        match self {
            IonType::Precursor => 1,
            IonType::Imm => 2,
            IonType::B => 3,
            IonType::Y => 4,
            IonType::A => 5,
            IonType::C => 6,
            IonType::Z => 7,
            IonType::X => 8,
        }
    }
}

impl FromStr for IonType {
    type Err = Error;

    fn from_str(handle: &str) -> Result<IonType> {
        match handle.trim().to_lowercase().as_str() {
            "precursor" => Ok(IonType::Precursor),
            "imm" | "immonium" => Ok(IonType::Imm),
            "b" => Ok(IonType::B),
            "y" => Ok(IonType::Y),
            "a" => Ok(IonType::A),
            "c" => Ok(IonType::C),
            "z" => Ok(IonType::Z),
            "x" => Ok(IonType::X),
            _ => Err(Error::InvalidIonType(handle.to_string())),
        }
    }
}

/// A neutral loss as configured by the caller: either the name of a fixed
/// mass, or an explicit name and mass pair.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum NeutralLoss {
    Named(String),
    Custom(String, f64),
}

impl NeutralLoss {
    pub fn named(name: &str) -> Self {
        NeutralLoss::Named(name.to_string())
    }

    pub fn custom(name: &str, mass: f64) -> Self {
        NeutralLoss::Custom(name.to_string(), mass)
    }

    /// Normalize into an explicit `(name, mass)` pair, resolving bare names
    /// against the fixed-mass table.
    ///
    /// # Example
    ///
    /// ```
    /// use fragms::chemistry::tables::MassTables;
    /// use fragms::data::ion::NeutralLoss;
    ///
    /// let tables = MassTables::default();
    /// let loss = NeutralLoss::named("H2O").resolve(&tables).unwrap();
    /// assert_eq!(loss.mass, 18.01056468403);
    /// ```
    pub fn resolve(&self, tables: &MassTables) -> Result<ResolvedLoss> {
        match self {
            NeutralLoss::Named(name) => Ok(ResolvedLoss {
                name: name.clone(),
                mass: tables.neutral_loss(name)?,
            }),
            NeutralLoss::Custom(name, mass) => Ok(ResolvedLoss {
                name: name.clone(),
                mass: *mass,
            }),
        }
    }
}

/// A neutral loss after boundary normalization.
#[derive(Clone, PartialEq, Debug)]
pub struct ResolvedLoss {
    pub name: String,
    pub mass: f64,
}
