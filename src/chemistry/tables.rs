use std::collections::HashMap;

use crate::chemistry::amino_acid::{residue_masses, MassType, ResidueMass};
use crate::chemistry::constants::{
    MASS_CARBAMIDOMETHYL, MASS_CO, MASS_CO2, MASS_ITRAQ8_TAG, MASS_NH3, MASS_NITROGEN,
    MASS_PROTON, MASS_WATER,
};
use crate::error::{Error, Result};

/// Fixed Masses
///
/// # Returns
///
/// * `HashMap<String, f64>` - a map of small-molecule names to their
///   monoisotopic masses, resolvable as named neutral losses
///
/// # Example
///
/// ```
/// use fragms::chemistry::tables::fixed_masses;
///
/// let masses = fixed_masses();
/// assert_eq!(masses.get("H2O"), Some(&18.01056468403));
/// ```
pub fn fixed_masses() -> HashMap<String, f64> {
    let mut map = HashMap::new();
    map.insert("H".to_string(), MASS_PROTON);
    map.insert("H2O".to_string(), MASS_WATER);
    map.insert("CO".to_string(), MASS_CO);
    map.insert("CO2".to_string(), MASS_CO2);
    map.insert("NH3".to_string(), MASS_NH3);
    map.insert("N".to_string(), MASS_NITROGEN);
    map.insert("tag".to_string(), MASS_ITRAQ8_TAG);
    map.insert("cys_c".to_string(), MASS_CARBAMIDOMETHYL);
    map
}

/// The constant data the engine computes against: per-residue masses and the
/// fixed masses of small molecules. The tables are read-only once built and
/// are shared between peptides, so isotope-labeled or otherwise customized
/// tables can be substituted without touching generator logic.
#[derive(Clone, Debug)]
pub struct MassTables {
    pub residues: HashMap<char, ResidueMass>,
    pub fixed: HashMap<String, f64>,
}

impl Default for MassTables {
    fn default() -> Self {
        MassTables {
            residues: residue_masses(),
            fixed: fixed_masses(),
        }
    }
}

impl MassTables {
    /// Look up a residue mass of the requested type.
    ///
    /// Arguments:
    ///
    /// * `residue` - one-letter amino acid code
    /// * `mass_type` - monoisotopic or average
    ///
    /// Returns:
    ///
    /// * `Result<f64>` - the residue mass, or `Error::UnknownResidue`
    pub fn residue_mass(&self, residue: char, mass_type: MassType) -> Result<f64> {
        self.residues
            .get(&residue)
            .map(|mass| mass.by_type(mass_type))
            .ok_or(Error::UnknownResidue(residue))
    }

    /// Resolve a named neutral loss against the fixed-mass table.
    pub fn neutral_loss(&self, name: &str) -> Result<f64> {
        self.fixed
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownNeutralLoss(name.to_string()))
    }

    fn fixed_or(&self, name: &str, fallback: f64) -> f64 {
        self.fixed.get(name).copied().unwrap_or(fallback)
    }

    pub fn proton(&self) -> f64 {
        self.fixed_or("H", MASS_PROTON)
    }

    pub fn water(&self) -> f64 {
        self.fixed_or("H2O", MASS_WATER)
    }

    pub fn co(&self) -> f64 {
        self.fixed_or("CO", MASS_CO)
    }

    pub fn nh3(&self) -> f64 {
        self.fixed_or("NH3", MASS_NH3)
    }

    pub fn nitrogen(&self) -> f64 {
        self.fixed_or("N", MASS_NITROGEN)
    }

    pub fn tag(&self) -> f64 {
        self.fixed_or("tag", MASS_ITRAQ8_TAG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_residue_is_an_error() {
        let tables = MassTables::default();
        assert_eq!(
            tables.residue_mass('U', MassType::Mono),
            Err(Error::UnknownResidue('U'))
        );
    }

    #[test]
    fn neutral_loss_resolution() {
        let tables = MassTables::default();
        assert_eq!(tables.neutral_loss("NH3"), Ok(MASS_NH3));
        assert_eq!(
            tables.neutral_loss("XYZ"),
            Err(Error::UnknownNeutralLoss("XYZ".to_string()))
        );
    }

    #[test]
    fn custom_tables_are_honored() {
        let mut tables = MassTables::default();
        tables
            .residues
            .insert('X', ResidueMass::new(100.0, 100.1));
        tables.fixed.insert("testLoss".to_string(), 9.0);
        assert_eq!(tables.residue_mass('X', MassType::Avg), Ok(100.1));
        assert_eq!(tables.neutral_loss("testLoss"), Ok(9.0));
    }
}
