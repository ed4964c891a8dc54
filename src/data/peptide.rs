use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use bincode::{Decode, Encode};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::algorithm::fragment::{fragment_peptide, IonTypeConfig};
use crate::chemistry::amino_acid::MassType;
use crate::chemistry::tables::MassTables;
use crate::data::ion::Ion;
use crate::error::{Error, Result};

/// The location of a modification: a 1-based sequence position or a terminus.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Encode, Decode)]
pub enum Site {
    Nterm,
    Cterm,
    Residue(i64),
}

impl Site {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Site::Nterm | Site::Cterm)
    }
}

impl FromStr for Site {
    type Err = Error;

    /// Parses a terminus spelling. Case and `-`/`_`/space separators are
    /// normalized, anything that does not spell a terminus is an error.
    fn from_str(site: &str) -> Result<Site> {
        let normalized: String = site
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        match normalized.as_str() {
            "nterm" => Ok(Site::Nterm),
            "cterm" => Ok(Site::Cterm),
            _ => Err(Error::UnknownModificationSite(site.to_string())),
        }
    }
}

impl TryFrom<f64> for Site {
    type Error = Error;

    /// Coerces an integer-like numeric site to a sequence position.
    fn try_from(site: f64) -> Result<Site> {
        if site.fract() == 0.0 && site.is_finite() {
            Ok(Site::Residue(site as i64))
        } else {
            Err(Error::InvalidModificationSite(site.to_string()))
        }
    }
}

impl Serialize for Site {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Site::Nterm => serializer.serialize_str("nterm"),
            Site::Cterm => serializer.serialize_str("cterm"),
            Site::Residue(position) => serializer.serialize_i64(*position),
        }
    }
}

struct SiteVisitor;

impl<'de> Visitor<'de> for SiteVisitor {
    type Value = Site;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("an integer sequence position or a terminus string")
    }

    fn visit_i64<E: de::Error>(self, site: i64) -> std::result::Result<Site, E> {
        Ok(Site::Residue(site))
    }

    fn visit_u64<E: de::Error>(self, site: u64) -> std::result::Result<Site, E> {
        Ok(Site::Residue(site as i64))
    }

    fn visit_f64<E: de::Error>(self, site: f64) -> std::result::Result<Site, E> {
        Site::try_from(site).map_err(de::Error::custom)
    }

    fn visit_str<E: de::Error>(self, site: &str) -> std::result::Result<Site, E> {
        Site::from_str(site).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Site {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Site, D::Error> {
        deserializer.deserialize_any(SiteVisitor)
    }
}

/// A positional or terminal modification applied to a peptide.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, Encode, Decode)]
pub struct ModSite {
    pub mass: f64,
    pub site: Site,
    pub name: String,
}

impl ModSite {
    pub fn new(mass: f64, site: Site, name: &str) -> Self {
        ModSite {
            mass,
            site,
            name: name.to_string(),
        }
    }
}

/// The positional mass array of a peptide: index 0 holds the N-terminal
/// modification delta, indices 1..=N the residue masses including sited
/// modifications, index N+1 the C-terminal delta. This array is the single
/// source of truth for both total-mass and ion-mass computation.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, Encode, Decode)]
pub struct PeptideMass {
    masses: Vec<f64>,
}

impl PeptideMass {
    pub fn new(masses: Vec<f64>) -> Self {
        PeptideMass { masses }
    }

    pub fn nterm(&self) -> f64 {
        self.masses.first().copied().unwrap_or(0.0)
    }

    pub fn cterm(&self) -> f64 {
        self.masses.last().copied().unwrap_or(0.0)
    }

    /// The per-residue masses, sited modifications included.
    pub fn residues(&self) -> &[f64] {
        if self.masses.len() <= 2 {
            return &[];
        }
        &self.masses[1..self.masses.len() - 1]
    }

    /// Sum over all array entries, terminal deltas included. Water is not
    /// part of the array and is added by the caller.
    pub fn sum(&self) -> f64 {
        self.masses.iter().sum()
    }

    /// Derives the singly-uncharged cumulative mass series for the N-terminal
    /// (b-type) and C-terminal (y-type) fragment families. The b series seeds
    /// with the N-terminal delta; the y series seeds with the C-terminal
    /// delta when one is present, otherwise with water.
    pub fn ion_series(&self, water: f64) -> (Vec<f64>, Vec<f64>) {
        let residues = self.residues();
        let length = residues.len();
        let mut b_series = Vec::with_capacity(length);
        let mut y_series = Vec::with_capacity(length);
        let mut b_mass = self.nterm();
        let cterm = self.cterm();
        let mut y_mass = if cterm == 0.0 { water } else { cterm };
        for i in 0..length {
            b_mass += residues[i];
            b_series.push(b_mass);
            y_mass += residues[length - 1 - i];
            y_series.push(y_mass);
        }
        (b_series, y_series)
    }
}

/// Calculates the positional mass array of a peptide.
///
/// Arguments:
///
/// * `sequence` - peptide sequence in one-letter codes
/// * `modifications` - positional and terminal modifications
/// * `mass_type` - monoisotopic or average residue masses
/// * `tables` - the residue and fixed-mass tables to compute against
///
/// Returns:
///
/// * `Result<PeptideMass>` - the array of length `sequence.len() + 2`, or
///   `Error::UnknownResidue` for a character absent from the residue table
///
/// Integer modification sites outside `[1, len]` are tolerated and
/// contribute nothing. Multiple terminal modifications accumulate.
///
/// # Example
///
/// ```
/// use fragms::chemistry::amino_acid::MassType;
/// use fragms::chemistry::tables::MassTables;
/// use fragms::data::peptide::calculate_mass;
///
/// let tables = MassTables::default();
/// let pep_mass = calculate_mass("AAA", &[], MassType::Mono, &tables).unwrap();
/// assert!((pep_mass.sum() - 213.1113).abs() < 1e-3);
/// ```
pub fn calculate_mass(
    sequence: &str,
    modifications: &[ModSite],
    mass_type: MassType,
    tables: &MassTables,
) -> Result<PeptideMass> {
    let residues: Vec<char> = sequence.chars().collect();
    let length = residues.len();
    let mut masses = vec![0.0; length + 2];

    for (i, &residue) in residues.iter().enumerate() {
        masses[i + 1] = tables.residue_mass(residue, mass_type)?;
    }

    for modification in modifications {
        match modification.site {
            Site::Nterm => masses[0] += modification.mass,
            Site::Cterm => masses[length + 1] += modification.mass,
            Site::Residue(position) => {
                // out-of-range sites are a deliberate silent no-op
                if position >= 1 && position <= length as i64 {
                    masses[position as usize] += modification.mass;
                }
            }
        }
    }

    Ok(PeptideMass::new(masses))
}

/// A peptide with its charge state, modifications and fragmentation state.
///
/// Mutating the sequence, charge or modifications through the setters clears
/// the cached fragment ions; the next call to [`Peptide::fragment`]
/// recomputes them lazily.
#[derive(Clone, Debug)]
pub struct Peptide {
    sequence: String,
    charge: u32,
    modifications: Vec<ModSite>,
    pub mass_type: MassType,
    pub radical: bool,
    tables: Arc<MassTables>,
    fragment_ions: Option<Vec<Ion>>,
}

impl Peptide {
    /// Creates a peptide against the standard mass tables.
    ///
    /// # Example
    ///
    /// ```
    /// use fragms::data::peptide::Peptide;
    ///
    /// let peptide = Peptide::new("AAA", 2, vec![]);
    /// assert!((peptide.mass().unwrap() - 231.1219).abs() < 1e-3);
    /// ```
    pub fn new(sequence: &str, charge: u32, modifications: Vec<ModSite>) -> Self {
        Peptide::with_tables(
            sequence,
            charge,
            modifications,
            Arc::new(MassTables::default()),
        )
    }

    /// Creates a peptide against caller-supplied mass tables.
    pub fn with_tables(
        sequence: &str,
        charge: u32,
        modifications: Vec<ModSite>,
        tables: Arc<MassTables>,
    ) -> Self {
        Peptide {
            sequence: sequence.to_string(),
            charge,
            modifications,
            mass_type: MassType::Mono,
            radical: false,
            tables,
            fragment_ions: None,
        }
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn charge(&self) -> u32 {
        self.charge
    }

    pub fn modifications(&self) -> &[ModSite] {
        &self.modifications
    }

    pub fn tables(&self) -> &MassTables {
        &self.tables
    }

    pub fn set_sequence(&mut self, sequence: &str) {
        self.clear_fragment_ions();
        self.sequence = sequence.to_string();
    }

    pub fn set_charge(&mut self, charge: u32) {
        self.clear_fragment_ions();
        self.charge = charge;
    }

    pub fn set_modifications(&mut self, modifications: Vec<ModSite>) {
        self.clear_fragment_ions();
        self.modifications = modifications;
    }

    /// Clears the cached fragment ions.
    pub fn clear_fragment_ions(&mut self) {
        self.fragment_ions = None;
    }

    /// The cached fragment ions, if a fragmentation has run since the last
    /// mutation.
    pub fn cached_fragment_ions(&self) -> Option<&[Ion]> {
        self.fragment_ions.as_deref()
    }

    /// The positional mass array of the peptide, modifications included.
    pub fn peptide_mass(&self) -> Result<PeptideMass> {
        calculate_mass(
            &self.sequence,
            &self.modifications,
            self.mass_type,
            &self.tables,
        )
    }

    /// The total peptide mass, modifications and water included.
    pub fn mass(&self) -> Result<f64> {
        Ok(self.peptide_mass()?.sum() + self.tables.water())
    }

    /// The mass-to-charge ratio of the intact peptide.
    pub fn mz(&self) -> Result<f64> {
        Ok(self.mass()? / self.charge as f64 + self.tables.proton())
    }

    /// Fragments the peptide, serving the cached result when one exists.
    ///
    /// Arguments:
    ///
    /// * `config` - the requested ion types with their neutral losses; an
    ///   empty config requests every type with its default losses
    ///
    /// Returns:
    ///
    /// * `Result<&[Ion]>` - the generated ions, config-ordered across types
    ///
    /// # Example
    ///
    /// ```
    /// use fragms::algorithm::fragment::IonTypeConfig;
    /// use fragms::data::ion::IonType;
    /// use fragms::data::peptide::Peptide;
    ///
    /// let mut peptide = Peptide::new("AAA", 1, vec![]);
    /// let config = IonTypeConfig::new().request(IonType::B, vec![]);
    /// let ions = peptide.fragment(&config).unwrap();
    /// assert_eq!(ions.len(), 2);
    /// assert_eq!(ions[0].label, "b1[+]");
    /// ```
    pub fn fragment(&mut self, config: &IonTypeConfig) -> Result<&[Ion]> {
        if self.fragment_ions.is_none() {
            let ions = fragment_peptide(self, config)?;
            self.fragment_ions = Some(ions);
        }
        Ok(self.fragment_ions.as_deref().unwrap_or_default())
    }

    /// Fragments the peptide unconditionally, replacing any cached result.
    pub fn fragment_forced(&mut self, config: &IonTypeConfig) -> Result<&[Ion]> {
        let ions = fragment_peptide(self, config)?;
        self.fragment_ions = Some(ions);
        Ok(self.fragment_ions.as_deref().unwrap_or_default())
    }
}

impl Display for Peptide {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Peptide {} {}+ ({} modifications, {} cached ions)>",
            self.sequence,
            self.charge,
            self.modifications.len(),
            self.fragment_ions.as_ref().map_or(0, |ions| ions.len())
        )
    }
}
