use itertools::concat;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::algorithm::generator::{
    generate_series, ion_rules, precursor_ions, GeneratorContext, SeriesKind,
};
use crate::data::ion::{Ion, IonType, NeutralLoss};
use crate::data::peptide::Peptide;
use crate::error::Result;

const PRECURSOR_DEFAULT_LOSSES: &[&str] = &["H2O", "NH3", "CO2"];

/// The ion types to generate, each with its neutral losses, in insertion
/// order. An empty loss list requests the type with no losses; a type absent
/// from the config is not generated; an empty config stands for every type
/// with its per-type default losses.
#[derive(Clone, PartialEq, Debug)]
pub struct IonTypeConfig {
    entries: Vec<(IonType, Vec<NeutralLoss>)>,
}

impl IonTypeConfig {
    pub fn new() -> Self {
        IonTypeConfig {
            entries: Vec::new(),
        }
    }

    /// Adds or replaces the entry for one ion type.
    ///
    /// # Example
    ///
    /// ```
    /// use fragms::algorithm::fragment::IonTypeConfig;
    /// use fragms::data::ion::{IonType, NeutralLoss};
    ///
    /// let config = IonTypeConfig::new()
    ///     .request(IonType::B, vec![NeutralLoss::named("NH3")])
    ///     .request(IonType::Y, vec![]);
    /// assert_eq!(config.len(), 2);
    /// ```
    pub fn request(mut self, ion_type: IonType, losses: Vec<NeutralLoss>) -> Self {
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| *existing == ion_type)
        {
            Some(entry) => entry.1 = losses,
            None => self.entries.push((ion_type, losses)),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &(IonType, Vec<NeutralLoss>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Every ion type with its default neutral losses.
impl Default for IonTypeConfig {
    fn default() -> Self {
        let mut config = IonTypeConfig::new().request(
            IonType::Precursor,
            PRECURSOR_DEFAULT_LOSSES
                .iter()
                .map(|name| NeutralLoss::named(name))
                .collect(),
        );
        for ion_type in [
            IonType::Imm,
            IonType::B,
            IonType::Y,
            IonType::A,
            IonType::C,
            IonType::X,
            IonType::Z,
        ] {
            let losses = ion_rules(ion_type)
                .map(|rules| rules.default_losses)
                .unwrap_or_default()
                .iter()
                .map(|name| NeutralLoss::named(name))
                .collect();
            config = config.request(ion_type, losses);
        }
        config
    }
}

/// Fragments a peptide into the configured ion types.
///
/// The positional mass array and the b/y cumulative series are computed
/// once; each requested generator then runs with the peptide's charge and
/// radical flag. Results concatenate in config order; within one type, ions
/// are position-ascending, then charge-ascending.
///
/// Arguments:
///
/// * `peptide` - the peptide to fragment
/// * `config` - the requested ion types with their neutral losses
///
/// Returns:
///
/// * `Result<Vec<Ion>>` - the generated ions, or the first error detected
///
/// # Example
///
/// ```
/// use fragms::algorithm::fragment::{fragment_peptide, IonTypeConfig};
/// use fragms::data::ion::IonType;
/// use fragms::data::peptide::Peptide;
///
/// let peptide = Peptide::new("AFCWK", 1, vec![]);
/// let config = IonTypeConfig::new().request(IonType::Y, vec![]);
/// let ions = fragment_peptide(&peptide, &config).unwrap();
/// assert_eq!(ions.len(), 4);
/// assert_eq!(ions[0].label, "y1[+]");
/// ```
pub fn fragment_peptide(peptide: &Peptide, config: &IonTypeConfig) -> Result<Vec<Ion>> {
    let default_config;
    let config = if config.is_empty() {
        default_config = IonTypeConfig::default();
        &default_config
    } else {
        config
    };

    let tables = peptide.tables();
    let pep_mass = peptide.peptide_mass()?;
    let total_mass = pep_mass.sum() + tables.water();
    let (b_series, y_series) = pep_mass.ion_series(tables.water());
    let ctx = GeneratorContext::new(tables, peptide.sequence(), peptide.modifications());

    let mut batches = Vec::with_capacity(config.len());
    for (ion_type, losses) in config.iter() {
        let resolved = losses
            .iter()
            .map(|loss| loss.resolve(tables))
            .collect::<Result<Vec<_>>>()?;

        let ions = match ion_rules(*ion_type) {
            // precursor is the one type without a rules bundle
            None => precursor_ions(
                total_mass,
                peptide.charge(),
                peptide.sequence().chars().count(),
                peptide.modifications(),
                &resolved,
                peptide.radical,
                tables,
            ),
            Some(rules) => {
                let masses: &[f64] = match rules.series {
                    SeriesKind::NTerminal => &b_series,
                    SeriesKind::CTerminal => &y_series,
                    SeriesKind::Residue => pep_mass.residues(),
                };
                generate_series(
                    rules,
                    masses,
                    peptide.charge(),
                    &resolved,
                    peptide.radical,
                    &ctx,
                )
            }
        };
        batches.push(ions);
    }

    Ok(concat(batches))
}

/// Fragments a batch of peptides in parallel.
///
/// Arguments:
///
/// * `peptides` - the peptides to fragment
/// * `config` - one shared ion type configuration
/// * `num_threads` - size of the thread pool
///
/// Returns:
///
/// * `Result<Vec<Vec<Ion>>>` - one ion list per peptide, input-ordered
pub fn fragment_peptides(
    peptides: &[Peptide],
    config: &IonTypeConfig,
    num_threads: usize,
) -> Result<Vec<Vec<Ion>>> {
    let thread_pool = ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .unwrap();
    thread_pool.install(|| {
        peptides
            .par_iter()
            .map(|peptide| fragment_peptide(peptide, config))
            .collect()
    })
}
