use std::collections::HashMap;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Selector for the kind of residue mass used in calculations.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "lowercase")]
pub enum MassType {
    Mono,
    Avg,
}

/// The monoisotopic and average mass of a single residue.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize, Encode, Decode)]
pub struct ResidueMass {
    pub mono: f64,
    pub avg: f64,
}

impl ResidueMass {
    pub fn new(mono: f64, avg: f64) -> Self {
        ResidueMass { mono, avg }
    }

    pub fn by_type(&self, mass_type: MassType) -> f64 {
        match mass_type {
            MassType::Mono => self.mono,
            MassType::Avg => self.avg,
        }
    }
}

/// Residue Masses
///
/// # Returns
///
/// * `HashMap<char, ResidueMass>` - a map of amino acid one-letter codes to
///   their monoisotopic and average masses
///
/// # Example
///
/// ```
/// use fragms::chemistry::amino_acid::residue_masses;
///
/// let masses = residue_masses();
/// assert_eq!(masses.get(&'K').unwrap().mono, 128.09496301519);
/// ```
pub fn residue_masses() -> HashMap<char, ResidueMass> {
    let mut map = HashMap::new();
    map.insert('G', ResidueMass::new(57.02146372069, 57.051402191402));
    map.insert('A', ResidueMass::new(71.03711378515, 71.078019596249));
    map.insert('S', ResidueMass::new(87.03202840472, 87.077424520567));
    map.insert('P', ResidueMass::new(97.05276384961, 97.115372897831));
    map.insert('V', ResidueMass::new(99.06841391407, 99.131254405943));
    map.insert('T', ResidueMass::new(101.04767846918, 101.104041925414));
    map.insert('C', ResidueMass::new(103.00918495955, 103.142807002376));
    map.insert('I', ResidueMass::new(113.08406397853, 113.157871810790));
    map.insert('L', ResidueMass::new(113.08406397853, 113.157871810790));
    map.insert('N', ResidueMass::new(114.04292744138, 114.102804382804));
    map.insert('D', ResidueMass::new(115.02694302429, 115.087565341620));
    map.insert('Q', ResidueMass::new(128.05857750584, 128.129421787651));
    map.insert('K', ResidueMass::new(128.09496301519, 128.172515776292));
    map.insert('E', ResidueMass::new(129.04259308875, 129.114182746467));
    map.insert('M', ResidueMass::new(131.04048508847, 131.19604181207));
    map.insert('H', ResidueMass::new(137.05891185847, 137.139515217458));
    map.insert('F', ResidueMass::new(147.06841391407, 147.174197992883));
    map.insert('R', ResidueMass::new(156.10111102405, 156.185922199184));
    map.insert('Y', ResidueMass::new(163.06332853364, 163.173602917201));
    map.insert('W', ResidueMass::new(186.07931295073, 186.210313751855));
    map
}
