use std::collections::HashMap;

use ordered_float::OrderedFloat;

use crate::data::ion::Ion;

/// Generates the multiply charged variants of a batch of singly charged
/// ions.
///
/// Each ion is kept only if its backbone position satisfies the empirical
/// position-charge rule `position >= 2 * charge - 1`, excluding fragment
/// charge states too short to be plausible. Kept ions receive
/// `(mass + (charge - 1) * proton) / charge` and a label with every `+`
/// replaced by `{charge}+`.
///
/// # Example
///
/// ```
/// use fragms::algorithm::charge::expand;
/// use fragms::data::ion::Ion;
///
/// let ions = vec![
///     Ion::new(100.0, "b1[+]".to_string(), 1),
///     Ion::new(300.0, "b3[+]".to_string(), 3),
/// ];
/// let doubly = expand(&ions, 2, 1.007276466879);
/// assert_eq!(doubly.len(), 1);
/// assert_eq!(doubly[0].label, "b3[2+]");
/// ```
pub fn expand(ions: &[Ion], charge: u32, proton: f64) -> Vec<Ion> {
    let added_protons = proton * (charge - 1) as f64;
    let min_position = 2 * charge as usize - 1;
    let charge_str = format!("{}+", charge);
    ions.iter()
        .filter(|ion| ion.position >= min_position)
        .map(|ion| {
            Ion::new(
                (ion.mass + added_protons) / charge as f64,
                ion.label.replace('+', &charge_str),
                ion.position,
            )
        })
        .collect()
}

type BatchKey = (Vec<(OrderedFloat<f64>, String, usize)>, u32);

/// A memoizing wrapper around [`expand`], keyed on the structural value of
/// the ion batch and the target charge. The transform is pure, so cached
/// results are always valid; this is a performance option, not part of the
/// engine contract.
#[derive(Clone, Debug)]
pub struct ChargeExpander {
    proton: f64,
    cache: HashMap<BatchKey, Vec<Ion>>,
}

impl ChargeExpander {
    pub fn new(proton: f64) -> Self {
        ChargeExpander {
            proton,
            cache: HashMap::new(),
        }
    }

    pub fn expand(&mut self, ions: &[Ion], charge: u32) -> Vec<Ion> {
        let key: BatchKey = (
            ions.iter()
                .map(|ion| (OrderedFloat(ion.mass), ion.label.clone(), ion.position))
                .collect(),
            charge,
        );
        self.cache
            .entry(key)
            .or_insert_with(|| expand(ions, charge, self.proton))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
