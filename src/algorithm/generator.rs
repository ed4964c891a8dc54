use std::collections::HashSet;

use crate::algorithm::charge::expand;
use crate::chemistry::tables::MassTables;
use crate::data::ion::{Ion, IonType, ResolvedLoss};
use crate::data::peptide::{ModSite, Site};

/// Shared inputs of the per-type hooks: the mass tables, the residue
/// characters and the 0-based indices carrying an integer modification.
pub struct GeneratorContext<'a> {
    pub tables: &'a MassTables,
    pub residues: Vec<char>,
    pub modified: HashSet<usize>,
}

impl<'a> GeneratorContext<'a> {
    pub fn new(tables: &'a MassTables, sequence: &str, modifications: &[ModSite]) -> Self {
        let modified = modifications
            .iter()
            .filter_map(|modification| match modification.site {
                Site::Residue(position) if position >= 1 => Some(position as usize - 1),
                _ => None,
            })
            .collect();
        GeneratorContext {
            tables,
            residues: sequence.chars().collect(),
            modified,
        }
    }
}

/// Which cumulative mass series an ion type consumes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SeriesKind {
    NTerminal,
    CTerminal,
    Residue,
}

/// The behavior bundle of one ion type: the input series, whether the final
/// (full-length) position is dropped, and the four hooks of the shared
/// template algorithm.
pub struct IonRules {
    pub series: SeriesKind,
    pub truncate_last: bool,
    pub default_losses: &'static [&'static str],
    pub fix_mass: fn(&MassTables, f64) -> f64,
    pub base_ions: fn(&GeneratorContext, f64, usize) -> Vec<Ion>,
    pub radical_ions: fn(&GeneratorContext, f64, usize) -> Vec<Ion>,
    pub neutral_loss_ions: fn(&GeneratorContext, f64, usize, &[ResolvedLoss]) -> Vec<Ion>,
}

fn no_radical_ions(_: &GeneratorContext, _: f64, _: usize) -> Vec<Ion> {
    Vec::new()
}

fn backbone_losses(stem: &str, mass: f64, pos: usize, losses: &[ResolvedLoss]) -> Vec<Ion> {
    losses
        .iter()
        .map(|loss| {
            Ion::new(
                mass - loss.mass,
                format!("[{}{}-{}][+]", stem, pos + 1, loss.name),
                pos + 1,
            )
        })
        .collect()
}

fn b_fix(tables: &MassTables, mass: f64) -> f64 {
    mass + tables.proton()
}

fn b_base(_: &GeneratorContext, mass: f64, pos: usize) -> Vec<Ion> {
    vec![Ion::new(mass, format!("b{}[+]", pos + 1), pos + 1)]
}

fn b_radical(_: &GeneratorContext, mass: f64, pos: usize) -> Vec<Ion> {
    // radical b retains the fixed mass, only the label marks the H loss
    vec![Ion::new(mass, format!("[b{}-H][•+]", pos + 1), pos + 1)]
}

fn b_losses(_: &GeneratorContext, mass: f64, pos: usize, losses: &[ResolvedLoss]) -> Vec<Ion> {
    backbone_losses("b", mass, pos, losses)
}

fn y_fix(tables: &MassTables, mass: f64) -> f64 {
    mass + tables.proton()
}

fn y_base(_: &GeneratorContext, mass: f64, pos: usize) -> Vec<Ion> {
    vec![Ion::new(mass, format!("y{}[+]", pos + 1), pos + 1)]
}

fn y_losses(_: &GeneratorContext, mass: f64, pos: usize, losses: &[ResolvedLoss]) -> Vec<Ion> {
    backbone_losses("y", mass, pos, losses)
}

fn a_fix(tables: &MassTables, mass: f64) -> f64 {
    mass + tables.proton() - tables.co()
}

fn a_base(_: &GeneratorContext, mass: f64, pos: usize) -> Vec<Ion> {
    vec![Ion::new(mass, format!("a{}[+]", pos + 1), pos + 1)]
}

fn a_radical(ctx: &GeneratorContext, mass: f64, pos: usize) -> Vec<Ion> {
    let proton = ctx.tables.proton();
    vec![
        Ion::new(mass - proton, format!("[a{}-H][•+]", pos + 1), pos + 1),
        Ion::new(mass + proton, format!("[a{}+H][•+]", pos + 1), pos + 1),
    ]
}

fn a_losses(_: &GeneratorContext, mass: f64, pos: usize, losses: &[ResolvedLoss]) -> Vec<Ion> {
    backbone_losses("a", mass, pos, losses)
}

fn c_fix(tables: &MassTables, mass: f64) -> f64 {
    mass + tables.nitrogen() + 3.0 * tables.proton()
}

fn c_base(_: &GeneratorContext, mass: f64, pos: usize) -> Vec<Ion> {
    vec![Ion::new(mass, format!("c{}[+]", pos + 1), pos + 1)]
}

fn c_radical(ctx: &GeneratorContext, mass: f64, pos: usize) -> Vec<Ion> {
    vec![Ion::new(
        mass + 2.0 * ctx.tables.proton(),
        format!("[c{}+2H][•+]", pos + 1),
        pos + 1,
    )]
}

fn c_losses(_: &GeneratorContext, mass: f64, pos: usize, losses: &[ResolvedLoss]) -> Vec<Ion> {
    backbone_losses("c", mass, pos, losses)
}

fn x_fix(tables: &MassTables, mass: f64) -> f64 {
    mass + tables.co() - tables.proton()
}

fn x_base(_: &GeneratorContext, mass: f64, pos: usize) -> Vec<Ion> {
    vec![Ion::new(mass, format!("x{}[+]", pos + 1), pos + 1)]
}

fn x_losses(_: &GeneratorContext, mass: f64, pos: usize, losses: &[ResolvedLoss]) -> Vec<Ion> {
    backbone_losses("x", mass, pos, losses)
}

fn z_fix(tables: &MassTables, mass: f64) -> f64 {
    mass - tables.nitrogen() - 3.0 * tables.proton()
}

fn z_base(_: &GeneratorContext, mass: f64, pos: usize) -> Vec<Ion> {
    vec![Ion::new(mass, format!("z{}[+]", pos + 1), pos + 1)]
}

fn z_radical(ctx: &GeneratorContext, mass: f64, pos: usize) -> Vec<Ion> {
    vec![Ion::new(
        mass - ctx.tables.proton(),
        format!("[z{}-H][•+]", pos + 1),
        pos + 1,
    )]
}

fn z_losses(_: &GeneratorContext, mass: f64, pos: usize, losses: &[ResolvedLoss]) -> Vec<Ion> {
    backbone_losses("z", mass, pos, losses)
}

fn imm_fix(tables: &MassTables, mass: f64) -> f64 {
    mass - tables.co() + tables.proton()
}

fn imm_label(ctx: &GeneratorContext, pos: usize) -> String {
    let residue = ctx.residues.get(pos).copied().unwrap_or('?');
    let marker = if ctx.modified.contains(&pos) { "*" } else { "" };
    format!("imm({}{})", residue, marker)
}

fn imm_base(ctx: &GeneratorContext, mass: f64, pos: usize) -> Vec<Ion> {
    vec![Ion::new(mass, imm_label(ctx, pos), pos + 1)]
}

fn imm_losses(ctx: &GeneratorContext, mass: f64, pos: usize, losses: &[ResolvedLoss]) -> Vec<Ion> {
    losses
        .iter()
        .map(|loss| {
            Ion::new(
                mass - loss.mass,
                format!("[{}-{}][+]", imm_label(ctx, pos), loss.name),
                pos + 1,
            )
        })
        .collect()
}

static B_RULES: IonRules = IonRules {
    series: SeriesKind::NTerminal,
    truncate_last: true,
    default_losses: &["H2O", "NH3", "CO"],
    fix_mass: b_fix,
    base_ions: b_base,
    radical_ions: b_radical,
    neutral_loss_ions: b_losses,
};

static Y_RULES: IonRules = IonRules {
    series: SeriesKind::CTerminal,
    truncate_last: true,
    default_losses: &["NH3", "H2O"],
    fix_mass: y_fix,
    base_ions: y_base,
    radical_ions: no_radical_ions,
    neutral_loss_ions: y_losses,
};

static A_RULES: IonRules = IonRules {
    series: SeriesKind::NTerminal,
    truncate_last: true,
    default_losses: &[],
    fix_mass: a_fix,
    base_ions: a_base,
    radical_ions: a_radical,
    neutral_loss_ions: a_losses,
};

static C_RULES: IonRules = IonRules {
    series: SeriesKind::NTerminal,
    truncate_last: true,
    default_losses: &[],
    fix_mass: c_fix,
    base_ions: c_base,
    radical_ions: c_radical,
    neutral_loss_ions: c_losses,
};

static X_RULES: IonRules = IonRules {
    series: SeriesKind::CTerminal,
    truncate_last: false,
    default_losses: &[],
    fix_mass: x_fix,
    base_ions: x_base,
    radical_ions: no_radical_ions,
    neutral_loss_ions: x_losses,
};

static Z_RULES: IonRules = IonRules {
    series: SeriesKind::CTerminal,
    truncate_last: false,
    default_losses: &[],
    fix_mass: z_fix,
    base_ions: z_base,
    radical_ions: z_radical,
    neutral_loss_ions: z_losses,
};

static IMM_RULES: IonRules = IonRules {
    series: SeriesKind::Residue,
    truncate_last: false,
    default_losses: &[],
    fix_mass: imm_fix,
    base_ions: imm_base,
    radical_ions: no_radical_ions,
    neutral_loss_ions: imm_losses,
};

/// The behavior bundle of an ion type. Precursor ions enumerate by charge
/// state rather than by position and have no bundle; see
/// [`precursor_ions`].
pub fn ion_rules(ion_type: IonType) -> Option<&'static IonRules> {
    match ion_type {
        IonType::Precursor => None,
        IonType::Imm => Some(&IMM_RULES),
        IonType::B => Some(&B_RULES),
        IonType::Y => Some(&Y_RULES),
        IonType::A => Some(&A_RULES),
        IonType::C => Some(&C_RULES),
        IonType::Z => Some(&Z_RULES),
        IonType::X => Some(&X_RULES),
    }
}

/// Runs the shared template over one ion type's input mass series.
///
/// For each position: fix the raw series mass, emit the base ions, the
/// radical ions when the radical flag is set, and one ion per configured
/// neutral loss. The singly-charged pass is then expanded to every charge
/// state from 2 up to the peptide charge and the expansions appended.
pub fn generate_series(
    rules: &IonRules,
    masses: &[f64],
    charge: u32,
    losses: &[ResolvedLoss],
    radical: bool,
    ctx: &GeneratorContext,
) -> Vec<Ion> {
    let end = if rules.truncate_last {
        masses.len().saturating_sub(1)
    } else {
        masses.len()
    };

    let mut singly = Vec::with_capacity(end * (2 + losses.len()));
    for (pos, &raw_mass) in masses[..end].iter().enumerate() {
        let mass = (rules.fix_mass)(ctx.tables, raw_mass);
        singly.extend((rules.base_ions)(ctx, mass, pos));
        if radical {
            singly.extend((rules.radical_ions)(ctx, mass, pos));
        }
        if !losses.is_empty() {
            singly.extend((rules.neutral_loss_ions)(ctx, mass, pos, losses));
        }
    }

    let proton = ctx.tables.proton();
    let mut ions = singly.clone();
    for charge_state in 2..=charge {
        ions.extend(expand(&singly, charge_state, proton));
    }
    ions
}

/// Generates the precursor ions of a peptide by direct charge enumeration.
///
/// For each charge state: the protonated precursor, the radical `M` ion when
/// the radical flag is set, one ion per configured neutral loss, and the
/// tag-loss ion when an `iTRAQ8plex` modification sits at a terminus.
/// Position is the full sequence length for all emitted ions.
pub fn precursor_ions(
    mass: f64,
    charge: u32,
    sequence_len: usize,
    modifications: &[ModSite],
    losses: &[ResolvedLoss],
    radical: bool,
    tables: &MassTables,
) -> Vec<Ion> {
    let proton = tables.proton();
    let tagged = modifications
        .iter()
        .any(|modification| modification.name == "iTRAQ8plex" && modification.site.is_terminal());

    let mut ions = Vec::new();
    for charge_state in 1..=charge {
        let symbol = format!(
            "{}{}+",
            if radical { "•" } else { "" },
            if charge_state > 1 {
                charge_state.to_string()
            } else {
                String::new()
            }
        );
        let scaled = mass / charge_state as f64;

        ions.push(Ion::new(
            scaled + proton,
            format!("[M+H][{}]", symbol),
            sequence_len,
        ));
        if radical {
            ions.push(Ion::new(scaled, format!("M[{}]", symbol), sequence_len));
        }
        for loss in losses {
            ions.push(Ion::new(
                (mass - loss.mass) / charge_state as f64 + proton,
                format!("[M-{}][{}]", loss.name, symbol),
                sequence_len,
            ));
        }
        if tagged {
            ions.push(Ion::new(
                (mass - tables.tag()) / charge_state as f64 + proton,
                format!("M-iT8[{}]", symbol),
                sequence_len,
            ));
        }
    }
    ions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::amino_acid::MassType;
    use crate::chemistry::constants::{MASS_CO, MASS_NH3, MASS_NITROGEN, MASS_PROTON, MASS_WATER};
    use crate::data::peptide::calculate_mass;

    fn context<'a>(tables: &'a MassTables, sequence: &str, mods: &'a [ModSite]) -> GeneratorContext<'a> {
        GeneratorContext::new(tables, sequence, mods)
    }

    fn series(sequence: &str, tables: &MassTables) -> (Vec<f64>, Vec<f64>) {
        let pep_mass = calculate_mass(sequence, &[], MassType::Mono, tables).unwrap();
        pep_mass.ion_series(tables.water())
    }

    #[test]
    fn b_series_truncates_the_full_length_position() {
        let tables = MassTables::default();
        let (b_series, _) = series("AFCWK", &tables);
        let ctx = context(&tables, "AFCWK", &[]);
        let ions = generate_series(&B_RULES, &b_series, 1, &[], false, &ctx);
        assert_eq!(ions.len(), 4);
        assert_eq!(ions[0].label, "b1[+]");
        assert_eq!(ions[3].label, "b4[+]");
        assert_eq!(ions[3].position, 4);
    }

    #[test]
    fn a_ions_sit_one_co_below_b_ions() {
        let tables = MassTables::default();
        let (b_series, _) = series("AFCWK", &tables);
        let ctx = context(&tables, "AFCWK", &[]);
        let b_ions = generate_series(&B_RULES, &b_series, 1, &[], false, &ctx);
        let a_ions = generate_series(&A_RULES, &b_series, 1, &[], false, &ctx);
        for (a_ion, b_ion) in a_ions.iter().zip(b_ions.iter()) {
            assert!((b_ion.mass - a_ion.mass - MASS_CO).abs() < 0.01);
        }
    }

    #[test]
    fn c_and_z_offsets() {
        let tables = MassTables::default();
        let (b_series, y_series) = series("AFCWK", &tables);
        let ctx = context(&tables, "AFCWK", &[]);
        let c_ions = generate_series(&C_RULES, &b_series, 1, &[], false, &ctx);
        let z_ions = generate_series(&Z_RULES, &y_series, 1, &[], false, &ctx);
        let expected_c1 = b_series[0] + MASS_NITROGEN + 3.0 * MASS_PROTON;
        let expected_z1 = y_series[0] - MASS_NITROGEN - 3.0 * MASS_PROTON;
        assert!((c_ions[0].mass - expected_c1).abs() < 1e-9);
        assert!((z_ions[0].mass - expected_z1).abs() < 1e-9);
    }

    #[test]
    fn x_and_z_run_the_full_series() {
        let tables = MassTables::default();
        let (_, y_series) = series("AFCWK", &tables);
        let ctx = context(&tables, "AFCWK", &[]);
        let x_ions = generate_series(&X_RULES, &y_series, 1, &[], false, &ctx);
        let z_ions = generate_series(&Z_RULES, &y_series, 1, &[], false, &ctx);
        assert_eq!(x_ions.len(), 5);
        assert_eq!(z_ions.len(), 5);
        assert_eq!(x_ions[4].label, "x5[+]");
    }

    #[test]
    fn radical_b_ions_mark_the_hydrogen_loss() {
        let tables = MassTables::default();
        let (b_series, _) = series("AAA", &tables);
        let ctx = context(&tables, "AAA", &[]);
        let ions = generate_series(&B_RULES, &b_series, 1, &[], true, &ctx);
        let labels: Vec<&str> = ions.iter().map(|ion| ion.label.as_str()).collect();
        assert!(labels.contains(&"[b1-H][•+]"));
        // radical b keeps the fixed mass
        let b1 = ions.iter().find(|ion| ion.label == "b1[+]").unwrap();
        let b1_radical = ions.iter().find(|ion| ion.label == "[b1-H][•+]").unwrap();
        assert_eq!(b1.mass, b1_radical.mass);
    }

    #[test]
    fn radical_a_ions_come_in_pairs() {
        let tables = MassTables::default();
        let (b_series, _) = series("AAA", &tables);
        let ctx = context(&tables, "AAA", &[]);
        let ions = generate_series(&A_RULES, &b_series, 1, &[], true, &ctx);
        let minus = ions.iter().find(|ion| ion.label == "[a1-H][•+]").unwrap();
        let plus = ions.iter().find(|ion| ion.label == "[a1+H][•+]").unwrap();
        assert!((plus.mass - minus.mass - 2.0 * MASS_PROTON).abs() < 1e-9);
    }

    #[test]
    fn neutral_losses_shift_and_relabel() {
        let tables = MassTables::default();
        let (b_series, _) = series("AAA", &tables);
        let ctx = context(&tables, "AAA", &[]);
        let losses = vec![
            ResolvedLoss {
                name: "NH3".to_string(),
                mass: MASS_NH3,
            },
            ResolvedLoss {
                name: "testLoss".to_string(),
                mass: 9.0,
            },
        ];
        let ions = generate_series(&B_RULES, &b_series, 1, &losses, false, &ctx);
        let b1 = ions.iter().find(|ion| ion.label == "b1[+]").unwrap();
        let b1_nh3 = ions.iter().find(|ion| ion.label == "[b1-NH3][+]").unwrap();
        let b1_test = ions
            .iter()
            .find(|ion| ion.label == "[b1-testLoss][+]")
            .unwrap();
        assert!((b1.mass - b1_nh3.mass - MASS_NH3).abs() < 1e-9);
        assert!((b1.mass - b1_test.mass - 9.0).abs() < 1e-9);
    }

    #[test]
    fn immonium_ions_report_residue_positions_and_markers() {
        let tables = MassTables::default();
        let mods = vec![ModSite::new(15.994915, Site::Residue(3), "Oxidation")];
        let pep_mass = calculate_mass("AAMK", &mods, MassType::Mono, &tables).unwrap();
        let ctx = context(&tables, "AAMK", &mods);
        let ions = generate_series(&IMM_RULES, pep_mass.residues(), 1, &[], false, &ctx);
        assert_eq!(ions.len(), 4);
        assert_eq!(ions[2].label, "imm(M*)");
        assert_eq!(ions[2].position, 3);
        assert_eq!(ions[3].label, "imm(K)");
        // A immonium at 44.05
        assert!((ions[0].mass - 44.05).abs() < 0.01);
    }

    #[test]
    fn precursor_enumerates_charges_and_losses() {
        let tables = MassTables::default();
        let losses = vec![ResolvedLoss {
            name: "H2O".to_string(),
            mass: MASS_WATER,
        }];
        let ions = precursor_ions(231.1219, 2, 3, &[], &losses, false, &tables);
        let labels: Vec<&str> = ions.iter().map(|ion| ion.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["[M+H][+]", "[M-H2O][+]", "[M+H][2+]", "[M-H2O][2+]"]
        );
        assert!((ions[0].mass - (231.1219 + MASS_PROTON)).abs() < 1e-9);
        assert!((ions[2].mass - (231.1219 / 2.0 + MASS_PROTON)).abs() < 1e-9);
        assert!(ions.iter().all(|ion| ion.position == 3));
    }

    #[test]
    fn radical_precursor_adds_bare_m_ions() {
        let tables = MassTables::default();
        let ions = precursor_ions(231.1219, 1, 3, &[], &[], true, &tables);
        let labels: Vec<&str> = ions.iter().map(|ion| ion.label.as_str()).collect();
        assert_eq!(labels, vec!["[M+H][•+]", "M[•+]"]);
    }

    #[test]
    fn terminal_itraq_tag_emits_the_tag_loss() {
        let tables = MassTables::default();
        let mods = vec![ModSite::new(304.20536, Site::Nterm, "iTRAQ8plex")];
        let ions = precursor_ions(535.3273, 1, 3, &mods, &[], false, &tables);
        let tag_ion = ions.iter().find(|ion| ion.label == "M-iT8[+]").unwrap();
        assert!((tag_ion.mass - (535.3273 - 304.20536 + MASS_PROTON)).abs() < 1e-6);
    }

    #[test]
    fn internal_itraq_tag_does_not() {
        let tables = MassTables::default();
        let mods = vec![ModSite::new(304.20536, Site::Residue(1), "iTRAQ8plex")];
        let ions = precursor_ions(535.3273, 1, 3, &mods, &[], false, &tables);
        assert!(ions.iter().all(|ion| !ion.label.starts_with("M-iT8")));
    }

    #[test]
    fn empty_series_yields_no_ions() {
        let tables = MassTables::default();
        let ctx = context(&tables, "", &[]);
        let ions = generate_series(&B_RULES, &[], 2, &[], true, &ctx);
        assert!(ions.is_empty());
    }
}
