// Fixed monoisotopic masses of the small molecules used in fragment mass fixing
pub const MASS_PROTON: f64 = 1.007276466879; // Unified atomic mass unit
pub const MASS_WATER: f64 = 18.01056468403; // Unified atomic mass unit
pub const MASS_CO: f64 = 27.99491461957; // Unified atomic mass unit
pub const MASS_CO2: f64 = 43.989830; // Unified atomic mass unit
pub const MASS_NH3: f64 = 17.02654910112; // Unified atomic mass unit
pub const MASS_NITROGEN: f64 = 14.003074; // Unified atomic mass unit

// Quantitative labeling
pub const MASS_ITRAQ8_TAG: f64 = 304.20536; // iTRAQ 8-plex reporter tag
pub const MASS_CARBAMIDOMETHYL: f64 = 57.021464; // Carbamidomethylation of cysteine
