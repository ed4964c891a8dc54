// chemistry module
pub mod chemistry {
    pub mod amino_acid;
    pub mod constants;
    pub mod tables;
}

// data module
pub mod data {
    pub mod ion;
    pub mod peptide;
}

// algorithm module
pub mod algorithm {
    pub mod charge;
    pub mod fragment;
    pub mod generator;
}

pub mod error;
