//! Physical constants used by the analysis jobs.

/// Avogadro constant, 1/mol.
pub const AVOGADRO: f64 = 6.022_140_76e23;

/// Cubic angstroms to cubic centimeters.
pub const ANG3_TO_CM3: f64 = 1.0e-24;

/// Boltzmann constant, kJ/(mol K).
pub const BOLTZMANN_KJ_PER_MOL_K: f64 = 8.314_462_618e-3;

/// Picoseconds to seconds.
pub const PS_TO_S: f64 = 1.0e-12;
