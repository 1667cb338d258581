//! Physical constants for the ED002 stack and the CO2 capture chemistry.

/// Active area of a single membrane in m^2.
pub const MEMBRANE_AREA: f64 = 0.0036;

/// Faraday constant in C mol^-1.
pub const FARADAY_CONSTANT: f64 = 96485.0;

/// Density of CO2 gas in g dm^-3.
pub const CO2_DENSITY: f64 = 1.815;

/// Number of membrane pairs in the stack.
pub const MEMBRANE_PAIRS: f64 = 10.0;

/// Molar mass of CO2 in g mol^-1.
pub const CO2_MOLAR_MASS: f64 = 44.01;
