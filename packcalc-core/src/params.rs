//! Module containing physical constants and unit conversions.

/// Unit conversions that should NEVER change
pub const KMH_PER_MPS: f64 = 3.6;
pub const KM_PER_MI: f64 = 1.609;
pub const M_PER_KM: f64 = 1_000.0;
pub const W_PER_KW: f64 = 1_000.0;
pub const WH_PER_KWH: f64 = 1_000.0;
pub const MOHM_PER_OHM: f64 = 1_000.0;
pub const SECS_PER_HOUR: f64 = 3_600.0;

/// Gravitational acceleration used by the road-load model, $\frac{m}{s^2}$
pub const GRAVITY_MPS2: f64 = 9.81;
/// Sea level air density at roughly 20C, $\frac{kg}{m^3}$
pub const AIR_DENSITY_KG_PER_M3: f64 = 1.2041;

/// Cycle sample interval [s]
pub const DT_S: f64 = 1.0;

/// State of charge of a full pack [%]
pub const SOC_FULL_PERC: f64 = 100.0;
