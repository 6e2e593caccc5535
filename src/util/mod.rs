//! Utility module
//!
//! Unit conversions used by the decoder.

/// Converts a power level in dBm to watts
pub fn dbm_to_watts(dbm: i32) -> f64 {
    10f64.powf(f64::from(dbm) / 10.0) / 1000.0
}
