//! Acceleration from consecutive speed samples.

use crate::cycle::SpeedCycle;
use crate::imports::*;
use crate::params::DT_S;

/// Backward difference of speed per sample \[m/s²\].
///
/// The speed before the first sample is taken as 0, so `accel[0]` equals the
/// first speed.  A cycle that starts rolling therefore begins with a spike.
pub fn acceleration(cyc: &SpeedCycle) -> CalcResult<Array1<f64>> {
    cyc.init_checks()?;
    Ok(cyc
        .mps
        .iter()
        .scan(0.0, |prev, &v| {
            let accel = (v - *prev) / DT_S;
            *prev = v;
            Some(accel)
        })
        .collect())
}
