//! Cumulative battery energy over a cycle with optional regen credit.

use crate::cycle::SpeedCycle;
use crate::imports::*;
use crate::motor::{motor_power_actual, MotorMode};
use crate::packsim::ParameterSet;
use crate::params::*;
use crate::power::total_cycle_power;

/// Running sum of motor power in $kWh$.
///
/// Traction always counts.  Braking counts only when regen is on with a
/// non-zero capacity, and then only `regen_perc` percent of it.
pub fn cumulative_energy(motor_power_kw: &Array1<f64>, regen_on: bool, regen_perc: f64) -> Array1<f64> {
    let regen_active = regen_on && regen_perc != 0.0;
    motor_power_kw
        .iter()
        .scan(0.0, |energy_kwh, &p| {
            let credited = if p > 0.0 {
                p
            } else if regen_active {
                p * regen_perc / 100.0
            } else {
                0.0
            };
            *energy_kwh += credited * DT_S / SECS_PER_HOUR;
            Some(*energy_kwh)
        })
        .collect()
}

/// Stages 2 to 5 for `params` followed by [cumulative_energy], $kWh$
pub fn cycle_energy(
    cyc: &SpeedCycle,
    params: &ParameterSet,
    mode: MotorMode,
    regen_on: bool,
    regen_perc: f64,
) -> CalcResult<Array1<f64>> {
    let demand = total_cycle_power(cyc, &params.vehicle, &params.environment, &params.powertrain)?;
    let motor_power = motor_power_actual(&demand, &params.powertrain, mode)?;
    Ok(cumulative_energy(&motor_power, regen_on, regen_perc))
}
