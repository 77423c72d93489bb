//! Pack current from a resistive source model, and the state of charge it implies.

use crate::imports::*;
use crate::pack::VoltageArchitecture;
use crate::params::*;

/// Smaller root of `R i² - V i + P·1000 = 0`, $A$.
///
/// Written as `2 P·1000 / (V + √(V² - 4 R P·1000))`, which is the same root
/// as `(V - √(..)) / 2R` but stays finite for `R = 0` and does not lose
/// precision when `4RP` is small next to `V²`.  A negative discriminant means
/// the pack cannot deliver `power_kw`.
pub fn solve_current(index: usize, power_kw: f64, voltage: f64, resistance_ohm: f64) -> CalcResult<f64> {
    ensure_param!(voltage > 0.0, "pack voltage must be positive, got {voltage}");
    ensure_param!(
        resistance_ohm >= 0.0,
        "pack resistance cannot be negative, got {resistance_ohm} ohm"
    );
    let power_w = power_kw * W_PER_KW;
    let discriminant = voltage.powi(2) - 4.0 * resistance_ohm * power_w;
    // `!(x >= 0)` also rejects NaN
    if !(discriminant >= 0.0) || !power_kw.is_finite() {
        return Err(CalcError::InfeasibleElectricalState {
            index,
            power_kw,
            voltage,
            resistance_ohm,
        });
    }
    Ok(2.0 * power_w / (voltage + discriminant.sqrt()))
}

/// [solve_current] for every sample of a motor power trace, $A$
pub fn pack_current(
    motor_power_kw: &Array1<f64>,
    arch: VoltageArchitecture,
    pack_resistance_mohm: f64,
) -> CalcResult<Array1<f64>> {
    let voltage = arch.volts();
    let resistance_ohm = pack_resistance_mohm / MOHM_PER_OHM;
    motor_power_kw
        .iter()
        .enumerate()
        .map(|(i, p)| solve_current(i, *p, voltage, resistance_ohm))
        .collect::<CalcResult<Vec<f64>>>()
        .map(Array1::from_vec)
}

/// State of charge trace, %.
///
/// `soc[i] = min(soc[i-1], 100) - 100 i[i] / capacity_ah / 3600` starting
/// from a full pack.  Values above 100 after regen are only clipped when
/// read back for the next sample, and nothing stops the trace going below 0.
///
/// `soc[0] <= 100` holds only while the first sample draws current.  A cycle
/// that starts by regenerating (e.g. rolling downhill) reports `soc[0]` above
/// 100, since the formula credits that charge before any clip applies.
pub fn soc(current_a: &Array1<f64>, pack_energy_kwh: f64, voltage: f64) -> CalcResult<Array1<f64>> {
    ensure_param!(
        pack_energy_kwh > 0.0,
        "pack energy must be positive, got {pack_energy_kwh} kWh"
    );
    ensure_param!(voltage > 0.0, "pack voltage must be positive, got {voltage}");
    let capacity_ah = pack_energy_kwh * WH_PER_KWH / voltage;
    let soc: Array1<f64> = current_a
        .iter()
        .scan(SOC_FULL_PERC, |prev, i| {
            let next = prev.min(SOC_FULL_PERC)
                - SOC_FULL_PERC * i / capacity_ah / (SECS_PER_HOUR / DT_S);
            *prev = next;
            Some(next)
        })
        .collect();
    if let Some(first_empty) = soc.iter().position(|s| *s < 0.0) {
        log::warn!(
            "state of charge goes negative at {first_empty} s; \
            the {pack_energy_kwh} kWh pack cannot finish the cycle"
        );
    }
    Ok(soc)
}
