//! Range-driven pack energy requirement.

use crate::cycle::SpeedCycle;
use crate::energy::cycle_energy;
use crate::imports::*;
use crate::motor::MotorMode;
use crate::packsim::ParameterSet;
use crate::params::*;

/// Result of sizing the pack for the design range
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackSizing {
    pub distance_km: f64,
    /// net battery energy for one pass of the cycle, peak mode with regen, $kWh$
    pub cycle_energy_kwh: f64,
    pub efficiency_wh_per_km: f64,
    pub efficiency_mi_per_kwh: f64,
    pub range_km: f64,
    pub range_mi: f64,
    pub useable_capacity_perc: f64,
    pub required_pack_energy_kwh: f64,
}

impl SerdeAPI for PackSizing {}

/// Pack energy needed to cover the vehicle range at the consumption of `cyc`.
///
/// Consumption is `(cycle kWh * 1000 / km + ancillary Wh/km) / efficiency`,
/// and the requirement is that consumption times range divided by the useable
/// share of the pack.
pub fn calculate_battery_pack_size(cyc: &SpeedCycle, params: &ParameterSet) -> CalcResult<PackSizing> {
    let pt = &params.powertrain;
    let distance_km = cyc.dist_km();
    ensure_param!(
        distance_km > 0.0,
        "cycle covers no distance, consumption per km is undefined"
    );
    ensure_param!(
        pt.efficiency > 0.0,
        "powertrain efficiency must be above 0, got {}",
        pt.efficiency
    );
    let useable_perc = params.pack.useable_capacity_perc;
    ensure_param!(
        useable_perc > 0.0,
        "useable capacity must be above 0 %, got {useable_perc}"
    );

    let energy = cycle_energy(cyc, params, MotorMode::Peak, true, pt.regen_capacity_perc)?;
    let cycle_energy_kwh = energy.iter().next_back().copied().unwrap_or_default();
    let efficiency_wh_per_km =
        (cycle_energy_kwh * WH_PER_KWH / distance_km + pt.ancillary_wh_per_km) / pt.efficiency;
    ensure_param!(
        efficiency_wh_per_km > 0.0,
        "cycle returns more energy than it uses ({efficiency_wh_per_km} Wh/km)"
    );
    let range_km = params.vehicle.range_km;
    let required_pack_energy_kwh =
        efficiency_wh_per_km * range_km / (useable_perc / 100.0) / WH_PER_KWH;
    log::debug!(
        "{}",
        format_dbg!((efficiency_wh_per_km, required_pack_energy_kwh))
    );

    Ok(PackSizing {
        distance_km,
        cycle_energy_kwh,
        efficiency_wh_per_km,
        efficiency_mi_per_kwh: WH_PER_KWH / efficiency_wh_per_km / KM_PER_MI,
        range_km,
        range_mi: range_km / KM_PER_MI,
        useable_capacity_perc: useable_perc,
        required_pack_energy_kwh,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizing_relations() {
        let params = ParameterSet::default();
        let cyc = SpeedCycle::from_kmh(&[0.0, 20.0, 40.0, 50.0, 50.0, 50.0, 30.0, 10.0, 0.0]).unwrap();
        let sizing = calculate_battery_pack_size(&cyc, &params).unwrap();
        let expected_eff = (sizing.cycle_energy_kwh * 1000.0 / sizing.distance_km
            + params.powertrain.ancillary_wh_per_km)
            / params.powertrain.efficiency;
        assert!(almost_eq(sizing.efficiency_wh_per_km, expected_eff, None));
        assert!(almost_eq(
            sizing.required_pack_energy_kwh,
            expected_eff * 400.0 / 0.95 / 1000.0,
            None
        ));
        assert!(almost_eq(
            sizing.efficiency_mi_per_kwh * sizing.efficiency_wh_per_km,
            1000.0 / 1.609,
            None
        ));
        assert!(almost_eq(sizing.range_mi, 400.0 / 1.609, None));
    }

    #[test]
    fn test_standing_cycle_is_degenerate() {
        let cyc = SpeedCycle::from_kmh(&[0.0, 0.0, 0.0]).unwrap();
        assert!(matches!(
            calculate_battery_pack_size(&cyc, &ParameterSet::default()),
            Err(CalcError::DegenerateParameter(_))
        ));
    }

    #[test]
    fn test_zero_useable_capacity() {
        let mut params = ParameterSet::default();
        params.pack.useable_capacity_perc = 0.0;
        let cyc = SpeedCycle::from_kmh(&[0.0, 30.0, 30.0]).unwrap();
        assert!(matches!(
            calculate_battery_pack_size(&cyc, &params),
            Err(CalcError::DegenerateParameter(_))
        ));
    }
}
