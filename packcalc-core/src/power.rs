//! Electrical power demand at the wheels plus ancillaries.

use crate::cycle::SpeedCycle;
use crate::dynamics::{total_forces, ForceTrace};
use crate::imports::*;
use crate::motor::PowertrainParameters;
use crate::params::*;
use crate::vehicle::{EnvironmentParameters, VehicleParameters};

/// Ancillary load spread evenly over the cycle, $kW$ per sample.
///
/// This is `(Wh/km / 1000) * (distance_km / samples)`, i.e. the ancillary
/// energy share of each sample expressed in the same per-sample units as the
/// traction term.
pub fn ancillary_kw(cyc: &SpeedCycle, pt: &PowertrainParameters) -> CalcResult<f64> {
    cyc.init_checks()?;
    Ok(pt.ancillary_wh_per_km / WH_PER_KWH * (cyc.dist_km() / cyc.len() as f64))
}

/// `P = F v / 1000 + ancillary` per sample, $kW$
pub fn power_demand(
    cyc: &SpeedCycle,
    forces: &ForceTrace,
    pt: &PowertrainParameters,
) -> CalcResult<Array1<f64>> {
    ensure_param!(
        forces.force_n.len() == cyc.len(),
        "force trace has {} samples but the cycle has {}",
        forces.force_n.len(),
        cyc.len()
    );
    let anc_kw = ancillary_kw(cyc, pt)?;
    Ok(&forces.force_n * &cyc.mps / W_PER_KW + anc_kw)
}

/// Forces then power demand for the cycle, $kW$
pub fn total_cycle_power(
    cyc: &SpeedCycle,
    veh: &VehicleParameters,
    env: &EnvironmentParameters,
    pt: &PowertrainParameters,
) -> CalcResult<Array1<f64>> {
    let forces = total_forces(cyc, veh, env)?;
    power_demand(cyc, &forces, pt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_is_force_times_speed_plus_ancillary() {
        let cyc = SpeedCycle::from_kmh(&[36.0, 72.0]).unwrap();
        let forces = ForceTrace {
            force_n: array![1_000.0, -500.0],
            ..Default::default()
        };
        let mut pt = PowertrainParameters::default();
        pt.ancillary_wh_per_km = 0.0;
        let p = power_demand(&cyc, &forces, &pt).unwrap();
        assert!(almost_eq(p[0], 10.0, None));
        assert!(almost_eq(p[1], -10.0, None));

        // 30 m over 2 samples, 10 Wh/km
        pt.ancillary_wh_per_km = 10.0;
        let anc = ancillary_kw(&cyc, &pt).unwrap();
        assert!(almost_eq(anc, 0.01 * 0.015, None));
        let p = power_demand(&cyc, &forces, &pt).unwrap();
        assert!(almost_eq(p[0], 10.0 + anc, None));
    }

    #[test]
    fn test_golden_cycle_power() {
        let veh = VehicleParameters {
            mass_kg: 1_500.0,
            frontal_area_m2: 2.2,
            drag_coef: 0.3,
            rolling_resistance_coef: 0.01,
            ..Default::default()
        };
        let env = EnvironmentParameters {
            air_density_kg_per_m3: 1.225,
            ..Default::default()
        };
        let mut pt = PowertrainParameters::default();
        pt.ancillary_wh_per_km = 0.0;
        let cyc = SpeedCycle::from_kmh_str("0,10,20,20,10,0").unwrap();
        let p = total_cycle_power(&cyc, &veh, &env, &pt).unwrap();
        assert_eq!(p[0], 0.0);
        assert!(almost_eq(p[1], 4316.935879629629 * (10.0 / 3.6) / 1000.0, Some(1e-9)));
        assert_eq!(p[5], 0.0);
    }

    #[test]
    fn test_mismatched_trace() {
        let cyc = SpeedCycle::from_kmh(&[10.0, 10.0]).unwrap();
        let forces = ForceTrace {
            force_n: array![1.0],
            ..Default::default()
        };
        assert!(power_demand(&cyc, &forces, &PowertrainParameters::default()).is_err());
    }
}
