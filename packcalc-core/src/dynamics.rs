//! Longitudinal road-load model: tractive force and torque per sample.

use crate::cycle::SpeedCycle;
use crate::imports::*;
use crate::kinematics::acceleration;
use crate::params::*;
use crate::vehicle::{EnvironmentParameters, VehicleParameters};

/// Force and torque traces, index-aligned with the cycle
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceTrace {
    /// net tractive force, $N$
    pub force_n: Array1<f64>,
    /// $N \cdot m$
    pub wheel_torque_nm: Array1<f64>,
    /// wheel torque over the overall drive ratio, $N \cdot m$
    pub motor_torque_nm: Array1<f64>,
}

/// Resistance per unit mass from rolling and grade, $\frac{m}{s^2}$
fn road_accel_mps2(veh: &VehicleParameters, env: &EnvironmentParameters) -> f64 {
    let alpha = env.road_slope_rad();
    env.a_grav_mps2 * veh.rolling_resistance_coef * alpha.cos() + env.a_grav_mps2 * alpha.sin()
}

/// Aerodynamic drag at `v_mps`, $N$
fn aero_force_n(v_mps: f64, veh: &VehicleParameters, env: &EnvironmentParameters) -> f64 {
    0.5 * env.air_density_kg_per_m3 * veh.drag_coef * veh.frontal_area_m2 * v_mps.powi(2)
}

/// `F = m (a + g Crr cos α + g sin α) + ½ ρ Cd A v²` for every sample, with
/// wheel and motor torque derived from it.
pub fn total_forces(
    cyc: &SpeedCycle,
    veh: &VehicleParameters,
    env: &EnvironmentParameters,
) -> CalcResult<ForceTrace> {
    let accel = acceleration(cyc)?;
    let wheel_radius_m = veh.wheel_radius_m()?;
    let drive_ratio = veh.drive_ratio();
    ensure_param!(
        drive_ratio > 0.0,
        "drive ratio must be positive, got {drive_ratio}"
    );
    let road_accel = road_accel_mps2(veh, env);

    let force_n: Array1<f64> = cyc
        .mps
        .iter()
        .zip(accel.iter())
        .map(|(v, a)| veh.mass_kg * (a + road_accel) + aero_force_n(*v, veh, env))
        .collect();
    let wheel_torque_nm = &force_n * wheel_radius_m;
    let motor_torque_nm = &wheel_torque_nm / drive_ratio;
    log::debug!("{}", format_dbg!(force_n.len()));

    Ok(ForceTrace {
        force_n,
        wheel_torque_nm,
        motor_torque_nm,
    })
}

/// Road-load energy per sample split by cause, $Wh$.  Each component is its
/// force times speed held for one sample.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadLoadBreakdown {
    pub inertial_wh: Array1<f64>,
    /// rolling resistance plus grade
    pub road_wh: Array1<f64>,
    pub aero_wh: Array1<f64>,
}

impl SerdeAPI for RoadLoadBreakdown {}

impl RoadLoadBreakdown {
    pub fn new(
        cyc: &SpeedCycle,
        veh: &VehicleParameters,
        env: &EnvironmentParameters,
    ) -> CalcResult<Self> {
        let accel = acceleration(cyc)?;
        let road_accel = road_accel_mps2(veh, env);
        let to_wh = DT_S / SECS_PER_HOUR;
        Ok(Self {
            inertial_wh: ndarray::Zip::from(&accel)
                .and(&cyc.mps)
                .map_collect(|a, v| veh.mass_kg * a * v * to_wh),
            road_wh: cyc.mps.mapv(|v| veh.mass_kg * road_accel * v * to_wh),
            aero_wh: cyc.mps.mapv(|v| aero_force_n(v, veh, env) * v * to_wh),
        })
    }

    pub fn total_inertial_wh(&self) -> f64 {
        self.inertial_wh.sum()
    }

    pub fn total_road_wh(&self) -> f64 {
        self.road_wh.sum()
    }

    pub fn total_aero_wh(&self) -> f64 {
        self.aero_wh.sum()
    }

    /// Sum over all three components, $Wh$
    pub fn total_wh(&self) -> f64 {
        self.total_inertial_wh() + self.total_road_wh() + self.total_aero_wh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn golden_vehicle() -> (VehicleParameters, EnvironmentParameters) {
        let veh = VehicleParameters {
            mass_kg: 1_500.0,
            frontal_area_m2: 2.2,
            drag_coef: 0.3,
            rolling_resistance_coef: 0.01,
            tyre_code: "200/50R16".into(),
            diff_ratio: 2.0,
            gear_ratio: 1.5,
            range_km: 300.0,
        };
        let env = EnvironmentParameters {
            air_density_kg_per_m3: 1.225,
            road_slope_deg: 0.0,
            a_grav_mps2: 9.81,
        };
        (veh, env)
    }

    #[test]
    fn test_golden_forces() {
        let (veh, env) = golden_vehicle();
        let cyc = SpeedCycle::from_kmh_str("0,10,20,20,10,0").unwrap();
        let trace = total_forces(&cyc, &veh, &env).unwrap();
        let expected = [
            147.15,
            4316.935879629629,
            4326.293518518519,
            159.62685185185185,
            -4016.3974537037034,
            -4019.5166666666664,
        ];
        assert!(almost_eq_arrs(
            trace.force_n.as_slice().unwrap(),
            &expected,
            Some(1e-9)
        ));
        // radius 0.033 m, drive ratio 3
        assert!(almost_eq(trace.wheel_torque_nm[0], 147.15 * 0.033, Some(1e-9)));
        assert!(almost_eq(
            trace.motor_torque_nm[0],
            147.15 * 0.033 / 3.0,
            Some(1e-9)
        ));
    }

    #[test]
    fn test_constant_speed_is_road_load_only() {
        let (veh, mut env) = golden_vehicle();
        env.road_slope_deg = 3.0;
        let v = 25.0;
        let cyc = SpeedCycle::new("cruise", vec![v; 10]).unwrap();
        let trace = total_forces(&cyc, &veh, &env).unwrap();
        let alpha = 3.0_f64.to_radians();
        let expected = veh.mass_kg * 9.81 * (0.01 * alpha.cos() + alpha.sin())
            + 0.5 * 1.225 * 0.3 * 2.2 * v * v;
        // first sample carries the step up from standstill
        for f in trace.force_n.iter().skip(1) {
            assert!(almost_eq(*f, expected, Some(1e-9)));
        }
    }

    #[test]
    fn test_zero_ratio_is_degenerate() {
        let (mut veh, env) = golden_vehicle();
        veh.diff_ratio = 0.0;
        let cyc = SpeedCycle::from_kmh(&[10.0]).unwrap();
        assert!(matches!(
            total_forces(&cyc, &veh, &env),
            Err(CalcError::DegenerateParameter(_))
        ));
    }

    #[test]
    fn test_breakdown_adds_up_to_tractive_energy() {
        let (veh, env) = golden_vehicle();
        let cyc = SpeedCycle::from_kmh_str("0,10,20,20,10,0").unwrap();
        let trace = total_forces(&cyc, &veh, &env).unwrap();
        let breakdown = RoadLoadBreakdown::new(&cyc, &veh, &env).unwrap();
        let tractive_wh: f64 = trace
            .force_n
            .iter()
            .zip(cyc.mps.iter())
            .map(|(f, v)| f * v / 3600.0)
            .sum();
        assert!(almost_eq(breakdown.total_wh(), tractive_wh, Some(1e-9)));
        assert_eq!(breakdown.aero_wh[0], 0.0);
        assert!(breakdown.total_inertial_wh() > 0.0);
    }
}
