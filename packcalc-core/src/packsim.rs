//! Module containing the parameter snapshot and the calculation that walks a
//! speed cycle through every stage for it.

use crate::cycle::{CycleStats, SpeedCycle};
use crate::dynamics::{total_forces, RoadLoadBreakdown};
use crate::electrical::{pack_current, soc};
use crate::energy::cumulative_energy;
use crate::imports::*;
use crate::kinematics::acceleration;
use crate::motor::{motor_power_actual, MotorMode, PowertrainParameters};
use crate::pack::{PackParameters, PackSpec};
use crate::power::power_demand;
use crate::sizing::{calculate_battery_pack_size, PackSizing};
use crate::vehicle::{EnvironmentParameters, VehicleParameters};

/// Every input of the calculation besides the cycle itself
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub vehicle: VehicleParameters,
    #[serde(default)]
    pub environment: EnvironmentParameters,
    pub powertrain: PowertrainParameters,
    pub pack: PackParameters,
}

impl SerdeAPI for ParameterSet {
    fn init(&mut self) -> anyhow::Result<()> {
        self.validate_params()?;
        Ok(())
    }
}

impl ParameterSet {
    pub fn validate_params(&self) -> CalcResult<()> {
        self.vehicle.init_checks()?;
        self.environment.init_checks()?;
        self.powertrain.init_checks()?;
        self.pack.init_checks()?;
        Ok(())
    }
}

/// Pack current and the state of charge it implies, $A$ and %
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricalSeries {
    pub current_a: Array1<f64>,
    pub soc_perc: Array1<f64>,
}

impl ElectricalSeries {
    pub fn new(motor_power_kw: &Array1<f64>, pack: &PackParameters) -> CalcResult<Self> {
        let current_a = pack_current(
            motor_power_kw,
            pack.voltage_architecture,
            pack.pack_resistance_mohm()?,
        )?;
        let soc_perc = soc(&current_a, pack.pack_energy_kwh, pack.voltage())?;
        Ok(Self {
            current_a,
            soc_perc,
        })
    }

    pub fn len(&self) -> usize {
        self.current_a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current_a.is_empty()
    }
}

/// All per-sample outputs of one walk, index-aligned with the cycle.
///
/// Only the electrical traces depend on the pack delivering every sample, so
/// they are kept as their own result next to the mechanical and energy traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    pub mode: MotorMode,
    pub time_s: Array1<f64>,
    pub speed_mps: Array1<f64>,
    pub accel_mps2: Array1<f64>,
    pub force_n: Array1<f64>,
    pub wheel_torque_nm: Array1<f64>,
    pub motor_torque_nm: Array1<f64>,
    pub power_demand_kw: Array1<f64>,
    pub motor_power_kw: Array1<f64>,
    pub electrical: CalcResult<ElectricalSeries>,
    /// with regen credited per the powertrain settings, $kWh$
    pub cumulative_energy_kwh: Array1<f64>,
    /// braking never credited, $kWh$
    pub cumulative_energy_no_regen_kwh: Array1<f64>,
}

impl SerdeAPI for DerivedSeries {
    fn init(&mut self) -> anyhow::Result<()> {
        self.check_lengths()?;
        Ok(())
    }
}

impl DerivedSeries {
    pub fn len(&self) -> usize {
        self.time_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_s.is_empty()
    }

    /// Fails unless every trace has one value per time sample
    pub fn check_lengths(&self) -> CalcResult<()> {
        let mut lens = vec![
            ("speed_mps", self.speed_mps.len()),
            ("accel_mps2", self.accel_mps2.len()),
            ("force_n", self.force_n.len()),
            ("wheel_torque_nm", self.wheel_torque_nm.len()),
            ("motor_torque_nm", self.motor_torque_nm.len()),
            ("power_demand_kw", self.power_demand_kw.len()),
            ("motor_power_kw", self.motor_power_kw.len()),
            ("cumulative_energy_kwh", self.cumulative_energy_kwh.len()),
            (
                "cumulative_energy_no_regen_kwh",
                self.cumulative_energy_no_regen_kwh.len(),
            ),
        ];
        if let Ok(elec) = &self.electrical {
            lens.push(("current_a", elec.current_a.len()));
            lens.push(("soc_perc", elec.soc_perc.len()));
        }
        for (name, len) in lens {
            if len != self.len() {
                return Err(CalcError::Validation(format!(
                    "{name} has {len} samples, time_s has {}",
                    self.len()
                )));
            }
        }
        Ok(())
    }
}

/// Scalars that need the electrical traces
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricalSummary {
    pub final_soc_perc: f64,
    pub min_soc_perc: f64,
    pub peak_current_a: f64,
}

impl ElectricalSummary {
    pub fn new(elec: &ElectricalSeries) -> Self {
        Self {
            final_soc_perc: elec.soc_perc.iter().next_back().copied().unwrap_or_default(),
            min_soc_perc: arrmin(elec.soc_perc.as_slice().unwrap_or_default()),
            peak_current_a: arrmax(elec.current_a.as_slice().unwrap_or_default()),
        }
    }
}

/// Scalar results handed to reports.  Sizing, the pack specification and the
/// electrical scalars are derived independently and each may fail on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub cycle_name: String,
    pub mode: MotorMode,
    pub cycle_stats: CycleStats,
    pub sizing: CalcResult<PackSizing>,
    pub pack_spec: CalcResult<PackSpec>,
    pub electrical: CalcResult<ElectricalSummary>,
    pub final_energy_kwh: f64,
    pub peak_motor_power_kw: f64,
    pub inertial_energy_wh: f64,
    pub road_energy_wh: f64,
    pub aero_energy_wh: f64,
}

impl SerdeAPI for Summary {}

/// One cycle and one parameter snapshot.  Construction validates the
/// parameters; every method then recomputes from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackSim {
    pub cyc: SpeedCycle,
    pub params: ParameterSet,
}

impl SerdeAPI for PackSim {
    fn init(&mut self) -> anyhow::Result<()> {
        self.cyc.init_checks()?;
        self.params.validate_params()?;
        Ok(())
    }
}

impl PackSim {
    pub fn new(cyc: SpeedCycle, params: ParameterSet) -> CalcResult<Self> {
        cyc.init_checks()?;
        params.validate_params()?;
        Ok(Self { cyc, params })
    }

    /// Runs kinematics through energy for `mode`.  A pack that cannot deliver
    /// a sample only fails [DerivedSeries::electrical].
    pub fn walk(&self, mode: MotorMode) -> CalcResult<DerivedSeries> {
        let ParameterSet {
            vehicle,
            environment,
            powertrain,
            pack,
        } = &self.params;
        log::debug!(
            "walking {:?} ({} s) in {mode} mode",
            self.cyc.name,
            self.cyc.len()
        );

        let forces = total_forces(&self.cyc, vehicle, environment)?;
        let power_demand_kw = power_demand(&self.cyc, &forces, powertrain)?;
        let motor_power_kw = motor_power_actual(&power_demand_kw, powertrain, mode)?;
        let electrical = ElectricalSeries::new(&motor_power_kw, pack);
        if let Err(err) = &electrical {
            log::warn!("no current or state of charge for {:?}: {err}", self.cyc.name);
        }
        let cumulative_energy_kwh = cumulative_energy(
            &motor_power_kw,
            powertrain.regen_on,
            powertrain.regen_capacity_perc,
        );
        let cumulative_energy_no_regen_kwh = cumulative_energy(&motor_power_kw, false, 0.0);

        Ok(DerivedSeries {
            mode,
            time_s: self.cyc.time_s(),
            speed_mps: self.cyc.mps.clone(),
            accel_mps2: acceleration(&self.cyc)?,
            force_n: forces.force_n,
            wheel_torque_nm: forces.wheel_torque_nm,
            motor_torque_nm: forces.motor_torque_nm,
            power_demand_kw,
            motor_power_kw,
            electrical,
            cumulative_energy_kwh,
            cumulative_energy_no_regen_kwh,
        })
    }

    pub fn pack_spec(&self) -> CalcResult<PackSpec> {
        PackSpec::new(&self.params.pack)
    }

    pub fn pack_sizing(&self) -> CalcResult<PackSizing> {
        calculate_battery_pack_size(&self.cyc, &self.params)
    }

    pub fn cycle_stats(&self) -> CalcResult<CycleStats> {
        CycleStats::new(&self.cyc)
    }

    pub fn road_load_breakdown(&self) -> CalcResult<RoadLoadBreakdown> {
        RoadLoadBreakdown::new(&self.cyc, &self.params.vehicle, &self.params.environment)
    }

    /// Walks the cycle and gathers every scalar result.  Fails only when the
    /// mechanical walk does; sizing, pack spec and electrical failures are
    /// kept in their own fields.
    pub fn summary(&self, mode: MotorMode) -> CalcResult<(DerivedSeries, Summary)> {
        let series = self.walk(mode)?;
        let breakdown = self.road_load_breakdown()?;
        let summary = Summary {
            cycle_name: self.cyc.name.clone(),
            mode,
            cycle_stats: self.cycle_stats()?,
            sizing: self.pack_sizing(),
            pack_spec: self.pack_spec(),
            electrical: series
                .electrical
                .as_ref()
                .map(ElectricalSummary::new)
                .map_err(Clone::clone),
            final_energy_kwh: series
                .cumulative_energy_kwh
                .iter()
                .next_back()
                .copied()
                .unwrap_or_default(),
            peak_motor_power_kw: arrmax(series.motor_power_kw.as_slice().unwrap_or_default()),
            inertial_energy_wh: breakdown.total_inertial_wh(),
            road_energy_wh: breakdown.total_road_wh(),
            aero_energy_wh: breakdown.total_aero_wh(),
        };
        Ok((series, summary))
    }
}
