//! Module containing the cell template, the pack parameters and the pack
//! electrical/physical specification derived from them.

use crate::imports::*;
use crate::params::*;

/// Nominal pack voltage class
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoltageArchitecture {
    #[serde(rename = "400V")]
    V400,
    #[default]
    #[serde(rename = "800V")]
    V800,
}

impl VoltageArchitecture {
    pub fn volts(&self) -> f64 {
        match self {
            Self::V400 => 400.0,
            Self::V800 => 800.0,
        }
    }
}

/// Outer dimensions of a cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum CellGeometry {
    Cylindrical {
        diameter_mm: f64,
        height_mm: f64,
    },
    Prismatic {
        width_mm: f64,
        height_mm: f64,
        depth_mm: f64,
    },
    Pouch {
        width_mm: f64,
        height_mm: f64,
        depth_mm: f64,
    },
}

impl CellGeometry {
    /// $cm^3$
    pub fn volume_cm3(&self) -> f64 {
        match *self {
            Self::Cylindrical {
                diameter_mm,
                height_mm,
            } => std::f64::consts::PI * diameter_mm.powi(2) * height_mm / 4.0 * 1e-3,
            Self::Prismatic {
                width_mm,
                height_mm,
                depth_mm,
            }
            | Self::Pouch {
                width_mm,
                height_mm,
                depth_mm,
            } => width_mm * height_mm * depth_mm * 1e-3,
        }
    }
}

/// One cell as listed in a cell library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CellTemplate {
    pub name: String,
    #[validate(range(min = 0))]
    pub nominal_voltage: f64,
    #[validate(range(min = 0))]
    pub max_voltage: f64,
    #[validate(range(min = 0))]
    pub cutoff_voltage: f64,
    /// $Ah$
    #[validate(range(min = 0))]
    pub capacity_ah: f64,
    /// $g$
    #[validate(range(min = 0))]
    pub mass_g: f64,
    pub geometry: CellGeometry,
    /// $m\Omega$
    #[validate(range(min = 0))]
    pub tab_resistance_mohm: f64,
    /// $m\Omega$
    #[validate(range(min = 0))]
    pub internal_resistance_mohm: f64,
}

impl Default for CellTemplate {
    fn default() -> Self {
        Self {
            name: "generic 21700".into(),
            nominal_voltage: 3.6,
            max_voltage: 4.2,
            cutoff_voltage: 2.5,
            capacity_ah: 4.8,
            mass_g: 68.0,
            geometry: CellGeometry::Cylindrical {
                diameter_mm: 21.0,
                height_mm: 70.0,
            },
            tab_resistance_mohm: 0.003,
            internal_resistance_mohm: 14.0,
        }
    }
}

impl SerdeAPI for CellTemplate {
    fn init(&mut self) -> anyhow::Result<()> {
        self.init_checks()?;
        Ok(())
    }
}

impl CellTemplate {
    pub fn init_checks(&self) -> CalcResult<()> {
        self.validate()?;
        ensure_param!(
            self.nominal_voltage > 0.0,
            "cell {:?} has no nominal voltage",
            self.name
        );
        ensure_param!(
            self.capacity_ah > 0.0,
            "cell {:?} has no capacity",
            self.name
        );
        ensure_param!(self.mass_g > 0.0, "cell {:?} has no mass", self.name);
        if !(self.cutoff_voltage <= self.nominal_voltage && self.nominal_voltage <= self.max_voltage)
        {
            return Err(CalcError::Validation(format!(
                "cell {:?}: expected cutoff <= nominal <= max voltage",
                self.name
            )));
        }
        Ok(())
    }

    /// $Wh$
    pub fn energy_wh(&self) -> f64 {
        self.capacity_ah * self.nominal_voltage
    }
}

/// Requested pack plus the cell it is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PackParameters {
    /// Requested energy, $kWh$
    #[validate(range(min = 0))]
    pub pack_energy_kwh: f64,
    pub voltage_architecture: VoltageArchitecture,
    #[validate]
    pub cell: CellTemplate,
    /// Resistance of busbars, contactors and fuses, $m\Omega$
    #[validate(range(min = 0))]
    pub ee_resistance_mohm: f64,
    /// C-rate the current and power figures are quoted at
    #[serde(default = "default_c_rate")]
    #[validate(range(min = 0))]
    pub c_rate: f64,
    /// Share of the pack energy the range may draw on, %
    #[serde(default = "default_useable_capacity_perc")]
    #[validate(range(min = 0, max = 100))]
    pub useable_capacity_perc: f64,
}

fn default_c_rate() -> f64 {
    10.0
}

fn default_useable_capacity_perc() -> f64 {
    95.0
}

impl Default for PackParameters {
    fn default() -> Self {
        Self {
            pack_energy_kwh: 85.0,
            voltage_architecture: VoltageArchitecture::V800,
            cell: CellTemplate::default(),
            ee_resistance_mohm: 5.0,
            c_rate: default_c_rate(),
            useable_capacity_perc: default_useable_capacity_perc(),
        }
    }
}

impl SerdeAPI for PackParameters {
    fn init(&mut self) -> anyhow::Result<()> {
        self.init_checks()?;
        Ok(())
    }
}

impl PackParameters {
    pub fn init_checks(&self) -> CalcResult<()> {
        self.validate()?;
        self.cell.init_checks()?;
        ensure_param!(
            self.pack_energy_kwh > 0.0,
            "pack energy must be positive, got {} kWh",
            self.pack_energy_kwh
        );
        Ok(())
    }

    pub fn voltage(&self) -> f64 {
        self.voltage_architecture.volts()
    }

    /// Cells in series and strings in parallel, both rounded up
    pub fn pack_sp(&self) -> CalcResult<(u32, u32)> {
        ensure_param!(
            self.cell.nominal_voltage > 0.0,
            "cell nominal voltage must be positive"
        );
        ensure_param!(
            self.cell.capacity_ah > 0.0,
            "cell capacity must be positive"
        );
        ensure_param!(
            self.pack_energy_kwh > 0.0,
            "pack energy must be positive"
        );
        let series = cell_count(
            self.voltage() / self.cell.nominal_voltage,
            "cells in series",
        )?;
        let parallel = cell_count(
            self.pack_energy_kwh * WH_PER_KWH / self.voltage() / self.cell.capacity_ah,
            "strings in parallel",
        )?;
        Ok((series, parallel))
    }

    /// `(tab + internal) * S / P + EE`, $m\Omega$
    pub fn pack_resistance_mohm(&self) -> CalcResult<f64> {
        let (series, parallel) = self.pack_sp()?;
        Ok(
            (self.cell.tab_resistance_mohm + self.cell.internal_resistance_mohm) * series as f64
                / parallel as f64
                + self.ee_resistance_mohm,
        )
    }
}

/// Rounds `count` up, failing if it does not fit a `u32`
fn cell_count(count: f64, what: &str) -> CalcResult<u32> {
    let count = count.ceil();
    ensure_param!(
        count.is_finite() && count <= u32::MAX as f64,
        "{what} out of range: {count}"
    );
    Ok(count as u32)
}

/// Everything the pack report shows for a cell choice
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackSpec {
    pub pack_voltage: f64,
    pub num_cells_series: u32,
    pub num_cells_parallel: u32,
    pub total_cells: u32,
    /// $m\Omega$
    pub pack_resistance_mohm: f64,
    /// energy actually installed after rounding the string count up, $kWh$
    pub revised_pack_energy_kwh: f64,
    /// $Ah$
    pub revised_capacity_ah: f64,
    pub pack_mass_kg: f64,
    pub pack_volume_l: f64,
    pub cell_volume_cm3: f64,
    pub cell_energy_wh: f64,
    pub cell_specific_energy_wh_per_kg: f64,
    pub cell_energy_density_wh_per_l: f64,
    pub c_rate: f64,
    /// pack current at [Self::c_rate], $A$
    pub c_rate_current_a: f64,
    /// $kW$
    pub c_rate_power_kw: f64,
}

impl SerdeAPI for PackSpec {}

impl PackSpec {
    pub fn new(pack: &PackParameters) -> CalcResult<Self> {
        pack.init_checks()?;
        let cell = &pack.cell;
        let (series, parallel) = pack.pack_sp()?;
        let voltage = pack.voltage();
        let total_cells = series.checked_mul(parallel).ok_or_else(|| {
            CalcError::DegenerateParameter(format!(
                "{series}S{parallel}P has more cells than can be counted"
            ))
        })?;
        let cell_volume_cm3 = cell.geometry.volume_cm3();
        ensure_param!(
            cell_volume_cm3 > 0.0,
            "cell {:?} has no volume",
            cell.name
        );
        let cell_energy_wh = cell.energy_wh();
        let revised_pack_energy_kwh = parallel as f64 * voltage * cell.capacity_ah / WH_PER_KWH;
        let c_rate_current_a = parallel as f64 * pack.c_rate * cell.capacity_ah;
        Ok(Self {
            pack_voltage: voltage,
            num_cells_series: series,
            num_cells_parallel: parallel,
            total_cells,
            pack_resistance_mohm: pack.pack_resistance_mohm()?,
            revised_pack_energy_kwh,
            revised_capacity_ah: revised_pack_energy_kwh * WH_PER_KWH / voltage,
            pack_mass_kg: total_cells as f64 * cell.mass_g / 1_000.0,
            pack_volume_l: total_cells as f64 * cell_volume_cm3 * 1e-3,
            cell_volume_cm3,
            cell_energy_wh,
            cell_specific_energy_wh_per_kg: cell_energy_wh * 1_000.0 / cell.mass_g,
            cell_energy_density_wh_per_l: cell_energy_wh * 1_000.0 / cell_volume_cm3,
            c_rate: pack.c_rate,
            c_rate_current_a,
            c_rate_power_kw: c_rate_current_a * voltage / W_PER_KW,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prismatic_pack() -> PackParameters {
        PackParameters {
            pack_energy_kwh: 77.0,
            voltage_architecture: VoltageArchitecture::V400,
            cell: CellTemplate {
                name: "prismatic 60Ah".into(),
                nominal_voltage: 3.7,
                max_voltage: 4.2,
                cutoff_voltage: 2.8,
                capacity_ah: 60.0,
                mass_g: 900.0,
                geometry: CellGeometry::Prismatic {
                    width_mm: 148.0,
                    height_mm: 91.0,
                    depth_mm: 27.0,
                },
                tab_resistance_mohm: 0.1,
                internal_resistance_mohm: 0.9,
            },
            ee_resistance_mohm: 5.0,
            c_rate: 2.0,
            useable_capacity_perc: 95.0,
        }
    }

    #[test]
    fn test_pack_sp_and_resistance() {
        let pack = prismatic_pack();
        // 400 / 3.7 = 108.1, 77000 / 400 / 60 = 3.2
        assert_eq!(pack.pack_sp().unwrap(), (109, 4));
        assert!(almost_eq(
            pack.pack_resistance_mohm().unwrap(),
            1.0 * 109.0 / 4.0 + 5.0,
            None
        ));
    }

    #[test]
    fn test_revised_energy_covers_request() {
        for energy in [10.0, 50.5, 77.0, 85.0, 120.0, 199.9] {
            for arch in [VoltageArchitecture::V400, VoltageArchitecture::V800] {
                let mut pack = PackParameters::default();
                pack.pack_energy_kwh = energy;
                pack.voltage_architecture = arch;
                let spec = PackSpec::new(&pack).unwrap();
                assert!(spec.revised_pack_energy_kwh >= energy);
                let (_, parallel) = pack.pack_sp().unwrap();
                assert!((parallel as f64 - 1.0) * arch.volts() * 4.8 / 1000.0 < energy);
            }
        }
    }

    #[test]
    fn test_cell_counts_that_overflow_are_rejected() {
        let mut pack = PackParameters::default();
        pack.cell.nominal_voltage = 0.001;
        pack.cell.cutoff_voltage = 0.0005;
        pack.cell.capacity_ah = 0.001;
        // 800 000 in series, 106 250 in parallel
        assert_eq!(pack.pack_sp().unwrap(), (800_000, 106_250));
        assert!(matches!(
            PackSpec::new(&pack),
            Err(CalcError::DegenerateParameter(_))
        ));

        pack.cell.capacity_ah = 1e-12;
        assert!(matches!(
            pack.pack_sp(),
            Err(CalcError::DegenerateParameter(_))
        ));
    }

    #[test]
    fn test_pack_report() {
        let spec = PackSpec::new(&prismatic_pack()).unwrap();
        assert_eq!(spec.total_cells, 436);
        assert!(almost_eq(spec.revised_pack_energy_kwh, 96.0, None));
        assert!(almost_eq(spec.revised_capacity_ah, 240.0, None));
        assert!(almost_eq(spec.pack_mass_kg, 392.4, None));
        assert!(almost_eq(spec.cell_volume_cm3, 363.636, None));
        assert!(almost_eq(spec.pack_volume_l, 436.0 * 0.363636, None));
        assert!(almost_eq(spec.cell_energy_wh, 222.0, None));
        assert!(almost_eq(spec.cell_specific_energy_wh_per_kg, 246.666_666_666_666_66, None));
        assert!(almost_eq(spec.c_rate_current_a, 480.0, None));
        assert!(almost_eq(spec.c_rate_power_kw, 192.0, None));
        assert_eq!(spec, PackSpec::new(&prismatic_pack()).unwrap());
    }

    #[test]
    fn test_cylindrical_volume() {
        let geom = CellGeometry::Cylindrical {
            diameter_mm: 20.0,
            height_mm: 100.0,
        };
        assert!(almost_eq(geom.volume_cm3(), std::f64::consts::PI * 10.0, None));
    }

    #[test]
    fn test_degenerate_cell() {
        let mut pack = prismatic_pack();
        pack.cell.capacity_ah = 0.0;
        assert!(matches!(
            pack.pack_sp(),
            Err(CalcError::DegenerateParameter(_))
        ));
        assert!(PackSpec::new(&pack).is_err());
    }

    #[test]
    fn test_pack_yaml() {
        let yaml = "pack_energy_kwh: 60.0\nvoltage_architecture: 400V\nee_resistance_mohm: 4.0\n\
            cell:\n  name: pouch\n  nominal_voltage: 3.65\n  max_voltage: 4.2\n  cutoff_voltage: 2.5\n  \
            capacity_ah: 50.0\n  mass_g: 700.0\n  tab_resistance_mohm: 0.05\n  internal_resistance_mohm: 1.2\n  \
            geometry:\n    format: pouch\n    width_mm: 100.0\n    height_mm: 300.0\n    depth_mm: 10.0\n";
        let pack = PackParameters::from_yaml(yaml).unwrap();
        assert_eq!(pack.voltage_architecture, VoltageArchitecture::V400);
        assert_eq!(pack.c_rate, 10.0);
        assert_eq!(pack.useable_capacity_perc, 95.0);
        assert!(almost_eq(pack.cell.geometry.volume_cm3(), 300.0, None));
    }
}
