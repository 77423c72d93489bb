//! Module containing vehicle and environment parameter structs.

use lazy_static::lazy_static;
use regex::Regex;

use crate::imports::*;
use crate::params::*;

lazy_static! {
    /// `"<width>/<aspect>R<rim>"`, e.g. `"225/50R17"`
    static ref TYRE_CODE_REGEX: Regex = Regex::new(
        r"^\s*([0-9]+(?:\.[0-9]+)?)\s*/\s*([0-9]+(?:\.[0-9]+)?)\s*[Rr]\s*([0-9]+(?:\.[0-9]+)?)\s*$"
    )
    .unwrap();
}

/// Tyre dimensions read from a size code
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TyreSize {
    /// section width, $mm$
    pub width_mm: f64,
    /// sidewall height as a percentage of width
    pub aspect_ratio: f64,
    /// rim diameter, $in$
    pub rim_diameter_in: f64,
}

impl TyreSize {
    pub fn from_code<S: AsRef<str>>(tyre_code: S) -> CalcResult<Self> {
        let tyre_code = tyre_code.as_ref();
        let captures = TYRE_CODE_REGEX.captures(tyre_code).ok_or_else(|| {
            CalcError::Validation(format!(
                "tyre code {tyre_code:?} does not look like \"<width>/<aspect>R<rim>\""
            ))
        })?;
        let field = |i: usize| -> CalcResult<f64> {
            captures[i].parse().map_err(|_| {
                CalcError::Validation(format!("tyre code {tyre_code:?}: bad number {:?}", &captures[i]))
            })
        };
        Ok(Self {
            width_mm: field(1)?,
            aspect_ratio: field(2)?,
            rim_diameter_in: field(3)?,
        })
    }

    /// Rolling radius used for the torque figures, $m$:
    /// `(100 * aspect / width + rim / 2) / 1000`
    pub fn radius_m(&self) -> CalcResult<f64> {
        ensure_param!(
            self.width_mm > 0.0,
            "tyre width must be positive, got {} mm",
            self.width_mm
        );
        Ok((100.0 * self.aspect_ratio / self.width_mm + self.rim_diameter_in / 2.0) / M_PER_KM)
    }

    pub fn to_code(&self) -> String {
        format!(
            "{}/{}R{}",
            self.width_mm, self.aspect_ratio, self.rim_diameter_in
        )
    }
}

/// Body, tyre and driveline ratios of the vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct VehicleParameters {
    /// Test mass, $kg$
    #[validate(range(min = 0))]
    pub mass_kg: f64,
    /// Frontal area, $m^2$
    #[validate(range(min = 0))]
    pub frontal_area_m2: f64,
    /// Aerodynamic drag coefficient
    #[validate(range(min = 0))]
    pub drag_coef: f64,
    /// Rolling resistance coefficient
    #[validate(range(min = 0, max = 1))]
    pub rolling_resistance_coef: f64,
    /// Tyre size code, `"<width>/<aspect>R<rim>"`
    #[validate(regex(
        path = "TYRE_CODE_REGEX",
        message = "must look like \"<width>/<aspect>R<rim>\""
    ))]
    pub tyre_code: String,
    /// Final drive ratio
    #[validate(range(min = 0))]
    pub diff_ratio: f64,
    /// Gearbox ratio
    #[validate(range(min = 0))]
    pub gear_ratio: f64,
    /// Design range, $km$
    #[validate(range(min = 0))]
    pub range_km: f64,
}

impl Default for VehicleParameters {
    fn default() -> Self {
        Self {
            mass_kg: 2_000.0,
            frontal_area_m2: 2.5,
            drag_coef: 0.35,
            rolling_resistance_coef: 0.012,
            tyre_code: "255/45R19".into(),
            diff_ratio: 2.57,
            gear_ratio: 1.0,
            range_km: 400.0,
        }
    }
}

impl SerdeAPI for VehicleParameters {
    fn init(&mut self) -> anyhow::Result<()> {
        self.init_checks()?;
        Ok(())
    }
}

impl VehicleParameters {
    /// Range checks plus the strictly positive fields
    pub fn init_checks(&self) -> CalcResult<()> {
        self.validate()?;
        ensure_param!(self.mass_kg > 0.0, "vehicle mass must be positive");
        ensure_param!(self.frontal_area_m2 > 0.0, "frontal area must be positive");
        ensure_param!(
            self.diff_ratio * self.gear_ratio > 0.0,
            "differential ({}) and gear ({}) ratios must both be positive",
            self.diff_ratio,
            self.gear_ratio
        );
        self.wheel_radius_m()?;
        Ok(())
    }

    pub fn tyre_size(&self) -> CalcResult<TyreSize> {
        TyreSize::from_code(&self.tyre_code)
    }

    pub fn wheel_radius_m(&self) -> CalcResult<f64> {
        self.tyre_size()?.radius_m()
    }

    /// Overall reduction between motor and wheel
    pub fn drive_ratio(&self) -> f64 {
        self.diff_ratio * self.gear_ratio
    }

    pub fn range_mi(&self) -> f64 {
        self.range_km / KM_PER_MI
    }
}

/// Ambient conditions the cycle is driven in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EnvironmentParameters {
    /// Air density, $\frac{kg}{m^3}$
    #[validate(range(min = 0))]
    pub air_density_kg_per_m3: f64,
    /// Road slope, degrees; positive is uphill
    pub road_slope_deg: f64,
    /// Gravitational acceleration, $\frac{m}{s^2}$
    #[serde(default = "default_a_grav_mps2")]
    pub a_grav_mps2: f64,
}

fn default_a_grav_mps2() -> f64 {
    GRAVITY_MPS2
}

impl Default for EnvironmentParameters {
    fn default() -> Self {
        Self {
            air_density_kg_per_m3: AIR_DENSITY_KG_PER_M3,
            road_slope_deg: 0.0,
            a_grav_mps2: GRAVITY_MPS2,
        }
    }
}

impl SerdeAPI for EnvironmentParameters {
    fn init(&mut self) -> anyhow::Result<()> {
        self.init_checks()?;
        Ok(())
    }
}

impl EnvironmentParameters {
    pub fn init_checks(&self) -> CalcResult<()> {
        self.validate()?;
        ensure_param!(
            self.air_density_kg_per_m3 > 0.0,
            "air density must be positive"
        );
        if self.road_slope_deg.abs() > 90.0 || self.road_slope_deg.is_nan() {
            return Err(CalcError::Validation(format!(
                "road slope must be within +/-90 degrees, got {}",
                self.road_slope_deg
            )));
        }
        Ok(())
    }

    pub fn road_slope_rad(&self) -> f64 {
        self.road_slope_deg.to_radians()
    }
}
