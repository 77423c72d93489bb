//! Module containing the powertrain ratings and the motor power limiter.

use std::fmt;
use std::str::FromStr;

use crate::imports::*;

/// Which motor rating bounds the delivered power
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotorMode {
    Continuous,
    #[default]
    Peak,
}

impl FromStr for MotorMode {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "continuous" | "cont" => Ok(Self::Continuous),
            "peak" => Ok(Self::Peak),
            other => Err(CalcError::Validation(format!(
                "motor mode must be `peak` or `continuous`, got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for MotorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continuous => write!(f, "continuous"),
            Self::Peak => write!(f, "peak"),
        }
    }
}

/// Driven axles
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveType {
    /// front-wheel drive
    #[serde(rename = "FWD")]
    Fwd,
    /// rear-wheel drive
    #[default]
    #[serde(rename = "RWD")]
    Rwd,
    /// all-wheel drive
    #[serde(rename = "AWD")]
    Awd,
}

impl DriveType {
    pub fn has_front(&self) -> bool {
        matches!(self, Self::Fwd | Self::Awd)
    }

    pub fn has_rear(&self) -> bool {
        matches!(self, Self::Rwd | Self::Awd)
    }
}

/// Motor ratings per axle, drivetrain efficiency and regen settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PowertrainParameters {
    pub drive_type: DriveType,
    /// Front motor peak power, $kW$
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub front_peak_kw: Option<f64>,
    /// Front motor continuous power, $kW$
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub front_continuous_kw: Option<f64>,
    /// Rear motor peak power, $kW$
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub rear_peak_kw: Option<f64>,
    /// Rear motor continuous power, $kW$
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub rear_continuous_kw: Option<f64>,
    /// Battery to wheel efficiency, used for both traction and regen
    #[validate(range(min = 0, max = 1))]
    pub efficiency: f64,
    /// Share of the motor rating available for regenerative braking, %
    #[validate(range(min = 0, max = 100))]
    pub regen_capacity_perc: f64,
    #[serde(default = "default_true")]
    pub regen_on: bool,
    /// Ancillary load, $\frac{Wh}{km}$
    #[validate(range(min = 0))]
    pub ancillary_wh_per_km: f64,
}

fn default_true() -> bool {
    true
}

impl Default for PowertrainParameters {
    fn default() -> Self {
        Self {
            drive_type: DriveType::Awd,
            front_peak_kw: Some(100.0),
            front_continuous_kw: Some(50.0),
            rear_peak_kw: Some(100.0),
            rear_continuous_kw: Some(50.0),
            efficiency: 0.9,
            regen_capacity_perc: 50.0,
            regen_on: true,
            ancillary_wh_per_km: 10.0,
        }
    }
}

impl SerdeAPI for PowertrainParameters {
    fn init(&mut self) -> anyhow::Result<()> {
        self.init_checks()?;
        Ok(())
    }
}

impl PowertrainParameters {
    pub fn init_checks(&self) -> CalcResult<()> {
        self.validate()?;
        ensure_param!(
            self.efficiency > 0.0,
            "powertrain efficiency must be above 0, got {}",
            self.efficiency
        );
        // a set may rate only one mode; the other fails where it is used
        ensure_param!(
            self.total_motor_power(MotorMode::Peak).is_ok()
                || self.total_motor_power(MotorMode::Continuous).is_ok(),
            "no motor power on the driven axles ({:?})",
            self.drive_type
        );
        Ok(())
    }

    /// Combined rating of the driven axles for `mode`, $kW$.  Ratings of an
    /// axle the drive type does not drive are ignored.
    pub fn total_motor_power(&self, mode: MotorMode) -> CalcResult<f64> {
        let (front, rear) = match mode {
            MotorMode::Peak => (self.front_peak_kw, self.rear_peak_kw),
            MotorMode::Continuous => (self.front_continuous_kw, self.rear_continuous_kw),
        };
        let front = front.filter(|_| self.drive_type.has_front()).unwrap_or(0.0);
        let rear = rear.filter(|_| self.drive_type.has_rear()).unwrap_or(0.0);
        let total = front + rear;
        ensure_param!(
            total > 0.0,
            "no {mode} motor power on the driven axles ({:?})",
            self.drive_type
        );
        Ok(total)
    }

    /// Regen ceiling magnitude for `mode`, $kW$
    pub fn regen_limit_kw(&self, mode: MotorMode) -> CalcResult<f64> {
        Ok(self.total_motor_power(mode)? * self.regen_capacity_perc / 100.0)
    }
}

/// Motor power after the efficiency divisor and both clamps, $kW$.
///
/// Traction is capped at `available_kw`; braking is floored at
/// `-available_kw * regen_perc / 100`.
pub fn limit_motor_power(demand_kw: f64, available_kw: f64, eff: f64, regen_perc: f64) -> f64 {
    let p = demand_kw / eff;
    let regen_floor = -available_kw * regen_perc / 100.0;
    if p >= available_kw {
        available_kw
    } else if p < regen_floor {
        regen_floor
    } else {
        p
    }
}

/// [limit_motor_power] over a power demand trace
pub fn motor_power_actual(
    power_demand_kw: &Array1<f64>,
    pt: &PowertrainParameters,
    mode: MotorMode,
) -> CalcResult<Array1<f64>> {
    ensure_param!(
        pt.efficiency > 0.0,
        "powertrain efficiency must be above 0, got {}",
        pt.efficiency
    );
    let available_kw = pt.total_motor_power(mode)?;
    let limited = power_demand_kw
        .mapv(|p| limit_motor_power(p, available_kw, pt.efficiency, pt.regen_capacity_perc));
    let saturated = limited.iter().filter(|p| **p >= available_kw).count();
    if saturated > 1 {
        log::warn!(
            "{saturated} samples saturate the {mode} motor rating of {available_kw} kW"
        );
    }
    Ok(limited)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt_100kw() -> PowertrainParameters {
        PowertrainParameters {
            drive_type: DriveType::Rwd,
            front_peak_kw: None,
            front_continuous_kw: None,
            rear_peak_kw: Some(100.0),
            rear_continuous_kw: Some(40.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_limiter_scenario() {
        assert_eq!(limit_motor_power(120.0, 100.0, 0.9, 50.0), 100.0);
        assert_eq!(limit_motor_power(-80.0, 100.0, 0.9, 50.0), -50.0);
        assert!(almost_eq(limit_motor_power(45.0, 100.0, 0.9, 50.0), 50.0, None));
        assert!(almost_eq(limit_motor_power(-9.0, 100.0, 0.9, 50.0), -10.0, None));
    }

    #[test]
    fn test_motor_power_actual_by_mode() {
        let pt = pt_100kw();
        let demand = array![120.0, -80.0, 0.0, 27.0];
        let peak = motor_power_actual(&demand, &pt, MotorMode::Peak).unwrap();
        assert_eq!(peak[0], 100.0);
        assert_eq!(peak[1], -50.0);
        assert_eq!(peak[2], 0.0);
        assert!(almost_eq(peak[3], 30.0, None));
        let cont = motor_power_actual(&demand, &pt, MotorMode::Continuous).unwrap();
        assert_eq!(cont[0], 40.0);
        assert_eq!(cont[1], -20.0);
        assert!(almost_eq(cont[3], 30.0, None));
    }

    #[test]
    fn test_total_motor_power_follows_drive_type() {
        let mut pt = PowertrainParameters::default();
        assert_eq!(pt.total_motor_power(MotorMode::Peak).unwrap(), 200.0);
        assert_eq!(pt.total_motor_power(MotorMode::Continuous).unwrap(), 100.0);
        pt.drive_type = DriveType::Fwd;
        assert_eq!(pt.total_motor_power(MotorMode::Peak).unwrap(), 100.0);
        assert_eq!(pt.regen_limit_kw(MotorMode::Peak).unwrap(), 50.0);
    }

    #[test]
    fn test_degenerate_powertrain() {
        let mut pt = pt_100kw();
        pt.drive_type = DriveType::Fwd;
        assert!(matches!(
            pt.total_motor_power(MotorMode::Peak),
            Err(CalcError::DegenerateParameter(_))
        ));
        let mut pt = pt_100kw();
        pt.efficiency = 0.0;
        assert!(matches!(
            motor_power_actual(&array![1.0], &pt, MotorMode::Peak),
            Err(CalcError::DegenerateParameter(_))
        ));
    }

    #[test]
    fn test_single_mode_ratings_pass_checks() {
        let mut pt = PowertrainParameters::default();
        pt.front_continuous_kw = None;
        pt.rear_continuous_kw = None;
        assert!(pt.init_checks().is_ok());
        let peak = motor_power_actual(&array![120.0, 250.0], &pt, MotorMode::Peak).unwrap();
        assert_eq!(peak[1], 200.0);
        assert!(matches!(
            pt.total_motor_power(MotorMode::Continuous),
            Err(CalcError::DegenerateParameter(_))
        ));

        pt.front_peak_kw = None;
        pt.rear_peak_kw = None;
        assert!(matches!(
            pt.init_checks(),
            Err(CalcError::DegenerateParameter(_))
        ));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Peak".parse::<MotorMode>().unwrap(), MotorMode::Peak);
        assert_eq!(
            "continuous".parse::<MotorMode>().unwrap(),
            MotorMode::Continuous
        );
        assert!("turbo".parse::<MotorMode>().is_err());
        assert_eq!(MotorMode::Continuous.to_string(), "continuous");
    }

    #[test]
    fn test_powertrain_yaml() {
        let pt = PowertrainParameters::from_yaml(
            "drive_type: FWD\nfront_peak_kw: 150.0\nfront_continuous_kw: 70.0\n\
             efficiency: 0.85\nregen_capacity_perc: 30.0\nancillary_wh_per_km: 12.0\n",
        )
        .unwrap();
        assert_eq!(pt.drive_type, DriveType::Fwd);
        assert!(pt.regen_on);
        assert_eq!(pt.rear_peak_kw, None);
        assert!(PowertrainParameters::from_yaml(
            "drive_type: RWD\nfront_peak_kw: 150.0\nfront_continuous_kw: 70.0\n\
             efficiency: 0.85\nregen_capacity_perc: 30.0\nancillary_wh_per_km: 12.0\n",
        )
        .is_err());
    }
}
