#![allow(clippy::field_reassign_with_default)]

//! Crate containing models for sizing the battery pack of an electric vehicle
//! from a second-by-second speed cycle.
//!
//! The pipeline runs leaves first:
//! [cycle] → [kinematics] → [dynamics] → [power] → [motor] → [electrical] / [energy],
//! with [sizing] and [pack] as independent derivations. [packsim::PackSim]
//! strings the stages together for one parameter snapshot.
//!
//! # Features:
//! - resources: package the default parameter set, demo cycle and sample cell
//!   library into the binary (see [resources])

#[macro_use]
pub mod macros;

pub mod catalog;
pub mod cycle;
pub mod dynamics;
pub mod electrical;
pub mod energy;
pub mod error;
pub mod imports;
pub mod kinematics;
pub mod motor;
pub mod pack;
pub mod packsim;
pub mod params;
pub mod power;
pub mod report;
#[cfg(feature = "resources")]
pub mod resources;
pub mod sizing;
pub mod traits;
pub mod utils;
pub mod vehicle;

pub mod prelude {
    pub use crate::catalog::{CellCatalog, CellLibrary, TyreCatalog, TyreList};
    pub use crate::cycle::{CycleStats, SpeedCycle};
    pub use crate::error::{CalcError, CalcResult};
    pub use crate::motor::{DriveType, MotorMode, PowertrainParameters};
    pub use crate::pack::{CellGeometry, CellTemplate, PackParameters, PackSpec, VoltageArchitecture};
    pub use crate::packsim::{
        DerivedSeries, ElectricalSeries, ElectricalSummary, PackSim, ParameterSet, Summary,
    };
    pub use crate::report::{CsvReport, FileParameterSink, ParameterSink, ReportSink};
    pub use crate::sizing::PackSizing;
    pub use crate::traits::SerdeAPI;
    pub use crate::vehicle::{EnvironmentParameters, TyreSize, VehicleParameters};
}
