//! Sinks that take results and parameters out of the calculation.

use std::io::Write;

use itertools::izip;

use crate::imports::*;
use crate::packsim::{DerivedSeries, ParameterSet, Summary};

/// Consumer of one walk's output, e.g. a chart or document renderer
pub trait ReportSink {
    fn report(&mut self, series: &DerivedSeries, summary: &Summary) -> anyhow::Result<()>;
}

/// Consumer of the raw parameter record
pub trait ParameterSink {
    fn store(&mut self, params: &ParameterSet) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize)]
struct SeriesRow {
    time_s: f64,
    speed_mps: f64,
    accel_mps2: f64,
    force_n: f64,
    wheel_torque_nm: f64,
    motor_torque_nm: f64,
    power_demand_kw: f64,
    motor_power_kw: f64,
    /// empty when the pack cannot deliver the cycle
    current_a: Option<f64>,
    soc_perc: Option<f64>,
    cumulative_energy_kwh: f64,
    cumulative_energy_no_regen_kwh: f64,
}

/// Writes the derived series as CSV, one row per sample
pub struct CsvReport<W: Write> {
    wtr: csv::Writer<W>,
}

impl<W: Write> CsvReport<W> {
    pub fn new(wtr: W) -> Self {
        Self {
            wtr: csv::Writer::from_writer(wtr),
        }
    }

    /// Flushes and hands back the underlying writer
    pub fn into_inner(self) -> anyhow::Result<W> {
        self.wtr
            .into_inner()
            .map_err(|e| anyhow!("could not flush CSV report: {}", e.error()))
    }
}

impl CsvReport<File> {
    pub fn create<P: AsRef<Path>>(filepath: P) -> anyhow::Result<Self> {
        let filepath = filepath.as_ref();
        let file = File::create(filepath)
            .with_context(|| format!("Could not create file: {filepath:?}"))?;
        Ok(Self::new(file))
    }
}

impl<W: Write> ReportSink for CsvReport<W> {
    fn report(&mut self, series: &DerivedSeries, summary: &Summary) -> anyhow::Result<()> {
        log::debug!(
            "writing {} samples of {:?} as CSV",
            series.len(),
            summary.cycle_name
        );
        series.check_lengths()?;
        let (current_a, soc_perc): (Vec<Option<f64>>, Vec<Option<f64>>) = match &series.electrical
        {
            Ok(elec) => (
                elec.current_a.iter().copied().map(Some).collect(),
                elec.soc_perc.iter().copied().map(Some).collect(),
            ),
            Err(_) => (vec![None; series.len()], vec![None; series.len()]),
        };
        for (t, v, a, f, wt, mt, pd, pm, i, soc, e, e_no_regen) in izip!(
            &series.time_s,
            &series.speed_mps,
            &series.accel_mps2,
            &series.force_n,
            &series.wheel_torque_nm,
            &series.motor_torque_nm,
            &series.power_demand_kw,
            &series.motor_power_kw,
            current_a,
            soc_perc,
            &series.cumulative_energy_kwh,
            &series.cumulative_energy_no_regen_kwh,
        ) {
            self.wtr.serialize(SeriesRow {
                time_s: *t,
                speed_mps: *v,
                accel_mps2: *a,
                force_n: *f,
                wheel_torque_nm: *wt,
                motor_torque_nm: *mt,
                power_demand_kw: *pd,
                motor_power_kw: *pm,
                current_a: i,
                soc_perc: soc,
                cumulative_energy_kwh: *e,
                cumulative_energy_no_regen_kwh: *e_no_regen,
            })?;
        }
        self.wtr.flush()?;
        Ok(())
    }
}

/// Saves each parameter set it is given to a YAML, JSON or bincode file,
/// picked by extension.  Later calls overwrite earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub struct FileParameterSink {
    pub filepath: PathBuf,
}

impl FileParameterSink {
    pub fn new<P: Into<PathBuf>>(filepath: P) -> Self {
        Self {
            filepath: filepath.into(),
        }
    }
}

impl ParameterSink for FileParameterSink {
    fn store(&mut self, params: &ParameterSet) -> anyhow::Result<()> {
        params.to_file(&self.filepath)?;
        log::info!("saved parameters to {:?}", self.filepath);
        Ok(())
    }
}
