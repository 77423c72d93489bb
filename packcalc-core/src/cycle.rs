//! Module containing the speed cycle and its summary statistics.

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

use crate::imports::*;
use crate::params::*;

lazy_static! {
    /// Stray separators at either end of a pasted speed string, e.g. `",0,5,10,"`
    static ref EDGE_SEPARATORS: Regex = Regex::new(r"^[\s,]+|[\s,]+$").unwrap();
}

/// Uniformly sampled speed trace.  Sample `i` is the vehicle speed at `i`
/// seconds; the step is fixed at [DT_S].
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedCycle {
    #[serde(default)]
    pub name: String,
    /// speed \[m/s\]
    pub mps: Array1<f64>,
}

impl SerdeAPI for SpeedCycle {
    const ACCEPTED_BYTE_FORMATS: &'static [SerdeFormat] = &[
        SerdeFormat::Yaml,
        SerdeFormat::Json,
        SerdeFormat::Bin,
        SerdeFormat::Txt,
    ];
    const ACCEPTED_STR_FORMATS: &'static [SerdeFormat] =
        &[SerdeFormat::Yaml, SerdeFormat::Json, SerdeFormat::Txt];

    fn init(&mut self) -> anyhow::Result<()> {
        self.init_checks()?;
        Ok(())
    }

    fn to_writer<W: std::io::Write>(&self, mut wtr: W, format: SerdeFormat) -> anyhow::Result<()> {
        match format {
            SerdeFormat::Yaml => serde_yaml::to_writer(wtr, self)?,
            SerdeFormat::Json => serde_json::to_writer(wtr, self)?,
            SerdeFormat::Bin => bincode::serialize_into(wtr, self)?,
            SerdeFormat::Txt => wtr.write_all(self.to_kmh_string().as_bytes())?,
        }
        Ok(())
    }

    fn from_reader<R: std::io::Read>(mut rdr: R, format: SerdeFormat) -> anyhow::Result<Self> {
        let mut deserialized: Self = match format {
            SerdeFormat::Yaml => serde_yaml::from_reader(rdr)?,
            SerdeFormat::Json => serde_json::from_reader(rdr)?,
            SerdeFormat::Bin => bincode::deserialize_from(rdr)?,
            SerdeFormat::Txt => {
                let mut contents = String::new();
                rdr.read_to_string(&mut contents)?;
                Self::from_kmh_str(&contents)?
            }
        };
        deserialized.init()?;
        Ok(deserialized)
    }
}

impl SpeedCycle {
    /// Builds a cycle from speeds in m/s.  Every value must be finite and
    /// there must be at least one.
    pub fn new<S: Into<String>>(name: S, mps: Vec<f64>) -> CalcResult<Self> {
        let cyc = Self {
            name: name.into(),
            mps: Array1::from_vec(mps),
        };
        cyc.init_checks()?;
        Ok(cyc)
    }

    /// Builds a cycle from speeds in km/h
    pub fn from_kmh(kmh: &[f64]) -> CalcResult<Self> {
        Self::new("", kmh.iter().map(|v| v / KMH_PER_MPS).collect())
    }

    /// Parses comma separated km/h speeds such as `"0, 10, 20,20,10,0"`.
    ///
    /// Separators at either end are dropped.  Every other token must be a
    /// finite number; an empty or malformed token in the middle is an error
    /// rather than being skipped, so sample `i` always stays at `i` seconds.
    pub fn from_kmh_str(text: &str) -> CalcResult<Self> {
        let trimmed = EDGE_SEPARATORS.replace_all(text, "");
        if trimmed.is_empty() {
            return Err(CalcError::EmptyCycle);
        }
        let mps = trimmed
            .split(',')
            .enumerate()
            .map(|(index, token)| {
                let token = token.trim();
                match token.parse::<f64>() {
                    Ok(kmh) if kmh.is_finite() => Ok(kmh / KMH_PER_MPS),
                    _ => Err(CalcError::Parse {
                        index,
                        token: token.to_string(),
                    }),
                }
            })
            .collect::<CalcResult<Vec<f64>>>()?;
        Self::new("", mps)
    }

    /// Load a km/h text cycle, naming it after the file stem
    pub fn from_text_file<P: AsRef<Path>>(filepath: P) -> anyhow::Result<Self> {
        let filepath = filepath.as_ref();
        let name = filepath
            .file_stem()
            .and_then(OsStr::to_str)
            .with_context(|| format!("Could not parse cycle name from filepath: {filepath:?}"))?
            .to_string();
        let contents = std::fs::read_to_string(filepath)
            .with_context(|| format!("Could not read cycle file: {filepath:?}"))?;
        let mut cyc = Self::from_kmh_str(&contents)?;
        cyc.name = name;
        Ok(cyc)
    }

    /// Load one of the packaged km/h text cycles, e.g. `"ece15.txt"`
    #[cfg(feature = "resources")]
    pub fn from_text_resource(name: &str) -> anyhow::Result<Self> {
        let contents = crate::resources::resource_str(&format!("cycles/{name}"))?;
        let mut cyc = Self::from_kmh_str(contents)?;
        cyc.name = name.trim_end_matches(".txt").to_string();
        Ok(cyc)
    }

    pub fn init_checks(&self) -> CalcResult<()> {
        if self.is_empty() {
            return Err(CalcError::EmptyCycle);
        }
        if let Some((index, v)) = self.mps.iter().find_position(|v| !v.is_finite()) {
            return Err(CalcError::Parse {
                index,
                token: v.to_string(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.mps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mps.is_empty()
    }

    /// Time axis labels, one per sample \[s\]
    pub fn labels(&self) -> Vec<usize> {
        (0..self.len()).collect()
    }

    /// time \[s\]
    pub fn time_s(&self) -> Array1<f64> {
        Array1::range(0.0, self.len() as f64 * DT_S, DT_S)
    }

    /// speed \[km/h\]
    pub fn kmh(&self) -> Array1<f64> {
        &self.mps * KMH_PER_MPS
    }

    /// Distance covered, with each sample held for one second \[km\]
    pub fn dist_km(&self) -> f64 {
        self.mps.sum() * DT_S / M_PER_KM
    }

    /// Comma separated km/h text, the inverse of [Self::from_kmh_str]
    pub fn to_kmh_string(&self) -> String {
        self.kmh().iter().join(",")
    }
}

/// Summary figures for a cycle, as shown next to a speed trace
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleStats {
    pub min_kmh: f64,
    pub max_kmh: f64,
    pub avg_kmh: f64,
    /// mean of the positive forward differences \[m/s²\]
    pub avg_accel_mps2: f64,
    /// mean of the negative forward differences, reported as a negative value \[m/s²\]
    pub avg_decel_mps2: f64,
    pub distance_km: f64,
    pub duration_s: f64,
}

impl SerdeAPI for CycleStats {}

impl CycleStats {
    /// Forward differences `v[i+1] - v[i]` are used here, with the sample after
    /// the last one taken as a stop.  This is different from the backward rule
    /// of [crate::kinematics::acceleration].
    pub fn new(cyc: &SpeedCycle) -> CalcResult<Self> {
        cyc.init_checks()?;
        let kmh = cyc.kmh();
        let fwd_diffs: Vec<f64> = cyc
            .mps
            .iter()
            .chain(std::iter::once(&0.0))
            .tuple_windows()
            .map(|(v, v_next)| (v_next - v) / DT_S)
            .collect();
        Ok(Self {
            min_kmh: arrmin(kmh.as_slice().unwrap_or_default()),
            max_kmh: arrmax(kmh.as_slice().unwrap_or_default()),
            avg_kmh: mean_or_zero(kmh.iter().copied()),
            avg_accel_mps2: mean_or_zero(fwd_diffs.iter().copied().filter(|a| *a > 0.0)),
            avg_decel_mps2: mean_or_zero(fwd_diffs.iter().copied().filter(|a| *a < 0.0)),
            distance_km: cyc.dist_km(),
            duration_s: cyc.len() as f64 * DT_S,
        })
    }
}
