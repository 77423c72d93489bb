use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser};
use serde::Serialize;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

use packcalc_core::prelude::*;

/// Sizes an electric-vehicle battery pack from a speed cycle.
/// After running `cargo build --release`, run with
/// ```bash
/// ./target/release/packcalc-cli --cyc-resource ece15.txt
/// ./target/release/packcalc-cli --params-file my_params.yaml --cyc "0,10,20,20,10,0" --res-fmt json
/// ```
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(group(
    ArgGroup::new("cycle")
    .required(true)
    .args(&["cyc", "cyc-file", "cyc-resource"])
))]
struct PackCalcApi {
    /// Parameter set file (yaml or json); the packaged defaults are used if omitted
    #[clap(long, value_parser)]
    params_file: Option<PathBuf>,
    /// Speed cycle as comma separated km/h, e.g. "0,10,20,20,10,0"
    #[clap(long, value_parser, allow_hyphen_values = true)]
    cyc: Option<String>,
    /// Path to a cycle file: km/h text (txt, csv) or a serialized cycle (yaml, json)
    #[clap(long, value_parser)]
    cyc_file: Option<PathBuf>,
    /// Name of a packaged cycle, e.g. `ece15.txt`
    #[clap(long, value_parser)]
    cyc_resource: Option<String>,
    /// Motor rating the power limiter uses: `peak` or `continuous`
    #[clap(long, value_parser, default_value = "peak")]
    mode: String,
    /// How to return results: `summary`, `json` or `csv`
    #[clap(long, value_parser, default_value = "summary")]
    res_fmt: String,
    /// Write json/csv results here instead of stdout
    #[clap(long, value_parser)]
    out: Option<PathBuf>,
    /// Also save the parameter set used to this file (yaml, json or bin)
    #[clap(long, value_parser)]
    save_params: Option<PathBuf>,
    /// Log pipeline stages to stderr
    #[clap(long, short, action)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct JsonResults<'a> {
    summary: &'a Summary,
    series: &'a DerivedSeries,
}

fn init_logger(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)
        .context("Could not install the terminal logger")
}

fn load_params(params_file: Option<&Path>) -> anyhow::Result<ParameterSet> {
    match params_file {
        Some(path) => ParameterSet::from_file(path)
            .with_context(|| format!("Could not load parameters from {path:?}")),
        None => ParameterSet::from_resource("params/default.yaml"),
    }
}

fn load_cycle(api: &PackCalcApi) -> anyhow::Result<SpeedCycle> {
    if let Some(speeds) = &api.cyc {
        let mut cyc = SpeedCycle::from_kmh_str(speeds).context("Could not parse --cyc")?;
        cyc.name = "cli".into();
        Ok(cyc)
    } else if let Some(path) = &api.cyc_file {
        let is_text = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("txt") | Some("csv")
        );
        if is_text {
            SpeedCycle::from_text_file(path)
        } else {
            SpeedCycle::from_file(path)
        }
    } else if let Some(name) = &api.cyc_resource {
        SpeedCycle::from_text_resource(name)
    } else {
        bail!("One of --cyc, --cyc-file or --cyc-resource is required")
    }
}

fn output(out: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match out {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Could not create {path:?}"))?,
        ),
        None => Box::new(io::stdout()),
    })
}

fn print_summary(summary: &Summary) {
    let stats = &summary.cycle_stats;
    println!("Cycle: {} ({} mode)", summary.cycle_name, summary.mode);
    println!(
        "  {:.0} s, {:.3} km, speed {:.1}/{:.1}/{:.1} km/h (min/avg/max)",
        stats.duration_s, stats.distance_km, stats.min_kmh, stats.avg_kmh, stats.max_kmh
    );
    println!(
        "  average acceleration {:.3} m/s2, deceleration {:.3} m/s2",
        stats.avg_accel_mps2, stats.avg_decel_mps2
    );
    println!(
        "Road load: inertial {:.2} Wh, rolling/grade {:.2} Wh, aero {:.2} Wh",
        summary.inertial_energy_wh, summary.road_energy_wh, summary.aero_energy_wh
    );
    match &summary.sizing {
        Ok(sizing) => {
            println!(
                "Efficiency: {:.1} Wh/km ({:.2} mi/kWh)",
                sizing.efficiency_wh_per_km, sizing.efficiency_mi_per_kwh
            );
            println!(
                "Required pack energy: {:.2} kWh for {:.0} km ({:.0} mi) at {:.0} % useable",
                sizing.required_pack_energy_kwh,
                sizing.range_km,
                sizing.range_mi,
                sizing.useable_capacity_perc
            );
        }
        Err(err) => println!("Required pack energy: cannot compute ({err})"),
    }
    match &summary.pack_spec {
        Ok(spec) => {
            println!(
                "Pack: {}S{}P ({} cells) at {:.0} V, {:.3} mOhm",
                spec.num_cells_series,
                spec.num_cells_parallel,
                spec.total_cells,
                spec.pack_voltage,
                spec.pack_resistance_mohm
            );
            println!(
                "  {:.2} kWh, {:.1} Ah, {:.1} kg, {:.2} L",
                spec.revised_pack_energy_kwh,
                spec.revised_capacity_ah,
                spec.pack_mass_kg,
                spec.pack_volume_l
            );
            println!(
                "  at {} C: {:.0} A, {:.0} kW",
                spec.c_rate, spec.c_rate_current_a, spec.c_rate_power_kw
            );
        }
        Err(err) => println!("Pack: cannot compute ({err})"),
    }
    println!("Cycle energy: {:.4} kWh", summary.final_energy_kwh);
    match &summary.electrical {
        Ok(elec) => println!(
            "  final SOC {:.3} %, minimum SOC {:.3} %, peak current {:.1} A",
            elec.final_soc_perc, elec.min_soc_perc, elec.peak_current_a
        ),
        Err(err) => println!("  current and SOC: cannot compute ({err})"),
    }
}

fn run(api: PackCalcApi) -> anyhow::Result<()> {
    let mode: MotorMode = api.mode.parse()?;
    let params = load_params(api.params_file.as_deref())?;
    if let Some(path) = &api.save_params {
        FileParameterSink::new(path).store(&params)?;
    }
    let cyc = load_cycle(&api)?;
    log::debug!("loaded cycle {:?} with {} samples", cyc.name, cyc.len());

    let sim = PackSim::new(cyc, params)?;
    let (series, summary) = sim
        .summary(mode)
        .with_context(|| format!("Could not compute the {mode} mode results"))?;

    match api.res_fmt.to_lowercase().as_str() {
        "summary" => print_summary(&summary),
        "json" => {
            let mut wtr = output(api.out.as_deref())?;
            serde_json::to_writer_pretty(
                &mut wtr,
                &JsonResults {
                    summary: &summary,
                    series: &series,
                },
            )?;
            writeln!(wtr)?;
        }
        "csv" => {
            let mut report = CsvReport::new(output(api.out.as_deref())?);
            report.report(&series, &summary)?;
        }
        other => bail!("Unsupported --res-fmt {other:?}, must be one of summary, json, csv"),
    }
    Ok(())
}

pub fn main() -> anyhow::Result<()> {
    let api = PackCalcApi::parse();
    init_logger(api.verbose)?;
    run(api)
}
