use clap::Parser;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

mod drugs;
mod error;
mod nmr;
mod output;
mod pk;
mod plot;
mod report;
mod routes;

use crate::drugs::Drug;
use crate::pk::{Inputs, Metabolism};
use crate::plot::CurveParams;
use crate::routes::Route;

#[derive(Parser)]
#[command(name = "detwin")]
#[command(about = "Drug detection window estimator for oral fluid and urine testing")]
struct Cli {
    /// Drug name or common synonym (e.g. "heroin", "ethanol")
    #[arg(long)]
    drug: String,

    /// Route of administration, full name or abbreviation (e.g. "IV", "SL")
    #[arg(long)]
    route: String,

    /// Dosage in mg
    #[arg(long)]
    dose: u32,

    /// Body weight in kg
    #[arg(short, long)]
    weight: u32,

    /// Age in years
    #[arg(short, long)]
    age: u32,

    /// Metabolism rate: slow/normal/fast or 1/2/3
    #[arg(short, long, default_value = "normal")]
    metabolism: String,

    /// Duration of use in hours (24.0 = 1 day)
    #[arg(long)]
    duration: f64,

    /// Also render the synthetic 1H NMR spectrum
    #[arg(long)]
    nmr: bool,

    /// Random seed for reproducible NMR peak widths
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory to save curve samples and a JSON summary
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let drug: Drug = cli.drug.parse()?;
    let route: Route = cli.route.parse()?;
    let metabolism: Metabolism = cli.metabolism.parse()?;

    let inputs = Inputs {
        drug,
        route,
        dosage_mg: cli.dose,
        weight_kg: cli.weight,
        age_years: cli.age,
        metabolism,
        duration_hours: cli.duration,
    };

    info!(
        "Estimating detection window for {} via {}",
        drug.name(),
        route.name()
    );
    let estimate = pk::estimate(&inputs)?;
    debug!(
        "Resolved route parameters: bioavailability {:.2}, absorption {:.2} h, oral factor {:.4}",
        estimate.route_params.bioavailability,
        estimate.route_params.absorption_rate,
        estimate.route_params.oral_factor
    );

    println!("====================================================================");
    println!("DETWIN - Drug Detection Window Estimator v2.0");
    println!("FOR ORAL FLUID (SALIVA) AND URINE TESTING");
    println!("====================================================================");

    let curve_params = CurveParams {
        elimination_rate: estimate.saliva.elimination_rate,
        cutoff: estimate.saliva.cutoff_ng_ml,
        half_life: estimate.saliva.half_life_hours,
        duration_hours: inputs.duration_hours,
        dosing_interval: estimate.saliva.dosing_interval_hours,
        single_dose_conc: estimate.saliva.single_dose_conc,
        absorption_rate: estimate.route_params.absorption_rate,
    };

    print!("\n{}", plot::render_chart(&curve_params));
    print!("{}", report::render(&estimate));

    if cli.nmr {
        let mut rng = match cli.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let peaks = nmr::peaks_for(drug, &mut rng);
        print!(
            "\n{}",
            nmr::render_spectrum(drug, f64::from(cli.dose), &peaks)
        );
    }

    if let Some(dir) = &cli.output {
        let samples = plot::sample_curve(&curve_params);
        output::save_results(&estimate, &samples, dir)?;
    }

    Ok(())
}
