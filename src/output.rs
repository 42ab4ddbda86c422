use crate::error::DetectResult;
use crate::pk::DetectionEstimate;
use crate::plot::CurveSamples;
use log::info;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

#[derive(Serialize)]
struct Summary<'a> {
    generated_at: String,
    estimate: &'a DetectionEstimate,
}

/// Save the run to disk: the saliva curve samples as CSV and the full
/// estimate as pretty JSON.
pub fn save_results<P: AsRef<Path>>(
    estimate: &DetectionEstimate,
    samples: &CurveSamples,
    output_dir: P,
) -> DetectResult<()> {
    let output_path = output_dir.as_ref();
    std::fs::create_dir_all(output_path)?;

    save_curve_samples(samples, output_path.join("concentrations.csv"))?;
    save_summary(estimate, output_path.join("summary.json"))?;

    info!("Results saved to {:?}", output_path);
    Ok(())
}

fn save_curve_samples<P: AsRef<Path>>(samples: &CurveSamples, path: P) -> DetectResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(["TIME_HOURS", "CONC_NG_ML"])?;
    for (time, conc) in samples.times.iter().zip(&samples.conc) {
        writer.write_record([time.to_string(), conc.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

fn save_summary<P: AsRef<Path>>(estimate: &DetectionEstimate, path: P) -> DetectResult<()> {
    let summary = Summary {
        generated_at: chrono::Utc::now().to_rfc3339(),
        estimate,
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &summary)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drugs::Drug;
    use crate::pk::{estimate, Inputs, Metabolism};
    use crate::plot::{sample_curve, CurveParams};
    use crate::routes::Route;

    #[test]
    fn test_save_results_writes_both_files() {
        let est = estimate(&Inputs {
            drug: Drug::Oxycodone,
            route: Route::Oral,
            dosage_mg: 20,
            weight_kg: 70,
            age_years: 40,
            metabolism: Metabolism::Normal,
            duration_hours: 24.0,
        })
        .unwrap();

        let samples = sample_curve(&CurveParams {
            elimination_rate: est.saliva.elimination_rate,
            cutoff: est.saliva.cutoff_ng_ml,
            half_life: est.saliva.half_life_hours,
            duration_hours: est.inputs.duration_hours,
            dosing_interval: est.saliva.dosing_interval_hours,
            single_dose_conc: est.saliva.single_dose_conc,
            absorption_rate: est.route_params.absorption_rate,
        });

        let dir = std::env::temp_dir().join(format!("detwin_test_{}", std::process::id()));
        save_results(&est, &samples, &dir).unwrap();

        let csv = std::fs::read_to_string(dir.join("concentrations.csv")).unwrap();
        assert!(csv.starts_with("TIME_HOURS,CONC_NG_ML"));
        assert_eq!(csv.lines().count(), 62); // header + 61 samples

        let json = std::fs::read_to_string(dir.join("summary.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["generated_at"].is_string());
        assert_eq!(value["estimate"]["inputs"]["drug"], "Oxycodone");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
