use crate::drugs::Drug;
use crate::pk::{DetectionEstimate, MatrixEstimate};
use std::fmt::Write;

const RULE: &str = "====================================================================";

fn write_matrix_block(out: &mut String, est: &MatrixEstimate) {
    let _ = writeln!(out, "\nPHARMACOKINETIC DATA ({}):", est.matrix.name());
    let _ = writeln!(out, "  Half-life: {:.1} hours", est.half_life_hours);
    let _ = writeln!(out, "  Cutoff: {:.1} ng/mL", est.cutoff_ng_ml);
    let _ = writeln!(out, "  Dosing interval: {:.1} hours", est.dosing_interval_hours);
    let _ = writeln!(out, "  Number of doses: {}", est.num_doses);
    let _ = writeln!(out, "  Single dose conc: {:.2} ng/mL", est.single_dose_conc);
    let _ = writeln!(out, "  Total accum conc: {:.2} ng/mL", est.total_conc);
    let _ = writeln!(out, "  Elim rate: {:.4} /hour", est.elimination_rate);
    let _ = writeln!(out, "  Steady-state conc: {:.2} ng/mL", est.steady_state_conc);
    let _ = writeln!(out, "  Buildup to SS: {:.1}%", est.buildup_percent);
}

fn write_detection_block(out: &mut String, est: &MatrixEstimate) {
    let total_seconds = (est.detection_time_hours * 3600.0) as u64;
    let td = est.detection_time;
    let _ = writeln!(
        out,
        "\nDETECTION TIME ({}): {:.0} seconds",
        est.matrix.name(),
        est.detection_time_hours * 3600.0
    );
    let _ = writeln!(
        out,
        "EQUIVALENT TO: {} hours, {} minutes, {} seconds",
        total_seconds / 3600,
        td.minutes,
        td.seconds
    );
    let _ = writeln!(
        out,
        "FULL FORMAT: {} days, {} hours, {} minutes, {} seconds",
        td.days, td.hours, td.minutes, td.seconds
    );
}

/// Assemble the full result report: echoed inputs, both matrix blocks,
/// detection times, metabolite info, and the fixed disclaimers.
pub fn render(est: &DetectionEstimate) -> String {
    let inputs = &est.inputs;
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", RULE);
    let _ = writeln!(out, "DETECTION TIME CALCULATION FOR {}", inputs.drug.name());
    let _ = writeln!(out, "{}\n", RULE);

    out.push_str("INPUT PARAMETERS:\n");
    let _ = writeln!(out, "  Dosage: {} mg", inputs.dosage_mg);
    let _ = writeln!(out, "  Weight: {} kg", inputs.weight_kg);
    let _ = writeln!(out, "  Age: {} years", inputs.age_years);
    let _ = writeln!(out, "  Metabolism: {}", inputs.metabolism.name());
    let _ = writeln!(
        out,
        "  Duration of use: {:.1} hours ({:.2} days)",
        inputs.duration_hours,
        inputs.duration_hours / 24.0
    );
    let _ = writeln!(
        out,
        "  Route: {} (Bioavail {:.1}%, Abs rate {:.2} hr)",
        inputs.route.name(),
        est.route_params.bioavailability * 100.0,
        est.route_params.absorption_rate
    );

    if inputs.drug == Drug::Fentanyl {
        let _ = writeln!(
            out,
            "  Fentanyl dose: {:.0} mg (constant)",
            crate::pk::FENTANYL_DOSE_MG
        );
    }

    write_matrix_block(&mut out, &est.saliva);
    write_matrix_block(&mut out, &est.urine);
    write_detection_block(&mut out, &est.saliva);
    write_detection_block(&mut out, &est.urine);

    let _ = writeln!(out, "\nMETABOLITE INFO: {}", est.metabolite_info);

    out.push_str("\n** IMPORTANT DISCLAIMERS **\n");
    out.push_str("- Estimates based on population averages\n");
    out.push_str("- Individual variation can be significant\n");
    out.push_str("- Chronic use calculations are simplified\n");
    out.push_str("- Assumes regular dosing intervals\n");
    out.push_str("- Route-specific parameters are estimates\n");
    out.push_str("- For research/educational use only\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pk::{estimate, Inputs, Metabolism};
    use crate::routes::Route;

    fn sample_estimate() -> DetectionEstimate {
        estimate(&Inputs {
            drug: Drug::Diamorphine,
            route: Route::Intravenous,
            dosage_mg: 1000,
            weight_kg: 76,
            age_years: 28,
            metabolism: Metabolism::Fast,
            duration_hours: 48.0,
        })
        .unwrap()
    }

    #[test]
    fn test_report_covers_both_matrices() {
        let report = render(&sample_estimate());
        assert!(report.contains("DETECTION TIME CALCULATION FOR DIAMORPHINE"));
        assert!(report.contains("PHARMACOKINETIC DATA (SALIVA):"));
        assert!(report.contains("PHARMACOKINETIC DATA (URINE):"));
        assert!(report.contains("DETECTION TIME (SALIVA):"));
        assert!(report.contains("DETECTION TIME (URINE):"));
        assert!(report.contains("6-MAM"));
        assert!(report.contains("IMPORTANT DISCLAIMERS"));
    }

    #[test]
    fn test_report_echoes_resolved_route() {
        let report = render(&sample_estimate());
        assert!(report.contains("Route: INTRAVENOUS (Bioavail 100.0%, Abs rate 0.10 hr)"));
        assert!(report.contains("Metabolism: FAST"));
    }

    #[test]
    fn test_fentanyl_dose_constant_noted() {
        let est = estimate(&Inputs {
            drug: Drug::Fentanyl,
            route: Route::Transdermal,
            dosage_mg: 1,
            weight_kg: 80,
            age_years: 55,
            metabolism: Metabolism::Normal,
            duration_hours: 72.0,
        })
        .unwrap();
        let report = render(&est);
        assert!(report.contains("Fentanyl dose: 1000 mg (constant)"));
    }
}
