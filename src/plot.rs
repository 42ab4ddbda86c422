use crate::pk::{self, LN2};
use std::fmt::Write;

/// Chart geometry. 61 samples over the time axis, one row per sample.
pub const SAMPLES: usize = 61;
pub const PLOT_WIDTH: usize = 119;

/// Concentration marks below this floor are not plotted.
const PLOT_FLOOR: f64 = 1e-3;

/// Inputs for the saliva concentration-vs-time chart.
#[derive(Debug, Clone, Copy)]
pub struct CurveParams {
    pub elimination_rate: f64,
    pub cutoff: f64,
    pub half_life: f64,
    pub duration_hours: f64,
    pub dosing_interval: f64,
    pub single_dose_conc: f64,
    pub absorption_rate: f64,
}

#[derive(Debug, Clone)]
pub struct CurveSamples {
    pub times: Vec<f64>,
    pub conc: Vec<f64>,
    pub tmax: f64,
    pub dt: f64,
    /// Peak of the sampled curve, before display scaling.
    pub peak: f64,
}

/// Outcome of scanning the sampled curve against the cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveAnalysis {
    /// Last sample still above the cutoff, in hours.
    Clears { non_detection_hours: f64, peak: f64 },
    /// The curve never reaches the cutoff.
    BelowCutoff { peak: f64 },
}

/// Superpose every administered dose at 61 evenly spaced times.
///
/// Each dose contributes absorption-limited uptake (slow routes) or an
/// instantaneous step (IV-like routes), decayed by first-order
/// elimination since administration; once dosing stops the whole
/// sample decays further from the end of the period.
pub fn sample_curve(p: &CurveParams) -> CurveSamples {
    // Extend past the dosing period far enough to show elimination.
    let tmax = (p.duration_hours + 8.0 * p.half_life).max(24.0);
    let dt = tmax / (SAMPLES as f64 - 1.0);

    let ka = (LN2 / p.absorption_rate).max(0.1);
    let doses = pk::dose_times(p.duration_hours, p.dosing_interval);

    let mut times = Vec::with_capacity(SAMPLES);
    let mut conc = Vec::with_capacity(SAMPLES);
    let mut peak: f64 = 0.0;

    for i in 0..SAMPLES {
        let t = i as f64 * dt;
        let mut c = 0.0;

        for &dose_time in &doses {
            if t >= dose_time {
                let since_dose = t - dose_time;
                let absorbed = if p.absorption_rate < 0.5 {
                    // Fast uptake: IV, inhalation, intranasal
                    p.single_dose_conc
                } else {
                    p.single_dose_conc * (1.0 - (-ka * since_dose).exp())
                };
                c += absorbed * (-p.elimination_rate * since_dose).exp();
            }
        }

        if t > p.duration_hours {
            c *= (-p.elimination_rate * (t - p.duration_hours)).exp();
        }

        peak = peak.max(c);
        times.push(t);
        conc.push(c);
    }

    CurveSamples {
        times,
        conc,
        tmax,
        dt,
        peak,
    }
}

/// Scan from the latest sample backwards for the last one still above
/// the cutoff.
pub fn analyze(samples: &CurveSamples, cutoff: f64) -> CurveAnalysis {
    if samples.peak > cutoff {
        let non_detection_hours = samples
            .times
            .iter()
            .zip(&samples.conc)
            .rev()
            .find(|(_, &c)| c > cutoff)
            .map(|(&t, _)| t)
            .unwrap_or(0.0);
        CurveAnalysis::Clears {
            non_detection_hours,
            peak: samples.peak,
        }
    } else {
        CurveAnalysis::BelowCutoff { peak: samples.peak }
    }
}

/// Render one chart row: time grid on every 6th row, dosing-end bar on
/// the row closest to the end of use, the concentration mark, and the
/// cutoff mark where the curve does not already sit.
fn render_row(i: usize, t: f64, c: f64, p: &CurveParams, dt: f64, cmax: f64) -> String {
    let mut row = vec![b' '; PLOT_WIDTH];

    if i % 6 == 0 {
        let mut col = 9;
        while col < PLOT_WIDTH {
            if row[col] == b' ' {
                row[col] = b'+';
            }
            col += 10;
        }
    }

    if p.duration_hours > 0.0 && (t - p.duration_hours).abs() < dt {
        let end_col = (PLOT_WIDTH as f64 * 0.1) as usize;
        if row[end_col] == b' ' {
            row[end_col] = b'|';
        }
    }

    if c > PLOT_FLOOR {
        let col = (c * (PLOT_WIDTH - 2) as f64 / cmax) as usize;
        if col < PLOT_WIDTH {
            row[col] = b'*';
        }
    }

    let cutoff_col = (p.cutoff * (PLOT_WIDTH - 2) as f64 / cmax) as usize;
    if cutoff_col < PLOT_WIDTH && row[cutoff_col] != b'*' {
        row[cutoff_col] = b'-';
    }

    String::from_utf8(row).expect("chart rows are ASCII")
}

/// Full chart block: header, 61 rows, legend, and the trailing
/// detection analysis.
pub fn render_chart(p: &CurveParams) -> String {
    let samples = sample_curve(p);
    let num_doses = pk::dose_count(p.duration_hours, p.dosing_interval);

    // Display scale keeps the cutoff mark inside the frame even when
    // the curve stays low.
    let cmax = samples.peak.max(p.cutoff * 2.0).max(1.0);

    let mut out = String::new();
    out.push_str(
        "====================================================================\n",
    );
    out.push_str("  SALIVA CONCENTRATION vs TIME WITH ACCUMULATION\n");
    out.push_str("       (INCLUDES CHRONIC USE BUILD-UP EFFECTS)\n");
    out.push_str("       (ADJUSTED FOR ROUTE OF ADMINISTRATION)\n");
    out.push_str(
        "====================================================================\n\n",
    );

    let _ = writeln!(out, "Time range: 0 to {:.1} hours", samples.tmax);
    let _ = writeln!(out, "Maximum concentration: {:.2} ng/mL", cmax);
    let _ = writeln!(out, "Cutoff level: {:.2} ng/mL", p.cutoff);
    let _ = writeln!(
        out,
        "Dosing period: {:.1} hours ({} doses)\n",
        p.duration_hours, num_doses
    );

    for i in 0..SAMPLES {
        out.push_str(&render_row(
            i,
            samples.times[i],
            samples.conc[i],
            p,
            samples.dt,
            cmax,
        ));
        out.push('\n');
    }

    out.push_str("\nLEGEND: * = CONCENTRATION CURVE\n");
    out.push_str("        - = DETECTION CUTOFF THRESHOLD\n");
    let _ = writeln!(
        out,
        "        + = TIME GRID MARKERS (every {:.1} hrs)",
        samples.tmax / 10.0
    );
    out.push_str("        | = END OF DOSING PERIOD\n\n");

    match analyze(&samples, p.cutoff) {
        CurveAnalysis::Clears {
            non_detection_hours,
            peak,
        } => {
            let _ = writeln!(
                out,
                "ANALYSIS: Time to non-detection = {:.1} hours ({:.1} days)",
                non_detection_hours,
                non_detection_hours / 24.0
            );
            let _ = writeln!(out, "          Peak concentration = {:.2} ng/mL", peak);
            let _ = writeln!(
                out,
                "          Dosing duration = {:.1} hours ({:.1} days)",
                p.duration_hours,
                p.duration_hours / 24.0
            );
            let _ = writeln!(
                out,
                "          Absorption rate = {:.2} hours",
                p.absorption_rate
            );
            let _ = writeln!(
                out,
                "          Elimination half-life = {:.1} hours\n",
                p.half_life
            );
        }
        CurveAnalysis::BelowCutoff { peak } => {
            let _ = writeln!(
                out,
                "ANALYSIS: Peak concentration ({:.2} ng/mL) below cutoff",
                peak
            );
            out.push_str("          No detection expected with these parameters\n\n");
        }
    }

    out
}
