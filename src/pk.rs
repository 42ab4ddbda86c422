use crate::drugs::{Drug, DrugProfile};
use crate::error::{DetectError, DetectResult};
use crate::routes::{Route, RouteParams};
use serde::Serialize;
use std::str::FromStr;

/// ln(2) as used throughout the half-life conversions. Kept at three
/// decimals for output compatibility with the established model.
pub const LN2: f64 = 0.693;

/// Fentanyl doses are microgram-scale; the model replaces user dosage
/// with a fixed 1000 mg reference magnitude.
pub const FENTANYL_DOSE_MG: f64 = 1000.0;

/// Near-total elimination per interval collapses the accumulation
/// series to the dose count. Tolerance preserved from the reference
/// model.
const DEGENERATE_R_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metabolism {
    Slow,
    Normal,
    Fast,
}

impl Metabolism {
    /// Direct multiplier on the elimination rate. A three-level knob,
    /// not population-calibrated.
    pub fn factor(self) -> f64 {
        match self {
            Metabolism::Slow => 0.7,
            Metabolism::Normal => 1.0,
            Metabolism::Fast => 1.4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Metabolism::Slow => "SLOW",
            Metabolism::Normal => "NORMAL",
            Metabolism::Fast => "FAST",
        }
    }
}

impl FromStr for Metabolism {
    type Err = DetectError;

    fn from_str(s: &str) -> DetectResult<Self> {
        match s.trim().to_uppercase().as_str() {
            "1" | "SLOW" => Ok(Metabolism::Slow),
            "2" | "NORMAL" => Ok(Metabolism::Normal),
            "3" | "FAST" => Ok(Metabolism::Fast),
            other => Err(DetectError::Validation(format!(
                "metabolism must be slow/normal/fast or 1/2/3, got '{}'",
                other
            ))),
        }
    }
}

/// Test matrix the estimate applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Matrix {
    Saliva,
    Urine,
}

impl Matrix {
    pub fn name(self) -> &'static str {
        match self {
            Matrix::Saliva => "SALIVA",
            Matrix::Urine => "URINE",
        }
    }
}

/// One validated run of the estimator.
#[derive(Debug, Clone, Serialize)]
pub struct Inputs {
    pub drug: Drug,
    pub route: Route,
    pub dosage_mg: u32,
    pub weight_kg: u32,
    pub age_years: u32,
    pub metabolism: Metabolism,
    pub duration_hours: f64,
}

impl Inputs {
    pub fn validate(&self) -> DetectResult<()> {
        if self.dosage_mg == 0 {
            return Err(DetectError::Validation(
                "dosage must be a positive number of mg".to_string(),
            ));
        }
        if self.weight_kg == 0 {
            return Err(DetectError::Validation(
                "body weight must be a positive number of kg".to_string(),
            ));
        }
        if !self.duration_hours.is_finite() || self.duration_hours < 0.0 {
            return Err(DetectError::Validation(
                "duration of use must be a non-negative number of hours".to_string(),
            ));
        }
        Ok(())
    }
}

/// Elimination slowing with age, as a step function.
pub fn age_factor(age_years: u32) -> f64 {
    if age_years < 35 {
        1.15
    } else if age_years < 50 {
        1.0
    } else if age_years < 65 {
        0.85
    } else {
        0.7
    }
}

/// Flip-flop correction: when absorption is slower than elimination,
/// the apparent half-life is absorption-limited and lengthens.
pub fn apparent_half_life(half_life: f64, absorption_rate: f64) -> f64 {
    if absorption_rate > half_life * LN2 {
        half_life * (1.0 + absorption_rate / (half_life * LN2))
    } else {
        half_life
    }
}

/// First-order elimination rate (per hour) from a flip-flop-corrected
/// half-life, scaled for age and metabolism class.
pub fn elimination_rate(half_life: f64, age_years: u32, metabolism: Metabolism) -> f64 {
    (LN2 / half_life) * age_factor(age_years) * metabolism.factor()
}

/// Plasma-equivalent concentration from one dose (ng/mL).
///
/// Fentanyl ignores the entered dosage in favor of the fixed reference
/// magnitude; alcohol carries an extra 0.5 unit-convention scale.
pub fn single_dose_concentration(
    drug: Drug,
    params: &RouteParams,
    dosage_mg: u32,
    weight_kg: u32,
) -> DetectResult<f64> {
    if weight_kg == 0 {
        return Err(DetectError::Validation(
            "body weight must be positive".to_string(),
        ));
    }

    let dose = if drug == Drug::Fentanyl {
        FENTANYL_DOSE_MG
    } else {
        f64::from(dosage_mg)
    };

    let mut conc = dose * params.oral_factor * params.bioavailability / f64::from(weight_kg);
    if drug == Drug::Alcohol {
        conc *= 0.5;
    }
    Ok(conc)
}

/// Number of doses taken over a usage period of regular dosing.
pub fn dose_count(duration_hours: f64, dosing_interval: f64) -> u32 {
    (duration_hours / dosing_interval).floor() as u32 + 1
}

/// Administration times for every dose in the usage period, in hours
/// from the first dose.
pub fn dose_times(duration_hours: f64, dosing_interval: f64) -> Vec<f64> {
    (0..dose_count(duration_hours, dosing_interval))
        .map(|n| f64::from(n) * dosing_interval)
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Accumulation {
    pub num_doses: u32,
    pub factor: f64,
    pub total_conc: f64,
    pub steady_state_conc: f64,
    pub buildup_percent: f64,
}

/// Multiple-dose superposition under first-order elimination.
///
/// The series is summed in terms of the fraction eliminated per
/// interval r; when r is within tolerance of 1 the closed form is
/// replaced by the dose count to avoid the vanishing denominator.
pub fn accumulate(
    single_dose_conc: f64,
    elim_rate: f64,
    dosing_interval: f64,
    duration_hours: f64,
) -> Accumulation {
    let num_doses = dose_count(duration_hours, dosing_interval);
    let retained = (-elim_rate * dosing_interval).exp();
    let r = 1.0 - retained;

    let factor = if (r - 1.0).abs() < DEGENERATE_R_TOLERANCE {
        f64::from(num_doses)
    } else {
        (1.0 - r.powf(f64::from(num_doses))) / (1.0 - r)
    };

    let total_conc = single_dose_conc * factor;
    let steady_state_conc = single_dose_conc / (1.0 - retained);
    // Finite accumulation cannot exceed the asymptote; cap rounding
    // spill at 100.
    let buildup_percent = (total_conc / steady_state_conc * 100.0).min(100.0);

    Accumulation {
        num_doses,
        factor,
        total_conc,
        steady_state_conc,
        buildup_percent,
    }
}

/// Hours until the accumulated concentration decays to the cutoff.
/// Zero when already at or below it, never negative.
pub fn detection_time_hours(total_conc: f64, cutoff: f64, elim_rate: f64) -> f64 {
    if total_conc > cutoff {
        (total_conc / cutoff).ln() / elim_rate
    } else {
        0.0
    }
}

/// Detection time decomposed for display. Days are unbounded; the
/// remaining fields stay in their natural ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeBreakdown {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeBreakdown {
    pub fn from_hours(hours: f64) -> Self {
        Self::from_seconds((hours * 3600.0) as u64)
    }

    pub fn from_seconds(total: u64) -> Self {
        TimeBreakdown {
            days: total / 86_400,
            hours: total % 86_400 / 3600,
            minutes: total % 3600 / 60,
            seconds: total % 60,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400 + self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

/// Full estimate for one matrix.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixEstimate {
    pub matrix: Matrix,
    /// Half-life after the flip-flop correction (hours).
    pub half_life_hours: f64,
    pub cutoff_ng_ml: f64,
    pub dosing_interval_hours: f64,
    pub single_dose_conc: f64,
    pub num_doses: u32,
    pub accumulation_factor: f64,
    pub total_conc: f64,
    pub elimination_rate: f64,
    pub steady_state_conc: f64,
    pub buildup_percent: f64,
    pub detection_time_hours: f64,
    pub detection_time: TimeBreakdown,
}

/// Result of a complete run: both matrices plus the resolved route
/// parameters that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionEstimate {
    pub inputs: Inputs,
    pub route_params: RouteParams,
    pub saliva: MatrixEstimate,
    pub urine: MatrixEstimate,
    pub metabolite_info: &'static str,
}

fn estimate_matrix(
    matrix: Matrix,
    profile: &DrugProfile,
    params: &RouteParams,
    inputs: &Inputs,
) -> DetectResult<MatrixEstimate> {
    let (base_half_life, cutoff) = match matrix {
        Matrix::Saliva => (profile.half_life_saliva, profile.cutoff_saliva),
        Matrix::Urine => (profile.half_life_urine, profile.cutoff_urine),
    };

    let half_life = apparent_half_life(base_half_life, params.absorption_rate);
    let elim_rate = elimination_rate(half_life, inputs.age_years, inputs.metabolism);
    let single =
        single_dose_concentration(inputs.drug, params, inputs.dosage_mg, inputs.weight_kg)?;
    let acc = accumulate(
        single,
        elim_rate,
        profile.dosing_interval,
        inputs.duration_hours,
    );
    let detection_hours = detection_time_hours(acc.total_conc, cutoff, elim_rate);

    Ok(MatrixEstimate {
        matrix,
        half_life_hours: half_life,
        cutoff_ng_ml: cutoff,
        dosing_interval_hours: profile.dosing_interval,
        single_dose_conc: single,
        num_doses: acc.num_doses,
        accumulation_factor: acc.factor,
        total_conc: acc.total_conc,
        elimination_rate: elim_rate,
        steady_state_conc: acc.steady_state_conc,
        buildup_percent: acc.buildup_percent,
        detection_time_hours: detection_hours,
        detection_time: TimeBreakdown::from_hours(detection_hours),
    })
}

/// Run the whole pipeline for validated inputs: route adjustment, then
/// per-matrix dose response, accumulation, and detection-time solve.
pub fn estimate(inputs: &Inputs) -> DetectResult<DetectionEstimate> {
    inputs.validate()?;

    let profile = inputs.drug.profile();
    let params = RouteParams::resolve(inputs.drug, inputs.route);

    let saliva = estimate_matrix(Matrix::Saliva, &profile, &params, inputs)?;
    let urine = estimate_matrix(Matrix::Urine, &profile, &params, inputs)?;

    Ok(DetectionEstimate {
        inputs: inputs.clone(),
        route_params: params,
        saliva,
        urine,
        metabolite_info: profile.metabolite_info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn base_inputs() -> Inputs {
        Inputs {
            drug: Drug::Morphine,
            route: Route::Oral,
            dosage_mg: 60,
            weight_kg: 70,
            age_years: 40,
            metabolism: Metabolism::Normal,
            duration_hours: 24.0,
        }
    }

    #[test]
    fn test_age_factor_steps() {
        assert_relative_eq!(age_factor(20), 1.15);
        assert_relative_eq!(age_factor(35), 1.0);
        assert_relative_eq!(age_factor(49), 1.0);
        assert_relative_eq!(age_factor(50), 0.85);
        assert_relative_eq!(age_factor(64), 0.85);
        assert_relative_eq!(age_factor(65), 0.7);
        assert_relative_eq!(age_factor(90), 0.7);
    }

    #[test]
    fn test_metabolism_parsing() {
        assert_eq!("slow".parse::<Metabolism>().unwrap(), Metabolism::Slow);
        assert_eq!("2".parse::<Metabolism>().unwrap(), Metabolism::Normal);
        assert_eq!("FAST".parse::<Metabolism>().unwrap(), Metabolism::Fast);
        assert!("medium".parse::<Metabolism>().is_err());
    }

    #[test]
    fn test_flip_flop_lengthens_half_life() {
        // Transdermal fentanyl: 12 h absorption against a 7 h half-life
        let hl = apparent_half_life(7.0, 12.0);
        assert_relative_eq!(hl, 7.0 * (1.0 + 12.0 / (7.0 * LN2)), epsilon = 1e-12);
        assert!(hl > 7.0);

        // IV absorption is faster than elimination; no correction
        assert_relative_eq!(apparent_half_life(7.0, 0.1), 7.0);
    }

    #[test]
    fn test_single_dose_weight_monotonicity() {
        let params = RouteParams::resolve(Drug::Morphine, Route::Oral);
        let light = single_dose_concentration(Drug::Morphine, &params, 60, 50).unwrap();
        let heavy = single_dose_concentration(Drug::Morphine, &params, 60, 100).unwrap();
        assert!(light > heavy);
        assert_relative_eq!(light / heavy, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fentanyl_dose_constant_overrides_input() {
        let params = RouteParams::resolve(Drug::Fentanyl, Route::Intravenous);
        let a = single_dose_concentration(Drug::Fentanyl, &params, 1, 70).unwrap();
        let b = single_dose_concentration(Drug::Fentanyl, &params, 500, 70).unwrap();
        assert_relative_eq!(a, b);
        assert_relative_eq!(
            a,
            FENTANYL_DOSE_MG * params.oral_factor * params.bioavailability / 70.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_alcohol_unit_convention_scale() {
        let params = RouteParams::resolve(Drug::Alcohol, Route::Oral);
        let conc = single_dose_concentration(Drug::Alcohol, &params, 100, 80).unwrap();
        assert_relative_eq!(
            conc,
            100.0 * params.oral_factor * params.bioavailability * 0.5 / 80.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_zero_weight_rejected() {
        let params = RouteParams::resolve(Drug::Morphine, Route::Oral);
        assert!(single_dose_concentration(Drug::Morphine, &params, 60, 0).is_err());
    }

    #[test]
    fn test_accumulation_closed_form() {
        // rate 0.1/h, 8 h interval, 3 doses: factor = 1 + r + r^2
        let acc = accumulate(1.0, 0.1, 8.0, 16.0);
        assert_eq!(acc.num_doses, 3);
        let r = 1.0 - (-0.8f64).exp();
        assert_relative_eq!(acc.factor, 1.0 + r + r * r, epsilon = 1e-9);
        assert_relative_eq!(acc.factor, 1.853, epsilon = 1e-3);
    }

    #[test]
    fn test_accumulation_degenerate_branch() {
        // Near-total elimination per interval: the series collapses to
        // the dose count.
        let acc = accumulate(1.0526, 5.74, 4.0, 48.0);
        assert_eq!(acc.num_doses, 13);
        assert_relative_eq!(acc.factor, 13.0);
        assert_relative_eq!(acc.total_conc, 13.68, epsilon = 1e-2);
    }

    #[test]
    fn test_accumulation_monotonic_in_duration() {
        let mut last_factor = 0.0;
        let mut last_total = 0.0;
        for duration in [0.0, 8.0, 16.0, 24.0, 48.0, 96.0, 240.0] {
            let acc = accumulate(2.0, 0.05, 8.0, duration);
            assert!(acc.factor >= last_factor);
            assert!(acc.total_conc >= last_total);
            last_factor = acc.factor;
            last_total = acc.total_conc;
        }
    }

    #[test]
    fn test_buildup_percent_bounded() {
        for rate in [0.01, 0.1, 1.0, 5.0] {
            for duration in [0.0, 4.0, 24.0, 240.0, 2400.0] {
                let acc = accumulate(3.0, rate, 6.0, duration);
                assert!(acc.buildup_percent >= 0.0);
                assert!(acc.buildup_percent <= 100.0);
            }
        }
    }

    #[test]
    fn test_detection_time_zero_at_or_below_cutoff() {
        assert_relative_eq!(detection_time_hours(5.0, 5.0, 0.1), 0.0);
        assert_relative_eq!(detection_time_hours(1.0, 5.0, 0.1), 0.0);
        assert!(detection_time_hours(5.01, 5.0, 0.1) > 0.0);
    }

    #[test]
    fn test_detection_time_scenario_against_ten_ng_ml() {
        // 13 accumulated 1.0526 ng/mL doses at a 5.74/h elimination
        // rate clear a 10 ng/mL cutoff in about 197 seconds.
        let acc = accumulate(1.0526, 5.74, 4.0, 48.0);
        let hours = detection_time_hours(acc.total_conc, 10.0, 5.74);
        let seconds = hours * 3600.0;
        assert!((seconds - 197.0).abs() < 2.0, "got {seconds}");
    }

    #[test]
    fn test_diamorphine_iv_table_resolution() {
        let inputs = Inputs {
            drug: Drug::Diamorphine,
            route: Route::Intravenous,
            dosage_mg: 1000,
            weight_kg: 76,
            age_years: 28,
            metabolism: Metabolism::Fast,
            duration_hours: 48.0,
        };
        let est = estimate(&inputs).unwrap();

        assert_relative_eq!(est.route_params.bioavailability, 1.0);
        assert_relative_eq!(est.route_params.oral_factor, 0.08);
        assert_relative_eq!(est.saliva.single_dose_conc, 1000.0 * 0.08 / 76.0, epsilon = 1e-9);
        assert_relative_eq!(est.saliva.single_dose_conc, 1.0526, epsilon = 1e-3);
        assert_eq!(est.saliva.num_doses, 13);
    }

    #[test]
    fn test_time_breakdown_round_trip() {
        for total in [0u64, 59, 60, 3599, 3600, 86_399, 86_400, 123_456_789] {
            let td = TimeBreakdown::from_seconds(total);
            assert_eq!(td.total_seconds(), total);
            assert!(td.hours < 24);
            assert!(td.minutes < 60);
            assert!(td.seconds < 60);
        }
    }

    #[test]
    fn test_dose_times_match_count() {
        let times = dose_times(48.0, 4.0);
        assert_eq!(times.len() as u32, dose_count(48.0, 4.0));
        assert_relative_eq!(times[0], 0.0);
        assert_relative_eq!(*times.last().unwrap(), 48.0);
    }

    #[test]
    fn test_estimate_covers_both_matrices() {
        let est = estimate(&base_inputs()).unwrap();
        assert_eq!(est.saliva.matrix, Matrix::Saliva);
        assert_eq!(est.urine.matrix, Matrix::Urine);
        // Urine half-life is longer, so its elimination is slower
        assert!(est.urine.elimination_rate < est.saliva.elimination_rate);
        assert!(est.saliva.total_conc >= 0.0);
        assert!(est.urine.total_conc >= 0.0);
    }

    #[test]
    fn test_estimate_rejects_invalid_inputs() {
        let mut inputs = base_inputs();
        inputs.dosage_mg = 0;
        assert!(estimate(&inputs).is_err());

        let mut inputs = base_inputs();
        inputs.weight_kg = 0;
        assert!(estimate(&inputs).is_err());

        let mut inputs = base_inputs();
        inputs.duration_hours = -1.0;
        assert!(estimate(&inputs).is_err());
    }
}
