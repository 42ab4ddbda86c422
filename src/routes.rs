use crate::drugs::Drug;
use crate::error::{DetectError, DetectResult};
use serde::Serialize;
use std::str::FromStr;

/// Routes of administration in the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Route {
    Oral,
    Intravenous,
    Intramuscular,
    Subcutaneous,
    Intranasal,
    Inhalation,
    Sublingual,
    Transdermal,
    Rectal,
    Buccal,
    Topical,
}

/// Base absorption constants for a route, before drug-specific
/// adjustment.
#[derive(Debug, Clone, Copy)]
pub struct RouteProfile {
    /// Fraction of the dose reaching systemic circulation, (0, 1].
    pub bioavailability: f64,
    /// Absorption half-time (hours). Small values mean near-instant
    /// uptake; large values mean sustained release.
    pub absorption_rate: f64,
    /// Dimensionless dose-to-concentration transfer factor.
    pub oral_factor: f64,
}

/// Route parameters after the drug-specific override rules have been
/// applied. Always a local copy; the shared profile table is never
/// written back.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RouteParams {
    pub bioavailability: f64,
    pub absorption_rate: f64,
    pub oral_factor: f64,
}

impl Route {
    pub const ALL: [Route; 11] = [
        Route::Oral,
        Route::Intravenous,
        Route::Intramuscular,
        Route::Subcutaneous,
        Route::Intranasal,
        Route::Inhalation,
        Route::Sublingual,
        Route::Transdermal,
        Route::Rectal,
        Route::Buccal,
        Route::Topical,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Route::Oral => "ORAL",
            Route::Intravenous => "INTRAVENOUS",
            Route::Intramuscular => "INTRAMUSCULAR",
            Route::Subcutaneous => "SUBCUTANEOUS",
            Route::Intranasal => "INTRANASAL",
            Route::Inhalation => "INHALATION",
            Route::Sublingual => "SUBLINGUAL",
            Route::Transdermal => "TRANSDERMAL",
            Route::Rectal => "RECTAL",
            Route::Buccal => "BUCCAL",
            Route::Topical => "TOPICAL",
        }
    }

    pub fn profile(self) -> RouteProfile {
        match self {
            Route::Oral => RouteProfile {
                bioavailability: 0.7,
                absorption_rate: 1.5,
                oral_factor: 0.01,
            },
            Route::Intravenous => RouteProfile {
                bioavailability: 1.0,
                absorption_rate: 0.1,
                oral_factor: 0.05,
            },
            Route::Intramuscular => RouteProfile {
                bioavailability: 0.9,
                absorption_rate: 0.5,
                oral_factor: 0.03,
            },
            Route::Subcutaneous => RouteProfile {
                bioavailability: 0.8,
                absorption_rate: 0.8,
                oral_factor: 0.025,
            },
            Route::Intranasal => RouteProfile {
                bioavailability: 0.6,
                absorption_rate: 0.3,
                oral_factor: 0.02,
            },
            Route::Inhalation => RouteProfile {
                bioavailability: 0.9,
                absorption_rate: 0.1,
                oral_factor: 0.04,
            },
            Route::Sublingual => RouteProfile {
                bioavailability: 0.8,
                absorption_rate: 0.5,
                oral_factor: 0.02,
            },
            Route::Transdermal => RouteProfile {
                bioavailability: 0.9,
                absorption_rate: 4.0,
                oral_factor: 0.015,
            },
            Route::Rectal => RouteProfile {
                bioavailability: 0.7,
                absorption_rate: 1.0,
                oral_factor: 0.015,
            },
            Route::Buccal => RouteProfile {
                bioavailability: 0.75,
                absorption_rate: 0.8,
                oral_factor: 0.025,
            },
            Route::Topical => RouteProfile {
                bioavailability: 0.1,
                absorption_rate: 8.0,
                oral_factor: 0.005,
            },
        }
    }
}

impl RouteParams {
    /// Resolve the effective route parameters for a drug/route pair.
    ///
    /// Rules run in a fixed order over a local copy: drug-specific
    /// overrides first, in table order, then the universal topical
    /// restriction last. Several rules may touch the same pair, so the
    /// order is load-bearing and must not be reshuffled.
    pub fn resolve(drug: Drug, route: Route) -> Self {
        let base = route.profile();
        let mut p = RouteParams {
            bioavailability: base.bioavailability,
            absorption_rate: base.absorption_rate,
            oral_factor: base.oral_factor,
        };

        // Alcohol: parenteral routes are atypical; vapor is highly
        // bioavailable.
        if drug == Drug::Alcohol {
            if matches!(
                route,
                Route::Intravenous | Route::Intramuscular | Route::Subcutaneous
            ) {
                p.bioavailability *= 0.1;
            }
            if route == Route::Inhalation {
                p.bioavailability = 0.95;
                p.absorption_rate = 0.05;
            }
        }

        // Fentanyl: transdermal patches run sustained-release kinetics.
        if drug == Drug::Fentanyl {
            if route == Route::Transdermal {
                p.absorption_rate = 12.0;
                p.bioavailability = 0.92;
            }
            if route == Route::Sublingual {
                p.bioavailability = 0.8;
            }
        }

        // Amphetamine-type stimulants.
        if drug.is_amphetamine_class() {
            if route == Route::Intranasal {
                p.bioavailability = 0.8;
                p.absorption_rate = 0.2;
            }
            if route == Route::Inhalation {
                p.bioavailability = 0.7;
                p.absorption_rate = 0.08;
            }
        }

        // Opioids: full bioavailability intravenously.
        if drug.is_opioid_class() {
            if route == Route::Intravenous {
                p.bioavailability = 1.0;
                p.oral_factor = 0.08;
            }
            if route == Route::Intranasal {
                p.bioavailability = 0.65;
            }
        }

        // Psychedelic block: inhalation atypical except for DMT.
        if drug.is_psychedelic_class() {
            if route == Route::Inhalation && drug != Drug::Dmt {
                p.bioavailability *= 0.3;
            }
            if drug == Drug::Dmt && route == Route::Inhalation {
                p.bioavailability = 0.8;
                p.absorption_rate = 0.02;
            }
        }

        if drug == Drug::Benzodiazepines {
            if route == Route::Sublingual {
                p.bioavailability = 0.9;
                p.absorption_rate = 0.3;
            }
            if route == Route::Rectal {
                p.bioavailability = 0.8;
                p.absorption_rate = 0.5;
            }
        }

        if drug == Drug::Ketamine {
            if route == Route::Intranasal {
                p.bioavailability = 0.5;
                p.absorption_rate = 0.3;
            }
            if route == Route::Intramuscular {
                p.bioavailability = 0.93;
                p.absorption_rate = 0.3;
            }
        }

        // GHB is primarily oral.
        if drug == Drug::Ghb && route != Route::Oral {
            p.bioavailability *= 0.5;
        }

        // Universal topical restriction, applied after all drug rules.
        // Transdermal-formulated drugs are exempt.
        if route == Route::Topical && !matches!(drug, Drug::Fentanyl | Drug::Methadone) {
            p.bioavailability = 0.05;
            p.oral_factor = 0.002;
        }

        p
    }
}

impl FromStr for Route {
    type Err = DetectError;

    /// Case-insensitive lookup over canonical names plus clinical
    /// abbreviations and street synonyms.
    fn from_str(s: &str) -> DetectResult<Self> {
        let name = s.trim().to_uppercase();

        for route in Route::ALL {
            if name == route.name() {
                return Ok(route);
            }
        }

        match name.as_str() {
            "IV" | "I.V." | "I.V" | "INJECTION" => Ok(Route::Intravenous),
            "IM" | "I.M." | "I.M" | "MUSCLE" => Ok(Route::Intramuscular),
            "SC" | "SQ" | "SUBQ" | "S.C." | "SUB-Q" => Ok(Route::Subcutaneous),
            "IN" | "NASAL" | "SNORT" | "SNORTING" | "NOSE" => Ok(Route::Intranasal),
            "INH" | "INHALED" | "SMOKING" | "SMOKE" | "VAPING" | "VAPE" => Ok(Route::Inhalation),
            "PO" | "P.O." | "MOUTH" | "SWALLOW" | "PILL" | "TABLET" => Ok(Route::Oral),
            "SL" | "S.L." | "UNDER TONGUE" | "SUB" => Ok(Route::Sublingual),
            "TD" | "PATCH" | "SKIN" => Ok(Route::Transdermal),
            "PR" | "P.R." | "SUPPOSITORY" => Ok(Route::Rectal),
            "BUC" | "CHEEK" => Ok(Route::Buccal),
            "TOP" | "CREAM" | "GEL" => Ok(Route::Topical),
            _ => Err(DetectError::UnknownRoute(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_abbreviation_resolution() {
        assert_eq!("iv".parse::<Route>().unwrap(), Route::Intravenous);
        assert_eq!("I.V.".parse::<Route>().unwrap(), Route::Intravenous);
        assert_eq!("SC".parse::<Route>().unwrap(), Route::Subcutaneous);
        assert_eq!("sl".parse::<Route>().unwrap(), Route::Sublingual);
        assert_eq!("smoking".parse::<Route>().unwrap(), Route::Inhalation);
        assert_eq!("patch".parse::<Route>().unwrap(), Route::Transdermal);
        assert_eq!("po".parse::<Route>().unwrap(), Route::Oral);
    }

    #[test]
    fn test_unknown_route_rejected() {
        assert!(matches!(
            "osmosis".parse::<Route>(),
            Err(DetectError::UnknownRoute(_))
        ));
    }

    #[test]
    fn test_opioid_intravenous_override() {
        let p = RouteParams::resolve(Drug::Diamorphine, Route::Intravenous);
        assert_relative_eq!(p.bioavailability, 1.0);
        assert_relative_eq!(p.oral_factor, 0.08);
        assert_relative_eq!(p.absorption_rate, 0.1);
    }

    #[test]
    fn test_fentanyl_transdermal_sustained_release() {
        let p = RouteParams::resolve(Drug::Fentanyl, Route::Transdermal);
        assert_relative_eq!(p.absorption_rate, 12.0);
        assert_relative_eq!(p.bioavailability, 0.92);
    }

    #[test]
    fn test_topical_restriction_applies_last() {
        let p = RouteParams::resolve(Drug::Morphine, Route::Topical);
        assert_relative_eq!(p.bioavailability, 0.05);
        assert_relative_eq!(p.oral_factor, 0.002);

        // Exempt drugs keep the base topical profile
        let f = RouteParams::resolve(Drug::Fentanyl, Route::Topical);
        assert_relative_eq!(f.bioavailability, 0.1);
        assert_relative_eq!(f.oral_factor, 0.005);
    }

    #[test]
    fn test_alcohol_parenteral_suppression() {
        let p = RouteParams::resolve(Drug::Alcohol, Route::Intravenous);
        assert_relative_eq!(p.bioavailability, 0.1, epsilon = 1e-9);
    }

    #[test]
    fn test_psychedelic_block_includes_ketamine() {
        // Ketamine first takes the ×0.3 block rule on inhalation
        let p = RouteParams::resolve(Drug::Ketamine, Route::Inhalation);
        assert_relative_eq!(p.bioavailability, 0.9 * 0.3, epsilon = 1e-9);

        // DMT inhalation is overridden, not suppressed
        let d = RouteParams::resolve(Drug::Dmt, Route::Inhalation);
        assert_relative_eq!(d.bioavailability, 0.8);
        assert_relative_eq!(d.absorption_rate, 0.02);
    }

    #[test]
    fn test_ghb_non_oral_halved() {
        let p = RouteParams::resolve(Drug::Ghb, Route::Intranasal);
        assert_relative_eq!(p.bioavailability, 0.3, epsilon = 1e-9);
        let o = RouteParams::resolve(Drug::Ghb, Route::Oral);
        assert_relative_eq!(o.bioavailability, 0.7);
    }

    #[test]
    fn test_resolution_never_mutates_the_table() {
        let before = Route::Intravenous.profile();
        let _ = RouteParams::resolve(Drug::Diamorphine, Route::Intravenous);
        let after = Route::Intravenous.profile();
        assert_relative_eq!(before.oral_factor, after.oral_factor);
    }
}
