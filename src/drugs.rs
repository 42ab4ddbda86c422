use crate::error::{DetectError, DetectResult};
use serde::Serialize;
use std::str::FromStr;

/// Substances in the reference table. Values cover both test matrices
/// (oral fluid and urine), loaded once and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Drug {
    Fentanyl,
    Nitazenes,
    Amphetamine,
    Methamphetamine,
    Dextroamphetamine,
    Hydromorphone,
    Oxycodone,
    Morphine,
    Hydrocodone,
    Codeine,
    Pethidine,
    Barbiturates,
    Benzodiazepines,
    Alcohol,
    Lsd,
    Ketamine,
    Mescaline,
    Psilocybin,
    Dmt,
    Ghb,
    Methaqualone,
    Methadone,
    Dextropropoxyphene,
    Diamorphine,
}

/// Per-drug pharmacokinetic constants for both matrices.
#[derive(Debug, Clone, Copy)]
pub struct DrugProfile {
    /// Apparent half-life in oral fluid (hours).
    pub half_life_saliva: f64,
    /// Apparent half-life in urine (hours).
    pub half_life_urine: f64,
    /// Assay cutoff in oral fluid (ng/mL).
    pub cutoff_saliva: f64,
    /// Assay cutoff in urine (ng/mL).
    pub cutoff_urine: f64,
    /// Typical repeat-dose spacing (hours).
    pub dosing_interval: f64,
    /// Display-only description of the detected analytes.
    pub metabolite_info: &'static str,
}

impl Drug {
    pub const ALL: [Drug; 24] = [
        Drug::Fentanyl,
        Drug::Nitazenes,
        Drug::Amphetamine,
        Drug::Methamphetamine,
        Drug::Dextroamphetamine,
        Drug::Hydromorphone,
        Drug::Oxycodone,
        Drug::Morphine,
        Drug::Hydrocodone,
        Drug::Codeine,
        Drug::Pethidine,
        Drug::Barbiturates,
        Drug::Benzodiazepines,
        Drug::Alcohol,
        Drug::Lsd,
        Drug::Ketamine,
        Drug::Mescaline,
        Drug::Psilocybin,
        Drug::Dmt,
        Drug::Ghb,
        Drug::Methaqualone,
        Drug::Methadone,
        Drug::Dextropropoxyphene,
        Drug::Diamorphine,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Drug::Fentanyl => "FENTANYL",
            Drug::Nitazenes => "NITAZENES",
            Drug::Amphetamine => "AMPHETAMINE",
            Drug::Methamphetamine => "METHAMPHETAMINE",
            Drug::Dextroamphetamine => "DEXTROAMPHETAMINE",
            Drug::Hydromorphone => "HYDROMORPHONE",
            Drug::Oxycodone => "OXYCODONE",
            Drug::Morphine => "MORPHINE",
            Drug::Hydrocodone => "HYDROCODONE",
            Drug::Codeine => "CODEINE",
            Drug::Pethidine => "PETHIDINE",
            Drug::Barbiturates => "BARBITURATES",
            Drug::Benzodiazepines => "BENZODIAZEPINES",
            Drug::Alcohol => "ALCOHOL",
            Drug::Lsd => "LSD",
            Drug::Ketamine => "KETAMINE",
            Drug::Mescaline => "MESCALINE",
            Drug::Psilocybin => "PSILOCYBIN",
            Drug::Dmt => "DMT",
            Drug::Ghb => "GHB",
            Drug::Methaqualone => "METHAQUALONE",
            Drug::Methadone => "METHADONE",
            Drug::Dextropropoxyphene => "DEXTROPROPOXYPHENE",
            Drug::Diamorphine => "DIAMORPHINE",
        }
    }

    pub fn profile(self) -> DrugProfile {
        match self {
            Drug::Fentanyl => DrugProfile {
                half_life_saliva: 7.0,
                half_life_urine: 20.0,
                cutoff_saliva: 1.0,
                cutoff_urine: 2.0,
                dosing_interval: 4.0,
                metabolite_info: "Parent drug + norfentanyl",
            },
            Drug::Nitazenes => DrugProfile {
                half_life_saliva: 8.0,
                half_life_urine: 24.0,
                cutoff_saliva: 0.5,
                cutoff_urine: 1.0,
                dosing_interval: 6.0,
                metabolite_info: "Parent drug + hydroxy metabolites",
            },
            Drug::Amphetamine => DrugProfile {
                half_life_saliva: 8.0,
                half_life_urine: 30.0,
                cutoff_saliva: 50.0,
                cutoff_urine: 500.0,
                dosing_interval: 12.0,
                metabolite_info: "Unchanged drug (80%) + metabolites",
            },
            Drug::Methamphetamine => DrugProfile {
                half_life_saliva: 12.0,
                half_life_urine: 36.0,
                cutoff_saliva: 50.0,
                cutoff_urine: 500.0,
                dosing_interval: 8.0,
                metabolite_info: "Parent drug + amphetamine metabolite",
            },
            Drug::Dextroamphetamine => DrugProfile {
                half_life_saliva: 9.0,
                half_life_urine: 32.0,
                cutoff_saliva: 50.0,
                cutoff_urine: 500.0,
                dosing_interval: 12.0,
                metabolite_info: "Unchanged drug + hydroxylated metabolites",
            },
            Drug::Hydromorphone => DrugProfile {
                half_life_saliva: 3.0,
                half_life_urine: 11.0,
                cutoff_saliva: 1.0,
                cutoff_urine: 10.0,
                dosing_interval: 4.0,
                metabolite_info: "Parent drug + hydromorphone-3-glucuronide",
            },
            Drug::Oxycodone => DrugProfile {
                half_life_saliva: 4.5,
                half_life_urine: 19.0,
                cutoff_saliva: 5.0,
                cutoff_urine: 100.0,
                dosing_interval: 6.0,
                metabolite_info: "Parent drug + oxymorphone + glucuronides",
            },
            Drug::Morphine => DrugProfile {
                half_life_saliva: 3.5,
                half_life_urine: 15.0,
                cutoff_saliva: 10.0,
                cutoff_urine: 300.0,
                dosing_interval: 4.0,
                metabolite_info: "Parent drug + morphine-3-glucuronide + M6G",
            },
            Drug::Hydrocodone => DrugProfile {
                half_life_saliva: 4.0,
                half_life_urine: 18.0,
                cutoff_saliva: 5.0,
                cutoff_urine: 100.0,
                dosing_interval: 6.0,
                metabolite_info: "Parent drug + hydromorphone + glucuronides",
            },
            Drug::Codeine => DrugProfile {
                half_life_saliva: 3.0,
                half_life_urine: 12.0,
                cutoff_saliva: 10.0,
                cutoff_urine: 300.0,
                dosing_interval: 6.0,
                metabolite_info: "Parent drug + morphine + norcodeine",
            },
            Drug::Pethidine => DrugProfile {
                half_life_saliva: 4.0,
                half_life_urine: 16.0,
                cutoff_saliva: 25.0,
                cutoff_urine: 200.0,
                dosing_interval: 6.0,
                metabolite_info: "Parent drug + norpethidine",
            },
            Drug::Barbiturates => DrugProfile {
                half_life_saliva: 120.0,
                half_life_urine: 240.0,
                cutoff_saliva: 50.0,
                cutoff_urine: 200.0,
                dosing_interval: 24.0,
                metabolite_info: "Parent drugs + hydroxylated metabolites",
            },
            Drug::Benzodiazepines => DrugProfile {
                half_life_saliva: 72.0,
                half_life_urine: 168.0,
                cutoff_saliva: 10.0,
                cutoff_urine: 200.0,
                dosing_interval: 24.0,
                metabolite_info: "Parent drugs + oxazepam + glucuronides",
            },
            Drug::Alcohol => DrugProfile {
                half_life_saliva: 1.0,
                half_life_urine: 2.0,
                cutoff_saliva: 25.0,
                cutoff_urine: 100.0,
                dosing_interval: 2.0,
                metabolite_info: "Ethanol + EtG (up to 80 hours urine)",
            },
            Drug::Lsd => DrugProfile {
                half_life_saliva: 5.0,
                half_life_urine: 8.0,
                cutoff_saliva: 0.5,
                cutoff_urine: 0.5,
                dosing_interval: 12.0,
                metabolite_info: "Parent drug + iso-LSD + nor-LSD",
            },
            Drug::Ketamine => DrugProfile {
                half_life_saliva: 3.5,
                half_life_urine: 14.0,
                cutoff_saliva: 25.0,
                cutoff_urine: 100.0,
                dosing_interval: 4.0,
                metabolite_info: "Parent drug + norketamine + dehydronorketamine",
            },
            Drug::Mescaline => DrugProfile {
                half_life_saliva: 8.0,
                half_life_urine: 36.0,
                cutoff_saliva: 25.0,
                cutoff_urine: 100.0,
                dosing_interval: 12.0,
                metabolite_info: "Parent drug + 3,4,5-trimethoxyphenylacetic acid",
            },
            Drug::Psilocybin => DrugProfile {
                half_life_saliva: 3.0,
                half_life_urine: 13.0,
                cutoff_saliva: 1.0,
                cutoff_urine: 10.0,
                dosing_interval: 8.0,
                metabolite_info: "Psilocin (active metabolite) + glucuronide",
            },
            Drug::Dmt => DrugProfile {
                half_life_saliva: 0.5,
                half_life_urine: 2.0,
                cutoff_saliva: 1.0,
                cutoff_urine: 10.0,
                dosing_interval: 1.0,
                metabolite_info: "Indole-3-acetic acid + 6-hydroxyindole-3-acetic acid",
            },
            Drug::Ghb => DrugProfile {
                half_life_saliva: 1.0,
                half_life_urine: 6.0,
                cutoff_saliva: 5.0,
                cutoff_urine: 10.0,
                dosing_interval: 2.0,
                metabolite_info: "Parent drug (endogenous levels present)",
            },
            Drug::Methaqualone => DrugProfile {
                half_life_saliva: 36.0,
                half_life_urine: 72.0,
                cutoff_saliva: 25.0,
                cutoff_urine: 200.0,
                dosing_interval: 12.0,
                metabolite_info: "Parent drug + hydroxylated metabolites",
            },
            Drug::Methadone => DrugProfile {
                half_life_saliva: 48.0,
                half_life_urine: 86.0,
                cutoff_saliva: 25.0,
                cutoff_urine: 200.0,
                dosing_interval: 24.0,
                metabolite_info: "Parent drug + EDDP + EMDP metabolites",
            },
            Drug::Dextropropoxyphene => DrugProfile {
                half_life_saliva: 18.0,
                half_life_urine: 48.0,
                cutoff_saliva: 10.0,
                cutoff_urine: 300.0,
                dosing_interval: 8.0,
                metabolite_info: "Parent drug + norpropoxyphene",
            },
            Drug::Diamorphine => DrugProfile {
                half_life_saliva: 8.0,
                half_life_urine: 24.0,
                cutoff_saliva: 2.0,
                cutoff_urine: 10.0,
                dosing_interval: 4.0,
                metabolite_info: "6-MAM (specific) + morphine + morphine glucuronides",
            },
        }
    }

    /// Amphetamine-type stimulants.
    pub fn is_amphetamine_class(self) -> bool {
        matches!(
            self,
            Drug::Amphetamine | Drug::Methamphetamine | Drug::Dextroamphetamine
        )
    }

    /// Opioids sharing the intravenous/intranasal route overrides.
    pub fn is_opioid_class(self) -> bool {
        matches!(
            self,
            Drug::Hydromorphone
                | Drug::Oxycodone
                | Drug::Morphine
                | Drug::Hydrocodone
                | Drug::Codeine
                | Drug::Pethidine
                | Drug::Methadone
                | Drug::Diamorphine
        )
    }

    /// Psychedelic block for route overrides. Ketamine sits inside this
    /// block and additionally carries its own route rules.
    pub fn is_psychedelic_class(self) -> bool {
        matches!(
            self,
            Drug::Lsd | Drug::Ketamine | Drug::Mescaline | Drug::Psilocybin | Drug::Dmt
        )
    }

    /// Morphinan-skeleton opioids sharing one NMR peak set.
    pub fn is_morphine_class(self) -> bool {
        matches!(
            self,
            Drug::Morphine
                | Drug::Hydromorphone
                | Drug::Oxycodone
                | Drug::Hydrocodone
                | Drug::Codeine
                | Drug::Diamorphine
        )
    }
}

impl FromStr for Drug {
    type Err = DetectError;

    /// Case-insensitive lookup over the canonical names plus common
    /// synonyms (heroin, ethanol, meperidine, propoxyphene).
    fn from_str(s: &str) -> DetectResult<Self> {
        let name = s.trim().to_uppercase();

        for drug in Drug::ALL {
            if name == drug.name() {
                return Ok(drug);
            }
        }

        match name.as_str() {
            "MEPERIDINE" => Ok(Drug::Pethidine),
            "ETHANOL" => Ok(Drug::Alcohol),
            "PROPOXYPHENE" => Ok(Drug::Dextropropoxyphene),
            "HEROIN" => Ok(Drug::Diamorphine),
            _ => Err(DetectError::UnknownDrug(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name_resolution() {
        assert_eq!("fentanyl".parse::<Drug>().unwrap(), Drug::Fentanyl);
        assert_eq!("METHADONE".parse::<Drug>().unwrap(), Drug::Methadone);
        assert_eq!(" lsd ".parse::<Drug>().unwrap(), Drug::Lsd);
    }

    #[test]
    fn test_alias_resolution() {
        assert_eq!("heroin".parse::<Drug>().unwrap(), Drug::Diamorphine);
        assert_eq!("Meperidine".parse::<Drug>().unwrap(), Drug::Pethidine);
        assert_eq!("ethanol".parse::<Drug>().unwrap(), Drug::Alcohol);
        assert_eq!(
            "propoxyphene".parse::<Drug>().unwrap(),
            Drug::Dextropropoxyphene
        );
    }

    #[test]
    fn test_unknown_drug_rejected() {
        assert!(matches!(
            "cannabis".parse::<Drug>(),
            Err(DetectError::UnknownDrug(_))
        ));
    }

    #[test]
    fn test_profiles_are_well_formed() {
        for drug in Drug::ALL {
            let p = drug.profile();
            assert!(p.half_life_saliva > 0.0, "{}", drug.name());
            assert!(p.half_life_urine > 0.0, "{}", drug.name());
            assert!(p.cutoff_saliva > 0.0, "{}", drug.name());
            assert!(p.cutoff_urine > 0.0, "{}", drug.name());
            assert!(p.dosing_interval > 0.0, "{}", drug.name());
            // Urine keeps the analyte around at least as long as saliva
            assert!(p.half_life_urine >= p.half_life_saliva, "{}", drug.name());
        }
    }

    #[test]
    fn test_ketamine_is_in_the_psychedelic_block() {
        assert!(Drug::Ketamine.is_psychedelic_class());
        assert!(!Drug::Ghb.is_psychedelic_class());
    }
}
