//! Run parameters read from `para.in`.
//!
//! Each non-blank line is `key value...`. Parsing stops at the first bad
//! line, so an unknown key is reported before any other input is touched.

use log::warn;

use crate::error::{ModelError, Result};
use crate::Real;

/// Every key accepted in the parameter file.
pub const VALID_KEYS: [&str; 10] = [
    "model",
    "anderson_disorder",
    "charged_impurity",
    "vacancy_disorder",
    "calculate_vac",
    "calculate_msd",
    "calculate_spin",
    "number_of_random_vectors",
    "number_of_moments",
    "energy_max",
];

/// How the Hamiltonian structure is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Explicit neighbor, position and hopping files.
    General,
    /// Unit cell expanded into a supercell.
    Lattice,
}

/// Gaussian-screened charged impurities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargedImpurityParams {
    /// Number of impurity sites.
    pub number: usize,
    /// Charges are uniform in `[-strength/2, +strength/2]`.
    pub strength: Real,
    /// Screening range ξ of `exp(-r²/2ξ²)`.
    pub range: Real,
}

/// Validated run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub model: ModelKind,
    pub anderson_disorder: Option<Real>,
    pub charged_impurity: Option<ChargedImpurityParams>,
    pub vacancy_disorder: Option<usize>,
    pub calculate_vac: bool,
    pub calculate_msd: bool,
    pub calculate_spin: bool,
    pub number_of_random_vectors: usize,
    pub number_of_moments: usize,
    pub energy_max: Real,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            model: ModelKind::General,
            anderson_disorder: None,
            charged_impurity: None,
            vacancy_disorder: None,
            calculate_vac: false,
            calculate_msd: false,
            calculate_spin: false,
            number_of_random_vectors: 1,
            number_of_moments: 1000,
            energy_max: 10.0,
        }
    }
}

/// Values that follow one key on a parameter line.
struct Line<'a> {
    key: &'a str,
    values: Vec<&'a str>,
}

impl<'a> Line<'a> {
    fn expect_count(&self, n: usize) -> Result<()> {
        if self.values.len() == n {
            Ok(())
        } else {
            Err(ModelError::config(format!(
                "'{}' takes {} value(s), got {}",
                self.key,
                n,
                self.values.len()
            )))
        }
    }

    fn value<T: std::str::FromStr>(&self, i: usize, field: &'static str) -> Result<T> {
        self.values[i].parse().map_err(|_| ModelError::Parse {
            source_name: "para.in".to_string(),
            field,
            token: self.values[i].to_string(),
        })
    }

    fn positive_real(&self, i: usize, field: &'static str) -> Result<Real> {
        let v: Real = self.value(i, field)?;
        if v > 0.0 {
            Ok(v)
        } else {
            Err(ModelError::config(format!("{field} must be positive, got {v}")))
        }
    }

    fn positive_count(&self, i: usize, field: &'static str) -> Result<usize> {
        let v: usize = self.value(i, field)?;
        if v > 0 {
            Ok(v)
        } else {
            Err(ModelError::config(format!("{field} must be positive")))
        }
    }
}

impl Parameters {
    /// Parse and validate the contents of a parameter file.
    pub fn parse(text: &str) -> Result<Self> {
        let mut params = Parameters::default();
        let mut seen: Vec<&str> = Vec::new();

        for raw in text.lines() {
            let mut tokens = raw.split_whitespace();
            let Some(key) = tokens.next() else {
                continue;
            };
            let line = Line {
                key,
                values: tokens.collect(),
            };
            params.apply(&line)?;
            if seen.contains(&key) {
                warn!("parameter '{key}' given more than once; using the last value");
            } else {
                seen.push(key);
            }
        }

        params.validate()?;
        Ok(params)
    }

    fn apply(&mut self, line: &Line) -> Result<()> {
        match line.key {
            "model" => {
                line.expect_count(1)?;
                self.model = match line.value::<i64>(0, "model")? {
                    0 => ModelKind::General,
                    1 => ModelKind::Lattice,
                    other => {
                        return Err(ModelError::config(format!(
                            "model must be 0 (general) or 1 (lattice), got {other}"
                        )))
                    }
                };
            }
            "anderson_disorder" => {
                line.expect_count(1)?;
                self.anderson_disorder = Some(line.positive_real(0, "Anderson disorder strength")?);
            }
            "charged_impurity" => {
                line.expect_count(3)?;
                self.charged_impurity = Some(ChargedImpurityParams {
                    number: line.positive_count(0, "number of charged impurities")?,
                    strength: line.positive_real(1, "charged impurity strength")?,
                    range: line.positive_real(2, "charged impurity range")?,
                });
            }
            "vacancy_disorder" => {
                line.expect_count(1)?;
                self.vacancy_disorder = Some(line.positive_count(0, "number of vacancies")?);
            }
            "calculate_vac" => {
                line.expect_count(0)?;
                self.calculate_vac = true;
            }
            "calculate_msd" => {
                line.expect_count(0)?;
                self.calculate_msd = true;
            }
            "calculate_spin" => {
                line.expect_count(0)?;
                self.calculate_spin = true;
            }
            "number_of_random_vectors" => {
                line.expect_count(1)?;
                self.number_of_random_vectors =
                    line.positive_count(0, "number of random vectors")?;
            }
            "number_of_moments" => {
                line.expect_count(1)?;
                self.number_of_moments = line.positive_count(0, "number of moments")?;
            }
            "energy_max" => {
                line.expect_count(1)?;
                self.energy_max = line.positive_real(0, "energy_max")?;
            }
            other => {
                return Err(ModelError::UnknownKey {
                    key: other.to_string(),
                    valid: VALID_KEYS.join(", "),
                })
            }
        }
        Ok(())
    }

    /// Reject feature combinations the model cannot represent.
    pub fn validate(&self) -> Result<()> {
        if self.calculate_spin && self.calculate_vac {
            return Err(ModelError::config(
                "calculate_spin cannot be combined with calculate_vac",
            ));
        }
        if self.anderson_disorder.is_some() && self.charged_impurity.is_some() {
            return Err(ModelError::config(
                "anderson_disorder and charged_impurity are mutually exclusive",
            ));
        }
        if self.model == ModelKind::General && self.has_lattice_disorder() {
            return Err(ModelError::config(
                "disorder options (anderson_disorder, charged_impurity, vacancy_disorder) \
                 require the lattice model",
            ));
        }
        Ok(())
    }

    pub fn has_lattice_disorder(&self) -> bool {
        self.anderson_disorder.is_some()
            || self.charged_impurity.is_some()
            || self.vacancy_disorder.is_some()
    }

    /// VAC and MSD are sampled on the time-step grid.
    pub fn requires_time(&self) -> bool {
        self.calculate_vac || self.calculate_msd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let p = Parameters::parse("\n   \n").unwrap();
        assert_eq!(p, Parameters::default());
        assert!(!p.requires_time());
    }

    #[test]
    fn test_full_lattice_parameters() {
        let text = "model 1\n\
                    charged_impurity 10 2.0 1.5\n\
                    vacancy_disorder 3\n\
                    calculate_msd\n\
                    number_of_random_vectors 4\n\
                    number_of_moments 500\n\
                    energy_max 3.5\n";
        let p = Parameters::parse(text).unwrap();
        assert_eq!(p.model, ModelKind::Lattice);
        assert_eq!(
            p.charged_impurity,
            Some(ChargedImpurityParams {
                number: 10,
                strength: 2.0,
                range: 1.5
            })
        );
        assert_eq!(p.vacancy_disorder, Some(3));
        assert!(p.calculate_msd);
        assert!(p.requires_time());
        assert_eq!(p.number_of_random_vectors, 4);
        assert_eq!(p.number_of_moments, 500);
        assert_eq!(p.energy_max, 3.5);
    }

    #[test]
    fn test_unknown_key_is_fatal() {
        let err = Parameters::parse("model 1\nfrobnicate 5\n").unwrap_err();
        match err {
            ModelError::UnknownKey { key, valid } => {
                assert_eq!(key, "frobnicate");
                for k in VALID_KEYS {
                    assert!(valid.contains(k), "missing {k} in {valid}");
                }
            }
            other => panic!("expected UnknownKey, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_key_stops_before_later_lines() {
        // The malformed line after the unknown key is never reached.
        let err = Parameters::parse("frobnicate 5\nenergy_max abc\n").unwrap_err();
        assert!(matches!(err, ModelError::UnknownKey { .. }));
    }

    #[test]
    fn test_wrong_value_count() {
        assert!(Parameters::parse("model 1\ncharged_impurity 10 2.0\n").is_err());
        assert!(Parameters::parse("calculate_vac yes\n").is_err());
    }

    #[test]
    fn test_invalid_model_enum() {
        let err = Parameters::parse("model 2\n").unwrap_err();
        assert!(matches!(err, ModelError::Config(_)));
    }

    #[test]
    fn test_non_positive_values_rejected() {
        assert!(Parameters::parse("model 1\nanderson_disorder 0\n").is_err());
        assert!(Parameters::parse("model 1\nanderson_disorder -1\n").is_err());
        assert!(Parameters::parse("number_of_moments 0\n").is_err());
        assert!(Parameters::parse("energy_max -2\n").is_err());
    }

    #[test]
    fn test_spin_and_vac_rejected() {
        let err = Parameters::parse("calculate_spin\ncalculate_vac\n").unwrap_err();
        assert!(err.to_string().contains("calculate_spin"));
    }

    #[test]
    fn test_spin_and_msd_allowed() {
        let p = Parameters::parse("calculate_spin\ncalculate_msd\n").unwrap();
        assert!(p.calculate_spin && p.calculate_msd);
    }

    #[test]
    fn test_anderson_and_impurity_rejected() {
        let text = "model 1\nanderson_disorder 1.0\ncharged_impurity 2 1.0 1.0\n";
        assert!(Parameters::parse(text).is_err());
    }

    #[test]
    fn test_disorder_on_general_model_rejected() {
        assert!(Parameters::parse("model 0\nanderson_disorder 1.0\n").is_err());
        assert!(Parameters::parse("vacancy_disorder 2\n").is_err());
    }

    #[test]
    fn test_repeated_key_last_wins() {
        let p = Parameters::parse("energy_max 2\nenergy_max 4\n").unwrap();
        assert_eq!(p.energy_max, 4.0);
    }
}
