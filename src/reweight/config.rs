use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};
use crate::reweight::binning::Binning;

/// Names of the record fields the estimator reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub pt: String,
    pub eta: String,
    pub light: String,
    pub charm: String,
    pub bottom: String,
    /// Truth label checked against `QualityCuts::truth_max`; no cut when `None`.
    pub truth: Option<String>,
}

impl Default for FieldNames {
    fn default() -> Self {
        FieldNames {
            pt: "pt".into(),
            eta: "eta".into(),
            light: "light".into(),
            charm: "charm".into(),
            bottom: "bottom".into(),
            truth: None,
        }
    }
}

/// Records pass when `|eta| < eta_max`, `pt_min < pt < pt_max` and the truth
/// label (if configured) is below `truth_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityCuts {
    pub eta_max: f64,
    pub pt_min: f64,
    pub pt_max: f64,
    pub truth_max: f64,
}

impl Default for QualityCuts {
    fn default() -> Self {
        QualityCuts { eta_max: 2.5, pt_min: 20.0, pt_max: 1000.0, truth_max: 100.0 }
    }
}

/// Population fractions the CDF method aims for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetFractions {
    pub light: f64,
    pub charm: f64,
    pub bottom: f64,
}

impl Default for TargetFractions {
    fn default() -> Self {
        TargetFractions { light: 0.5, charm: 0.2, bottom: 0.5 }
    }
}

/// Settings of a reweighting pass. Every field has a default, so a JSON file
/// only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReweightConfig {
    pub pt_bins: Binning,
    pub eta_bins: Binning,
    /// Derive factors from normalized CDFs instead of direct count ratios.
    pub cdf: bool,
    /// In CDF mode, express charm/bottom factors relative to the light factor.
    pub relative: bool,
    /// Share of the source (read from the start) used for the estimate, in (0, 1].
    pub sample_fraction: f64,
    pub cuts: QualityCuts,
    pub targets: TargetFractions,
    /// Direct-ratio divisor for charm.
    pub k_charm: f64,
    /// Direct-ratio divisor for bottom.
    pub k_bottom: f64,
    /// Upper bound of a direct-ratio factor.
    pub max_correction: f64,
    pub fields: FieldNames,
}

impl Default for ReweightConfig {
    fn default() -> Self {
        ReweightConfig {
            pt_bins: Binning::default_pt(),
            eta_bins: Binning::default_eta(),
            cdf: true,
            relative: true,
            sample_fraction: 0.1,
            cuts: QualityCuts::default(),
            targets: TargetFractions::default(),
            k_charm: 5.0,
            k_bottom: 1.0,
            max_correction: 20.0,
            fields: FieldNames::default(),
        }
    }
}

impl ReweightConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_fraction > 0.0 && self.sample_fraction <= 1.0) {
            return Err(NnError::InvalidConfig(format!(
                "sample_fraction {} outside (0, 1]",
                self.sample_fraction
            )));
        }
        let t = &self.targets;
        if [t.light, t.charm, t.bottom].iter().any(|&f| !(f > 0.0)) {
            return Err(NnError::InvalidConfig(format!("target fractions must be positive: {t:?}")));
        }
        if !(self.k_charm > 0.0 && self.k_bottom > 0.0) {
            return Err(NnError::InvalidConfig("direct-ratio divisors must be positive".into()));
        }
        if !(self.max_correction >= 1.0) {
            return Err(NnError::InvalidConfig(format!(
                "max_correction {} below 1",
                self.max_correction
            )));
        }
        Ok(())
    }

    pub fn load_json(path: &str) -> Result<ReweightConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: ReweightConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
