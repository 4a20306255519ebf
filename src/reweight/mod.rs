pub mod binning;
pub mod histogram;
pub mod config;
pub mod table;
pub mod estimator;

pub use binning::{categorize, Binning, DEFAULT_ETA_EDGES, DEFAULT_PT_EDGES};
pub use config::{FieldNames, QualityCuts, ReweightConfig, TargetFractions};
pub use estimator::{direct_ratio, FlavorHistograms, ReweightEstimator};
pub use histogram::Histogram2D;
pub use table::{CorrectionTable, Flavor};
