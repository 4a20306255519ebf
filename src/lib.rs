pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;
pub mod data;
pub mod reweight;

// Convenience re-exports
pub use error::{NnError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::architecture::{Architecture, NetType, NoiseMode};
pub use network::spec::NetworkSpec;
pub use loss::mse::MseLoss;
pub use optim::sgd::Sgd;
pub use train::{train_network, EncodeConfig, EpochStats};
pub use data::{Dataset, FieldType, Numeric, RecordSource, TableSource};
pub use reweight::{Binning, CorrectionTable, Flavor, ReweightConfig, ReweightEstimator};
