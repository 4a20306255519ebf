use serde::{Serialize, Deserialize};

/// Per-epoch statistics emitted by `Architecture::encode`.
///
/// When `EncodeConfig::progress_tx` is set, one value is sent at the end of
/// every completed epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean reconstruction error over all samples in this epoch, measured
    /// against the uncorrupted inputs.
    pub reconstruction_error: f64,
    /// Learning rate used during the epoch.
    pub learning_rate: f64,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
