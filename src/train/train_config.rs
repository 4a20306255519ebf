use std::sync::mpsc;
use crate::train::epoch_stats::EpochStats;

/// Configuration for an `Architecture::encode` run.
///
/// # Fields
/// - `learning_rate` — installed on the network before the first epoch
/// - `epochs`        — number of full passes over the inputs
/// - `progress_tx`   — optional channel sender; one `EpochStats` is sent per
///                     completed epoch. A dropped receiver is ignored and
///                     training runs to completion.
pub struct EncodeConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
}

impl EncodeConfig {
    /// Creates an `EncodeConfig` with the default 5 epochs and no progress channel.
    pub fn new(learning_rate: f64) -> Self {
        EncodeConfig {
            learning_rate,
            epochs: 5,
            progress_tx: None,
        }
    }

    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Enables per-epoch reporting.
    pub fn verbose(mut self, tx: mpsc::Sender<EpochStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }
}
