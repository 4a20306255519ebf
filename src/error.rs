use thiserror::Error;

/// Errors raised by the network engine, the record layer and the
/// reweighting estimator.
#[derive(Error, Debug)]
pub enum NnError {
    /// A vector did not have the length the receiving layer or network expects.
    #[error("{context}: expected length {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("network structure needs at least 2 entries, got {0}")]
    StructureTooShort(usize),

    #[error("layer {0} of the structure has zero width")]
    EmptyLayer(usize),

    /// Two parallel sequences (samples/weights, inputs/targets, columns) differ in length.
    #[error("{context}: lengths differ ({left} vs {right})")]
    LengthMismatch {
        context: &'static str,
        left: usize,
        right: usize,
    },

    #[error("{0} must not be empty")]
    EmptyInput(&'static str),

    #[error("autoencoding needs matching input and output widths ({inputs} vs {outputs})")]
    NotAutoencoder { inputs: usize, outputs: usize },

    #[error("unknown field \"{0}\"")]
    UnknownField(String),

    #[error("type \"{0}\" not recognized")]
    UnsupportedFieldType(String),

    #[error("field \"{name}\" is stored as {stored:?}, not {declared:?}")]
    FieldTypeMismatch {
        name: String,
        declared: crate::data::numeric::FieldType,
        stored: crate::data::numeric::FieldType,
    },

    #[error("field \"{0}\" is already bound")]
    DuplicateField(String),

    #[error("row {index} out of range ({rows} rows)")]
    RowOutOfRange { index: usize, rows: usize },

    #[error("invalid bin edges: {0}")]
    InvalidBins(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NnError>;
