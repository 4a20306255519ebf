pub mod numeric;
pub mod source;
pub mod dataset;

pub use numeric::{FieldType, Numeric};
pub use source::{RecordSource, TableSource};
pub use dataset::Dataset;
