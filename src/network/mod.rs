pub mod architecture;
pub mod spec;

pub use architecture::{Architecture, NetType, NoiseMode};
pub use spec::NetworkSpec;
