pub mod generator;
pub mod value;

pub use generator::synthesize;
pub use value::Value;
