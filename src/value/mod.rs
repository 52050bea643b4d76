pub mod payload;
pub mod types;

pub use payload::*;
pub use types::*;
