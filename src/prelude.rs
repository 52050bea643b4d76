//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the argmap crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use argmap::prelude::*;
//!
//! # fn run_example(target: Func, converters: Vec<OperationRef>) -> Result<()> {
//! let mapper = Mapper::builder(target)
//!     .with_value(Value::named("input", 42_i64))
//!     .with_converters(converters)
//!     .build();
//!
//! let result = mapper.call();
//! if let Some(error) = result.err() {
//!     println!("Call failed: {}", error);
//! }
//! # Ok(())
//! # }
//! ```

// Call surface
pub use crate::executor::{CallResult, Executor};
pub use crate::mapper::{Mapper, MapperBuilder};
pub use crate::planner::{Plan, Planner, Step};

// Operations and their descriptors
pub use crate::operation::{Arguments, Func, FuncBuilder, Operation, OperationRef, Outputs};
pub use crate::signature::{Field, IntoSignature, Signature};

// Values
pub use crate::registry::Registry;
pub use crate::value::{TypeKey, Value, ValueKey};

// Error types
pub use crate::error::{OperationError, ResolveError, SignatureError};

// Plan reporting
pub use crate::report::{PlanFormatter, PlanReport};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
