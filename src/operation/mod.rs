use crate::error::OperationError;
use crate::signature::Signature;
use std::sync::Arc;

pub mod args;
pub mod func;

pub use args::*;
pub use func::*;

/// Defines the contract between the planner and anything it can invoke.
///
/// Implementations must be synchronous. The planner only ever inspects
/// `signature()`; `call` receives the assembled arguments and returns the
/// declared outputs.
pub trait Operation: Send + Sync {
    fn name(&self) -> &str;
    fn signature(&self) -> &Signature;
    fn call(&self, args: &Arguments) -> Result<Outputs, OperationError>;
}

/// Shared handle to an operation, so one converter set can serve many calls.
pub type OperationRef = Arc<dyn Operation>;
