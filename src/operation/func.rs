use super::{Arguments, Operation, Outputs};
use crate::error::{OperationError, SignatureError};
use crate::signature::{Field, IntoSignature, Signature};
use std::fmt;
use std::sync::Arc;

type Body = dyn Fn(&Arguments) -> Result<Outputs, OperationError> + Send + Sync;

/// An operation backed by a closure.
#[derive(Clone)]
pub struct Func {
    name: String,
    signature: Signature,
    body: Arc<Body>,
}

impl Func {
    /// Creates an operation from a signature and a body. The signature is
    /// validated once here so the planner can rely on it.
    pub fn new<S, F>(name: &str, signature: S, body: F) -> Result<Self, SignatureError>
    where
        S: IntoSignature,
        F: Fn(&Arguments) -> Result<Outputs, OperationError> + Send + Sync + 'static,
    {
        let signature = signature.into_signature()?;
        signature.validate(name)?;
        Ok(Self {
            name: name.to_string(),
            signature,
            body: Arc::new(body),
        })
    }

    pub fn builder(name: &str) -> FuncBuilder {
        FuncBuilder::new(name)
    }
}

impl Operation for Func {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, args: &Arguments) -> Result<Outputs, OperationError> {
        (self.body)(args)
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Collects field descriptors before creating a [`Func`].
pub struct FuncBuilder {
    name: String,
    inputs: Vec<Field>,
    outputs: Vec<Field>,
}

impl FuncBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn input(mut self, field: Field) -> Self {
        self.inputs.push(field);
        self
    }

    pub fn output(mut self, field: Field) -> Self {
        self.outputs.push(field);
        self
    }

    pub fn build<F>(self, body: F) -> Result<Func, SignatureError>
    where
        F: Fn(&Arguments) -> Result<Outputs, OperationError> + Send + Sync + 'static,
    {
        Func::new(&self.name, Signature::new(self.inputs, self.outputs), body)
    }
}
