use crate::error::ResolveError;
use crate::executor::{CallResult, Executor};
use crate::graph::Graph;
use crate::operation::{Operation, OperationRef};
use crate::planner::{Plan, Planner};
use crate::registry::Registry;
use crate::value::Value;
use std::sync::Arc;

/// The resolution call surface: a target, the values on hand, and the
/// conversions that may derive missing inputs.
///
/// A `Mapper` holds no state between calls. Every call builds a fresh
/// registry, graph and plan.
#[derive(Clone)]
pub struct Mapper {
    operations: Vec<OperationRef>,
    values: Vec<Value>,
}

pub struct MapperBuilder {
    target: OperationRef,
    converters: Vec<OperationRef>,
    values: Vec<Value>,
}

impl MapperBuilder {
    pub fn new(target: OperationRef) -> Self {
        Self {
            target,
            converters: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.values.push(value);
        self
    }

    pub fn with_values(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.values.extend(values);
        self
    }

    pub fn with_converter<O: Operation + 'static>(mut self, converter: O) -> Self {
        self.converters.push(Arc::new(converter));
        self
    }

    /// Adds converters that are shared with other mappers.
    pub fn with_converters(mut self, converters: impl IntoIterator<Item = OperationRef>) -> Self {
        self.converters.extend(converters);
        self
    }

    pub fn build(self) -> Mapper {
        let mut operations = Vec::with_capacity(self.converters.len() + 1);
        operations.push(self.target);
        operations.extend(self.converters);
        Mapper {
            operations,
            values: self.values,
        }
    }
}

impl Mapper {
    pub fn builder<O: Operation + 'static>(target: O) -> MapperBuilder {
        MapperBuilder::new(Arc::new(target))
    }

    /// Same as [`Mapper::builder`], for a target that is already shared.
    pub fn builder_shared(target: OperationRef) -> MapperBuilder {
        MapperBuilder::new(target)
    }

    pub fn target(&self) -> &OperationRef {
        &self.operations[crate::planner::TARGET]
    }

    pub fn converters(&self) -> &[OperationRef] {
        &self.operations[1..]
    }

    fn registry(&self) -> Registry {
        self.values.iter().cloned().collect()
    }

    /// Builds the weighted graph for inspection, without resolving it.
    pub fn graph(&self) -> Result<Graph, ResolveError> {
        let registry = self.registry();
        Planner::new(&registry, &self.operations).graph()
    }

    /// Computes the plan without invoking any operation.
    pub fn plan(&self) -> Result<Plan, ResolveError> {
        let registry = self.registry();
        Planner::new(&registry, &self.operations).plan()
    }

    /// Plans and executes the call.
    pub fn call(&self) -> CallResult {
        match self.plan() {
            Ok(plan) => self.execute(plan),
            Err(error) => CallResult::failure(error, self.registry(), None),
        }
    }

    /// Executes a plan previously returned by [`Mapper::plan`] without
    /// resolving again.
    pub fn execute(&self, plan: Plan) -> CallResult {
        let mut executor = Executor::new(&self.operations, self.registry());
        match executor.run(&plan) {
            Ok(outputs) => CallResult::success(outputs, executor.into_registry(), plan),
            Err(error) => CallResult::failure(error, executor.into_registry(), Some(plan)),
        }
    }
}
