use crate::error::ResolveError;
use crate::graph::Graph;
use crate::operation::OperationRef;
use crate::registry::Registry;

mod builder;
pub mod plan;
mod resolve;

use builder::GraphBuilder;
use resolve::Resolver;

pub use plan::*;

/// Position of the target operation in a planner's operation table.
/// Conversion operations follow it in declaration order.
pub const TARGET: usize = 0;

/// Builds the resolution graph for one call and computes its plan.
pub struct Planner<'a> {
    registry: &'a Registry,
    operations: &'a [OperationRef],
}

impl<'a> Planner<'a> {
    /// `operations[TARGET]` is the target; the rest are conversions.
    pub fn new(registry: &'a Registry, operations: &'a [OperationRef]) -> Self {
        Self {
            registry,
            operations,
        }
    }

    /// Builds and validates the weighted graph without resolving it.
    pub fn graph(&self) -> Result<Graph, ResolveError> {
        GraphBuilder::new(self.registry, self.operations)
            .build()
            .map(|(graph, _)| graph)
    }

    /// Computes the cheapest plan that supplies every input of the target.
    pub fn plan(&self) -> Result<Plan, ResolveError> {
        let (graph, op_vertices) = GraphBuilder::new(self.registry, self.operations).build()?;
        Resolver::new(&graph, self.operations, &op_vertices).resolve()
    }
}
