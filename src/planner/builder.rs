use super::TARGET;
use crate::error::{ResolveError, SignatureError};
use crate::graph::{
    EdgeKind, Graph, Vertex, VertexId, VertexKey, WEIGHT_MATCHING_NAME, WEIGHT_NORMAL,
    WEIGHT_TYPED,
};
use crate::operation::OperationRef;
use crate::registry::Registry;
use crate::value::TypeKey;
use ahash::AHashSet;
use itertools::Itertools;
use tracing::debug;

/// Responsible for building the weighted resolution graph for one call.
pub(super) struct GraphBuilder<'a> {
    registry: &'a Registry,
    operations: &'a [OperationRef],
    graph: Graph,
    op_vertices: Vec<VertexId>,
}

impl<'a> GraphBuilder<'a> {
    pub(super) fn new(registry: &'a Registry, operations: &'a [OperationRef]) -> Self {
        Self {
            registry,
            operations,
            graph: Graph::new(),
            op_vertices: Vec::with_capacity(operations.len()),
        }
    }

    pub(super) fn build(mut self) -> Result<(Graph, Vec<VertexId>), ResolveError> {
        if self.operations.is_empty() {
            return Err(SignatureError::InvalidField("no target operation given".to_string()).into());
        }
        for operation in self.operations {
            operation.signature().validate(operation.name())?;
        }

        self.add_bound_values();
        self.add_operations();
        for index in 0..self.operations.len() {
            self.add_inputs(index);
            if index != TARGET {
                self.add_outputs(index);
            }
        }
        self.link_typed_vertices();
        self.check_cycles()?;

        debug!(
            vertices = self.graph.vertex_count(),
            edges = self.graph.edge_count(),
            operations = self.operations.len(),
            "resolution graph built"
        );
        Ok((self.graph, self.op_vertices))
    }

    fn add_bound_values(&mut self) {
        for value in self.registry.iter() {
            let id = self.graph.add_vertex(Vertex::Value {
                key: value.key(),
                bound: None,
            });
            self.graph.vertex_mut(id).bind(value.clone());
        }
    }

    fn add_operations(&mut self) {
        for (index, operation) in self.operations.iter().enumerate() {
            let id = self.graph.add_vertex(Vertex::Operation {
                index,
                name: operation.name().to_string(),
                target: index == TARGET,
            });
            self.op_vertices.push(id);
        }
    }

    fn add_inputs(&mut self, index: usize) {
        let op_id = self.op_vertices[index];
        let root = self.graph.root();
        let signature = self.operations[index].signature();

        for (field, descriptor) in signature.active_inputs() {
            let typed = self.graph.add_vertex(Vertex::TypedArg(descriptor.ty));
            self.graph
                .add_edge(typed, op_id, WEIGHT_TYPED, EdgeKind::Typed { field });

            if descriptor.wildcard {
                // The preferred name is only known once a consumer asks for the
                // wildcard output, so every bound candidate gets a name edge.
                let candidates: Vec<VertexId> = self
                    .registry
                    .of_type(descriptor.ty)
                    .filter(|v| !v.is_typed_only())
                    .filter_map(|v| self.graph.id_of(&VertexKey::Value(v.key())))
                    .collect();
                for candidate in candidates {
                    self.graph.add_edge(
                        candidate,
                        op_id,
                        WEIGHT_MATCHING_NAME,
                        EdgeKind::NameMatch { field },
                    );
                }
                if index == TARGET {
                    self.graph
                        .add_edge(typed, root, 0, EdgeKind::Demand { field });
                }
                continue;
            }

            let value_id = self.graph.add_vertex(Vertex::Value {
                key: descriptor.key(),
                bound: None,
            });
            self.graph
                .add_edge(value_id, op_id, WEIGHT_NORMAL, EdgeKind::Supply { field });
            if self.graph.vertex(value_id).is_bound() {
                self.graph.add_edge(
                    value_id,
                    op_id,
                    WEIGHT_MATCHING_NAME,
                    EdgeKind::NameMatch { field },
                );
            }
            if index == TARGET {
                self.graph
                    .add_edge(value_id, root, 0, EdgeKind::Demand { field });
            }
        }
    }

    fn add_outputs(&mut self, index: usize) {
        let op_id = self.op_vertices[index];
        let signature = self.operations[index].signature();

        for (field, descriptor) in signature.active_outputs() {
            let typed = self.graph.add_vertex(Vertex::TypedOutput(descriptor.ty));
            self.graph
                .add_edge(op_id, typed, WEIGHT_NORMAL, EdgeKind::Produce { field });

            if !descriptor.wildcard {
                let value_id = self.graph.add_vertex(Vertex::Value {
                    key: descriptor.key(),
                    bound: None,
                });
                self.graph
                    .add_edge(op_id, value_id, WEIGHT_NORMAL, EdgeKind::Produce { field });
            }
        }
    }

    /// Connects every value slot to the type-only vertices of its type.
    fn link_typed_vertices(&mut self) {
        let values: Vec<(VertexId, TypeKey, bool)> = self
            .graph
            .vertices()
            .filter_map(|(id, v)| v.value_key().map(|key| (id, key.ty, v.is_bound())))
            .collect();

        for (id, ty, bound) in values {
            if let Some(arg) = self.graph.id_of(&VertexKey::TypedArg(ty)) {
                self.graph.add_edge(id, arg, 0, EdgeKind::Accept);
            }
            if bound {
                continue;
            }
            if let Some(out) = self.graph.id_of(&VertexKey::TypedOutput(ty)) {
                self.graph
                    .add_edge(out, id, WEIGHT_TYPED, EdgeKind::Inherit);
            }
        }
    }

    /// Rejects operations that need their own output by name, directly or
    /// transitively. Only the part of the graph that can reach the root counts.
    fn check_cycles(&self) -> Result<(), ResolveError> {
        let relevant = self.reaching_root();
        let graph = &self.graph;
        let cycle = graph.find_cycle(|edge| {
            let named = match edge.kind {
                EdgeKind::Supply { .. } => true,
                EdgeKind::Produce { .. } => graph.vertex(edge.to).value_key().is_some(),
                _ => false,
            };
            named && relevant.contains(&edge.from) && relevant.contains(&edge.to)
        });

        match cycle {
            Some(vertices) => {
                let operations = vertices
                    .iter()
                    .filter_map(|&id| graph.vertex(id).operation_index())
                    .map(|index| self.operations[index].name().to_string())
                    .collect_vec();
                Err(ResolveError::Cycle { operations })
            }
            None => Ok(()),
        }
    }

    fn reaching_root(&self) -> AHashSet<VertexId> {
        let mut seen = AHashSet::new();
        let mut stack = vec![self.graph.root()];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            stack.extend(self.graph.in_edges(id).map(|e| e.from));
        }
        seen
    }
}
