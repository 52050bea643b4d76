use super::TARGET;
use super::plan::{Binding, Passthrough, Plan, Step};
use crate::error::ResolveError;
use crate::graph::{EdgeKind, Graph, Vertex, VertexId};
use crate::operation::OperationRef;
use crate::value::ValueKey;
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeSet;
use std::hash::Hash;
use std::rc::Rc;
use tracing::{debug, trace};

/// A chosen source for one input field, with the cost of reaching it.
///
/// `key` is always the slot the consumer reads. When it differs from the
/// producer's own slot for `output`, the producer also binds its output there.
#[derive(Debug, Clone)]
struct Supply {
    cost: i32,
    key: ValueKey,
    producer: Option<Rc<Invocation>>,
    output: Option<usize>,
}

/// One operation call together with the sources chosen for its inputs.
#[derive(Debug)]
struct Invocation {
    operation: usize,
    cost: i32,
    inputs: Vec<(usize, Supply)>,
    passthrough: Option<Passthrough>,
}

fn keep_cheapest(best: &mut Option<Supply>, candidate: Supply) {
    if best.as_ref().is_none_or(|b| candidate.cost < b.cost) {
        *best = Some(candidate);
    }
}

/// Memo table for one kind of sub-problem.
///
/// A result that did not depend on which operations were being resolved
/// higher up is shared by every caller. One that did is only reused under
/// the same set of in-flight operations.
struct Memo<K, V> {
    exact: AHashMap<K, V>,
    scoped: AHashMap<(K, Vec<usize>), V>,
}

impl<K: Hash + Eq + Clone, V: Clone> Memo<K, V> {
    fn new() -> Self {
        Self {
            exact: AHashMap::new(),
            scoped: AHashMap::new(),
        }
    }

    /// Returns the cached result and whether it was scoped.
    fn get(&self, key: &K, scope: &[usize]) -> Option<(V, bool)> {
        if let Some(hit) = self.exact.get(key) {
            return Some((hit.clone(), false));
        }
        self.scoped
            .get(&(key.clone(), scope.to_vec()))
            .map(|hit| (hit.clone(), true))
    }

    fn insert(&mut self, key: K, scope: Vec<usize>, value: V, scoped: bool) {
        if scoped {
            self.scoped.insert((key, scope), value);
        } else {
            self.exact.insert(key, value);
        }
    }
}

/// Computes the minimum-weight way to satisfy every input the target needs.
///
/// The search walks edges backwards from the root. Because operations may sum
/// several inputs and name-matched edges are negative, costs are computed by
/// memoized depth-first evaluation rather than Dijkstra. An operation that is
/// already being resolved further up the stack is never used again below
/// itself, which keeps every chosen chain acyclic. Results that depended on
/// such an exclusion are memoized per set of in-flight operations.
pub(super) struct Resolver<'g> {
    graph: &'g Graph,
    operations: &'g [OperationRef],
    op_vertices: &'g [VertexId],
    visiting: BTreeSet<usize>,
    cuts: usize,
    value_memo: Memo<VertexId, Option<Supply>>,
    output_memo: Memo<(VertexId, String), Option<Supply>>,
    invocation_memo: Memo<(usize, Option<String>), Option<Rc<Invocation>>>,
}

impl<'g> Resolver<'g> {
    pub(super) fn new(
        graph: &'g Graph,
        operations: &'g [OperationRef],
        op_vertices: &'g [VertexId],
    ) -> Self {
        Self {
            graph,
            operations,
            op_vertices,
            visiting: BTreeSet::new(),
            cuts: 0,
            value_memo: Memo::new(),
            output_memo: Memo::new(),
            invocation_memo: Memo::new(),
        }
    }

    fn scope(&self) -> Vec<usize> {
        self.visiting.iter().copied().collect()
    }

    pub(super) fn resolve(mut self) -> Result<Plan, ResolveError> {
        let operations = self.operations;
        let signature = operations[TARGET].signature();

        let mut demanded: Vec<usize> = self
            .graph
            .in_edges(self.graph.root())
            .filter_map(|e| match e.kind {
                EdgeKind::Demand { field } => Some(field),
                _ => None,
            })
            .collect();
        demanded.sort_unstable();

        self.visiting.insert(TARGET);
        let invocation = self.assemble(TARGET, None).map_err(|field| {
            let descriptor = &signature.inputs[field];
            ResolveError::MissingArgument {
                name: descriptor.match_name(),
                ty: descriptor.ty,
            }
        })?;
        debug_assert!(
            demanded
                .iter()
                .all(|f| invocation.inputs.iter().any(|(i, _)| i == f))
        );

        let mut steps = Vec::new();
        let mut seen = AHashMap::new();
        for (_, supply) in &invocation.inputs {
            self.link(supply, &mut steps, &mut seen);
        }
        let target = self.to_step(&invocation);

        debug!(
            target = %operations[TARGET].name(),
            steps = steps.len(),
            cost = invocation.cost,
            "resolution plan computed"
        );
        Ok(Plan {
            steps,
            target,
            cost: invocation.cost,
        })
    }

    /// Chooses a source for every active input of `operation`.
    ///
    /// Name matches are resolved first, then type-only fallbacks for fields
    /// that are still open or cheaper that way, then the wildcard field against
    /// whatever is left. A concrete value feeds at most one field.
    /// Returns the index of the first unsatisfiable field on failure.
    fn assemble(&mut self, operation: usize, context: Option<&str>) -> Result<Invocation, usize> {
        let operations = self.operations;
        let signature = operations[operation].signature();
        let vertex = self.op_vertices[operation];

        let named: Vec<usize> = signature
            .active_inputs()
            .filter(|(_, f)| !f.wildcard)
            .map(|(i, _)| i)
            .collect();
        let mut chosen: AHashMap<usize, Supply> = AHashMap::new();

        for &field in &named {
            if let Some(supply) = self.best_named(vertex, field) {
                if chosen.values().all(|s| s.key != supply.key) {
                    chosen.insert(field, supply);
                }
            }
        }

        for &field in &named {
            let excluded: AHashSet<ValueKey> = chosen
                .iter()
                .filter(|(f, _)| **f != field)
                .map(|(_, s)| s.key.clone())
                .collect();
            if let Some(typed) = self.best_typed(vertex, field, &excluded) {
                let cheaper = chosen.get(&field).is_none_or(|s| typed.cost < s.cost);
                if cheaper {
                    chosen.insert(field, typed);
                }
            }
        }

        if let Some(&missing) = named.iter().find(|f| !chosen.contains_key(f)) {
            return Err(missing);
        }

        let mut passthrough = None;
        if let Some((field, _)) = signature.wildcard_input() {
            let excluded: AHashSet<ValueKey> = chosen.values().map(|s| s.key.clone()).collect();
            let supply = self
                .best_wildcard(vertex, field, context, &excluded)
                .ok_or(field)?;
            if let Some((output_field, _)) = signature.wildcard_output() {
                passthrough = Some(Passthrough {
                    input_field: field,
                    output_field,
                    name: supply.key.name.clone(),
                });
            }
            chosen.insert(field, supply);
        }

        let mut inputs: Vec<(usize, Supply)> = chosen.into_iter().collect();
        inputs.sort_by_key(|(field, _)| *field);
        let cost = inputs.iter().map(|(_, s)| s.cost).sum();

        for (field, supply) in &inputs {
            trace!(
                operation = %operations[operation].name(),
                field = %signature.inputs[*field].name,
                source = %supply.key,
                cost = supply.cost,
                "input resolved"
            );
        }

        Ok(Invocation {
            operation,
            cost,
            inputs,
            passthrough,
        })
    }

    /// Best name+type source for a named field.
    fn best_named(&mut self, vertex: VertexId, field: usize) -> Option<Supply> {
        let graph = self.graph;
        let mut best = None;
        for edge in graph.in_edges(vertex) {
            match edge.kind {
                EdgeKind::NameMatch { field: f } if f == field => {
                    if let Some(supply) = Self::bound_supply(graph.vertex(edge.from), edge.weight) {
                        keep_cheapest(&mut best, supply);
                    }
                }
                EdgeKind::Supply { field: f } if f == field => {
                    if let Some(supply) = self.resolve_value(edge.from) {
                        keep_cheapest(
                            &mut best,
                            Supply {
                                cost: edge.weight + supply.cost,
                                ..supply
                            },
                        );
                    }
                }
                _ => {}
            }
        }
        best
    }

    /// Best type-only source for a field, skipping slots used by other fields.
    fn best_typed(
        &mut self,
        vertex: VertexId,
        field: usize,
        excluded: &AHashSet<ValueKey>,
    ) -> Option<Supply> {
        let graph = self.graph;
        let mut best = None;
        for edge in graph.in_edges(vertex) {
            if edge.kind != (EdgeKind::Typed { field }) {
                continue;
            }
            if let Some(supply) = self.resolve_typed_arg(edge.from, excluded) {
                keep_cheapest(
                    &mut best,
                    Supply {
                        cost: edge.weight + supply.cost,
                        ..supply
                    },
                );
            }
        }
        best
    }

    /// Best source for a wildcard field. A bound value named like the
    /// requested output wins the name-match weight; anything else of the
    /// right type is a type-only match.
    fn best_wildcard(
        &mut self,
        vertex: VertexId,
        field: usize,
        context: Option<&str>,
        excluded: &AHashSet<ValueKey>,
    ) -> Option<Supply> {
        let graph = self.graph;
        let mut best = None;
        if let Some(name) = context {
            for edge in graph.in_edges(vertex) {
                if edge.kind != (EdgeKind::NameMatch { field }) {
                    continue;
                }
                let source = graph.vertex(edge.from);
                let matches = source
                    .value_key()
                    .is_some_and(|key| key.name == name && !excluded.contains(key));
                if matches {
                    if let Some(supply) = Self::bound_supply(source, edge.weight) {
                        keep_cheapest(&mut best, supply);
                    }
                }
            }
        }
        if let Some(typed) = self.best_typed(vertex, field, excluded) {
            keep_cheapest(&mut best, typed);
        }
        best
    }

    fn bound_supply(vertex: &Vertex, weight: i32) -> Option<Supply> {
        match vertex {
            Vertex::Value {
                key,
                bound: Some(_),
            } => Some(Supply {
                cost: weight,
                key: key.clone(),
                producer: None,
                output: None,
            }),
            _ => None,
        }
    }

    /// Cheapest way to obtain the value slot `id`: bound already, produced by
    /// name, or inherited from a type-only output. The returned supply always
    /// reads slot `id` itself.
    fn resolve_value(&mut self, id: VertexId) -> Option<Supply> {
        let scope = self.scope();
        if let Some((hit, scoped)) = self.value_memo.get(&id, &scope) {
            self.cuts += usize::from(scoped);
            return hit;
        }
        let graph = self.graph;
        let vertex = graph.vertex(id);
        let key = vertex.value_key()?.clone();
        if let Some(supply) = Self::bound_supply(vertex, 0) {
            self.value_memo.insert(id, scope, Some(supply.clone()), false);
            return Some(supply);
        }

        let cuts = self.cuts;
        let mut best = None;
        for edge in graph.in_edges(id) {
            match edge.kind {
                EdgeKind::Produce { field } => {
                    let Some(operation) = graph.vertex(edge.from).operation_index() else {
                        continue;
                    };
                    if let Some(invocation) = self.resolve_invocation(operation, Some(&key.name))
                    {
                        keep_cheapest(
                            &mut best,
                            Supply {
                                cost: edge.weight + invocation.cost,
                                key: key.clone(),
                                producer: Some(invocation),
                                output: Some(field),
                            },
                        );
                    }
                }
                EdgeKind::Inherit => {
                    if let Some(supply) = self.resolve_typed_output(edge.from, &key) {
                        keep_cheapest(
                            &mut best,
                            Supply {
                                cost: edge.weight + supply.cost,
                                ..supply
                            },
                        );
                    }
                }
                _ => {}
            }
        }

        self.value_memo
            .insert(id, scope, best.clone(), self.cuts != cuts);
        best
    }

    /// Cheapest value slot accepted by a type-only argument vertex.
    fn resolve_typed_arg(
        &mut self,
        id: VertexId,
        excluded: &AHashSet<ValueKey>,
    ) -> Option<Supply> {
        let graph = self.graph;
        let mut best = None;
        for edge in graph.in_edges(id) {
            if edge.kind != EdgeKind::Accept {
                continue;
            }
            let Some(supply) = self.resolve_value(edge.from) else {
                continue;
            };
            if excluded.contains(&supply.key) {
                continue;
            }
            keep_cheapest(
                &mut best,
                Supply {
                    cost: edge.weight + supply.cost,
                    ..supply
                },
            );
        }
        best
    }

    /// Cheapest producer behind a type-only output vertex, when the slot `key`
    /// is being requested from it. The producer's output is bound under `key`.
    fn resolve_typed_output(&mut self, id: VertexId, key: &ValueKey) -> Option<Supply> {
        let memo_key = (id, key.name.clone());
        let scope = self.scope();
        if let Some((hit, scoped)) = self.output_memo.get(&memo_key, &scope) {
            self.cuts += usize::from(scoped);
            return hit;
        }
        let graph = self.graph;

        let cuts = self.cuts;
        let mut best = None;
        for edge in graph.in_edges(id) {
            let EdgeKind::Produce { field } = edge.kind else {
                continue;
            };
            let Some(operation) = graph.vertex(edge.from).operation_index() else {
                continue;
            };
            let Some(invocation) = self.resolve_invocation(operation, Some(&key.name)) else {
                continue;
            };
            keep_cheapest(
                &mut best,
                Supply {
                    cost: edge.weight + invocation.cost,
                    key: key.clone(),
                    producer: Some(invocation),
                    output: Some(field),
                },
            );
        }

        self.output_memo
            .insert(memo_key, scope, best.clone(), self.cuts != cuts);
        best
    }

    /// Resolves the inputs of a conversion operation. `context` is the name of
    /// the value being requested from it and only matters for wildcard pairing.
    fn resolve_invocation(
        &mut self,
        operation: usize,
        context: Option<&str>,
    ) -> Option<Rc<Invocation>> {
        if self.visiting.contains(&operation) {
            self.cuts += 1;
            return None;
        }
        let operations = self.operations;
        let context = operations[operation]
            .signature()
            .wildcard_input()
            .and(context.map(str::to_string));
        let memo_key = (operation, context);
        let scope = self.scope();
        if let Some((hit, scoped)) = self.invocation_memo.get(&memo_key, &scope) {
            self.cuts += usize::from(scoped);
            return hit;
        }

        let cuts = self.cuts;
        self.visiting.insert(operation);
        let result = self
            .assemble(operation, memo_key.1.as_deref())
            .ok()
            .map(Rc::new);
        self.visiting.remove(&operation);

        self.invocation_memo
            .insert(memo_key, scope, result.clone(), self.cuts != cuts);
        result
    }

    /// Schedules the producer behind `supply`, if any, and makes sure its
    /// output lands in the slot the consumer reads.
    fn link(
        &self,
        supply: &Supply,
        steps: &mut Vec<Step>,
        seen: &mut AHashMap<(usize, Vec<ValueKey>), usize>,
    ) {
        let (Some(producer), Some(output)) = (&supply.producer, supply.output) else {
            return;
        };
        let index = self.flatten(producer, steps, seen);
        if self.output_key(producer, output) != supply.key {
            let alias = (output, supply.key.clone());
            let step = &mut steps[index];
            if !step.aliases.contains(&alias) {
                step.aliases.push(alias);
            }
        }
    }

    /// Appends `invocation` and everything it depends on, producers first.
    /// Returns the position of its step.
    fn flatten(
        &self,
        invocation: &Rc<Invocation>,
        steps: &mut Vec<Step>,
        seen: &mut AHashMap<(usize, Vec<ValueKey>), usize>,
    ) -> usize {
        for (_, supply) in &invocation.inputs {
            self.link(supply, steps, seen);
        }
        let identity = (
            invocation.operation,
            invocation
                .inputs
                .iter()
                .map(|(_, s)| s.key.clone())
                .collect::<Vec<_>>(),
        );
        *seen.entry(identity).or_insert_with(|| {
            steps.push(self.to_step(invocation));
            steps.len() - 1
        })
    }

    /// The slot an invocation binds output field `field` to on its own.
    fn output_key(&self, invocation: &Invocation, field: usize) -> ValueKey {
        let descriptor = &self.operations[invocation.operation].signature().outputs[field];
        let name = match (&invocation.passthrough, descriptor.wildcard) {
            (Some(passthrough), true) => passthrough.name.clone(),
            _ => descriptor.match_name(),
        };
        ValueKey {
            name,
            ty: descriptor.ty,
        }
    }

    fn to_step(&self, invocation: &Invocation) -> Step {
        let operation = &self.operations[invocation.operation];
        let signature = operation.signature();
        Step {
            operation: invocation.operation,
            name: operation.name().to_string(),
            inputs: invocation
                .inputs
                .iter()
                .map(|(field, supply)| Binding {
                    field: *field,
                    field_name: signature.inputs[*field].name.clone(),
                    source: supply.key.clone(),
                    produced: supply.producer.is_some(),
                })
                .collect(),
            passthrough: invocation.passthrough.clone(),
            outputs: signature
                .active_outputs()
                .map(|(field, _)| self.output_key(invocation, field))
                .collect(),
            aliases: Vec::new(),
            cost: invocation.cost,
        }
    }
}
