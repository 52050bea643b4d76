//! A self-contained weighted directed graph for argument resolution.
//!
//! Edges point from producer to consumer: an edge `A -> B` means `A` must be
//! resolved before `B` can be satisfied from it. Vertices are deduplicated by
//! their [`VertexKey`], never by identity.

use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use indexmap::map::Entry;
use std::collections::VecDeque;

pub mod vertex;
pub mod visualizer;

pub use vertex::*;

/// Weight of a direct name+type match.
pub const WEIGHT_NORMAL: i32 = 1;

/// Weight of a type-only match. Penalized so that name matches are preferred.
pub const WEIGHT_TYPED: i32 = 5;

/// Weight of an already-bound value whose name matches the consuming field.
/// Cheaper than any conversion, so converting `A string -> A int` beats
/// `B string -> A int`.
pub const WEIGHT_MATCHING_NAME: i32 = -1;

/// What an edge means to the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// `Value(n,T) -> Op`: the value can feed input field `field` by name.
    Supply { field: usize },
    /// Bound `Value(n,T) -> Op`: the value already exists and its name matches.
    NameMatch { field: usize },
    /// `TypedArg(T) -> Op`: type-only fallback for input field `field`.
    Typed { field: usize },
    /// `Value(*,T) -> TypedArg(T)`.
    Accept,
    /// `Op -> Value` or `Op -> TypedOutput`, from output field `field`.
    Produce { field: usize },
    /// `TypedOutput(T) -> Value(*,T)`.
    Inherit,
    /// `Value -> Root`: the target requires this value for input field `field`.
    Demand { field: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: VertexId,
    pub to: VertexId,
    pub weight: i32,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone)]
pub struct Graph {
    vertices: IndexMap<VertexKey, Vertex>,
    edges: Vec<Edge>,
    incoming: Vec<Vec<usize>>,
    outgoing: Vec<Vec<usize>>,
    edge_index: AHashSet<(VertexId, VertexId, EdgeKind)>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Creates a graph holding only the root vertex.
    pub fn new() -> Self {
        let mut graph = Self {
            vertices: IndexMap::new(),
            edges: Vec::new(),
            incoming: Vec::new(),
            outgoing: Vec::new(),
            edge_index: AHashSet::new(),
        };
        graph.add_vertex(Vertex::Root);
        graph
    }

    /// Adds a vertex, or returns the existing one with the same key.
    pub fn add_vertex(&mut self, vertex: Vertex) -> VertexId {
        match self.vertices.entry(vertex.key()) {
            Entry::Occupied(entry) => entry.index(),
            Entry::Vacant(entry) => {
                let id = entry.index();
                entry.insert(vertex);
                self.incoming.push(Vec::new());
                self.outgoing.push(Vec::new());
                id
            }
        }
    }

    /// Adds a weighted edge. An identical `(from, to, kind)` edge is only stored once.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId, weight: i32, kind: EdgeKind) {
        if !self.edge_index.insert((from, to, kind)) {
            return;
        }
        let id = self.edges.len();
        self.edges.push(Edge {
            from,
            to,
            weight,
            kind,
        });
        self.outgoing[from].push(id);
        self.incoming[to].push(id);
    }

    pub fn root(&self) -> VertexId {
        0
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id]
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id]
    }

    pub fn id_of(&self, key: &VertexKey) -> Option<VertexId> {
        self.vertices.get_index_of(key)
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices.values().enumerate()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges ending at `id`, in insertion order.
    pub fn in_edges(&self, id: VertexId) -> impl Iterator<Item = &Edge> {
        self.incoming[id].iter().map(|&e| &self.edges[e])
    }

    /// Edges starting at `id`, in insertion order.
    pub fn out_edges(&self, id: VertexId) -> impl Iterator<Item = &Edge> {
        self.outgoing[id].iter().map(|&e| &self.edges[e])
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Finds a cycle made only of edges accepted by `include`.
    ///
    /// Runs Kahn's algorithm over the filtered subgraph; if some vertices
    /// never reach in-degree zero, walks predecessors among them until one
    /// repeats and returns that cycle in producer-to-consumer order.
    pub fn find_cycle<F>(&self, include: F) -> Option<Vec<VertexId>>
    where
        F: Fn(&Edge) -> bool,
    {
        let selected: Vec<&Edge> = self.edges.iter().filter(|e| include(e)).collect();
        let mut in_degrees: AHashMap<VertexId, usize> = AHashMap::new();
        let mut adjacency: AHashMap<VertexId, Vec<VertexId>> = AHashMap::new();
        for edge in &selected {
            in_degrees.entry(edge.from).or_insert(0);
            *in_degrees.entry(edge.to).or_insert(0) += 1;
            adjacency.entry(edge.from).or_default().push(edge.to);
        }

        let mut queue: VecDeque<VertexId> = in_degrees
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| *id)
            .collect();
        while let Some(id) = queue.pop_front() {
            for child in adjacency.get(&id).into_iter().flatten() {
                if let Some(degree) = in_degrees.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*child);
                    }
                }
            }
        }

        let remaining: AHashSet<VertexId> = in_degrees
            .into_iter()
            .filter(|(_, degree)| *degree > 0)
            .map(|(id, _)| id)
            .collect();
        let start = *remaining.iter().min()?;

        let mut path = vec![start];
        let mut position: AHashMap<VertexId, usize> = AHashMap::new();
        position.insert(start, 0);
        let mut current = start;
        loop {
            let predecessor = selected
                .iter()
                .filter(|e| e.to == current && remaining.contains(&e.from))
                .map(|e| e.from)
                .min()?;
            if let Some(&at) = position.get(&predecessor) {
                let mut cycle = path.split_off(at);
                cycle.reverse();
                return Some(cycle);
            }
            position.insert(predecessor, path.len());
            path.push(predecessor);
            current = predecessor;
        }
    }
}
