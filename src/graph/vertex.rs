use crate::value::{TypeKey, Value, ValueKey};
use std::fmt;

/// Index of a vertex inside its [`Graph`](super::Graph).
pub type VertexId = usize;

/// The hash key a vertex is deduplicated by. Repeated references to the
/// same key always resolve to the same vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VertexKey {
    Root,
    Value(ValueKey),
    TypedArg(TypeKey),
    TypedOutput(TypeKey),
    /// Position of the operation in the call's operation table.
    Operation(usize),
}

impl fmt::Display for VertexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexKey::Root => write!(f, "root"),
            VertexKey::Value(key) => write!(f, "{}", key),
            VertexKey::TypedArg(ty) => write!(f, "arg: {}", ty),
            VertexKey::TypedOutput(ty) => write!(f, "out: {}", ty),
            VertexKey::Operation(index) => write!(f, "op #{}", index),
        }
    }
}

/// A participant in resolution.
#[derive(Debug, Clone)]
pub enum Vertex {
    /// The sole origin of the search. Only the target's required inputs point at it.
    Root,
    /// A named, typed slot, optionally holding a value already.
    Value { key: ValueKey, bound: Option<Value> },
    /// "Any input of this type", matched without regard to name.
    TypedArg(TypeKey),
    /// "Some operation produces this type", inheritable by any value slot of that type.
    TypedOutput(TypeKey),
    Operation {
        index: usize,
        name: String,
        target: bool,
    },
}

impl Vertex {
    pub fn key(&self) -> VertexKey {
        match self {
            Vertex::Root => VertexKey::Root,
            Vertex::Value { key, .. } => VertexKey::Value(key.clone()),
            Vertex::TypedArg(ty) => VertexKey::TypedArg(*ty),
            Vertex::TypedOutput(ty) => VertexKey::TypedOutput(*ty),
            Vertex::Operation { index, .. } => VertexKey::Operation(*index),
        }
    }

    /// Sets the payload of a value vertex. Only the first binding sticks.
    pub fn bind(&mut self, value: Value) -> bool {
        match self {
            Vertex::Value { bound, .. } if bound.is_none() => {
                *bound = Some(value);
                true
            }
            _ => false,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Vertex::Value { bound: Some(_), .. })
    }

    pub fn value_key(&self) -> Option<&ValueKey> {
        match self {
            Vertex::Value { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn operation_index(&self) -> Option<usize> {
        match self {
            Vertex::Operation { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vertex::Operation { name, target, .. } => {
                if *target {
                    write!(f, "target: {}", name)
                } else {
                    write!(f, "op: {}", name)
                }
            }
            other => write!(f, "{}", other.key()),
        }
    }
}
