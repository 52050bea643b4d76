use crate::value::{TypeKey, Value, ValueKey};
use indexmap::IndexMap;
use tracing::warn;

/// Maps `(name, type)` slots to concrete values for the duration of one call.
///
/// Insertion order is preserved and drives tie-breaking during planning, so
/// values supplied first win between otherwise equal candidates.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    values: IndexMap<ValueKey, Value>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a value to its slot. A slot is written at most once; returns
    /// `false` and leaves the existing binding in place when already bound.
    pub fn bind(&mut self, value: Value) -> bool {
        let key = value.key();
        if self.values.contains_key(&key) {
            warn!(slot = %key, "slot already bound, keeping the existing value");
            return false;
        }
        self.values.insert(key, value);
        true
    }

    pub fn get(&self, key: &ValueKey) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn lookup(&self, name: &str, ty: TypeKey) -> Option<&Value> {
        self.values.get(&ValueKey::new(name, ty))
    }

    pub fn contains(&self, key: &ValueKey) -> bool {
        self.values.contains_key(key)
    }

    /// All values of the given type, in insertion order.
    pub fn of_type(&self, ty: TypeKey) -> impl Iterator<Item = &Value> {
        self.values.values().filter(move |v| v.ty() == ty)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<Value> for Registry {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut registry = Registry::new();
        for value in iter {
            registry.bind(value);
        }
        registry
    }
}
