use crate::error::OperationError;
use crate::value::{TypeKey, Value, normalize_name};
use indexmap::IndexMap;
use std::any::Any;

/// The assembled inputs handed to an operation, keyed by declared field name.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: IndexMap<String, Value>,
    wildcard: Option<String>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, value: Value) {
        self.values.insert(normalize_name(field), value);
    }

    pub(crate) fn insert_wildcard(&mut self, field: &str, value: Value) {
        let key = normalize_name(field);
        self.values.insert(key.clone(), value);
        self.wildcard = Some(key);
    }

    /// Reads a field's payload as `T`.
    pub fn get<T: Any>(&self, field: &str) -> Result<&T, OperationError> {
        let value = self
            .value(field)
            .ok_or_else(|| OperationError::MissingArgument(field.to_string()))?;
        value
            .downcast_ref::<T>()
            .ok_or_else(|| OperationError::TypeMismatch {
                field: field.to_string(),
                expected: TypeKey::of::<T>(),
                found: value.ty(),
            })
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.values.get(&normalize_name(field))
    }

    /// The value paired with the wildcard input, if the operation declares one.
    pub fn wildcard(&self) -> Option<&Value> {
        self.wildcard.as_ref().and_then(|key| self.values.get(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The values an operation returns, keyed by declared output field name.
#[derive(Debug, Clone, Default)]
pub struct Outputs {
    values: IndexMap<String, Value>,
}

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Any + Send + Sync>(mut self, field: &str, value: T) -> Self {
        self.set(field, value);
        self
    }

    pub fn set<T: Any + Send + Sync>(&mut self, field: &str, value: T) {
        self.values
            .insert(normalize_name(field), Value::named(field, value));
    }

    /// Sets an output from an existing value, keeping its payload.
    pub fn set_value(&mut self, field: &str, value: Value) {
        self.values
            .insert(normalize_name(field), value.renamed(field));
    }

    pub fn take(&mut self, field: &str) -> Option<Value> {
        self.values.shift_remove(&normalize_name(field))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
