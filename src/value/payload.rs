use super::{TypeKey, ValueKey, normalize_name};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased storage for a value's payload. Cloning is cheap.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// A named, typed value available for matching.
#[derive(Clone)]
pub struct Value {
    name: String,
    ty: TypeKey,
    payload: Payload,
}

impl Value {
    /// Creates a value that can be matched by name and type.
    pub fn named<T: Any + Send + Sync>(name: &str, value: T) -> Self {
        Self {
            name: normalize_name(name),
            ty: TypeKey::of::<T>(),
            payload: Arc::new(value),
        }
    }

    /// Creates a value with no name. It only satisfies type-only matches.
    pub fn typed<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            name: String::new(),
            ty: TypeKey::of::<T>(),
            payload: Arc::new(value),
        }
    }

    /// Returns a copy of this value bound under a different name. The payload is shared.
    pub fn renamed(&self, name: &str) -> Self {
        Self {
            name: normalize_name(name),
            ty: self.ty,
            payload: Arc::clone(&self.payload),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> TypeKey {
        self.ty
    }

    pub fn key(&self) -> ValueKey {
        ValueKey {
            name: self.name.clone(),
            ty: self.ty,
        }
    }

    pub fn is_typed_only(&self) -> bool {
        self.name.is_empty()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
