use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A reified type identifier that can be compared, hashed and displayed.
///
/// Equality and hashing use the underlying `TypeId`; the type name is kept
/// for display and for deterministic ordering.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The fully qualified type name, e.g. `alloc::string::String`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type name with module paths stripped, e.g. `Option<String>`.
    pub fn short_name(&self) -> String {
        let mut output = String::with_capacity(self.name.len());
        let mut segment = String::new();
        for c in self.name.chars() {
            if c.is_alphanumeric() || c == '_' || c == ':' {
                segment.push(c);
            } else {
                output.push_str(last_path_segment(&segment));
                segment.clear();
                output.push(c);
            }
        }
        output.push_str(last_path_segment(&segment));
        output
    }
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TypeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

/// Identifies a registry slot: a normalized name paired with a type.
///
/// Two values occupy the same slot iff both name and type match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueKey {
    pub name: String,
    pub ty: TypeKey,
}

impl ValueKey {
    pub fn new(name: &str, ty: TypeKey) -> Self {
        Self {
            name: normalize_name(name),
            ty,
        }
    }

    /// Whether this slot belongs to a type-only value (no name).
    pub fn is_typed_only(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Display for ValueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "<typed>/{}", self.ty)
        } else {
            write!(f, "{}/{}", self.name, self.ty)
        }
    }
}

/// Names are matched case-insensitively.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
