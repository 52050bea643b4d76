use crate::value::{TypeKey, ValueKey, normalize_name};
use std::any::Any;
use std::fmt;

/// Describes one input or output field of an operation.
///
/// `name` is the identifier the operation body uses to read or write the
/// field. Matching against available values uses [`Field::match_name`],
/// which honors `alias` when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub alias: Option<String>,
    pub ty: TypeKey,
    /// Excluded from matching entirely.
    pub ignored: bool,
    /// Matched by type against whatever is left over and passed through.
    pub wildcard: bool,
}

impl Field {
    pub fn new<T: Any>(name: &str) -> Self {
        Self::of_type(name, TypeKey::of::<T>())
    }

    pub fn of_type(name: &str, ty: TypeKey) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
            ty,
            ignored: false,
            wildcard: false,
        }
    }

    pub fn wildcard<T: Any>(name: &str) -> Self {
        Self::new::<T>(name).as_wildcard()
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn ignore(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn as_wildcard(mut self) -> Self {
        self.wildcard = true;
        self
    }

    /// The normalized name this field is matched by.
    pub fn match_name(&self) -> String {
        normalize_name(self.alias.as_deref().unwrap_or(&self.name))
    }

    pub fn key(&self) -> ValueKey {
        ValueKey {
            name: self.match_name(),
            ty: self.ty,
        }
    }

    /// Named fields take part in name+type matching.
    pub fn is_named(&self) -> bool {
        !self.ignored && !self.wildcard
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.ty)?;
        if let Some(alias) = &self.alias {
            write!(f, " as {}", alias)?;
        }
        if self.wildcard {
            write!(f, " (wildcard)")?;
        }
        if self.ignored {
            write!(f, " (ignored)")?;
        }
        Ok(())
    }
}
