use super::Signature;
use crate::error::SignatureError;

/// A trait for native declarations that can describe themselves as a `Signature`.
///
/// This is the extension point for signature introspection. Whatever reads an
/// operation's native declaration (a derive macro, a schema file, a hand-written
/// table) implements this trait to hand the planner explicit field descriptors,
/// with renames and wildcards already resolved into `Field` flags.
///
/// # Example
///
/// ```rust
/// use argmap::prelude::*;
/// use argmap::error::SignatureError;
///
/// // A hand-written description of `fn(a: i32, b: i32) -> i32`.
/// struct Adder;
///
/// impl IntoSignature for Adder {
///     fn into_signature(self) -> std::result::Result<Signature, SignatureError> {
///         Ok(Signature::new(
///             vec![Field::new::<i32>("A"), Field::new::<i32>("B")],
///             vec![Field::new::<i32>("sum")],
///         ))
///     }
/// }
///
/// let signature = Adder.into_signature().unwrap();
/// assert_eq!(signature.inputs.len(), 2);
/// ```
pub trait IntoSignature {
    /// Consumes the declaration and converts it into field descriptors.
    fn into_signature(self) -> Result<Signature, SignatureError>;
}

impl IntoSignature for Signature {
    fn into_signature(self) -> Result<Signature, SignatureError> {
        Ok(self)
    }
}
