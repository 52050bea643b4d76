use super::Field;
use crate::error::SignatureError;
use ahash::AHashSet;

/// The declared inputs and outputs of an operation, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub inputs: Vec<Field>,
    pub outputs: Vec<Field>,
}

impl Signature {
    pub fn new(inputs: Vec<Field>, outputs: Vec<Field>) -> Self {
        Self { inputs, outputs }
    }

    /// Checks the descriptor invariants the planner relies on: unique match
    /// names per direction, at most one wildcard per direction, and non-empty
    /// names on named fields.
    pub fn validate(&self, operation: &str) -> Result<(), SignatureError> {
        Self::validate_fields(operation, "input", &self.inputs)?;
        Self::validate_fields(operation, "output", &self.outputs)
    }

    fn validate_fields(
        operation: &str,
        direction: &'static str,
        fields: &[Field],
    ) -> Result<(), SignatureError> {
        let mut seen = AHashSet::new();
        let mut wildcards = 0;
        for field in fields.iter().filter(|f| !f.ignored) {
            if field.wildcard {
                wildcards += 1;
                if wildcards > 1 {
                    return Err(SignatureError::MultipleWildcards {
                        operation: operation.to_string(),
                        direction,
                    });
                }
                continue;
            }
            if field.match_name().is_empty() {
                return Err(SignatureError::EmptyFieldName {
                    operation: operation.to_string(),
                    direction,
                });
            }
            if !seen.insert(field.key()) {
                return Err(SignatureError::DuplicateField {
                    operation: operation.to_string(),
                    direction,
                    field: field.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Inputs that take part in matching, with their declaration index.
    pub fn active_inputs(&self) -> impl Iterator<Item = (usize, &Field)> {
        self.inputs.iter().enumerate().filter(|(_, f)| !f.ignored)
    }

    /// Outputs that are delivered, with their declaration index.
    pub fn active_outputs(&self) -> impl Iterator<Item = (usize, &Field)> {
        self.outputs.iter().enumerate().filter(|(_, f)| !f.ignored)
    }

    pub fn wildcard_input(&self) -> Option<(usize, &Field)> {
        self.active_inputs().find(|(_, f)| f.wildcard)
    }

    pub fn wildcard_output(&self) -> Option<(usize, &Field)> {
        self.active_outputs().find(|(_, f)| f.wildcard)
    }
}
