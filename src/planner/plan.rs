use crate::value::ValueKey;

/// Where one input field of a step reads its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Declaration index of the input field.
    pub field: usize,
    /// Declared name of the input field.
    pub field_name: String,
    /// The registry slot the value is read from.
    pub source: ValueKey,
    /// Whether an earlier step produces the slot, as opposed to the caller.
    pub produced: bool,
}

/// Pairs a step's wildcard input with its wildcard output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passthrough {
    pub input_field: usize,
    pub output_field: usize,
    /// The name carried from the paired input value to the output value.
    pub name: String,
}

/// One operation invocation in a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Position of the operation in the call's operation table.
    pub operation: usize,
    pub name: String,
    pub inputs: Vec<Binding>,
    pub passthrough: Option<Passthrough>,
    /// The slots this step binds, in output declaration order.
    pub outputs: Vec<ValueKey>,
    /// Extra slots an output is bound to, as `(output field, slot)`. Present
    /// when a consumer reads a type-only output under its own name.
    pub aliases: Vec<(usize, ValueKey)>,
    /// Total weight of the chain feeding this step.
    pub cost: i32,
}

impl Step {
    pub fn binding(&self, field: usize) -> Option<&Binding> {
        self.inputs.iter().find(|b| b.field == field)
    }
}

/// The ordered conversions needed to call the target, followed by the target itself.
///
/// Every step appears after the steps producing its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub steps: Vec<Step>,
    pub target: Step,
    pub cost: i32,
}

impl Plan {
    /// Whether the target can be called directly with caller-supplied values.
    pub fn is_direct(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }
}
