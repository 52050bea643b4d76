use crate::error::ResolveError;
use crate::operation::{Arguments, OperationRef, Outputs};
use crate::planner::{Plan, Step};
use crate::registry::Registry;
use crate::signature::Field;
use crate::value::Value;
use std::any::Any;
use tracing::debug;

/// The outcome of a resolution call.
///
/// Always reports whether the call succeeded. On success the target's outputs
/// are available by position; on failure a single error describes the first
/// unsatisfiable field or the first failing operation. The registry keeps
/// every value bound before the call ended, for diagnostics.
#[derive(Debug, Clone)]
pub struct CallResult {
    outputs: Vec<Value>,
    error: Option<ResolveError>,
    registry: Registry,
    plan: Option<Plan>,
}

impl CallResult {
    pub(crate) fn success(outputs: Vec<Value>, registry: Registry, plan: Plan) -> Self {
        Self {
            outputs,
            error: None,
            registry,
            plan: Some(plan),
        }
    }

    pub(crate) fn failure(error: ResolveError, registry: Registry, plan: Option<Plan>) -> Self {
        Self {
            outputs: Vec::new(),
            error: Some(error),
            registry,
            plan,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn err(&self) -> Option<&ResolveError> {
        self.error.as_ref()
    }

    /// Number of outputs; zero when the call failed.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn out(&self, index: usize) -> Option<&Value> {
        self.outputs.get(index)
    }

    pub fn out_as<T: Any>(&self, index: usize) -> Option<&T> {
        self.out(index).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn outputs(&self) -> &[Value] {
        &self.outputs
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The plan that was executed, if planning got that far.
    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn into_result(self) -> Result<Vec<Value>, ResolveError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.outputs),
        }
    }
}

/// Runs a plan's steps in order, then the target.
///
/// Each conversion's outputs are bound into the registry before the next
/// step runs, under their own slot unless it is already taken and under any
/// alias the plan asks for. The first failure stops execution; earlier bindings stay.
pub struct Executor<'a> {
    operations: &'a [OperationRef],
    registry: Registry,
}

impl<'a> Executor<'a> {
    pub fn new(operations: &'a [OperationRef], registry: Registry) -> Self {
        Self {
            operations,
            registry,
        }
    }

    /// Returns the target's outputs in declaration order.
    pub fn run(&mut self, plan: &Plan) -> Result<Vec<Value>, ResolveError> {
        for step in &plan.steps {
            let args = self.assemble(step)?;
            let mut outputs = self.invoke(step, &args)?;
            let signature = self.operations[step.operation].signature();
            for (index, field) in signature.active_outputs() {
                let value = Self::take_output(step, field, &args, &mut outputs)?;
                for (_, alias) in step.aliases.iter().filter(|(f, _)| *f == index) {
                    self.registry.bind(value.renamed(&alias.name));
                }
                if self.registry.contains(&value.key()) {
                    debug!(
                        operation = %step.name,
                        slot = %value.key(),
                        "output slot already bound, keeping existing value"
                    );
                    continue;
                }
                self.registry.bind(value);
            }
        }

        let target = &plan.target;
        let args = self.assemble(target)?;
        let mut outputs = self.invoke(target, &args)?;
        self.operations[target.operation]
            .signature()
            .active_outputs()
            .map(|(_, field)| Self::take_output(target, field, &args, &mut outputs))
            .collect()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn into_registry(self) -> Registry {
        self.registry
    }

    fn assemble(&self, step: &Step) -> Result<Arguments, ResolveError> {
        let signature = self.operations[step.operation].signature();
        let mut args = Arguments::new();
        for binding in &step.inputs {
            let value = self
                .registry
                .get(&binding.source)
                .ok_or_else(|| ResolveError::UnboundValue(binding.source.to_string()))?;
            let field = &signature.inputs[binding.field];
            if field.wildcard {
                args.insert_wildcard(&field.name, value.clone());
            } else {
                args.insert(&field.name, value.clone());
            }
        }
        Ok(args)
    }

    fn invoke(&self, step: &Step, args: &Arguments) -> Result<Outputs, ResolveError> {
        let operation = &self.operations[step.operation];
        debug!(
            operation = %operation.name(),
            arguments = args.len(),
            "invoking operation"
        );
        operation
            .call(args)
            .map_err(|source| ResolveError::OperationFailed {
                operation: operation.name().to_string(),
                source,
            })
    }

    /// Takes one declared output from what the operation returned.
    ///
    /// A wildcard output is named after the value paired with the wildcard
    /// input. When the operation leaves it unset and the types agree, the
    /// input value is passed through unchanged.
    fn take_output(
        step: &Step,
        field: &Field,
        args: &Arguments,
        outputs: &mut Outputs,
    ) -> Result<Value, ResolveError> {
        let returned = outputs.take(&field.name);
        let (value, name) = if field.wildcard {
            let name = step
                .passthrough
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| field.match_name());
            let passed = args
                .wildcard()
                .filter(|input| step.passthrough.is_some() && input.ty() == field.ty)
                .cloned();
            (returned.or(passed), name)
        } else {
            (returned, field.match_name())
        };

        let value = value.ok_or_else(|| ResolveError::OutputMissing {
            operation: step.name.clone(),
            field: field.name.clone(),
        })?;
        if value.ty() != field.ty {
            return Err(ResolveError::OutputTypeMismatch {
                operation: step.name.clone(),
                field: field.name.clone(),
                expected: field.ty,
                found: value.ty(),
            });
        }
        Ok(value.renamed(&name))
    }
}
