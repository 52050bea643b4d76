use crate::planner::{Binding, Plan, Step};
use itertools::Itertools;

/// Formats resolution plans into human-readable strings
pub struct PlanFormatter;

impl PlanFormatter {
    /// Format a plan as one line per step, conversions first, then the target.
    pub fn format_plan(plan: &Plan) -> String {
        let mut lines = plan
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{:>3}. {}", i + 1, Self::format_step(step)))
            .collect_vec();
        lines.push(format!("  => {}", Self::format_step(&plan.target)));
        lines.push(format!("total cost: {}", plan.cost));
        lines.join("\n")
    }

    /// Format a single step, e.g. `stringify(a <- a/i32) -> a/String [cost 1]`.
    pub fn format_step(step: &Step) -> String {
        let inputs = step.inputs.iter().map(Self::format_binding).join(", ");
        let mut line = format!("{}({})", step.name, inputs);
        if !step.outputs.is_empty() {
            line.push_str(" -> ");
            line.push_str(&step.outputs.iter().join(", "));
        }
        if !step.aliases.is_empty() {
            let aliases = step.aliases.iter().map(|(_, key)| key).join(", ");
            line.push_str(&format!(" (as {})", aliases));
        }
        line.push_str(&format!(" [cost {}]", step.cost));
        line
    }

    fn format_binding(binding: &Binding) -> String {
        // Produced slots are marked so they stand out from caller-supplied ones.
        let marker = if binding.produced { "*" } else { "" };
        format!("{} <- {}{}", binding.field_name, binding.source, marker)
    }
}
