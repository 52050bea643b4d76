//! Human- and machine-readable renderings of a resolution plan.

pub mod formatter;

pub use formatter::PlanFormatter;

use crate::error::ReportError;
use crate::planner::{Plan, Step};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InputReport {
    pub field: String,
    pub source: String,
    pub produced: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub operation: String,
    pub inputs: Vec<InputReport>,
    pub outputs: Vec<String>,
    /// Extra slots an output is also bound to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub cost: i32,
}

/// A serializable snapshot of a plan. Types are recorded by their short names.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlanReport {
    pub steps: Vec<StepReport>,
    pub target: StepReport,
    pub cost: i32,
}

impl From<&Step> for StepReport {
    fn from(step: &Step) -> Self {
        Self {
            operation: step.name.clone(),
            inputs: step
                .inputs
                .iter()
                .map(|b| InputReport {
                    field: b.field_name.clone(),
                    source: b.source.to_string(),
                    produced: b.produced,
                })
                .collect(),
            outputs: step.outputs.iter().map(ToString::to_string).collect(),
            aliases: step.aliases.iter().map(|(_, key)| key.to_string()).collect(),
            cost: step.cost,
        }
    }
}

impl From<&Plan> for PlanReport {
    fn from(plan: &Plan) -> Self {
        Self {
            steps: plan.steps.iter().map(StepReport::from).collect(),
            target: StepReport::from(&plan.target),
            cost: plan.cost,
        }
    }
}

impl PlanReport {
    pub fn from_plan(plan: &Plan) -> Self {
        Self::from(plan)
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Saves the report to a file as pretty-printed JSON.
    pub fn save(&self, path: &str) -> Result<(), ReportError> {
        fs::write(path, self.to_json()?).map_err(|source| ReportError::Io {
            path: path.to_string(),
            source,
        })
    }

    /// Loads a report previously written with [`PlanReport::save`].
    pub fn from_file(path: &str) -> Result<Self, ReportError> {
        let json = fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}
