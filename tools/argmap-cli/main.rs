use argmap::error::{OperationError, SignatureError};
use argmap::graph::visualizer::to_dot;
use argmap::prelude::*;
use clap::Parser;
use itertools::Itertools;
use serde::Deserialize;
use std::result::Result;
use std::fs;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// --- JSON Deserialization Structs (Scenario Format Specific) ---
// These structs match the scenario file format and are only used here for conversion.

#[derive(Deserialize)]
struct RawScenario {
    target: RawTarget,
    #[serde(default)]
    values: Vec<RawValue>,
    #[serde(default)]
    converters: Vec<RawConverter>,
}

#[derive(Deserialize)]
struct RawTarget {
    name: String,
    inputs: Vec<RawField>,
}

#[derive(Deserialize)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    ty: RawType,
    alias: Option<String>,
    #[serde(default)]
    ignored: bool,
    #[serde(default)]
    wildcard: bool,
}

#[derive(Deserialize)]
struct RawValue {
    /// Omitted for type-only values.
    name: Option<String>,
    #[serde(rename = "type")]
    ty: RawType,
    value: serde_json::Value,
}

#[derive(Deserialize)]
struct RawConverter {
    kind: ConverterKind,
    /// Input name; the converter is generic over names when omitted.
    from: Option<String>,
    /// Output name; defaults to `from`.
    to: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum RawType {
    Int,
    Float,
    String,
    Bool,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
enum ConverterKind {
    IntToString,
    StringToInt,
    BoolToString,
    IntToFloat,
}

impl RawType {
    fn key(self) -> TypeKey {
        match self {
            RawType::Int => TypeKey::of::<i64>(),
            RawType::Float => TypeKey::of::<f64>(),
            RawType::String => TypeKey::of::<String>(),
            RawType::Bool => TypeKey::of::<bool>(),
        }
    }
}

impl ConverterKind {
    fn types(self) -> (RawType, RawType) {
        match self {
            ConverterKind::IntToString => (RawType::Int, RawType::String),
            ConverterKind::StringToInt => (RawType::String, RawType::Int),
            ConverterKind::BoolToString => (RawType::Bool, RawType::String),
            ConverterKind::IntToFloat => (RawType::Int, RawType::Float),
        }
    }

    fn convert(self, input: &Value) -> Result<Value, OperationError> {
        let converted = match self {
            ConverterKind::IntToString => Value::typed(read::<i64>(input)?.to_string()),
            ConverterKind::StringToInt => {
                let text = read::<String>(input)?;
                let parsed = text.trim().parse::<i64>().map_err(|e| {
                    OperationError::failed(format!("'{}' is not an integer: {}", text, e))
                })?;
                Value::typed(parsed)
            }
            ConverterKind::BoolToString => Value::typed(read::<bool>(input)?.to_string()),
            ConverterKind::IntToFloat => Value::typed(*read::<i64>(input)? as f64),
        };
        Ok(converted)
    }
}

fn read<T: std::any::Any>(value: &Value) -> Result<&T, OperationError> {
    value
        .downcast_ref::<T>()
        .ok_or_else(|| OperationError::TypeMismatch {
            field: value.name().to_string(),
            expected: TypeKey::of::<T>(),
            found: value.ty(),
        })
}

// --- Converter Implementation ---
// These implement the conversion from the raw JSON model to argmap's signatures.

impl RawField {
    fn into_field(self) -> Field {
        let mut field = Field::of_type(&self.name, self.ty.key());
        if let Some(alias) = &self.alias {
            field = field.with_alias(alias);
        }
        if self.ignored {
            field = field.ignore();
        }
        if self.wildcard {
            field = field.as_wildcard();
        }
        field
    }
}

impl IntoSignature for RawTarget {
    fn into_signature(self) -> Result<Signature, SignatureError> {
        let inputs = self.inputs.into_iter().map(RawField::into_field).collect();
        Ok(Signature::new(
            inputs,
            vec![Field::new::<String>(SUMMARY_FIELD)],
        ))
    }
}

impl RawValue {
    fn into_value(self) -> Result<Value, String> {
        let invalid = || format!("value {} is not a valid {:?}", self.value, self.ty);
        let name = self.name.as_deref();
        let value = match self.ty {
            RawType::Int => make(name, self.value.as_i64().ok_or_else(invalid)?),
            RawType::Float => make(name, self.value.as_f64().ok_or_else(invalid)?),
            RawType::String => make(name, self.value.as_str().ok_or_else(invalid)?.to_string()),
            RawType::Bool => make(name, self.value.as_bool().ok_or_else(invalid)?),
        };
        Ok(value)
    }
}

fn make<T: std::any::Any + Send + Sync>(name: Option<&str>, value: T) -> Value {
    match name {
        Some(name) => Value::named(name, value),
        None => Value::typed(value),
    }
}

impl RawConverter {
    fn into_operation(self) -> Result<Func, SignatureError> {
        let kind = self.kind;
        let (from, to) = kind.types();
        let name = format!("{:?}", kind);
        let builder = match (&self.from, &self.to) {
            (None, _) => Func::builder(&name)
                .input(Field::of_type("in", from.key()).as_wildcard())
                .output(Field::of_type("out", to.key()).as_wildcard()),
            (Some(input), output) => Func::builder(&format!("{}({})", name, input))
                .input(Field::of_type("in", from.key()).with_alias(input))
                .output(
                    Field::of_type("out", to.key()).with_alias(output.as_deref().unwrap_or(input)),
                ),
        };
        builder.build(move |args| {
            let input = args
                .value("in")
                .ok_or_else(|| OperationError::MissingArgument("in".to_string()))?;
            let mut outputs = Outputs::new();
            outputs.set_value("out", kind.convert(input)?);
            Ok(outputs)
        })
    }
}

const SUMMARY_FIELD: &str = "summary";

/// Renders every argument the target received, in declaration order.
fn summarize(args: &Arguments) -> String {
    args.iter()
        .map(|(name, value)| {
            let rendered = value
                .downcast_ref::<i64>()
                .map(ToString::to_string)
                .or_else(|| value.downcast_ref::<f64>().map(ToString::to_string))
                .or_else(|| value.downcast_ref::<String>().map(|s| format!("{:?}", s)))
                .or_else(|| value.downcast_ref::<bool>().map(ToString::to_string))
                .unwrap_or_else(|| format!("<{}>", value.ty()));
            format!("{}={}", name, rendered)
        })
        .join(", ")
}

/// Explains how argmap would resolve the arguments of a target operation
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the scenario JSON file
    scenario_path: String,

    /// Print the resolution graph in Graphviz DOT form
    #[arg(long)]
    dot: bool,

    /// Print the plan as JSON
    #[arg(long)]
    json: bool,

    /// Execute the plan against a target that echoes its arguments
    #[arg(short, long)]
    run: bool,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = fs::read_to_string(&cli.scenario_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read scenario file '{}': {}",
            &cli.scenario_path, e
        ))
    });
    let scenario: RawScenario = serde_json::from_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse scenario JSON: {}", e)));

    let mapper = build_mapper(scenario).unwrap_or_else(|e| exit_with_error(&e));

    if cli.dot {
        let graph = mapper
            .graph()
            .unwrap_or_else(|e| exit_with_error(&format!("Graph construction failed: {}", e)));
        println!("{}", to_dot(&graph));
    }

    let plan = mapper
        .plan()
        .unwrap_or_else(|e| exit_with_error(&format!("Resolution failed: {}", e)));
    println!("{}", PlanFormatter::format_plan(&plan));

    if cli.json {
        let report = PlanReport::from_plan(&plan)
            .to_json()
            .unwrap_or_else(|e| exit_with_error(&e.to_string()));
        println!("{}", report);
    }

    if cli.run {
        match mapper.execute(plan).into_result() {
            Ok(outputs) => {
                let summary = outputs
                    .first()
                    .and_then(|v| v.downcast_ref::<String>())
                    .cloned()
                    .unwrap_or_default();
                println!("\n-> {}", summary);
            }
            Err(error) => exit_with_error(&format!("Call failed: {}", error)),
        }
    }
}

fn build_mapper(scenario: RawScenario) -> Result<Mapper, String> {
    let name = scenario.target.name.clone();
    let signature = scenario
        .target
        .into_signature()
        .map_err(|e| format!("Invalid target: {}", e))?;
    let target = Func::new(&name, signature, |args| {
        Ok(Outputs::new().with(SUMMARY_FIELD, summarize(args)))
    })
    .map_err(|e| format!("Invalid target: {}", e))?;

    let values = scenario
        .values
        .into_iter()
        .map(RawValue::into_value)
        .collect::<Result<Vec<_>, _>>()?;

    let converters = scenario
        .converters
        .into_iter()
        .map(|c| {
            c.into_operation()
                .map(|op| Arc::new(op) as OperationRef)
                .map_err(|e| format!("Invalid converter: {}", e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Mapper::builder(target)
        .with_values(values)
        .with_converters(converters)
        .build())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
