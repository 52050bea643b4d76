//! # argmap - Automatic Argument Resolution
//!
//! **argmap** calls a target operation whose inputs are not all on hand. Given a
//! set of named, typed values and a set of conversion operations, it builds a
//! weighted graph, finds the cheapest chain of conversions that supplies every
//! input the target needs, runs that chain and then calls the target.
//!
//! ## Core Workflow
//!
//! 1.  **Describe Operations**: Give every operation a `Signature` of input and
//!     output `Field`s, either with `Func::builder` or by implementing
//!     `IntoSignature` for your own declaration format.
//! 2.  **Build a Mapper**: Use `Mapper::builder` with the target, then add the
//!     available values and converters.
//! 3.  **Plan or Call**: `Mapper::plan` computes the chain without running it;
//!     `Mapper::call` plans and executes, returning a `CallResult`.
//!
//! Matching prefers, in order: a value with the same name and type, a value
//! produced by a converter under that name, and finally any value of the right
//! type. Names are compared case-insensitively.
//!
//! ## Quick Start
//!
//! ```rust
//! use argmap::prelude::*;
//!
//! fn main() -> Result<()> {
//!     // fn(a: i32, b: String) -> String
//!     let target = Func::builder("greet")
//!         .input(Field::new::<i32>("a"))
//!         .input(Field::new::<String>("b"))
//!         .output(Field::new::<String>("greeting"))
//!         .build(|args| {
//!             let a = args.get::<i32>("a")?;
//!             let b = args.get::<String>("b")?;
//!             Ok(Outputs::new().with("greeting", format!("{b} x{a}")))
//!         })?;
//!
//!     // Derives a `b: String` from a `b: i32`.
//!     let stringify = Func::builder("stringify")
//!         .input(Field::new::<i32>("b"))
//!         .output(Field::new::<String>("b"))
//!         .build(|args| Ok(Outputs::new().with("b", args.get::<i32>("b")?.to_string())))?;
//!
//!     let mapper = Mapper::builder(target)
//!         .with_value(Value::named("a", 3))
//!         .with_value(Value::named("b", 7))
//!         .with_converter(stringify)
//!         .build();
//!
//!     let plan = mapper.plan()?;
//!     println!("{}", PlanFormatter::format_plan(&plan));
//!
//!     let result = mapper.call();
//!     assert!(result.is_ok());
//!     assert_eq!(result.out_as::<String>(0).map(String::as_str), Some("7 x3"));
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod executor;
pub mod graph;
pub mod mapper;
pub mod operation;
pub mod planner;
pub mod prelude;
pub mod registry;
pub mod report;
pub mod signature;
pub mod value;
