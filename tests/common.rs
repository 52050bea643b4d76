//! Common test utilities for building operations and converters.
use argmap::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// `fn(a: i32, b: i32) -> i32`
#[allow(dead_code)]
pub fn sum_target() -> Func {
    Func::builder("sum")
        .input(Field::new::<i32>("A"))
        .input(Field::new::<i32>("B"))
        .output(Field::new::<i32>("out"))
        .build(|args| {
            let a = args.get::<i32>("a")?;
            let b = args.get::<i32>("b")?;
            Ok(Outputs::new().with("out", a + b))
        })
        .expect("valid signature")
}

/// `fn(<name>: String) -> String`, echoing its input.
#[allow(dead_code)]
pub fn echo_string(name: &str) -> Func {
    let field = name.to_string();
    Func::builder("echo")
        .input(Field::new::<String>(name))
        .output(Field::new::<String>("out"))
        .build(move |args| Ok(Outputs::new().with("out", args.get::<String>(&field)?.clone())))
        .expect("valid signature")
}

/// Converts the named `i32` field `from` into the `String` field `to`.
#[allow(dead_code)]
pub fn stringify(from: &str, to: &str) -> Func {
    let (input, output) = (from.to_string(), to.to_string());
    Func::builder(&format!("stringify_{}_{}", from, to))
        .input(Field::new::<i32>(from))
        .output(Field::new::<String>(to))
        .build(move |args| {
            let value = args.get::<i32>(&input)?;
            Ok(Outputs::new().with(&output, value.to_string()))
        })
        .expect("valid signature")
}

/// Converts any `i32` into a `String` carrying the same name.
#[allow(dead_code)]
pub fn generic_stringify() -> Func {
    Func::builder("generic_stringify")
        .input(Field::wildcard::<i32>("B"))
        .output(Field::wildcard::<String>("B"))
        .build(|args| {
            let value = args.get::<i32>("b")?;
            Ok(Outputs::new().with("b", value.to_string()))
        })
        .expect("valid signature")
}

/// Wraps `stringify(from, to)` so every invocation bumps `counter`.
#[allow(dead_code)]
pub fn counted_stringify(from: &str, to: &str, counter: Arc<AtomicUsize>) -> Func {
    let inner = stringify(from, to);
    let name = inner.name().to_string();
    let signature = inner.signature().clone();
    Func::new(&name, signature, move |args| {
        counter.fetch_add(1, Ordering::SeqCst);
        inner.call(args)
    })
    .expect("valid signature")
}

/// A converter that always fails.
#[allow(dead_code)]
pub fn failing(name: &str, from: &str, to: &str) -> Func {
    Func::builder(name)
        .input(Field::new::<i32>(from))
        .output(Field::new::<String>(to))
        .build(|_| Err(OperationError::failed("boom")))
        .expect("valid signature")
}
