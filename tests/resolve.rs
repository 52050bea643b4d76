//! End-to-end resolution tests
//!
//! Each test builds a mapper, calls the target and checks both the outputs
//! and the conversions that were chosen.
mod common;
use argmap::prelude::*;
use common::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_basic_matching() {
    let result = Mapper::builder(sum_target())
        .with_value(Value::named("a", 12))
        .with_value(Value::named("b", 24))
        .build()
        .call();

    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    assert_eq!(result.len(), 1);
    assert_eq!(result.out_as::<i32>(0), Some(&36));
}

#[test]
fn test_missing_argument() {
    let result = Mapper::builder(sum_target())
        .with_value(Value::named("a", 12))
        .build()
        .call();

    assert!(!result.is_ok());
    assert_eq!(result.len(), 0);
    let error = result.err().expect("call should fail");
    assert!(error.to_string().contains("argument cannot"));
    match error {
        ResolveError::MissingArgument { name, ty } => {
            assert_eq!(name, "b");
            assert_eq!(*ty, TypeKey::of::<i32>());
        }
        other => panic!("expected MissingArgument, got {:?}", other),
    }
}

#[test]
fn test_ignored_field() {
    let target = Func::builder("first")
        .input(Field::new::<i32>("A"))
        .input(Field::new::<i32>("b").ignore())
        .output(Field::new::<i32>("out"))
        .build(|args| {
            assert!(args.value("b").is_none());
            Ok(Outputs::new().with("out", *args.get::<i32>("a")?))
        })
        .unwrap();

    let result = Mapper::builder(target)
        .with_value(Value::named("a", 12))
        .build()
        .call();

    assert!(result.is_ok());
    assert_eq!(result.out_as::<i32>(0), Some(&12));
}

#[test]
fn test_alias_matches_value_name() {
    let target = Func::builder("sum")
        .input(Field::new::<i32>("A").with_alias("C"))
        .input(Field::new::<i32>("B"))
        .output(Field::new::<i32>("out"))
        .build(|args| Ok(Outputs::new().with("out", args.get::<i32>("a")? + args.get::<i32>("b")?)))
        .unwrap();

    let result = Mapper::builder(target)
        .with_value(Value::named("b", 24))
        .with_value(Value::named("c", 12))
        .build()
        .call();

    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    assert_eq!(result.out_as::<i32>(0), Some(&36));
}

#[test]
fn test_direct_named_converter() {
    let target = Func::builder("exclaim")
        .input(Field::new::<String>("A"))
        .output(Field::new::<String>("out"))
        .build(|args| Ok(Outputs::new().with("out", format!("{}!", args.get::<String>("a")?))))
        .unwrap();

    let result = Mapper::builder(target)
        .with_value(Value::named("a", 12))
        .with_converter(stringify("A", "A"))
        .build()
        .call();

    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    assert_eq!(result.out_as::<String>(0).map(String::as_str), Some("12!"));

    let plan = result.plan().expect("plan is kept");
    assert_eq!(plan.step_names(), vec!["stringify_A_A"]);
}

#[test]
fn test_generic_type_converter() {
    let repeat = Func::builder("repeat")
        .input(Field::new::<String>("A"))
        .input(Field::new::<i32>("B"))
        .output(Field::new::<String>("out"))
        .build(|args| {
            let text = args.get::<String>("a")?;
            let times = *args.get::<i32>("b")? as usize;
            Ok(Outputs::new().with("out", text.repeat(times)))
        })
        .unwrap();
    let from_string = Func::builder("from_string")
        .input(Field::new::<String>("C"))
        .output(Field::new::<String>("A"))
        .build(|_| Ok(Outputs::new().with("a", "FOO".to_string())))
        .unwrap();
    let from_bool = Func::builder("from_bool")
        .input(Field::new::<bool>("C"))
        .output(Field::new::<String>("A"))
        .build(|_| Ok(Outputs::new().with("a", "FOO".to_string())))
        .unwrap();

    let result = Mapper::builder(repeat)
        .with_value(Value::named("a", 12))
        .with_value(Value::named("b", 2))
        .with_converter(from_string)
        .with_converter(from_bool)
        .with_converter(generic_stringify())
        .build()
        .call();

    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    assert_eq!(result.out_as::<String>(0).map(String::as_str), Some("1212"));

    let plan = result.plan().expect("plan is kept");
    assert_eq!(plan.step_names(), vec!["generic_stringify"]);
    let step = &plan.steps[0];
    assert_eq!(step.inputs[0].source, ValueKey::new("a", TypeKey::of::<i32>()));
    assert_eq!(step.outputs, vec![ValueKey::new("a", TypeKey::of::<String>())]);
}

#[test]
fn test_wildcard_prefers_matching_name() {
    let result = Mapper::builder(echo_string("a"))
        .with_value(Value::named("x", 1))
        .with_value(Value::named("a", 2))
        .with_converter(generic_stringify())
        .build()
        .call();

    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    assert_eq!(result.out_as::<String>(0).map(String::as_str), Some("2"));
}

#[test]
fn test_wildcard_falls_back_to_type() {
    let result = Mapper::builder(echo_string("a"))
        .with_value(Value::named("x", 7))
        .with_converter(generic_stringify())
        .build()
        .call();

    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    assert_eq!(result.out_as::<String>(0).map(String::as_str), Some("7"));
    assert!(
        result
            .registry()
            .contains(&ValueKey::new("x", TypeKey::of::<String>()))
    );
}

#[test]
fn test_typed_output_satisfies_other_name() {
    // No converter produces `label`, but any String output may stand in for it.
    let result = Mapper::builder(echo_string("label"))
        .with_value(Value::named("a", 3))
        .with_converter(stringify("a", "a"))
        .build()
        .call();

    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    assert_eq!(result.out_as::<String>(0).map(String::as_str), Some("3"));
    let binding = result.plan().unwrap().target.binding(0).unwrap().clone();
    assert_eq!(binding.source, ValueKey::new("a", TypeKey::of::<String>()));
}

#[test]
fn test_typed_only_value_fills_field() {
    let target = Func::builder("identity")
        .input(Field::new::<i32>("A"))
        .output(Field::new::<i32>("out"))
        .build(|args| Ok(Outputs::new().with("out", *args.get::<i32>("a")?)))
        .unwrap();

    let result = Mapper::builder(target)
        .with_value(Value::typed(5))
        .build()
        .call();

    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    assert_eq!(result.out_as::<i32>(0), Some(&5));
}

#[test]
fn test_name_match_beats_typed_match() {
    let result = Mapper::builder(sum_target())
        .with_value(Value::typed(100))
        .with_value(Value::named("b", 2))
        .with_value(Value::named("a", 1))
        .build()
        .call();

    assert_eq!(result.out_as::<i32>(0), Some(&3));
}

#[test]
fn test_value_feeds_one_field_only() {
    // A single type-only value cannot satisfy both inputs.
    let result = Mapper::builder(sum_target())
        .with_value(Value::typed(4))
        .build()
        .call();

    assert!(matches!(
        result.err(),
        Some(ResolveError::MissingArgument { .. })
    ));
}

#[test]
fn test_names_are_case_insensitive() {
    let result = Mapper::builder(sum_target())
        .with_value(Value::named("A", 1))
        .with_value(Value::named(" b ", 2))
        .build()
        .call();

    assert_eq!(result.out_as::<i32>(0), Some(&3));
}

#[test]
fn test_wildcard_target_passes_input_through() {
    // The target leaves its wildcard output unset, so the input is copied.
    let target = Func::builder("inspect")
        .input(Field::wildcard::<i32>("any"))
        .output(Field::wildcard::<i32>("any"))
        .build(|_| Ok(Outputs::new()))
        .unwrap();

    let result = Mapper::builder(target)
        .with_value(Value::named("n", 9))
        .build()
        .call();

    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    let out = result.out(0).expect("one output");
    assert_eq!(out.name(), "n");
    assert_eq!(out.downcast_ref::<i32>(), Some(&9));
}

#[test]
fn test_only_chosen_converters_are_invoked() {
    let used = Arc::new(AtomicUsize::new(0));
    let unused = Arc::new(AtomicUsize::new(0));

    let result = Mapper::builder(echo_string("a"))
        .with_value(Value::named("a", 3))
        .with_converter(counted_stringify("a", "a", Arc::clone(&used)))
        .with_converter(counted_stringify("c", "d", Arc::clone(&unused)))
        .build()
        .call();

    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    assert_eq!(used.load(Ordering::SeqCst), 1);
    assert_eq!(unused.load(Ordering::SeqCst), 0);
}

#[test]
fn test_chained_conversions_run_in_order() {
    let to_float = Func::builder("to_float")
        .input(Field::new::<String>("a"))
        .output(Field::new::<f64>("a"))
        .build(|args| {
            let text = args.get::<String>("a")?;
            let parsed = text
                .parse::<f64>()
                .map_err(|e| OperationError::failed(e.to_string()))?;
            Ok(Outputs::new().with("a", parsed))
        })
        .unwrap();
    let target = Func::builder("half")
        .input(Field::new::<f64>("a"))
        .output(Field::new::<f64>("out"))
        .build(|args| Ok(Outputs::new().with("out", args.get::<f64>("a")? / 2.0)))
        .unwrap();

    let result = Mapper::builder(target)
        .with_value(Value::named("a", 9))
        .with_converter(to_float)
        .with_converter(stringify("a", "a"))
        .build()
        .call();

    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    assert_eq!(result.out_as::<f64>(0), Some(&4.5));
    let plan = result.plan().unwrap();
    assert_eq!(plan.step_names(), vec!["stringify_a_a", "to_float"]);
}

#[test]
fn test_operation_failure_keeps_bindings() {
    let result = Mapper::builder(echo_string("a"))
        .with_value(Value::named("a", 3))
        .with_converter(failing("explode", "a", "a"))
        .build()
        .call();

    let error = result.err().expect("call should fail");
    match error {
        ResolveError::OperationFailed { operation, .. } => assert_eq!(operation, "explode"),
        other => panic!("expected OperationFailed, got {:?}", other),
    }
    assert!(error.to_string().contains("boom"));
    assert!(result.registry().lookup("a", TypeKey::of::<i32>()).is_some());
    assert!(result.plan().is_some());
}

#[test]
fn test_named_cycle_is_rejected() {
    let back = Func::builder("back")
        .input(Field::new::<String>("a"))
        .output(Field::new::<i32>("a"))
        .build(|args| {
            let parsed = args
                .get::<String>("a")?
                .parse::<i32>()
                .map_err(|e| OperationError::failed(e.to_string()))?;
            Ok(Outputs::new().with("a", parsed))
        })
        .unwrap();

    let result = Mapper::builder(echo_string("a"))
        .with_value(Value::named("a", 1))
        .with_converter(stringify("a", "a"))
        .with_converter(back)
        .build()
        .call();

    match result.err() {
        Some(ResolveError::Cycle { operations }) => {
            assert!(operations.contains(&"stringify_a_a".to_string()));
            assert!(operations.contains(&"back".to_string()));
        }
        other => panic!("expected Cycle, got {:?}", other),
    }
}

#[test]
fn test_invalid_signature_is_reported() {
    struct Broken(Signature);

    impl Operation for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn signature(&self) -> &Signature {
            &self.0
        }
        fn call(&self, _: &Arguments) -> std::result::Result<Outputs, OperationError> {
            Ok(Outputs::new())
        }
    }

    let signature = Signature::new(
        vec![Field::wildcard::<i32>("x"), Field::wildcard::<i32>("y")],
        vec![],
    );
    let result = Mapper::builder(Broken(signature)).build().call();

    assert!(matches!(
        result.err(),
        Some(ResolveError::Signature(SignatureError::MultipleWildcards { .. }))
    ));
}

#[test]
fn test_calls_are_independent() {
    let mapper = Mapper::builder(echo_string("a"))
        .with_value(Value::named("a", 5))
        .with_converter(stringify("a", "a"))
        .build();

    let first = mapper.call();
    let second = mapper.call();

    assert_eq!(first.out_as::<String>(0), second.out_as::<String>(0));
    assert_eq!(first.plan(), second.plan());
    assert_eq!(first.registry().len(), second.registry().len());
}

#[test]
fn test_shared_converters() {
    let converters: Vec<OperationRef> = vec![Arc::new(stringify("a", "a"))];

    for n in [1, 2] {
        let result = Mapper::builder(echo_string("a"))
            .with_value(Value::named("a", n))
            .with_converters(converters.iter().cloned())
            .build()
            .call();
        assert_eq!(result.out_as::<String>(0), Some(&n.to_string()));
    }
}

#[test]
fn test_inherited_output_keeps_its_own_slot() {
    let pair = Func::builder("pair")
        .input(Field::new::<String>("A"))
        .input(Field::new::<String>("B"))
        .output(Field::new::<String>("out"))
        .build(|args| {
            let a = args.get::<String>("a")?;
            let b = args.get::<String>("b")?;
            Ok(Outputs::new().with("out", format!("{}|{}", a, b)))
        })
        .unwrap();

    // The converter's own output slot `b` is already bound, so its result
    // must reach `a` under that name instead.
    let result = Mapper::builder(pair)
        .with_value(Value::named("b", "bee".to_string()))
        .with_value(Value::named("n", 5))
        .with_converter(stringify("N", "B"))
        .build()
        .call();

    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    assert_eq!(result.out_as::<String>(0).map(String::as_str), Some("5|bee"));

    let registry = result.registry();
    let a = registry.lookup("a", TypeKey::of::<String>()).expect("a is bound");
    assert_eq!(a.downcast_ref::<String>().map(String::as_str), Some("5"));
    let b = registry.lookup("b", TypeKey::of::<String>()).expect("b is bound");
    assert_eq!(b.downcast_ref::<String>().map(String::as_str), Some("bee"));

    let step = &result.plan().unwrap().steps[0];
    assert_eq!(step.name, "stringify_N_B");
    assert_eq!(
        step.aliases,
        vec![(0, ValueKey::new("a", TypeKey::of::<String>()))]
    );
}

#[test]
fn test_name_matched_input_beats_earlier_constant() {
    let target = Func::builder("id")
        .input(Field::new::<i32>("A"))
        .output(Field::new::<i32>("out"))
        .build(|args| Ok(Outputs::new().with("out", *args.get::<i32>("a")?)))
        .unwrap();
    let constant = Func::builder("constant")
        .output(Field::new::<i32>("A"))
        .build(|_| Ok(Outputs::new().with("a", 0)))
        .unwrap();
    let parse = Func::builder("parse")
        .input(Field::new::<String>("A"))
        .output(Field::new::<i32>("A"))
        .build(|args| {
            let parsed = args
                .get::<String>("a")?
                .parse::<i32>()
                .map_err(|e| OperationError::failed(e.to_string()))?;
            Ok(Outputs::new().with("a", parsed))
        })
        .unwrap();

    let result = Mapper::builder(target)
        .with_value(Value::named("a", "42".to_string()))
        .with_converter(constant)
        .with_converter(parse)
        .build()
        .call();

    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    assert_eq!(result.out_as::<i32>(0), Some(&42));
    let plan = result.plan().unwrap();
    assert_eq!(plan.step_names(), vec!["parse"]);
    assert_eq!(plan.steps[0].cost, -1);
}

#[test]
fn test_unsatisfiable_chain_reports_target_field() {
    let result = Mapper::builder(echo_string("a"))
        .with_converter(stringify("a", "a"))
        .build()
        .call();

    match result.err() {
        Some(ResolveError::MissingArgument { name, ty }) => {
            assert_eq!(name, "a");
            assert_eq!(*ty, TypeKey::of::<String>());
        }
        other => panic!("expected MissingArgument, got {:?}", other),
    }
    assert!(result.plan().is_none());
}

#[test]
fn test_converters_feeding_each_other_by_type() {
    // `a/i32` can only come from `parse`, whose input `a/String` would come
    // from `stringify`, which needs `a/i32` again. The loop is skipped and
    // `parse` reads the caller's string by type instead.
    let double = Func::builder("double")
        .input(Field::new::<i32>("A"))
        .output(Field::new::<i32>("out"))
        .build(|args| Ok(Outputs::new().with("out", args.get::<i32>("a")? * 2)))
        .unwrap();
    let parse = Func::builder("parse")
        .input(Field::new::<String>("A"))
        .output(Field::new::<i32>("B"))
        .build(|args| {
            let parsed = args
                .get::<String>("a")?
                .parse::<i32>()
                .map_err(|e| OperationError::failed(e.to_string()))?;
            Ok(Outputs::new().with("b", parsed))
        })
        .unwrap();

    let mapper = Mapper::builder(double)
        .with_value(Value::named("seed", "21".to_string()))
        .with_converter(stringify("a", "a"))
        .with_converter(parse)
        .build();
    let result = mapper.call();

    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    assert_eq!(result.out_as::<i32>(0), Some(&42));
    let plan = result.plan().unwrap();
    assert_eq!(plan.step_names(), vec!["parse"]);
    assert_eq!(
        plan.steps[0].inputs[0].source,
        ValueKey::new("seed", TypeKey::of::<String>())
    );
    assert_eq!(&mapper.plan().expect("plan"), plan);
}

#[test]
fn test_execute_runs_a_prepared_plan() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mapper = Mapper::builder(echo_string("a"))
        .with_value(Value::named("a", 8))
        .with_converter(counted_stringify("a", "a", Arc::clone(&counter)))
        .build();

    let plan = mapper.plan().expect("plan");
    let result = mapper.execute(plan.clone());

    assert_eq!(result.plan(), Some(&plan));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    let outputs = result.into_result().expect("call succeeds");
    assert_eq!(outputs[0].downcast_ref::<String>().map(String::as_str), Some("8"));
}

#[test]
fn test_into_result_carries_the_error() {
    let error = Mapper::builder(sum_target())
        .with_value(Value::named("a", 1))
        .build()
        .call()
        .into_result()
        .expect_err("b is missing");

    assert!(matches!(error, ResolveError::MissingArgument { ref name, .. } if name == "b"));
}

#[test]
fn test_shared_target_and_accessors() {
    let target: OperationRef = Arc::new(echo_string("a"));
    let converters: Vec<OperationRef> = vec![Arc::new(stringify("a", "a"))];

    let mapper = Mapper::builder_shared(Arc::clone(&target))
        .with_value(Value::named("a", 2))
        .with_converters(converters.iter().cloned())
        .build();

    assert!(Arc::ptr_eq(mapper.target(), &target));
    assert_eq!(mapper.converters().len(), 1);
    assert_eq!(mapper.converters()[0].name(), "stringify_a_a");
    assert_eq!(mapper.call().out_as::<String>(0).map(String::as_str), Some("2"));
}
