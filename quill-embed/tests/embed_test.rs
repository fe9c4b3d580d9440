// quill-embed integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Comprehensive tests for the quill-embed embedding API.

use std::cell::Cell;
use std::rc::Rc;

use quill_embed::{Engine, Error, ErrorKind, Kind, Val};

fn eval_err_kind(engine: &Engine, code: &str) -> ErrorKind {
    match engine.eval(code) {
        Ok(val) => panic!("expected error for '{}' but got {}", code, val),
        Err(Error::Eval(e)) => e.kind,
        Err(other) => panic!("expected eval error for '{}' but got {}", code, other),
    }
}

// =============================================================================
// Evaluation and the global scope
// =============================================================================

mod evaluation {
    use super::*;

    #[test]
    fn eval_returns_value() {
        let engine = Engine::new();
        assert_eq!(engine.eval("return 1 + 2;").unwrap(), Val::Int(3));
        assert_eq!(engine.eval("int x = 5;").unwrap(), Val::Null);
    }

    #[test]
    fn declarations_persist_across_evals() {
        let engine = Engine::new();
        engine.eval("int counter = 0;").unwrap();
        engine.eval("counter += 1;").unwrap();
        engine.eval("counter += 1;").unwrap();
        assert_eq!(engine.eval("return counter;").unwrap(), Val::Int(2));
    }

    #[test]
    fn set_declares_and_get_reads() {
        let engine = Engine::new();
        engine.set("speed", 2.5f64).unwrap();
        assert_eq!(engine.get("speed"), Some(Val::Float(2.5)));
        assert_eq!(engine.get_as::<f64>("speed"), Some(2.5));
        assert_eq!(engine.get("missing"), None);
    }

    #[test]
    fn set_existing_coerces_to_declared_kind() {
        let engine = Engine::new();
        engine.eval("float f = 0.0;").unwrap();
        engine.set("f", 3i64).unwrap();
        assert_eq!(engine.get("f"), Some(Val::Float(3.0)));
        // A string cannot become a float.
        assert!(engine.set("f", "oops").is_err());
    }

    #[test]
    fn scripts_see_host_set_values() {
        let engine = Engine::new();
        engine.set("hp", 100i64).unwrap();
        engine.eval("hp = hp - 30;").unwrap();
        assert_eq!(engine.get_as::<i64>("hp"), Some(70));
    }

    #[test]
    fn try_get_as_distinguishes_missing_from_mismatch() {
        let engine = Engine::new();
        engine.set("name", "quill").unwrap();
        assert_eq!(engine.try_get_as::<i64>("absent").unwrap(), None);
        assert!(engine.try_get_as::<i64>("name").is_err());
        assert_eq!(
            engine.try_get_as::<String>("name").unwrap(),
            Some("quill".to_string())
        );
    }

    #[test]
    fn arrays_cross_the_boundary() {
        let engine = Engine::new();
        engine.set("xs", vec![1i64, 2, 3]).unwrap();
        engine
            .eval(
                "int total = 0;
                 foreach (int x in xs) { total += x; }",
            )
            .unwrap();
        assert_eq!(engine.get_as::<i64>("total"), Some(6));
        assert_eq!(engine.get_as::<Vec<i64>>("xs").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn vectors_cross_the_boundary() {
        let engine = Engine::new();
        engine.set("pos", [1.0, 2.0, 3.0]).unwrap();
        engine.eval("pos = pos * 2.0;").unwrap();
        assert_eq!(
            engine.get_as::<[f64; 3]>("pos"),
            Some([2.0, 4.0, 6.0])
        );
    }
}

// =============================================================================
// Typed function binding
// =============================================================================

mod binding {
    use super::*;

    #[test]
    fn register_fn_all_arities() {
        let mut engine = Engine::new();
        engine.register_fn("zero", || 0i64);
        engine.register_fn("inc", |n: i64| n + 1);
        engine.register_fn("add3", |a: i64, b: i64, c: i64| a + b + c);
        assert_eq!(engine.eval("return zero();").unwrap(), Val::Int(0));
        assert_eq!(engine.eval("return inc(41);").unwrap(), Val::Int(42));
        assert_eq!(
            engine.eval("return add3(1, 2, 3);").unwrap(),
            Val::Int(6)
        );
    }

    #[test]
    fn typed_arguments_check_kinds() {
        let mut engine = Engine::new();
        engine.register_fn("inc", |n: i64| n + 1);
        let err = eval_err_kind(&engine, "return inc(\"one\");");
        let ErrorKind::ArgumentTypeMismatch {
            name,
            index,
            expected,
            got,
        } = err
        else {
            panic!("expected argument mismatch");
        };
        assert_eq!(name, "inc");
        assert_eq!(index, 0);
        assert_eq!(expected, Kind::Int);
        assert_eq!(got, Kind::Str);
    }

    #[test]
    fn float_parameters_accept_ints() {
        let mut engine = Engine::new();
        engine.register_fn("half", |n: f64| n / 2.0);
        assert_eq!(engine.eval("return half(5);").unwrap(), Val::Float(2.5));
    }

    #[test]
    fn result_return_becomes_host_error() {
        let mut engine = Engine::new();
        engine.register_fn("checked", |n: i64| -> Result<i64, String> {
            if n < 0 {
                Err(format!("negative input {}", n))
            } else {
                Ok(n)
            }
        });
        assert_eq!(engine.eval("return checked(5);").unwrap(), Val::Int(5));
        let err = eval_err_kind(&engine, "return checked(-5);");
        assert!(matches!(err, ErrorKind::Host(msg) if msg.contains("negative input")));
    }

    #[test]
    fn arity_overloading_by_count() {
        let mut engine = Engine::new();
        engine.register_fn("vol", || 1.0f64);
        engine.register_fn("vol", |v: f64| v);
        assert_eq!(engine.eval("return vol();").unwrap(), Val::Float(1.0));
        assert_eq!(engine.eval("return vol(0.5);").unwrap(), Val::Float(0.5));
    }

    #[test]
    fn wrong_arity_reports_expected_count() {
        let mut engine = Engine::new();
        engine.register_fn("pair", |a: i64, b: i64| a + b);
        let err = eval_err_kind(&engine, "return pair(1);");
        assert!(matches!(
            err,
            ErrorKind::IncorrectParameters {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn unknown_function_named_in_error() {
        let engine = Engine::new();
        let err = eval_err_kind(&engine, "ghost();");
        assert!(matches!(err, ErrorKind::FunctionNotFound(name) if name == "ghost"));
    }

    #[test]
    fn register_native_sees_raw_values() {
        let mut engine = Engine::new();
        engine.register_native("kind_of", 1, |args| {
            Ok(Val::str(args[0].kind().to_string()))
        });
        assert_eq!(
            engine.eval("return kind_of((1, 2));").unwrap(),
            Val::str("float2")
        );
    }

    #[test]
    fn host_side_call() {
        let mut engine = Engine::new();
        engine.register_fn("double", |n: i64| n * 2);
        assert_eq!(
            engine.call("double", &[Val::Int(21)]).unwrap(),
            Val::Int(42)
        );
        assert_eq!(
            engine.call("max", &[Val::Int(1), Val::Int(9)]).unwrap(),
            Val::Int(9)
        );
    }

    #[test]
    fn closures_capture_host_state() {
        let mut engine = Engine::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        engine.register_fn("tick", move || {
            counter.set(counter.get() + 1);
        });
        engine
            .eval("for (int i = 0; i < 4; i += 1) { tick(); }")
            .unwrap();
        assert_eq!(hits.get(), 4);
    }

    #[test]
    fn new_bare_has_no_builtins() {
        let engine = Engine::new_bare();
        assert!(engine.function_names().is_empty());
        let err = eval_err_kind(&engine, "return max(1, 2);");
        assert!(matches!(err, ErrorKind::FunctionNotFound(_)));
    }

    #[test]
    fn function_names_include_builtins() {
        let engine = Engine::new();
        let names = engine.function_names();
        assert!(names.contains(&"print".to_string()));
        assert!(names.contains(&"max".to_string()));
    }
}

// =============================================================================
// Script registry surface
// =============================================================================

mod scripts {
    use super::*;

    #[test]
    fn load_and_run() {
        let mut engine = Engine::new();
        engine
            .load_script("damage", "return 5 + 2;")
            .unwrap();
        assert_eq!(engine.run_script("damage").unwrap(), Val::Int(7));
    }

    #[test]
    fn named_scripts_see_globals() {
        let mut engine = Engine::new();
        engine.eval("int base = 10;").unwrap();
        engine
            .load_script("damage", "return base * 2;")
            .unwrap();
        assert_eq!(engine.run_script("damage").unwrap(), Val::Int(20));
    }

    #[test]
    fn append_continues_script() {
        let mut engine = Engine::new();
        engine.append_script("s", "int total = 1;").unwrap();
        engine.append_script("s", "total += 2; return total;").unwrap();
        assert_eq!(engine.run_script("s").unwrap(), Val::Int(3));
    }

    #[test]
    fn load_replaces_previous() {
        let mut engine = Engine::new();
        engine.load_script("s", "return 1;").unwrap();
        engine.load_script("s", "return 2;").unwrap();
        assert_eq!(engine.run_script("s").unwrap(), Val::Int(2));
    }

    #[test]
    fn run_unknown_script_fails() {
        let engine = Engine::new();
        assert!(engine.run_script("ghost").is_err());
    }

    #[test]
    fn write_script_canonicalizes() {
        let mut engine = Engine::new();
        engine.load_script("s", "int   x=1;return x;").unwrap();
        assert_eq!(
            engine.write_script("s").unwrap(),
            "int x = 1;\nreturn x;\n"
        );
        assert_eq!(engine.write_script("ghost"), None);
    }

    #[test]
    fn remove_script() {
        let mut engine = Engine::new();
        engine.load_script("s", "return 1;").unwrap();
        assert!(engine.remove_script("s"));
        assert!(!engine.remove_script("s"));
        assert!(engine.run_script("s").is_err());
    }

    #[test]
    fn script_names_sorted() {
        let mut engine = Engine::new();
        engine.load_script("b", "").unwrap();
        engine.load_script("a", "").unwrap();
        assert_eq!(engine.script_names(), vec!["a".to_string(), "b".to_string()]);
    }
}

// =============================================================================
// Error traces
// =============================================================================

mod errors {
    use super::*;

    #[test]
    fn eval_errors_carry_position() {
        let engine = Engine::new();
        let err = engine.eval("int a = 1;\nreturn a / 0;").unwrap_err();
        let Error::Eval(e) = err else {
            panic!("expected eval error");
        };
        assert_eq!(e.trace.line, 2);
        assert!(matches!(e.kind, ErrorKind::DivisionByZero));
    }

    #[test]
    fn named_script_errors_name_the_script() {
        let mut engine = Engine::new();
        engine.load_script("boom", "return missing;").unwrap();
        let err = engine.run_script("boom").unwrap_err();
        let Error::Eval(e) = err else {
            panic!("expected eval error");
        };
        assert_eq!(&*e.trace.source, "boom");
    }

    #[test]
    fn parse_errors_surface() {
        let engine = Engine::new();
        assert!(matches!(
            engine.eval("int = 5;"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn array_element_kind_mismatch() {
        let engine = Engine::new();
        engine.set("xs", vec![1.5f64, 2.5]).unwrap();
        assert_eq!(engine.get_as::<Vec<i64>>("xs"), None);
        assert_eq!(
            engine.get_as::<Vec<f64>>("xs").unwrap(),
            vec![1.5, 2.5]
        );
    }

    #[test]
    fn index_out_of_range_reports_length() {
        let engine = Engine::new();
        engine.set("xs", vec![1i64, 2, 3, 4, 5]).unwrap();
        let err = eval_err_kind(&engine, "return xs[9];");
        assert!(matches!(
            err,
            ErrorKind::IndexOutOfRange {
                index: 9,
                length: 5
            }
        ));
    }
}
