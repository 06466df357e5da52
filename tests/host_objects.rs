use rusty_jexl::introspection::{str_arg, HostError};
use rusty_jexl::{
    Context, Engine, EvalErrorKind, HostObject, Mode, Options, OverloadPolicy, ParamType,
    TypeInfo, Value,
};

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Mutex, OnceLock};
use std::thread;
use std::time::Duration;

/// Host type that is itself private but exposes public members.
#[derive(Debug, Default)]
struct Report {
    code: Mutex<String>,
}

impl Report {
    fn code(&self) -> String {
        self.code.lock().unwrap().clone()
    }
}

impl HostObject for Report {
    fn type_info(&self) -> &'static TypeInfo {
        static TYPE: OnceLock<TypeInfo> = OnceLock::new();
        TYPE.get_or_init(|| {
            TypeInfo::builder::<Report>("Report")
                .private()
                .method("setCode", &[ParamType::String], |r, args| {
                    let code = str_arg(args, 0)?.unwrap_or_default();
                    *r.code.lock().map_err(|e| HostError::Failed(e.to_string()))? = code.to_owned();
                    Ok(Value::Null)
                })
                .method("getCode", &[], |r, _| Ok(Value::from(r.code())))
                .private_method("reset", &[], |r, _| {
                    r.code.lock().unwrap().clear();
                    Ok(Value::Null)
                })
                .build()
        })
    }
}

#[derive(Debug)]
struct Base {
    id: i64,
}

#[derive(Debug)]
struct Derived {
    base: Base,
    label: String,
}

fn base_type() -> &'static TypeInfo {
    static TYPE: OnceLock<TypeInfo> = OnceLock::new();
    TYPE.get_or_init(|| {
        TypeInfo::builder::<Base>("Base")
            .method("getId", &[], |b, _| Ok(Value::Integer(b.id)))
            .method("describe", &[], |b, _| Ok(Value::from(format!("base {}", b.id))))
            .build()
    })
}

impl HostObject for Base {
    fn type_info(&self) -> &'static TypeInfo {
        base_type()
    }
}

impl HostObject for Derived {
    fn type_info(&self) -> &'static TypeInfo {
        static TYPE: OnceLock<TypeInfo> = OnceLock::new();
        TYPE.get_or_init(|| {
            TypeInfo::builder::<Derived>("Derived")
                .private()
                .method("describe", &[], |d, _| Ok(Value::from(d.label.clone())))
                .field("label", |d| Value::from(d.label.clone()))
                .extends(base_type(), |d: &Derived| &d.base)
                .build()
        })
    }
}

#[derive(Debug)]
struct Overloads;

impl HostObject for Overloads {
    fn type_info(&self) -> &'static TypeInfo {
        static TYPE: OnceLock<TypeInfo> = OnceLock::new();
        TYPE.get_or_init(|| {
            TypeInfo::builder::<Overloads>("Overloads")
                .method("pick", &[ParamType::Float], |_, _| Ok(Value::from("float")))
                .method("pick", &[ParamType::Integer], |_, _| Ok(Value::from("integer")))
                .build()
        })
    }
}

/// Host type with a writable field and a hidden one.
#[derive(Debug)]
struct Counter {
    count: Mutex<Value>,
}

impl Default for Counter {
    fn default() -> Self {
        Counter { count: Mutex::new(Value::Null) }
    }
}

impl HostObject for Counter {
    fn type_info(&self) -> &'static TypeInfo {
        static TYPE: OnceLock<TypeInfo> = OnceLock::new();
        TYPE.get_or_init(|| {
            TypeInfo::builder::<Counter>("Counter")
                .field_mut(
                    "count",
                    |c| c.count.lock().unwrap().clone(),
                    |c, value| {
                        *c.count.lock().map_err(|e| HostError::Failed(e.to_string()))? = value;
                        Ok(())
                    },
                )
                .private_field("secret", |_| Value::from("hidden"))
                .build()
        })
    }
}

/// Host type reachable only through `get(name)` and `set(name, value)`.
#[derive(Debug, Default)]
struct Bag {
    entries: Mutex<Vec<(String, Value)>>,
}

impl Bag {
    fn entry(&self, key: &str) -> Value {
        let entries = self.entries.lock().unwrap();
        entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map_or(Value::Null, |(_, v)| v.clone())
    }
}

impl HostObject for Bag {
    fn type_info(&self) -> &'static TypeInfo {
        static TYPE: OnceLock<TypeInfo> = OnceLock::new();
        TYPE.get_or_init(|| {
            TypeInfo::builder::<Bag>("Bag")
                .method("get", &[ParamType::String], |b, args| {
                    Ok(b.entry(str_arg(args, 0)?.unwrap_or_default()))
                })
                .method("set", &[ParamType::String, ParamType::Any], |b, args| {
                    let key = str_arg(args, 0)?.unwrap_or_default().to_owned();
                    let value = args.get(1).cloned().unwrap_or(Value::Null);
                    b.entries
                        .lock()
                        .map_err(|e| HostError::Failed(e.to_string()))?
                        .push((key, value));
                    Ok(Value::Null)
                })
                .build()
        })
    }
}

fn context_with_result() -> (Context, Value) {
    let result = Value::object(Report::default());
    let mut context = Context::new();
    context.set("resultat", result.clone());
    (context, result)
}

#[test]
fn test_public_setter_on_private_type() {
    let engine = Engine::new();

    for (source, mode) in [
        ("resultat.setCode('OK')", Mode::Expression),
        ("resultat.setCode('OK');", Mode::Script),
    ] {
        let (mut context, result) = context_with_result();
        let unit = engine.compile(source, mode).unwrap();
        assert_eq!(unit.text(), source);
        assert_eq!(engine.evaluate(&unit, &mut context), Ok(Value::Null));
        assert_eq!(result.downcast_ref::<Report>().unwrap().code(), "OK");
    }
}

#[test]
fn test_property_through_getter_and_setter() {
    let engine = Engine::new();
    let (mut context, result) = context_with_result();

    let value = engine.run("resultat.code = 'A'; resultat.code + '!'", Mode::Script, &mut context);
    assert_eq!(value, Ok(Value::from("A!")));
    assert_eq!(result.downcast_ref::<Report>().unwrap().code(), "A");
}

#[test]
fn test_private_member_is_invisible() {
    let engine = Engine::new();
    let (mut context, _) = context_with_result();

    let err = engine
        .evaluate(&engine.create_expression("resultat.reset()").unwrap(), &mut context)
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::MemberNotFound { .. }));
}

#[test]
fn test_wrong_argument_type() {
    let engine = Engine::new();
    let (mut context, _) = context_with_result();

    let err = engine
        .run("resultat.setCode(1)", Mode::Expression, &mut context)
        .unwrap_err();
    assert!(err.to_string().contains("setCode"), "{}", err);
}

#[test]
fn test_while_script_updates_context() {
    let engine = Engine::new();
    let unit = engine.create_script("while (x < 10) x = x + 1;").unwrap();
    let mut context = Context::new();
    context.set("x", 1);

    assert_eq!(engine.evaluate(&unit, &mut context), Ok(Value::Integer(10)));
    assert_eq!(context.get("x"), Value::Integer(10));
}

#[test]
fn test_loop_terminates_at_bound() {
    let engine = Engine::new();
    let unit = engine.create_script("while (x < n) x = x + 1;").unwrap();

    for n in [0, 1, 7, 1000] {
        let mut context = Context::new();
        context.set("x", 0);
        context.set("n", n);
        engine.evaluate(&unit, &mut context).unwrap();
        assert_eq!(context.get("x"), Value::Integer(n));
    }
}

#[test]
fn test_undefined_and_incomparable() {
    let engine = Engine::new();
    let mut context = Context::new();

    assert_eq!(engine.run("y", Mode::Expression, &mut context), Ok(Value::Null));
    assert_eq!(
        engine.run("'abc' == 1", Mode::Expression, &mut context),
        Ok(Value::Boolean(false))
    );
    let err = engine
        .evaluate(&engine.create_expression("'abc' < 1").unwrap(), &mut context)
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::Type(_)));
}

#[test]
fn test_strict_mode() {
    let engine = Engine::with_options(Options::default().strict(true));
    let mut context = Context::new();

    let err = engine
        .evaluate(&engine.create_expression("y").unwrap(), &mut context)
        .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::UndefinedVariable("y".to_owned()));

    context.set("y", Value::Null);
    let err = engine
        .evaluate(&engine.create_expression("y + 1").unwrap(), &mut context)
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::Type(_)));
}

#[test]
fn test_inherited_members() {
    let engine = Engine::new();
    let mut context = Context::new();
    context.set(
        "item",
        Value::object(Derived {
            base: Base { id: 7 },
            label: "derived".to_owned(),
        }),
    );

    let value = engine.run(
        "item.getId() + ':' + item.id + ':' + item.describe() + ':' + item.label",
        Mode::Expression,
        &mut context,
    );
    assert_eq!(value, Ok(Value::from("7:7:derived:derived")));
}

#[test]
fn test_overload_policies() {
    let mut context = Context::new();
    context.set("o", Value::object(Overloads));

    let exact = Engine::new();
    assert_eq!(
        exact.run("o.pick(1)", Mode::Expression, &mut context),
        Ok(Value::from("integer"))
    );

    let first = Engine::with_options(
        Options::default().overload_policy(OverloadPolicy::FirstCompatible),
    );
    assert_eq!(
        first.run("o.pick(1)", Mode::Expression, &mut context),
        Ok(Value::from("float"))
    );
    assert_eq!(
        first.run("o.pick(1.5)", Mode::Expression, &mut context),
        Ok(Value::from("float"))
    );
}

#[test]
fn test_parallel_evaluation() {
    let engine = Engine::new();
    let unit = engine
        .create_script("while (x < n) x = x + 1; r.setCode('done ' + x); x")
        .unwrap();

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let (engine, unit) = (&engine, &unit);
                scope.spawn(move || {
                    let (mut context, result) = context_with_result();
                    context.set("r", result.clone());
                    context.set("x", 0);
                    context.set("n", i * 100);
                    let value = engine.evaluate(unit, &mut context).unwrap();
                    (i, value, result.downcast_ref::<Report>().unwrap().code())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.len(), 8);
    for (i, value, code) in results {
        assert_eq!(value, Value::Integer(i * 100));
        assert_eq!(code, format!("done {}", i * 100));
    }
}

#[test]
fn test_member_cache_is_shared() {
    use rusty_jexl::Introspector;
    use std::sync::Arc;

    let introspector = Arc::new(Introspector::default());
    let engine = Engine::with_resolver(Options::default(), introspector.clone());
    let unit = engine.create_expression("resultat.setCode('x')").unwrap();

    for _ in 0..3 {
        let (mut context, _) = context_with_result();
        engine.evaluate(&unit, &mut context).unwrap();
    }
    assert_eq!(introspector.cached_handles(), 1);
}

#[test]
fn test_writable_field() {
    let engine = Engine::new();
    let counter = Value::object(Counter::default());
    let mut context = Context::new();
    context.set("c", counter.clone());

    let value = engine.run("c.count = 3; c.count = c.count + 1; c.count", Mode::Script, &mut context);
    assert_eq!(value, Ok(Value::Integer(4)));
    assert_eq!(
        *counter.downcast_ref::<Counter>().unwrap().count.lock().unwrap(),
        Value::Integer(4)
    );
}

#[test]
fn test_private_field_is_invisible() {
    let engine = Engine::new();
    let mut context = Context::new();
    context.set("c", Value::object(Counter::default()));

    for source in ["c.secret", "c['secret']"] {
        let err = engine
            .evaluate(&engine.create_expression(source).unwrap(), &mut context)
            .unwrap_err();
        assert!(matches!(err.kind, EvalErrorKind::MemberNotFound { .. }), "{}", source);
    }
}

#[test]
fn test_duck_typed_property_and_index_assignment() {
    let engine = Engine::new();
    let bag = Value::object(Bag::default());
    let mut context = Context::new();
    context.set("b", bag.clone());

    let value = engine.run(
        "b['k'] = 'v'; b.other = 2; b.other + 1 + b['k']",
        Mode::Script,
        &mut context,
    );
    assert_eq!(value, Ok(Value::from("3v")));

    let bag = bag.downcast_ref::<Bag>().unwrap();
    assert_eq!(bag.entry("k"), Value::from("v"));
    assert_eq!(bag.entry("other"), Value::Integer(2));
    assert_eq!(bag.entry("missing"), Value::Null);
}

#[test]
fn test_unbounded_loop_does_not_terminate() {
    let (tx, rx) = mpsc::channel();

    // The worker never finishes; it is left detached when the test returns.
    thread::spawn(move || {
        let engine = Engine::new();
        let mut context = Context::new();
        context.set("x", 0);
        let _ = tx.send(engine.run("while (true) x = x + 1;", Mode::Script, &mut context));
    });

    assert_eq!(
        rx.recv_timeout(Duration::from_millis(200)),
        Err(RecvTimeoutError::Timeout)
    );
}
