use super::errors::{EvalError, EvalErrorKind, EvalResult};
use super::members::try_invoke;
use super::value::Value;
use crate::frontend::grammar::Builtin;
use crate::introspection::MemberResolver;

pub fn call_builtin(
    builtin: Builtin,
    arg: Value,
    resolver: &dyn MemberResolver,
) -> EvalResult<Value> {
    match builtin {
        Builtin::Size => size(arg, resolver),
        Builtin::Empty => empty(arg, resolver),
    }
}

/// Character count of a string, 0 for null, `size()` of a host object.
fn size(arg: Value, resolver: &dyn MemberResolver) -> EvalResult<Value> {
    match &arg {
        Value::Null => Ok(Value::Integer(0)),
        Value::String(s) => Ok(Value::Integer(s.chars().count() as i64)),
        Value::Object(_) => try_invoke(resolver, &arg, "size", vec![])?.ok_or_else(|| no_size(&arg)),
        _ => Err(no_size(&arg)),
    }
}

fn empty(arg: Value, resolver: &dyn MemberResolver) -> EvalResult<Value> {
    let is_empty = match &arg {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Object(_) => match try_invoke(resolver, &arg, "isEmpty", vec![])? {
            Some(result) => result.is_truthy(),
            None => try_invoke(resolver, &arg, "size", vec![])?
                .map_or(false, |n| n == Value::Integer(0)),
        },
        _ => false,
    };
    Ok(Value::Boolean(is_empty))
}

fn no_size(arg: &Value) -> EvalError {
    EvalError::new(EvalErrorKind::Type(format!("{} has no size", arg.type_name())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspection::{Introspector, TypeInfo};
    use crate::introspection::host::HostObject;
    use std::sync::OnceLock;

    #[derive(Debug)]
    struct Bag(Vec<i64>);

    impl HostObject for Bag {
        fn type_info(&self) -> &'static TypeInfo {
            static TYPE: OnceLock<TypeInfo> = OnceLock::new();
            TYPE.get_or_init(|| {
                TypeInfo::builder::<Bag>("Bag")
                    .method("size", &[], |bag, _| Ok(Value::Integer(bag.0.len() as i64)))
                    .build()
            })
        }
    }

    #[derive(Debug)]
    struct Opaque;

    impl HostObject for Opaque {
        fn type_info(&self) -> &'static TypeInfo {
            static TYPE: OnceLock<TypeInfo> = OnceLock::new();
            TYPE.get_or_init(|| TypeInfo::builder::<Opaque>("Opaque").build())
        }
    }

    #[test]
    fn test_size() {
        let resolver = Introspector::default();
        let size = |v: Value| call_builtin(Builtin::Size, v, &resolver);
        assert_eq!(size(Value::from("héllo")), Ok(Value::Integer(5)));
        assert_eq!(size(Value::Null), Ok(Value::Integer(0)));
        assert_eq!(size(Value::object(Bag(vec![1, 2]))), Ok(Value::Integer(2)));
        assert!(size(Value::object(Opaque)).is_err());
        assert!(size(Value::Integer(3)).is_err());
    }

    #[test]
    fn test_empty() {
        let resolver = Introspector::default();
        let empty = |v: Value| call_builtin(Builtin::Empty, v, &resolver);
        assert_eq!(empty(Value::Null), Ok(Value::Boolean(true)));
        assert_eq!(empty(Value::from("")), Ok(Value::Boolean(true)));
        assert_eq!(empty(Value::from(" ")), Ok(Value::Boolean(false)));
        assert_eq!(empty(Value::object(Bag(vec![]))), Ok(Value::Boolean(true)));
        assert_eq!(empty(Value::object(Opaque)), Ok(Value::Boolean(false)));
        assert_eq!(empty(Value::Integer(0)), Ok(Value::Boolean(false)));
    }
}
