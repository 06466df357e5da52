use super::errors::{EvalError, EvalErrorKind, EvalResult};
use super::value::Value;
use crate::introspection::resolver::receiver;
use crate::introspection::{Access, MemberHandle, MemberResolver, ResolveError};

/// Resolves `name` on `target` and runs it with `args`.
pub fn invoke(
    resolver: &dyn MemberResolver,
    target: &Value,
    name: &str,
    access: Access,
    args: Vec<Value>,
) -> EvalResult<Value> {
    let handle = resolve(resolver, target, name, &access)?;
    run(&handle, target, args)
}

/// Like [`invoke`], but a missing member yields `None` instead of an error.
pub fn try_invoke(
    resolver: &dyn MemberResolver,
    target: &Value,
    name: &str,
    args: Vec<Value>,
) -> EvalResult<Option<Value>> {
    match resolver.resolve(target, name, &Access::call(&args)) {
        Ok(handle) => run(&handle, target, args).map(Some),
        Err(ResolveError::NotFound { .. } | ResolveError::NotIntrospectable(_)) => Ok(None),
    }
}

pub fn resolve(
    resolver: &dyn MemberResolver,
    target: &Value,
    name: &str,
    access: &Access,
) -> EvalResult<MemberHandle> {
    if target.is_null() {
        return Err(EvalError::new(EvalErrorKind::Property(name.to_owned())));
    }

    resolver
        .resolve(target, name, access)
        .map_err(|err| match err {
            ResolveError::NotFound {
                type_name,
                member,
                access,
            } => EvalError::new(EvalErrorKind::MemberNotFound {
                type_name,
                member,
                access,
            }),
            ResolveError::NotIntrospectable(kind) => {
                EvalError::new(EvalErrorKind::MemberNotFound {
                    type_name: kind.to_string(),
                    member: name.to_owned(),
                    access: access.clone(),
                })
            }
        })
}

pub fn run(handle: &MemberHandle, target: &Value, args: Vec<Value>) -> EvalResult<Value> {
    let receiver = receiver(target).ok_or_else(|| {
        EvalError::new(EvalErrorKind::Type(format!(
            "{} values have no members",
            target.type_name()
        )))
    })?;

    handle.invoke(receiver, args).map_err(|source| {
        EvalError::new(EvalErrorKind::Invocation {
            member: handle.member().to_owned(),
            source,
        })
    })
}
