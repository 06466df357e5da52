use super::host::{HostResult, Invoker, ParamType};
use crate::interpreter::value::{Value, ValueKind};

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// What the interpreter wants to do with a member.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum Access {
    Get,
    Set(ValueKind),
    Call(Vec<ValueKind>),
}

impl Access {
    pub fn call(args: &[Value]) -> Self {
        Access::Call(args.iter().map(Value::kind).collect())
    }

    pub fn arity(&self) -> usize {
        match self {
            Access::Get => 0,
            Access::Set(_) => 1,
            Access::Call(kinds) => kinds.len(),
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Access::Get => f.write_str("readable property"),
            Access::Set(kind) => write!(f, "writable property accepting {}", kind),
            Access::Call(kinds) => {
                let kinds: Vec<_> = kinds.iter().map(|k| k.to_string()).collect();
                write!(f, "method accepting ({})", kinds.join(", "))
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum HandleKind {
    Getter,
    Setter,
    Method,
    FieldGet,
    FieldSet,
    DuckGet,
    DuckSet,
}

struct HandleData {
    member: String,
    kind: HandleKind,
    params: Vec<ParamType>,
    bound_name: Option<String>,
    invoker: Invoker,
}

/// A resolved, invocable member binding.
#[derive(Clone)]
pub struct MemberHandle(Arc<HandleData>);

impl MemberHandle {
    pub fn new(member: &str, kind: HandleKind, params: Vec<ParamType>, invoker: Invoker) -> Self {
        MemberHandle(Arc::new(HandleData {
            member: member.to_owned(),
            kind,
            params,
            bound_name: None,
            invoker,
        }))
    }

    /// Duck-typed accessor over this `get`/`set` method. The property name
    /// is passed as first argument on every invocation.
    pub fn bound_to(&self, property: &str, kind: HandleKind) -> Self {
        MemberHandle(Arc::new(HandleData {
            member: self.0.member.clone(),
            kind,
            params: self.0.params.clone(),
            bound_name: Some(property.to_owned()),
            invoker: self.0.invoker.clone(),
        }))
    }

    /// Property name bound by [`MemberHandle::bound_to`].
    pub fn bound_name(&self) -> Option<&str> {
        self.0.bound_name.as_deref()
    }

    pub fn member(&self) -> &str {
        &self.0.member
    }

    pub fn kind(&self) -> HandleKind {
        self.0.kind
    }

    pub fn params(&self) -> &[ParamType] {
        &self.0.params
    }

    pub fn invoke(&self, receiver: &dyn Any, args: Vec<Value>) -> HostResult<Value> {
        let mut full_args = Vec::with_capacity(args.len() + 1);
        if let Some(name) = &self.0.bound_name {
            full_args.push(Value::String(name.clone()));
        }
        full_args.extend(args);

        let full_args: Vec<Value> = match self.0.params.len() {
            0 => full_args,
            _ => full_args
                .into_iter()
                .zip(self.0.params.iter())
                .map(|(value, param)| param.coerce(value))
                .collect(),
        };

        (self.0.invoker)(receiver, &full_args)
    }

    pub fn ptr_eq(&self, other: &MemberHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for MemberHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{:?} {}{:?}>", self.0.kind, self.0.member, self.0.params)
    }
}
