use crate::interpreter::value::{Value, ValueKind};

use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by a host member while it runs.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum HostError {
    #[error("receiver is not a `{0}`")]
    WrongReceiver(&'static str),
    #[error("argument {0} has the wrong type")]
    BadArgument(usize),
    #[error("{0}")]
    Failed(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Type-erased member body. The receiver is downcast to the declaring type.
pub type Invoker = Arc<dyn Fn(&dyn Any, &[Value]) -> HostResult<Value> + Send + Sync>;

pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An object supplied by the embedding application.
///
/// Members are described by the [`TypeInfo`] the object returns; state that
/// setters change must live behind interior mutability since the engine only
/// ever holds shared references.
pub trait HostObject: AsAny + Send + Sync + fmt::Debug {
    fn type_info(&self) -> &'static TypeInfo;
}

pub type HostRef = Arc<dyn HostObject>;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Visibility {
    Public,
    Private,
}

/// Declared type of a method parameter.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ParamType {
    Any,
    Boolean,
    Integer,
    Float,
    Number,
    String,
    Object,
}

impl ParamType {
    /// Exact matches win over merely compatible ones during overload selection.
    pub fn is_exact(&self, kind: ValueKind) -> bool {
        matches!(
            (self, kind),
            (ParamType::Boolean, ValueKind::Boolean)
                | (ParamType::Integer, ValueKind::Integer)
                | (ParamType::Float, ValueKind::Float)
                | (ParamType::String, ValueKind::String)
                | (ParamType::Object, ValueKind::Object)
        )
    }

    pub fn accepts(&self, kind: ValueKind) -> bool {
        match self {
            ParamType::Any => true,
            ParamType::Boolean => kind == ValueKind::Boolean,
            ParamType::Integer => kind == ValueKind::Integer,
            ParamType::Float | ParamType::Number => {
                matches!(kind, ValueKind::Integer | ValueKind::Float)
            }
            ParamType::String => matches!(kind, ValueKind::String | ValueKind::Null),
            ParamType::Object => matches!(kind, ValueKind::Object | ValueKind::Null),
        }
    }

    /// Widens an accepted argument to the declared type.
    pub fn coerce(&self, value: Value) -> Value {
        match (self, value) {
            (ParamType::Float, Value::Integer(n)) => Value::Float(n as f64),
            (_, value) => value,
        }
    }
}

pub struct MethodInfo {
    pub name: String,
    pub params: Vec<ParamType>,
    pub visibility: Visibility,
    pub invoke: Invoker,
}

pub struct FieldInfo {
    pub name: String,
    pub visibility: Visibility,
    pub get: Invoker,
    pub set: Option<Invoker>,
}

/// Member table of a host type, in declaration order.
pub struct TypeInfo {
    name: String,
    visibility: Visibility,
    methods: Vec<MethodInfo>,
    fields: Vec<FieldInfo>,
}

impl TypeInfo {
    pub fn builder<T: Any>(name: &str) -> TypeInfoBuilder<T> {
        TypeInfoBuilder {
            info: TypeInfo {
                name: name.to_owned(),
                visibility: Visibility::Public,
                methods: vec![],
                fields: vec![],
            },
            _receiver: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<type {}>", self.name)
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<method {}{:?}>", self.name, self.params)
    }
}

pub struct TypeInfoBuilder<T> {
    info: TypeInfo,
    _receiver: PhantomData<fn() -> T>,
}

impl<T: Any> TypeInfoBuilder<T> {
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.info.visibility = visibility;
        self
    }

    /// Marks the type itself as non-public. Public members stay reachable.
    pub fn private(self) -> Self {
        self.visibility(Visibility::Private)
    }

    pub fn method<F>(self, name: &str, params: &[ParamType], body: F) -> Self
    where
        F: Fn(&T, &[Value]) -> HostResult<Value> + Send + Sync + 'static,
    {
        self.method_with(name, params, Visibility::Public, body)
    }

    pub fn private_method<F>(self, name: &str, params: &[ParamType], body: F) -> Self
    where
        F: Fn(&T, &[Value]) -> HostResult<Value> + Send + Sync + 'static,
    {
        self.method_with(name, params, Visibility::Private, body)
    }

    fn method_with<F>(
        mut self,
        name: &str,
        params: &[ParamType],
        visibility: Visibility,
        body: F,
    ) -> Self
    where
        F: Fn(&T, &[Value]) -> HostResult<Value> + Send + Sync + 'static,
    {
        self.info.methods.push(MethodInfo {
            name: name.to_owned(),
            params: params.to_vec(),
            visibility,
            invoke: erase(body),
        });
        self
    }

    /// Read-only public field.
    pub fn field<G>(self, name: &str, getter: G) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.push_field(name, Visibility::Public, getter, None)
    }

    /// Writable public field.
    pub fn field_mut<G, S>(self, name: &str, getter: G, setter: S) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
        S: Fn(&T, Value) -> HostResult<()> + Send + Sync + 'static,
    {
        let set = erase(move |this: &T, args: &[Value]| {
            let value = args.first().cloned().unwrap_or(Value::Null);
            setter(this, value).map(|_| Value::Null)
        });
        self.push_field(name, Visibility::Public, getter, Some(set))
    }

    pub fn private_field<G>(self, name: &str, getter: G) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.push_field(name, Visibility::Private, getter, None)
    }

    fn push_field<G>(
        mut self,
        name: &str,
        visibility: Visibility,
        getter: G,
        set: Option<Invoker>,
    ) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.info.fields.push(FieldInfo {
            name: name.to_owned(),
            visibility,
            get: erase(move |this: &T, _args: &[Value]| Ok(getter(this))),
            set,
        });
        self
    }

    /// Inherits the members of `parent`, reached through `project`.
    /// Inherited members come after the ones declared so far.
    pub fn extends<P, F>(mut self, parent: &'static TypeInfo, project: F) -> Self
    where
        P: Any,
        F: Fn(&T) -> &P + Send + Sync + 'static,
    {
        let project = Arc::new(project);

        for method in parent.methods.iter() {
            self.info.methods.push(MethodInfo {
                name: method.name.clone(),
                params: method.params.clone(),
                visibility: method.visibility,
                invoke: delegate::<T, P, F>(&method.invoke, project.clone()),
            });
        }

        for field in parent.fields.iter() {
            self.info.fields.push(FieldInfo {
                name: field.name.clone(),
                visibility: field.visibility,
                get: delegate::<T, P, F>(&field.get, project.clone()),
                set: field
                    .set
                    .as_ref()
                    .map(|set| delegate::<T, P, F>(set, project.clone())),
            });
        }

        self
    }

    pub fn build(self) -> TypeInfo {
        self.info
    }
}

fn downcast<T: Any>(receiver: &dyn Any) -> HostResult<&T> {
    receiver
        .downcast_ref::<T>()
        .ok_or(HostError::WrongReceiver(type_name::<T>()))
}

fn erase<T, F>(body: F) -> Invoker
where
    T: Any,
    F: Fn(&T, &[Value]) -> HostResult<Value> + Send + Sync + 'static,
{
    Arc::new(move |receiver: &dyn Any, args: &[Value]| body(downcast::<T>(receiver)?, args))
}

fn delegate<T, P, F>(inner: &Invoker, project: Arc<F>) -> Invoker
where
    T: Any,
    P: Any,
    F: Fn(&T) -> &P + Send + Sync + 'static,
{
    let inner = inner.clone();
    Arc::new(move |receiver: &dyn Any, args: &[Value]| {
        let this = downcast::<T>(receiver)?;
        inner(project(this) as &dyn Any, args)
    })
}

/// Fetches a string argument, accepting null as absent.
pub fn str_arg(args: &[Value], idx: usize) -> HostResult<Option<&str>> {
    match args.get(idx) {
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Null) => Ok(None),
        _ => Err(HostError::BadArgument(idx)),
    }
}

pub fn int_arg(args: &[Value], idx: usize) -> HostResult<i64> {
    match args.get(idx) {
        Some(Value::Integer(n)) => Ok(*n),
        _ => Err(HostError::BadArgument(idx)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        hits: std::sync::atomic::AtomicI64,
    }

    fn counter_type() -> TypeInfo {
        TypeInfo::builder::<Counter>("Counter")
            .method("hit", &[], |c, _| {
                let prev = c.hits.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(Value::Integer(prev + 1))
            })
            .field("hits", |c| {
                Value::Integer(c.hits.load(std::sync::atomic::Ordering::SeqCst))
            })
            .build()
    }

    #[test]
    fn test_param_compatibility() {
        assert!(ParamType::Float.accepts(ValueKind::Integer));
        assert!(!ParamType::Float.is_exact(ValueKind::Integer));
        assert!(!ParamType::Integer.accepts(ValueKind::Float));
        assert!(ParamType::String.accepts(ValueKind::Null));
        assert!(!ParamType::Boolean.accepts(ValueKind::Null));
        assert!(ParamType::Any.accepts(ValueKind::Object));
        assert!(!ParamType::Any.is_exact(ValueKind::String));
        assert_eq!(ParamType::Float.coerce(Value::Integer(2)), Value::Float(2.0));
        assert_eq!(ParamType::Number.coerce(Value::Integer(2)), Value::Integer(2));
    }

    #[test]
    fn test_erased_invokers_downcast_receiver() {
        let info = counter_type();
        let counter = Counter {
            hits: std::sync::atomic::AtomicI64::new(0),
        };

        let hit = &info.methods()[0].invoke;
        assert_eq!(hit(&counter, &[]), Ok(Value::Integer(1)));
        assert_eq!((info.fields()[0].get)(&counter, &[]), Ok(Value::Integer(1)));
        assert_eq!(
            hit(&"not a counter".to_owned(), &[]),
            Err(HostError::WrongReceiver(type_name::<Counter>()))
        );
    }

    #[test]
    fn test_arg_helpers() {
        let args = vec![Value::from("a"), Value::Null, Value::Integer(3)];
        assert_eq!(str_arg(&args, 0), Ok(Some("a")));
        assert_eq!(str_arg(&args, 1), Ok(None));
        assert_eq!(int_arg(&args, 2), Ok(3));
        assert_eq!(int_arg(&args, 0), Err(HostError::BadArgument(0)));
    }
}
