use super::handle::{Access, HandleKind, MemberHandle};
use super::host::{FieldInfo, MethodInfo, ParamType, TypeInfo, Visibility};
use super::strings::string_type;
use crate::interpreter::value::{Value, ValueKind};

use log::{debug, trace};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

/// How a call picks among same-name, same-arity overloads.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum OverloadPolicy {
    /// An overload whose parameters all match exactly wins; otherwise the
    /// first compatible overload in declaration order.
    #[default]
    ExactThenFirstCompatible,
    /// First compatible overload in declaration order.
    FirstCompatible,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ResolveError {
    #[error("no {access} `{member}` on {type_name}")]
    NotFound {
        type_name: String,
        member: String,
        access: Access,
    },
    #[error("{0} values have no members")]
    NotIntrospectable(ValueKind),
}

/// Locates members of runtime values.
pub trait MemberResolver: Send + Sync {
    fn resolve(&self, target: &Value, name: &str, access: &Access)
        -> Result<MemberHandle, ResolveError>;
}

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
struct MemberKey {
    type_id: TypeId,
    name: String,
    access: Access,
}

/// Default resolver over [`TypeInfo`] member tables.
pub struct Introspector {
    policy: OverloadPolicy,
    cache: Option<RwLock<HashMap<MemberKey, MemberHandle>>>,
}

impl Introspector {
    pub fn new(policy: OverloadPolicy, cache_members: bool) -> Self {
        Introspector {
            policy,
            cache: cache_members.then(|| RwLock::new(HashMap::new())),
        }
    }

    pub fn policy(&self) -> OverloadPolicy {
        self.policy
    }

    /// Number of cached handles.
    pub fn cached_handles(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| {
            cache.read().unwrap_or_else(PoisonError::into_inner).len()
        })
    }

    fn lookup(
        &self,
        info: &'static TypeInfo,
        name: &str,
        access: &Access,
    ) -> Option<MemberHandle> {
        if info.visibility() != Visibility::Public {
            debug!(
                "resolving `{}` through public members of non-public type {}",
                name,
                info.name()
            );
        }

        match access {
            Access::Get => self.lookup_get(info, name),
            Access::Set(kind) => self.lookup_set(info, name, *kind),
            Access::Call(kinds) => self
                .select_overload(info, name, kinds)
                .map(|m| method_handle(m, HandleKind::Method)),
        }
    }

    fn lookup_get(&self, info: &'static TypeInfo, name: &str) -> Option<MemberHandle> {
        for prefix in ["get", "is"] {
            if let Some(getter) = self.select_overload(info, &accessor_name(prefix, name), &[]) {
                return Some(method_handle(getter, HandleKind::Getter));
            }
        }

        accessible_fields(info).find(|f| f.name == name).map(|field| {
            MemberHandle::new(&field.name, HandleKind::FieldGet, vec![], field.get.clone())
        })
    }

    fn lookup_set(
        &self,
        info: &'static TypeInfo,
        name: &str,
        kind: ValueKind,
    ) -> Option<MemberHandle> {
        if let Some(setter) = self.select_overload(info, &accessor_name("set", name), &[kind]) {
            return Some(method_handle(setter, HandleKind::Setter));
        }

        let field = accessible_fields(info).find(|f| f.name == name && f.set.is_some());
        field.and_then(|f| f.set.clone()).map(|set| {
            MemberHandle::new(name, HandleKind::FieldSet, vec![ParamType::Any], set)
        })
    }

    /// Last resort for property access: a public `get(String)` or
    /// `set(String, value)`. The method handle is cached under its own call
    /// shape, so arbitrary property names add no cache entries.
    fn resolve_duck(
        &self,
        type_id: TypeId,
        info: &'static TypeInfo,
        name: &str,
        access: &Access,
    ) -> Option<MemberHandle> {
        let (method, kinds, kind) = match access {
            Access::Get => ("get", vec![ValueKind::String], HandleKind::DuckGet),
            Access::Set(value_kind) => (
                "set",
                vec![ValueKind::String, *value_kind],
                HandleKind::DuckSet,
            ),
            Access::Call(_) => return None,
        };

        let key = MemberKey {
            type_id,
            name: method.to_owned(),
            access: Access::Call(kinds.clone()),
        };
        let handle = match self.cached(&key) {
            Some(handle) => handle,
            None => {
                let selected = self.select_overload(info, method, &kinds)?;
                self.remember(key, method_handle(selected, HandleKind::Method))
            }
        };

        Some(handle.bound_to(name, kind))
    }

    fn cached(&self, key: &MemberKey) -> Option<MemberHandle> {
        self.cache.as_ref().and_then(|cache| {
            cache
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(key)
                .cloned()
        })
    }

    fn remember(&self, key: MemberKey, handle: MemberHandle) -> MemberHandle {
        match &self.cache {
            // Racing resolvers keep whichever handle landed first.
            Some(cache) => cache
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(key)
                .or_insert(handle)
                .clone(),
            None => handle,
        }
    }

    /// Picks an accessible method by name, arity and argument kinds.
    fn select_overload(
        &self,
        info: &'static TypeInfo,
        name: &str,
        kinds: &[ValueKind],
    ) -> Option<&'static MethodInfo> {
        let candidates: Vec<&'static MethodInfo> = accessible_methods(info)
            .filter(|m| m.name == name && m.params.len() == kinds.len())
            .collect();

        let exact = |m: &&'static MethodInfo| {
            m.params.iter().zip(kinds).all(|(p, k)| p.is_exact(*k))
        };
        let compatible = |m: &&'static MethodInfo| {
            m.params.iter().zip(kinds).all(|(p, k)| p.accepts(*k))
        };

        match self.policy {
            OverloadPolicy::ExactThenFirstCompatible => candidates
                .iter()
                .copied()
                .find(exact)
                .or_else(|| candidates.iter().copied().find(compatible)),
            OverloadPolicy::FirstCompatible => candidates.iter().copied().find(compatible),
        }
    }
}

impl Default for Introspector {
    fn default() -> Self {
        Introspector::new(OverloadPolicy::default(), true)
    }
}

impl MemberResolver for Introspector {
    fn resolve(
        &self,
        target: &Value,
        name: &str,
        access: &Access,
    ) -> Result<MemberHandle, ResolveError> {
        let (type_id, info) =
            type_of(target).ok_or(ResolveError::NotIntrospectable(target.kind()))?;

        let key = MemberKey {
            type_id,
            name: name.to_owned(),
            access: access.clone(),
        };

        if let Some(handle) = self.cached(&key) {
            return Ok(handle);
        }

        if let Some(handle) = self.lookup(info, name, access) {
            trace!("resolved {:?} on {} for {}", handle, info.name(), access);
            return Ok(self.remember(key, handle));
        }

        self.resolve_duck(type_id, info, name, access)
            .ok_or_else(|| ResolveError::NotFound {
                type_name: info.name().to_owned(),
                member: name.to_owned(),
                access: access.clone(),
            })
    }
}

/// Runtime type identity and member table of a value, if it has members.
pub fn type_of(target: &Value) -> Option<(TypeId, &'static TypeInfo)> {
    match target {
        Value::Object(obj) => Some(((**obj).as_any().type_id(), obj.type_info())),
        Value::String(_) => Some((TypeId::of::<String>(), string_type())),
        _ => None,
    }
}

/// The value a resolved handle must be invoked on.
pub fn receiver(target: &Value) -> Option<&dyn Any> {
    match target {
        Value::Object(obj) => Some((**obj).as_any()),
        Value::String(s) => Some(s as &dyn Any),
        _ => None,
    }
}

/// Members usable by the engine: those declared public, whatever the
/// visibility of the type declaring them.
fn accessible_methods(info: &'static TypeInfo) -> impl Iterator<Item = &'static MethodInfo> {
    info.methods()
        .iter()
        .filter(|m| m.visibility == Visibility::Public)
}

fn accessible_fields(info: &'static TypeInfo) -> impl Iterator<Item = &'static FieldInfo> {
    info.fields()
        .iter()
        .filter(|f| f.visibility == Visibility::Public)
}

fn accessor_name(prefix: &str, property: &str) -> String {
    let mut chars = property.chars();
    match chars.next() {
        Some(first) => format!("{}{}{}", prefix, first.to_uppercase(), chars.as_str()),
        None => prefix.to_owned(),
    }
}

fn method_handle(method: &MethodInfo, kind: HandleKind) -> MemberHandle {
    MemberHandle::new(&method.name, kind, method.params.clone(), method.invoke.clone())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspection::host::{str_arg, HostObject, HostResult};
    use std::sync::{Arc, Mutex, OnceLock};

    #[derive(Debug, Default)]
    struct Tester {
        code: Mutex<String>,
    }

    impl Tester {
        fn code(&self) -> String {
            self.code.lock().unwrap().clone()
        }

        fn set_code(&self, code: &str) -> HostResult<Value> {
            *self.code.lock().unwrap() = code.to_owned();
            Ok(Value::Null)
        }
    }

    impl HostObject for Tester {
        fn type_info(&self) -> &'static TypeInfo {
            static TYPE: OnceLock<TypeInfo> = OnceLock::new();
            TYPE.get_or_init(|| {
                TypeInfo::builder::<Tester>("Tester")
                    .private()
                    .method("getCode", &[], |t, _| Ok(Value::from(t.code())))
                    .method("setCode", &[ParamType::String], |t, args| {
                        t.set_code(str_arg(args, 0)?.unwrap_or_default())
                    })
                    .private_method("reset", &[], |t, _| t.set_code(""))
                    .method("describe", &[ParamType::Number], |_, _| Ok(Value::from("number")))
                    .method("describe", &[ParamType::Float], |_, _| Ok(Value::from("float")))
                    .method("describe", &[ParamType::Any], |_, _| Ok(Value::from("any")))
                    .method("get", &[ParamType::String], |_, args| {
                        Ok(Value::from(format!("duck:{}", str_arg(args, 0)?.unwrap_or(""))))
                    })
                    .build()
            })
        }
    }

    fn tester() -> Value {
        Value::Object(Arc::new(Tester::default()))
    }

    fn call(resolver: &Introspector, target: &Value, name: &str, args: Vec<Value>) -> Value {
        let handle = resolver.resolve(target, name, &Access::call(&args)).unwrap();
        handle.invoke(receiver(target).unwrap(), args).unwrap()
    }

    #[test]
    fn test_public_members_of_private_type_resolve() {
        let resolver = Introspector::default();
        let target = tester();

        call(&resolver, &target, "setCode", vec![Value::from("OK")]);
        assert_eq!(call(&resolver, &target, "getCode", vec![]), Value::from("OK"));

        let getter = resolver.resolve(&target, "code", &Access::Get).unwrap();
        assert_eq!(getter.kind(), HandleKind::Getter);
        let setter = resolver
            .resolve(&target, "code", &Access::Set(ValueKind::String))
            .unwrap();
        assert_eq!(setter.kind(), HandleKind::Setter);
    }

    #[test]
    fn test_private_members_are_not_found() {
        let resolver = Introspector::default();
        let error = resolver
            .resolve(&tester(), "reset", &Access::Call(vec![]))
            .unwrap_err();
        assert_eq!(
            error,
            ResolveError::NotFound {
                type_name: "Tester".into(),
                member: "reset".into(),
                access: Access::Call(vec![]),
            }
        );
    }

    #[test]
    fn test_overload_selection() {
        let exact_first = Introspector::new(OverloadPolicy::ExactThenFirstCompatible, false);
        let first = Introspector::new(OverloadPolicy::FirstCompatible, false);
        let target = tester();

        let float_arg = || vec![Value::Float(1.5)];
        assert_eq!(call(&exact_first, &target, "describe", float_arg()), Value::from("float"));
        assert_eq!(call(&first, &target, "describe", float_arg()), Value::from("number"));
        assert_eq!(
            call(&exact_first, &target, "describe", vec![Value::Integer(1)]),
            Value::from("number")
        );
        assert_eq!(
            call(&exact_first, &target, "describe", vec![Value::from("x")]),
            Value::from("any")
        );
        assert!(exact_first
            .resolve(&target, "describe", &Access::Call(vec![]))
            .is_err());
    }

    #[test]
    fn test_duck_typed_get() {
        let resolver = Introspector::default();
        let target = tester();
        let handle = resolver.resolve(&target, "anything", &Access::Get).unwrap();
        assert_eq!(handle.kind(), HandleKind::DuckGet);
        assert_eq!(handle.bound_name(), Some("anything"));
        assert_eq!(
            handle.invoke(receiver(&target).unwrap(), vec![]).unwrap(),
            Value::from("duck:anything")
        );
    }

    #[test]
    fn test_duck_access_caches_one_handle() {
        let resolver = Introspector::default();
        let target = tester();

        for key in ["a", "b", "c", "a"] {
            let handle = resolver.resolve(&target, key, &Access::Get).unwrap();
            assert_eq!(
                handle.invoke(receiver(&target).unwrap(), vec![]).unwrap(),
                Value::from(format!("duck:{}", key))
            );
        }
        assert_eq!(resolver.cached_handles(), 1);

        let direct = resolver
            .resolve(&target, "get", &Access::Call(vec![ValueKind::String]))
            .unwrap();
        assert_eq!(direct.kind(), HandleKind::Method);
        assert_eq!(direct.bound_name(), None);
        assert_eq!(resolver.cached_handles(), 1);
    }

    #[test]
    fn test_handles_are_cached_per_type_and_shape() {
        let resolver = Introspector::default();
        let a = tester();
        let b = tester();

        let first = resolver.resolve(&a, "getCode", &Access::Call(vec![])).unwrap();
        let second = resolver.resolve(&b, "getCode", &Access::Call(vec![])).unwrap();
        assert!(first.ptr_eq(&second));

        resolver
            .resolve(&a, "describe", &Access::Call(vec![ValueKind::Integer]))
            .unwrap();
        resolver
            .resolve(&a, "describe", &Access::Call(vec![ValueKind::Float]))
            .unwrap();
        assert_eq!(resolver.cached_handles(), 3);
    }

    #[test]
    fn test_values_without_members() {
        let resolver = Introspector::default();
        assert_eq!(
            resolver
                .resolve(&Value::Integer(1), "x", &Access::Get)
                .unwrap_err(),
            ResolveError::NotIntrospectable(ValueKind::Integer)
        );
    }

    #[test]
    fn test_accessor_name() {
        assert_eq!(accessor_name("get", "code"), "getCode");
        assert_eq!(accessor_name("is", "valid"), "isValid");
        assert_eq!(accessor_name("set", "URL"), "setURL");
    }
}
