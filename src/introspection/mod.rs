pub mod handle;
pub mod host;
pub mod resolver;
pub mod strings;

pub use handle::{Access, HandleKind, MemberHandle};
pub use host::{
    int_arg, str_arg, AsAny, HostError, HostObject, HostRef, HostResult, ParamType, TypeInfo,
    TypeInfoBuilder, Visibility,
};
pub use resolver::{Introspector, MemberResolver, OverloadPolicy, ResolveError};
