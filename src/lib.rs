//! Embeddable expression and script engine.
//!
//! Source text is compiled once into a [`CompiledUnit`] and evaluated any
//! number of times against a [`Context`] of variables. Host objects expose
//! members to scripts through [`HostObject`] and [`TypeInfo`].

pub mod engine;
pub mod error;
pub mod frontend;
pub mod interpreter;
pub mod introspection;
pub mod options;

pub use engine::{compile, CompiledUnit, Engine};
pub use error::Error;
pub use frontend::Mode;
pub use interpreter::{Context, EvalError, EvalErrorKind, Value, ValueKind};
pub use introspection::{
    HostError, HostObject, HostResult, Introspector, MemberResolver, OverloadPolicy, ParamType,
    TypeInfo,
};
pub use options::Options;
