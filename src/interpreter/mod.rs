pub mod arithmetic;
pub mod builtins;
pub mod context;
pub mod errors;
pub mod interpreter;
pub mod members;
pub mod value;

pub use arithmetic::Arithmetic;
pub use context::Context;
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use interpreter::Interpreter;
pub use value::{Value, ValueKind};
