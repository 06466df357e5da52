use crate::error::Error;
use crate::frontend::{parse, tokenize, Mode, Tree};
use crate::interpreter::{Arithmetic, Context, EvalResult, Interpreter, Value};
use crate::introspection::{Introspector, MemberResolver};
use crate::options::Options;

use log::debug;
use std::sync::Arc;

/// Parsed form of a source text. Immutable and shareable across threads.
#[derive(Debug, PartialEq, Clone)]
pub struct CompiledUnit {
    source: String,
    tree: Tree,
}

impl CompiledUnit {
    /// The source text exactly as it was compiled.
    pub fn text(&self) -> &str {
        &self.source
    }

    pub fn mode(&self) -> Mode {
        self.tree.mode()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn ast_string(&self) -> String {
        self.tree.ast_string()
    }
}

/// Lexes and parses `source` in the given mode.
pub fn compile(source: &str, mode: Mode) -> Result<CompiledUnit, Error> {
    let tokens = tokenize(source)?;
    let tree = parse(tokens, mode)?;
    debug!("compiled {:?} unit: {}", mode, tree.ast_string());

    Ok(CompiledUnit {
        source: source.to_owned(),
        tree,
    })
}

/// Compiles and evaluates units with a shared member resolver.
#[derive(Clone)]
pub struct Engine {
    options: Options,
    resolver: Arc<dyn MemberResolver>,
}

impl Engine {
    pub fn new() -> Self {
        Engine::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        let resolver = Introspector::new(options.overload_policy, options.cache_members);
        Engine::with_resolver(options, Arc::new(resolver))
    }

    /// Uses a caller-supplied resolver in place of the default introspector.
    pub fn with_resolver(options: Options, resolver: Arc<dyn MemberResolver>) -> Self {
        Engine { options, resolver }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn compile(&self, source: &str, mode: Mode) -> Result<CompiledUnit, Error> {
        compile(source, mode)
    }

    pub fn create_expression(&self, source: &str) -> Result<CompiledUnit, Error> {
        compile(source, Mode::Expression)
    }

    pub fn create_script(&self, source: &str) -> Result<CompiledUnit, Error> {
        compile(source, Mode::Script)
    }

    /// Runs a unit against `context`, which receives any assignments.
    pub fn evaluate(&self, unit: &CompiledUnit, context: &mut Context) -> EvalResult<Value> {
        let arithmetic = Arithmetic::new(self.options.strict);
        Interpreter::new(context, self.resolver.as_ref(), arithmetic).eval_tree(&unit.tree)
    }

    /// Compiles and evaluates in one step.
    pub fn run(&self, source: &str, mode: Mode, context: &mut Context) -> Result<Value, Error> {
        let unit = self.compile(source, mode)?;
        Ok(self.evaluate(&unit, context)?)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}
