use rusty_jexl::{Context, Engine, Error, Mode, Options, Value};

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::{fs, process};

const EX_USAGE: i32 = 64;
const EX_DATAERR: i32 = 65;
const EX_SOFTWARE: i32 = 70;

/// Evaluate expressions and scripts.
#[derive(Parser, Debug)]
#[clap(name = "rjexl", version)]
struct Args {
    /// Script file to run. Starts a prompt when omitted.
    script: Option<String>,

    /// Evaluate a single expression instead of a script.
    #[clap(short = 'e', long = "expr", conflicts_with = "script")]
    expression: Option<String>,

    /// Bind a variable before evaluation, as `name=expression`.
    #[clap(long = "var", multiple_occurrences = true)]
    vars: Vec<String>,

    /// Treat undefined variables and null operands as errors.
    #[clap(long)]
    strict: bool,
}

fn main() {
    let args = Args::parse();
    let engine = Engine::with_options(Options::default().strict(args.strict));

    let mut context = Context::new();
    for binding in args.vars.iter() {
        if let Err(code) = bind_variable(&engine, &mut context, binding) {
            process::exit(code);
        }
    }

    let outcome = match (&args.expression, &args.script) {
        (Some(expression), _) => run(&engine, expression, Mode::Expression, &mut context),
        (None, Some(path)) => run_file(&engine, path, &mut context),
        (None, None) => {
            run_prompt(&engine, &mut context);
            Ok(())
        }
    };

    if let Err(code) = outcome {
        process::exit(code);
    }
}

fn bind_variable(engine: &Engine, context: &mut Context, binding: &str) -> Result<(), i32> {
    let (name, source) = binding.split_once('=').ok_or_else(|| {
        eprintln!("Usage: --var name=expression, got `{}`", binding);
        EX_USAGE
    })?;

    let value = evaluate(engine, source, Mode::Expression, context)?;
    context.set(name.trim(), value);
    Ok(())
}

fn run_file(engine: &Engine, path: &str, context: &mut Context) -> Result<(), i32> {
    let source = fs::read_to_string(path).map_err(|e| {
        eprintln!("Cannot read {}: {}", path, e);
        EX_USAGE
    })?;
    run(engine, &source, Mode::Script, context)
}

fn run(engine: &Engine, source: &str, mode: Mode, context: &mut Context) -> Result<(), i32> {
    let value = evaluate(engine, source, mode, context)?;
    println!("{}", value);
    Ok(())
}

fn run_prompt(engine: &Engine, context: &mut Context) {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            return;
        }

        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => return,
        };
        if line.trim().is_empty() {
            continue;
        }

        // Errors are reported and the session carries on.
        if let Ok(value) = evaluate(engine, &line, Mode::Script, context) {
            println!("{}", value);
        }
    }
}

fn evaluate(
    engine: &Engine,
    source: &str,
    mode: Mode,
    context: &mut Context,
) -> Result<Value, i32> {
    engine.run(source, mode, context).map_err(|err| {
        eprintln!("{}", err.render(source));
        match err {
            Error::Lex(_) | Error::Syntax(_) => EX_DATAERR,
            Error::Evaluation(_) => EX_SOFTWARE,
        }
    })
}
