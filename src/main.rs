use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use monkey::repl::{self, ReplMode, ReplOptions};
use monkey::{Environment, Evaluator};

/// Monkey - a small interpreted language with closures, hashes and slices
#[derive(Parser, Debug)]
#[command(name = "monkey", version)]
#[command(about = "Run Monkey scripts or start the interactive REPL", long_about = None)]
struct Args {
    /// Print tokens as JSON instead of evaluating
    #[arg(long)]
    tokens: bool,

    /// REPL prompt
    #[arg(long, default_value = ">> ")]
    prompt: String,

    /// Script to run (if not provided, starts the REPL on stdin)
    script: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // MONKEY_LOG controls the log level; logs go to stderr
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env("MONKEY_LOG")
        .or_else(|_| EnvFilter::try_new("warn"))
        .context("invalid log filter")?;

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let mode = if args.tokens {
        ReplMode::Tokens
    } else {
        ReplMode::Evaluate
    };

    if let Some(path) = args.script {
        return run_script(&path, mode);
    }

    let options = ReplOptions {
        prompt: args.prompt,
        mode,
    };
    let stdin = io::stdin();
    repl::start(stdin.lock(), io::stdout().lock(), &options)?;
    Ok(ExitCode::SUCCESS)
}

fn run_script(path: &Path, mode: ReplMode) -> Result<ExitCode> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut stdout = io::stdout().lock();

    if mode == ReplMode::Tokens {
        repl::dump_tokens(&source, &mut stdout)?;
        return Ok(ExitCode::SUCCESS);
    }

    let (program, err) = monkey::parse(&source);
    if let Some(err) = err {
        repl::print_parse_errors(&err, &mut stdout)?;
        return Ok(ExitCode::FAILURE);
    }

    let result = Evaluator::new().eval(&program, &Environment::new());
    writeln!(stdout, "{}", result.display())?;

    if result.is_error() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
