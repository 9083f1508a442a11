//! CLI for applying named display transforms to text or JSON values.
//!
//! ## Usage
//!
//! ```bash
//! # Replace the first occurrence of a literal
//! pipette "hello world" --pattern world --replacement there
//!
//! # Replace every match of a pattern expression
//! pipette "aaa" --expr '/a/g' --replacement b
//!
//! # Read from stdin or a file
//! echo "John Smith" | pipette --expr '/(\w+)\s(\w+)/' --replacement '$2, $1'
//! pipette --file notes.txt --expr '/todo/gi' --replacement DONE
//!
//! # Treat the input as JSON (non-text values pass through)
//! pipette --json '42' --pattern 4 --replacement 5
//! ```

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueHint};
use color_eyre::eyre::{Result, WrapErr};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pipette::{Pattern, ReplaceTransform, TransformRegistry};

/// Apply a named display transform (such as `replace`) to text or JSON input
#[derive(Parser)]
#[command(name = "pipette", version, about, long_about = None)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// Input to transform (use "-" to read from stdin)
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// Read the input from a file instead
    #[arg(
        short,
        long,
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        conflicts_with = "input"
    )]
    file: Option<PathBuf>,

    /// Literal pattern; only its first occurrence is replaced
    #[arg(short, long, value_name = "TEXT", allow_hyphen_values = true)]
    pattern: Option<String>,

    /// Pattern expression in /SOURCE/FLAGS notation (flags: d g i m s u y)
    #[arg(short, long, value_name = "/SOURCE/FLAGS", conflicts_with = "pattern")]
    expr: Option<String>,

    /// Replacement text; supports $&, $`, $', $1..$99, $<name> and $$
    #[arg(short, long, value_name = "TEXT", allow_hyphen_values = true)]
    replacement: Option<String>,

    /// Name of the transform to apply
    #[arg(short, long, value_name = "NAME", default_value = ReplaceTransform::NAME)]
    transform: String,

    /// Parse the input as JSON and print the result as JSON
    #[arg(long)]
    json: bool,

    /// List the registered transforms and exit
    #[arg(long)]
    list: bool,
}

const AFTER_HELP: &str = "\
MISSING ARGUMENTS:
  Without --pattern/--expr or --replacement the input is printed unchanged,
  the same way a template transform passes through incomplete bindings.

EXAMPLES:
  pipette \"hello world\" -p world -r there     # hello there
  pipette \"aaa\" -e '/a/g' -r b                 # bbb
  pipette \"aaa\" -p a -r b                      # baa
  echo \"a-b-c\" | pipette -e '/-/g' -r ' '      # a b c
  pipette --json '[1,2]' -p 1 -r x             # [1,2]
  pipette --list                               # registered transforms

LOGGING:
  Set RUST_LOG (e.g. RUST_LOG=pipette=trace) to log to stderr.
";

fn main() -> Result<()> {
    color_eyre::install()?;

    // Setup logging if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .init();
    }

    let cli = Cli::parse();
    let registry = TransformRegistry::with_builtins();

    if cli.list {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    // Show help if no input provided and stdin is a terminal
    if cli.input.is_none() && cli.file.is_none() && io::stdin().is_terminal() {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    let raw = read_input(&cli)?;
    let input = if cli.json {
        serde_json::from_str(&raw).wrap_err("Input is not valid JSON")?
    } else {
        Value::String(raw)
    };

    let args = transform_args(&cli)?;
    debug!(transform = %cli.transform, args = args.len(), "applying transform");
    let output = registry.apply(&cli.transform, &input, &args)?;

    let rendered = render_output(&output, cli.json)?;
    if rendered.ends_with('\n') {
        print!("{rendered}");
    } else {
        println!("{rendered}");
    }

    Ok(())
}

/// Get the input from the positional arg, a file, or stdin.
fn read_input(cli: &Cli) -> Result<String> {
    if let Some(ref path) = cli.file {
        return fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read file '{}'", path.display()));
    }

    match cli.input.as_deref() {
        Some("-") | None => read_stdin(),
        Some(input) => Ok(input.to_string()),
    }
}

fn read_stdin() -> Result<String> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .wrap_err("Failed to read from stdin")?;
    Ok(content)
}

/// Positional transform arguments: `[pattern, replacement]`, cut short at the
/// first absent one.
fn transform_args(cli: &Cli) -> Result<Vec<Value>> {
    let pattern = match (&cli.pattern, &cli.expr) {
        (Some(text), _) => Some(Pattern::literal(text.as_str())),
        (None, Some(expr)) => Some(
            Pattern::parse_expression(expr).wrap_err_with(|| format!("Invalid --expr '{expr}'"))?,
        ),
        (None, None) => None,
    };

    let Some(pattern) = pattern else {
        return Ok(Vec::new());
    };

    let mut args = vec![pattern.to_value()];
    if let Some(ref replacement) = cli.replacement {
        args.push(Value::String(replacement.clone()));
    }
    Ok(args)
}

fn render_output(output: &Value, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string(output).wrap_err("Failed to serialize output");
    }

    Ok(match output {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}
