use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use csss_codegen::{CompilerOutput, Options};

const EXTENSIONS: &[&str] = &["css", "csss"];

#[derive(Parser)]
#[command(name = "csss")]
#[command(about = "CSSS compiler: turns rule blocks into JavaScript")]
#[command(version)]
struct Cli {
    /// Log pipeline stages (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a .csss file to JavaScript
    Build {
        /// Input .css or .csss file
        path: PathBuf,

        /// Output file, or `-` for stdout (default: <stem>.js next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        codegen: CodegenArgs,
    },

    /// Check a .csss file for errors without writing output
    Check {
        /// Input .css or .csss file
        path: PathBuf,

        #[command(flatten)]
        codegen: CodegenArgs,
    },

    /// Print the token stream as JSON
    Tokens {
        /// Input .css or .csss file
        path: PathBuf,
    },

    /// Print the syntax tree as JSON
    Ast {
        /// Input .css or .csss file
        path: PathBuf,
    },
}

#[derive(Args)]
struct CodegenArgs {
    /// Spaces per nesting level in generated code (0-16)
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=16))]
    indent: u8,

    /// Treat warnings as errors
    #[arg(long)]
    deny_warnings: bool,
}

impl CodegenArgs {
    fn options(&self) -> Options {
        Options {
            indent: usize::from(self.indent),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Build {
            path,
            output,
            codegen,
        } => cmd_build(&path, output.as_deref(), &codegen),
        Command::Check { path, codegen } => cmd_check(&path, &codegen),
        Command::Tokens { path } => cmd_tokens(&path),
        Command::Ast { path } => cmd_ast(&path),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext))
}

fn read_source(path: &Path) -> String {
    if !has_source_extension(path) {
        fail(format!(
            "{}: file must have a .css or .csss extension",
            path.display()
        ));
    }
    if !path.exists() {
        fail(format!("file not found: {}", path.display()));
    }
    match std::fs::read_to_string(path) {
        Ok(source) => {
            log::debug!("read {} ({} bytes)", path.display(), source.len());
            source
        }
        Err(e) => fail(format!("reading {}: {e}", path.display())),
    }
}

/// Run the whole pipeline, exiting on the first error.
fn compile_file(path: &Path, codegen: &CodegenArgs) -> CompilerOutput {
    let source = read_source(path);

    let program = match csss_parser::Parser::parse(&source) {
        Ok(program) => program,
        Err(e) => fail(e),
    };

    let output = match csss_codegen::compile(&program, &codegen.options()) {
        Ok(output) => output,
        Err(e) => fail(e),
    };

    for warning in &output.warnings {
        eprintln!("{}: {warning}", path.display());
    }
    if codegen.deny_warnings && !output.warnings.is_empty() {
        fail(format!(
            "{} warning(s) treated as errors",
            output.warnings.len()
        ));
    }

    output
}

fn cmd_build(path: &Path, output: Option<&Path>, codegen: &CodegenArgs) {
    let compiled = compile_file(path, codegen);

    let target = match output {
        Some(out) if out == Path::new("-") => {
            print!("{}", compiled.js);
            return;
        }
        Some(out) => out.to_path_buf(),
        None => path.with_extension("js"),
    };

    if let Err(e) = std::fs::write(&target, &compiled.js) {
        fail(format!("writing {}: {e}", target.display()));
    }

    eprintln!("Built: {}", target.display());
}

fn cmd_check(path: &Path, codegen: &CodegenArgs) {
    let compiled = compile_file(path, codegen);
    eprintln!(
        "OK: {} ({} variables)",
        path.display(),
        compiled.declared.len()
    );
}

fn cmd_tokens(path: &Path) {
    let source = read_source(path);
    let tokens = match csss_lexer::Scanner::tokenize(&source) {
        Ok(tokens) => tokens,
        Err(e) => fail(e),
    };
    print_json(&tokens);
}

fn cmd_ast(path: &Path) {
    let source = read_source(path);
    let program = match csss_parser::Parser::parse(&source) {
        Ok(program) => program,
        Err(e) => fail(e),
    };
    print_json(&program);
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(format!("serializing JSON: {e}")),
    }
}
