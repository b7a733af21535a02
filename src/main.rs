use clap::Parser;
use pseudo_lang::compiler::{compile, CompileOptions};
use pseudo_lang::error::PseudoError;
use pseudo_lang::ir::ir_text;
use pseudo_lang::vm::{Driver, Vm};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

/// Pseudocode compiler and interpreter
#[derive(Parser)]
#[command(name = "pseudo")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Source file to run
  file: PathBuf,

  /// Print the compiled IR and exit
  #[arg(long)]
  emit_ir: bool,

  /// Disable constant folding and dead-temporary elimination
  #[arg(long)]
  no_optimize: bool,

  /// Seed for the RAND built-in
  #[arg(long)]
  seed: Option<u64>,

  /// Pre-queued INPUT value; may be given multiple times
  #[arg(long = "input")]
  inputs: Vec<String>,
}

/// Interactive host: INPUT reads a line from stdin, OUTPUT prints one.
struct StdinDriver {
  stdin: io::Stdin,
}

impl Driver for StdinDriver {
  fn read_input(&mut self, target: &str) -> Result<String, PseudoError> {
    print!("{}? ", target);
    io::stdout()
      .flush()
      .map_err(|e| PseudoError::runtime(format!("Failed to flush stdout: {}", e)))?;
    let mut line = String::new();
    self
      .stdin
      .lock()
      .read_line(&mut line)
      .map_err(|e| PseudoError::runtime(format!("Failed to read input: {}", e)))?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
  }

  fn write_output(&mut self, line: &str) {
    println!("{}", line);
  }
}

fn main() {
  let cli = Cli::parse();

  let source = match std::fs::read_to_string(&cli.file) {
    Ok(source) => source,
    Err(e) => {
      eprintln!("Failed to read {}: {}", cli.file.display(), e);
      process::exit(1);
    }
  };

  if let Err(err) = execute(&cli, &source) {
    eprintln!("{}", err);
    process::exit(err.stage.exit_code());
  }
}

fn execute(cli: &Cli, source: &str) -> Result<(), PseudoError> {
  let options = CompileOptions {
    optimize: !cli.no_optimize,
  };
  let compiled = compile(source, &options)?;

  if cli.emit_ir {
    print!("{}", ir_text(&compiled.ir));
    return Ok(());
  }

  let mut vm = Vm::new(compiled.ir)?;
  vm.queue_inputs(cli.inputs.iter().cloned());
  if let Some(seed) = cli.seed {
    vm.set_seed(seed);
  }

  let mut driver = StdinDriver { stdin: io::stdin() };
  vm.run_with_driver(&mut driver)
}
