use crate::error::PseudoError;
use crate::ir::gen::IrGenerator;
use crate::ir::{optimize, Instr};
use crate::lexer::token::Token;
use crate::lexer::Lexer;
use crate::parser::{ast::Program, Parser};
use crate::types::checker::TypeChecker;
use crate::vm::files::VirtualFile;
use crate::vm::value::Value;
use crate::vm::Vm;
use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct CompileOptions {
  pub optimize: bool,
}

impl Default for CompileOptions {
  fn default() -> Self {
    Self { optimize: true }
  }
}

/// Everything the front half of the pipeline produces, so hosts can show
/// tokens, the AST, or the IR dump alongside the diagnostic log.
pub struct CompileResult {
  pub tokens: Vec<Token>,
  pub ast: Program,
  pub ir: Vec<Instr>,
  pub logs: Vec<String>,
}

/// Source text through lex, parse, check, lower and (optionally) the
/// peepholes. Pure: no side effects, fresh stage instances per call.
pub fn compile(source: &str, options: &CompileOptions) -> Result<CompileResult, PseudoError> {
  let mut logs = Vec::new();

  let tokens = Lexer::new(source.to_string()).tokenize()?;
  logs.push(format!("lex: {} tokens", tokens.len()));

  let ast = Parser::new(tokens.clone()).parse()?;
  logs.push(format!("parse: {} statements", ast.statements.len()));

  TypeChecker::new().check_program(&ast)?;
  logs.push("check: ok".to_string());

  let ir = IrGenerator::new().generate(&ast)?;
  logs.push(format!("ir: {} instructions", ir.len()));

  let ir = if options.optimize {
    let (optimized, stats) = optimize::optimize(ir);
    logs.push(format!(
      "optimize: folded {}, removed {}",
      stats.folded, stats.removed
    ));
    optimized
  } else {
    ir
  };

  Ok(CompileResult {
    tokens,
    ast,
    ir,
    logs,
  })
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
  pub optimize: bool,
  /// Pre-supplied INPUT queue for batch runs.
  pub inputs: Vec<String>,
  /// Virtual files available to the program before it starts.
  pub files: IndexMap<String, Vec<String>>,
  pub seed: Option<u64>,
}

impl RunOptions {
  pub fn new() -> Self {
    Self {
      optimize: true,
      ..Default::default()
    }
  }
}

#[derive(Debug)]
pub struct RunResult {
  pub ir: Vec<Instr>,
  pub output: Vec<String>,
  pub globals: IndexMap<String, Value>,
  pub files: IndexMap<String, VirtualFile>,
  pub logs: Vec<String>,
}

fn is_temp_name(name: &str) -> bool {
  let mut chars = name.chars();
  chars.next() == Some('T') && {
    let rest = chars.as_str();
    !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())
  }
}

/// Batch run-to-completion: compiles, executes against the pre-supplied
/// input queue and returns the observable end state.
pub fn run(source: &str, options: &RunOptions) -> Result<RunResult, PseudoError> {
  let compiled = compile(
    source,
    &CompileOptions {
      optimize: options.optimize,
    },
  )?;

  let mut vm = Vm::new(compiled.ir.clone())?;
  vm.queue_inputs(options.inputs.iter().cloned());
  for (name, lines) in &options.files {
    vm.preload_file(name, lines.clone());
  }
  if let Some(seed) = options.seed {
    vm.set_seed(seed);
  }

  vm.run()?;

  let mut logs = compiled.logs;
  logs.push(format!("run: {} output line(s)", vm.output.len()));

  // Intermediate temporaries live in the global map at top level; they are
  // not part of the host-visible result.
  let globals: IndexMap<String, Value> = vm
    .globals
    .into_iter()
    .filter(|(name, _)| !is_temp_name(name))
    .collect();

  Ok(RunResult {
    ir: compiled.ir,
    output: vm.output,
    globals,
    files: vm.files.files,
    logs,
  })
}
