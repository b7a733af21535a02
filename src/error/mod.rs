use thiserror::Error;

/// Pipeline stage an error was raised in. Doubles as the CLI exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Lex,
  Parse,
  Type,
  Runtime,
}

impl Stage {
  pub fn tag(&self) -> &'static str {
    match self {
      Stage::Lex => "LexError",
      Stage::Parse => "ParseError",
      Stage::Type => "TypeError",
      Stage::Runtime => "RuntimeError",
    }
  }

  pub fn exit_code(&self) -> i32 {
    match self {
      Stage::Lex => 1,
      Stage::Parse => 2,
      Stage::Type => 3,
      Stage::Runtime => 4,
    }
  }
}

impl std::fmt::Display for Stage {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "{}", self.tag())
  }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", render(.stage, .message, .line, .column))]
pub struct PseudoError {
  pub stage: Stage,
  pub message: String,
  pub line: Option<usize>,
  pub column: Option<usize>,
}

fn render(stage: &Stage, message: &str, line: &Option<usize>, column: &Option<usize>) -> String {
  match (line, column) {
    (Some(line), Some(column)) => format!("{} line {}:{}: {}", stage, line, column, message),
    (Some(line), None) => format!("{} line {}: {}", stage, line, message),
    _ => format!("{}: {}", stage, message),
  }
}

impl PseudoError {
  pub fn new(stage: Stage, message: impl Into<String>) -> Self {
    Self {
      stage,
      message: message.into(),
      line: None,
      column: None,
    }
  }

  pub fn lex(message: impl Into<String>, line: usize, column: usize) -> Self {
    Self {
      stage: Stage::Lex,
      message: message.into(),
      line: Some(line),
      column: Some(column),
    }
  }

  pub fn parse(message: impl Into<String>, line: usize) -> Self {
    Self {
      stage: Stage::Parse,
      message: message.into(),
      line: Some(line),
      column: None,
    }
  }

  pub fn type_error(message: impl Into<String>, line: usize) -> Self {
    Self {
      stage: Stage::Type,
      message: message.into(),
      line: Some(line),
      column: None,
    }
  }

  pub fn runtime(message: impl Into<String>) -> Self {
    Self::new(Stage::Runtime, message)
  }

  pub fn at_line(mut self, line: usize) -> Self {
    self.line = Some(line);
    self
  }
}
