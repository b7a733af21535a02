#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  // Literals
  IntegerLit(i64),
  RealLit(f64),
  StringLit(String),
  BooleanLit(bool),
  Ident(String),

  // Indexed element of a declared array, 1 or 2 indices
  ArrayAccess {
    name: String,
    indices: Vec<Expr>,
  },

  // Single-level record field access
  FieldAccess {
    name: String,
    field: String,
  },

  Binary {
    left: Box<Expr>,
    op: BinaryOp,
    right: Box<Expr>,
  },

  Unary {
    op: UnaryOp,
    expr: Box<Expr>,
  },

  // Function-style call: user function or built-in
  Call {
    name: String,
    args: Vec<Expr>,
  },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
  Add,
  Subtract,
  Multiply,
  Divide,
  IntDiv,
  Modulo,
  Power,
  Concat,

  Equal,
  NotEqual,
  Less,
  Greater,
  LessEqual,
  GreaterEqual,

  And,
  Or,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
  Negate,
  Not,
}

/// Syntactic type name as written in a DECLARE / parameter / RETURNS.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeName {
  Integer,
  Real,
  String,
  Char,
  Boolean,
  User(String),
}

impl TypeName {
  pub fn from_lexeme(name: &str) -> Self {
    match name.to_ascii_uppercase().as_str() {
      "INTEGER" => TypeName::Integer,
      "REAL" => TypeName::Real,
      "STRING" => TypeName::String,
      "CHAR" => TypeName::Char,
      "BOOLEAN" => TypeName::Boolean,
      _ => TypeName::User(name.to_string()),
    }
  }
}

/// Inclusive array bounds, as declared: ARRAY[start:end].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension {
  pub start: i64,
  pub end: i64,
}

/// Assignment / INPUT / READFILE target. The three forms are mutually
/// exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
  Name(String),
  Element { name: String, indices: Vec<Expr> },
  Field { name: String, field: String },
}

impl AssignTarget {
  pub fn base_name(&self) -> &str {
    match self {
      AssignTarget::Name(name) => name,
      AssignTarget::Element { name, .. } => name,
      AssignTarget::Field { name, .. } => name,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamMode {
  ByVal,
  ByRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
  pub name: String,
  pub type_name: TypeName,
  pub mode: ParamMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
  Read,
  Write,
  Append,
}

impl std::fmt::Display for FileMode {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self {
      FileMode::Read => write!(f, "READ"),
      FileMode::Write => write!(f, "WRITE"),
      FileMode::Append => write!(f, "APPEND"),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseBranch {
  pub values: Vec<Expr>,
  pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
  pub line: usize,
  pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
  Declare {
    name: String,
    type_name: TypeName,
    dimensions: Option<Vec<Dimension>>,
  },

  Constant {
    name: String,
    value: Expr,
  },

  // Record type definition: TYPE name ... ENDTYPE
  TypeDef {
    name: String,
    fields: Vec<(String, TypeName)>,
  },

  Assignment {
    target: AssignTarget,
    value: Expr,
  },

  Output {
    values: Vec<Expr>,
  },

  Input {
    target: AssignTarget,
  },

  If {
    condition: Expr,
    then_body: Vec<Stmt>,
    else_body: Option<Vec<Stmt>>,
  },

  While {
    condition: Expr,
    body: Vec<Stmt>,
  },

  For {
    var: String,
    start: Expr,
    end: Expr,
    step: Option<Expr>,
    body: Vec<Stmt>,
  },

  Repeat {
    body: Vec<Stmt>,
    condition: Expr,
  },

  Case {
    selector: Expr,
    branches: Vec<CaseBranch>,
    otherwise: Option<Vec<Stmt>>,
  },

  Procedure {
    name: String,
    params: Vec<Param>,
    body: Vec<Stmt>,
  },

  Function {
    name: String,
    params: Vec<Param>,
    returns: TypeName,
    body: Vec<Stmt>,
  },

  // CALL statement (procedures only)
  Call {
    name: String,
    args: Vec<Expr>,
  },

  Return {
    value: Option<Expr>,
  },

  OpenFile {
    name: Expr,
    mode: FileMode,
  },

  ReadFile {
    name: Expr,
    target: AssignTarget,
  },

  WriteFile {
    name: Expr,
    value: Expr,
  },

  CloseFile {
    name: Expr,
  },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
  pub statements: Vec<Stmt>,
}
