pub mod gen;
pub mod optimize;

use crate::parser::ast::FileMode;
use std::fmt;

/// Binary operator in the IR. Comparisons and logic yield 0/1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrOp {
  Add,
  Sub,
  Mul,
  Div,
  Pow,
  IntDiv,
  Mod,
  Concat,
  Eq,
  NotEq,
  Lt,
  Gt,
  LtEq,
  GtEq,
  And,
  Or,
}

impl fmt::Display for IrOp {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let symbol = match self {
      IrOp::Add => "+",
      IrOp::Sub => "-",
      IrOp::Mul => "*",
      IrOp::Div => "/",
      IrOp::Pow => "^",
      IrOp::IntDiv => "DIV",
      IrOp::Mod => "MOD",
      IrOp::Concat => "&",
      IrOp::Eq => "==",
      IrOp::NotEq => "!=",
      IrOp::Lt => "<",
      IrOp::Gt => ">",
      IrOp::LtEq => "<=",
      IrOp::GtEq => ">=",
      IrOp::And => "&&",
      IrOp::Or => "||",
    };
    write!(f, "{}", symbol)
  }
}

/// One three-address instruction. Operands are operand strings resolved by
/// the VM: quoted string literals, numbers, temporaries (`T<n>`), variable
/// names, `name[i]` / `name[i,j]` elements, `name.field`, or `RETVAL`.
/// `Display` renders the canonical textual form of each instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
  Label(String),

  /// `target = value` where target may be a temporary, a name, an array
  /// element or a record field.
  Assign { target: String, value: String },

  /// `target = left OP right`
  Binary {
    target: String,
    left: String,
    op: IrOp,
    right: String,
  },

  /// `target = BUILTIN NAME args…`
  Builtin {
    target: String,
    name: String,
    args: Vec<String>,
  },

  /// `ARRAY name [a:b]` or `ARRAY name [a:b,c:d]`: dense zero-filled
  /// allocation over the declared bounds.
  DeclareArray { name: String, dims: Vec<(i64, i64)> },

  /// `LOCAL name` pre-reserves a binding in the current frame.
  DeclareLocal { name: String },

  Output { value: String },
  OutputPart { value: String },
  OutputEnd,
  Input { target: String },

  Goto { label: String },
  IfZero { cond: String, label: String },
  IfNotZero { cond: String, label: String },

  Push { value: String },
  /// `PUSH_REF name|__NONE__`
  PushRef { target: String },
  EnterScope,
  ExitScope,
  PopParam { name: String },
  PopByRef { name: String },
  WritebackByRef { name: String },
  Call { label: String },
  /// `RETVAL v` stores v in the return slot.
  SetReturn { value: String },
  Ret,

  OpenFile { name: String, mode: FileMode },
  ReadFile { name: String, target: String },
  WriteFile { name: String, value: String },
  CloseFile { name: String },
}

pub const NO_REF: &str = "__NONE__";

impl fmt::Display for Instr {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Instr::Label(name) => write!(f, "{}:", name),
      Instr::Assign { target, value } => write!(f, "{} = {}", target, value),
      Instr::Binary {
        target,
        left,
        op,
        right,
      } => write!(f, "{} = {} {} {}", target, left, op, right),
      Instr::Builtin { target, name, args } => {
        write!(f, "{} = BUILTIN {}", target, name)?;
        for arg in args {
          write!(f, " {}", arg)?;
        }
        Ok(())
      }
      Instr::DeclareArray { name, dims } => {
        let bounds: Vec<String> = dims.iter().map(|(a, b)| format!("{}:{}", a, b)).collect();
        write!(f, "ARRAY {} [{}]", name, bounds.join(","))
      }
      Instr::DeclareLocal { name } => write!(f, "LOCAL {}", name),
      Instr::Output { value } => write!(f, "OUTPUT {}", value),
      Instr::OutputPart { value } => write!(f, "OUTPUT_PART {}", value),
      Instr::OutputEnd => write!(f, "OUTPUT_END"),
      Instr::Input { target } => write!(f, "INPUT {}", target),
      Instr::Goto { label } => write!(f, "GOTO {}", label),
      Instr::IfZero { cond, label } => write!(f, "IFZ {} GOTO {}", cond, label),
      Instr::IfNotZero { cond, label } => write!(f, "IFNZ {} GOTO {}", cond, label),
      Instr::Push { value } => write!(f, "PUSH {}", value),
      Instr::PushRef { target } => write!(f, "PUSH_REF {}", target),
      Instr::EnterScope => write!(f, "ENTER_SCOPE"),
      Instr::ExitScope => write!(f, "EXIT_SCOPE"),
      Instr::PopParam { name } => write!(f, "POP_PARAM {}", name),
      Instr::PopByRef { name } => write!(f, "POP_BYREF {}", name),
      Instr::WritebackByRef { name } => write!(f, "WRITEBACK_BYREF {}", name),
      Instr::Call { label } => write!(f, "CALL {}", label),
      Instr::SetReturn { value } => write!(f, "RETVAL {}", value),
      Instr::Ret => write!(f, "RET"),
      Instr::OpenFile { name, mode } => write!(f, "OPENFILE {} {}", name, mode),
      Instr::ReadFile { name, target } => write!(f, "READFILE {} {}", name, target),
      Instr::WriteFile { name, value } => write!(f, "WRITEFILE {} {}", name, value),
      Instr::CloseFile { name } => write!(f, "CLOSEFILE {}", name),
    }
  }
}

/// Canonical textual dump of an instruction sequence.
pub fn ir_text(instrs: &[Instr]) -> String {
  let mut out = String::new();
  for instr in instrs {
    out.push_str(&instr.to_string());
    out.push('\n');
  }
  out
}
