use super::{Instr, IrOp, NO_REF};
use crate::error::PseudoError;
use crate::parser::ast::*;
use crate::types::checker::is_builtin;

/// Lowers the AST to the flat three-address instruction sequence executed
/// by the VM. Temporary and label counters increase monotonically; every
/// temporary is assigned exactly once in the emitted text.
pub struct IrGenerator {
  instrs: Vec<Instr>,
  temp_count: usize,
  label_count: usize,
  in_routine: bool,
  byref_params: Vec<String>,
  in_function: bool,
}

impl IrGenerator {
  pub fn new() -> Self {
    Self {
      instrs: Vec::new(),
      temp_count: 0,
      label_count: 0,
      in_routine: false,
      byref_params: Vec::new(),
      in_function: false,
    }
  }

  pub fn generate(mut self, program: &Program) -> Result<Vec<Instr>, PseudoError> {
    for stmt in &program.statements {
      self.gen_stmt(stmt)?;
    }
    Ok(self.instrs)
  }

  fn new_temp(&mut self) -> String {
    let temp = format!("T{}", self.temp_count);
    self.temp_count += 1;
    temp
  }

  fn new_label(&mut self) -> String {
    let label = format!("L{}", self.label_count);
    self.label_count += 1;
    label
  }

  fn emit(&mut self, instr: Instr) {
    self.instrs.push(instr);
  }

  fn gen_stmt(&mut self, stmt: &Stmt) -> Result<(), PseudoError> {
    match &stmt.kind {
      StmtKind::Declare {
        name, dimensions, ..
      } => {
        if let Some(dims) = dimensions {
          self.emit(Instr::DeclareArray {
            name: name.clone(),
            dims: dims.iter().map(|d| (d.start, d.end)).collect(),
          });
        } else if self.in_routine {
          self.emit(Instr::DeclareLocal { name: name.clone() });
        }
      }

      StmtKind::Constant { name, value } => {
        let value = self.gen_expr(value)?;
        self.emit(Instr::Assign {
          target: name.clone(),
          value,
        });
      }

      StmtKind::TypeDef { .. } => {
        // Record shapes are static; nothing reaches the VM.
      }

      StmtKind::Assignment { target, value } => {
        let value = self.gen_expr(value)?;
        let target = self.gen_target(target)?;
        self.emit(Instr::Assign { target, value });
      }

      StmtKind::Output { values } => {
        if values.len() == 1 {
          let value = self.gen_expr(&values[0])?;
          self.emit(Instr::Output { value });
        } else {
          for value in values {
            let value = self.gen_expr(value)?;
            self.emit(Instr::OutputPart { value });
          }
          self.emit(Instr::OutputEnd);
        }
      }

      StmtKind::Input { target } => {
        let target = self.gen_target(target)?;
        self.emit(Instr::Input { target });
      }

      StmtKind::If {
        condition,
        then_body,
        else_body,
      } => {
        let cond = self.gen_expr(condition)?;
        match else_body {
          Some(else_body) => {
            let else_label = self.new_label();
            let end_label = self.new_label();
            self.emit(Instr::IfZero {
              cond,
              label: else_label.clone(),
            });
            self.gen_block(then_body)?;
            self.emit(Instr::Goto {
              label: end_label.clone(),
            });
            self.emit(Instr::Label(else_label));
            self.gen_block(else_body)?;
            self.emit(Instr::Label(end_label));
          }
          None => {
            let end_label = self.new_label();
            self.emit(Instr::IfZero {
              cond,
              label: end_label.clone(),
            });
            self.gen_block(then_body)?;
            self.emit(Instr::Label(end_label));
          }
        }
      }

      StmtKind::While { condition, body } => {
        let start_label = self.new_label();
        let end_label = self.new_label();
        self.emit(Instr::Label(start_label.clone()));
        let cond = self.gen_expr(condition)?;
        self.emit(Instr::IfZero {
          cond,
          label: end_label.clone(),
        });
        self.gen_block(body)?;
        self.emit(Instr::Goto { label: start_label });
        self.emit(Instr::Label(end_label));
      }

      StmtKind::Repeat { body, condition } => {
        let start_label = self.new_label();
        self.emit(Instr::Label(start_label.clone()));
        self.gen_block(body)?;
        let cond = self.gen_expr(condition)?;
        self.emit(Instr::IfZero {
          cond,
          label: start_label,
        });
      }

      StmtKind::For {
        var,
        start,
        end,
        step,
        body,
      } => self.gen_for(var, start, end, step.as_ref(), body)?,

      StmtKind::Case {
        selector,
        branches,
        otherwise,
      } => {
        let selector = self.gen_expr(selector)?;
        let end_label = self.new_label();

        for branch in branches {
          let next_label = self.new_label();
          if branch.values.len() == 1 {
            let value = self.gen_expr(&branch.values[0])?;
            let matched = self.new_temp();
            self.emit(Instr::Binary {
              target: matched.clone(),
              left: selector.clone(),
              op: IrOp::Eq,
              right: value,
            });
            self.emit(Instr::IfZero {
              cond: matched,
              label: next_label.clone(),
            });
            self.gen_block(&branch.body)?;
            self.emit(Instr::Goto {
              label: end_label.clone(),
            });
          } else {
            let match_label = self.new_label();
            for value in &branch.values {
              let value = self.gen_expr(value)?;
              let matched = self.new_temp();
              self.emit(Instr::Binary {
                target: matched.clone(),
                left: selector.clone(),
                op: IrOp::Eq,
                right: value,
              });
              self.emit(Instr::IfNotZero {
                cond: matched,
                label: match_label.clone(),
              });
            }
            self.emit(Instr::Goto {
              label: next_label.clone(),
            });
            self.emit(Instr::Label(match_label));
            self.gen_block(&branch.body)?;
            self.emit(Instr::Goto {
              label: end_label.clone(),
            });
          }
          self.emit(Instr::Label(next_label));
        }

        if let Some(body) = otherwise {
          self.gen_block(body)?;
        }
        self.emit(Instr::Label(end_label));
      }

      StmtKind::Procedure { name, params, body } => {
        self.gen_routine(&format!("PROC_{}", name), params, body, false)?;
      }

      StmtKind::Function {
        name, params, body, ..
      } => {
        self.gen_routine(&format!("FUNC_{}", name), params, body, true)?;
      }

      StmtKind::Call { name, args } => {
        for arg in args {
          self.push_arg(arg)?;
        }
        self.emit(Instr::Call {
          label: format!("PROC_{}", name),
        });
      }

      StmtKind::Return { value } => {
        if self.in_function {
          if let Some(value) = value {
            let value = self.gen_expr(value)?;
            self.emit(Instr::SetReturn { value });
          }
          self.emit(Instr::ExitScope);
          self.emit(Instr::Ret);
        } else if self.in_routine {
          // Early return from a procedure still writes BYREF parameters
          // back to the caller.
          for param in self.byref_params.clone() {
            self.emit(Instr::WritebackByRef { name: param });
          }
          self.emit(Instr::ExitScope);
          self.emit(Instr::Ret);
        }
      }

      StmtKind::OpenFile { name, mode } => {
        let name = self.gen_expr(name)?;
        self.emit(Instr::OpenFile { name, mode: *mode });
      }

      StmtKind::ReadFile { name, target } => {
        let name = self.gen_expr(name)?;
        let target = self.gen_target(target)?;
        self.emit(Instr::ReadFile { name, target });
      }

      StmtKind::WriteFile { name, value } => {
        let name = self.gen_expr(name)?;
        let value = self.gen_expr(value)?;
        self.emit(Instr::WriteFile { name, value });
      }

      StmtKind::CloseFile { name } => {
        let name = self.gen_expr(name)?;
        self.emit(Instr::CloseFile { name });
      }
    }
    Ok(())
  }

  fn gen_block(&mut self, body: &[Stmt]) -> Result<(), PseudoError> {
    for stmt in body {
      self.gen_stmt(stmt)?;
    }
    Ok(())
  }

  /// Literal step sign, when the step is a literal (possibly negated).
  fn literal_step_sign(step: Option<&Expr>) -> Option<f64> {
    match step {
      None => Some(1.0),
      Some(Expr::IntegerLit(n)) => Some(*n as f64),
      Some(Expr::RealLit(r)) => Some(*r),
      Some(Expr::Unary {
        op: UnaryOp::Negate,
        expr,
      }) => match expr.as_ref() {
        Expr::IntegerLit(n) => Some(-(*n as f64)),
        Expr::RealLit(r) => Some(-r),
        _ => None,
      },
      Some(_) => None,
    }
  }

  fn gen_for(
    &mut self,
    var: &str,
    start: &Expr,
    end: &Expr,
    step: Option<&Expr>,
    body: &[Stmt],
  ) -> Result<(), PseudoError> {
    let start_value = self.gen_expr(start)?;
    self.emit(Instr::Assign {
      target: var.to_string(),
      value: start_value,
    });

    let start_label = self.new_label();
    let end_label = self.new_label();
    self.emit(Instr::Label(start_label.clone()));

    let end_value = self.gen_expr(end)?;
    let literal_sign = Self::literal_step_sign(step);

    let cond = match literal_sign {
      // Literal step: the comparison direction is known at compile time.
      Some(sign) => {
        let cond = self.new_temp();
        self.emit(Instr::Binary {
          target: cond.clone(),
          left: var.to_string(),
          op: if sign >= 0.0 { IrOp::LtEq } else { IrOp::GtEq },
          right: end_value,
        });
        cond
      }
      // Runtime direction selection:
      // cond = (step > 0 && var <= end) || (!(step > 0) && var >= end)
      None => {
        let step_value = self.gen_expr(step.expect("non-literal step is present"))?;
        let step_pos = self.new_temp();
        self.emit(Instr::Binary {
          target: step_pos.clone(),
          left: step_value,
          op: IrOp::Gt,
          right: "0".to_string(),
        });
        let up = self.new_temp();
        self.emit(Instr::Binary {
          target: up.clone(),
          left: var.to_string(),
          op: IrOp::LtEq,
          right: end_value.clone(),
        });
        let down = self.new_temp();
        self.emit(Instr::Binary {
          target: down.clone(),
          left: var.to_string(),
          op: IrOp::GtEq,
          right: end_value,
        });
        let going_up = self.new_temp();
        self.emit(Instr::Binary {
          target: going_up.clone(),
          left: step_pos.clone(),
          op: IrOp::And,
          right: up,
        });
        let step_neg = self.new_temp();
        self.emit(Instr::Binary {
          target: step_neg.clone(),
          left: step_pos,
          op: IrOp::Eq,
          right: "0".to_string(),
        });
        let going_down = self.new_temp();
        self.emit(Instr::Binary {
          target: going_down.clone(),
          left: step_neg,
          op: IrOp::And,
          right: down,
        });
        let cond = self.new_temp();
        self.emit(Instr::Binary {
          target: cond.clone(),
          left: going_up,
          op: IrOp::Or,
          right: going_down,
        });
        cond
      }
    };

    self.emit(Instr::IfZero {
      cond,
      label: end_label.clone(),
    });

    self.gen_block(body)?;

    let step_value = match (literal_sign, step) {
      (Some(_), None) => "1".to_string(),
      (_, Some(step)) => self.gen_expr(step)?,
      (None, None) => unreachable!("missing step is always literal 1"),
    };
    self.emit(Instr::Binary {
      target: var.to_string(),
      left: var.to_string(),
      op: IrOp::Add,
      right: step_value,
    });
    self.emit(Instr::Goto { label: start_label });
    self.emit(Instr::Label(end_label));
    Ok(())
  }

  fn gen_routine(
    &mut self,
    label: &str,
    params: &[Param],
    body: &[Stmt],
    is_function: bool,
  ) -> Result<(), PseudoError> {
    let skip_label = self.new_label();
    self.emit(Instr::Goto {
      label: skip_label.clone(),
    });
    self.emit(Instr::Label(label.to_string()));
    self.emit(Instr::EnterScope);

    // Arguments were pushed left to right, so they pop in reverse.
    for param in params.iter().rev() {
      match param.mode {
        ParamMode::ByRef => self.emit(Instr::PopByRef {
          name: param.name.clone(),
        }),
        ParamMode::ByVal => self.emit(Instr::PopParam {
          name: param.name.clone(),
        }),
      }
    }

    let saved_routine = self.in_routine;
    let saved_function = self.in_function;
    let saved_byref = std::mem::take(&mut self.byref_params);
    self.in_routine = true;
    self.in_function = is_function;
    self.byref_params = params
      .iter()
      .filter(|p| p.mode == ParamMode::ByRef)
      .map(|p| p.name.clone())
      .collect();

    let result = self.gen_block(body);

    if !is_function {
      for param in self.byref_params.clone() {
        self.emit(Instr::WritebackByRef { name: param });
      }
    }
    self.emit(Instr::ExitScope);
    self.emit(Instr::Ret);

    self.in_routine = saved_routine;
    self.in_function = saved_function;
    self.byref_params = saved_byref;

    self.emit(Instr::Label(skip_label));
    result
  }

  /// Arguments that name a storage location (identifier, array element,
  /// record field) push their reference alongside the value so BYREF
  /// parameters can be written back; anything else pushes `__NONE__`.
  fn push_arg(&mut self, arg: &Expr) -> Result<(), PseudoError> {
    let reference = match arg {
      Expr::Ident(name) => Some(name.clone()),
      Expr::ArrayAccess { .. } | Expr::FieldAccess { .. } => Some(self.gen_expr_ref(arg)?),
      _ => None,
    };
    match reference {
      Some(reference) => {
        self.emit(Instr::Push {
          value: reference.clone(),
        });
        self.emit(Instr::PushRef { target: reference });
      }
      None => {
        let value = self.gen_expr(arg)?;
        self.emit(Instr::Push { value });
        self.emit(Instr::PushRef {
          target: NO_REF.to_string(),
        });
      }
    }
    Ok(())
  }

  /// Composite operand for an element or field access.
  fn gen_expr_ref(&mut self, expr: &Expr) -> Result<String, PseudoError> {
    match expr {
      Expr::ArrayAccess { name, indices } => {
        let mut parts = Vec::new();
        for index in indices {
          parts.push(self.gen_expr(index)?);
        }
        Ok(format!("{}[{}]", name, parts.join(",")))
      }
      Expr::FieldAccess { name, field } => Ok(format!("{}.{}", name, field)),
      _ => unreachable!("only element and field accesses have references"),
    }
  }

  fn gen_target(&mut self, target: &AssignTarget) -> Result<String, PseudoError> {
    match target {
      AssignTarget::Name(name) => Ok(name.clone()),
      AssignTarget::Element { name, indices } => {
        let mut parts = Vec::new();
        for index in indices {
          parts.push(self.gen_expr(index)?);
        }
        Ok(format!("{}[{}]", name, parts.join(",")))
      }
      AssignTarget::Field { name, field } => Ok(format!("{}.{}", name, field)),
    }
  }

  fn gen_expr(&mut self, expr: &Expr) -> Result<String, PseudoError> {
    match expr {
      Expr::IntegerLit(n) => Ok(n.to_string()),
      Expr::RealLit(r) => Ok(r.to_string()),
      Expr::StringLit(s) => Ok(format!("\"{}\"", s)),
      Expr::BooleanLit(b) => Ok(if *b { "1" } else { "0" }.to_string()),
      Expr::Ident(name) => Ok(name.clone()),

      Expr::ArrayAccess { .. } | Expr::FieldAccess { .. } => self.gen_expr_ref(expr),

      Expr::Binary { left, op, right } => {
        let left = self.gen_expr(left)?;
        let right = self.gen_expr(right)?;
        let target = self.new_temp();
        self.emit(Instr::Binary {
          target: target.clone(),
          left,
          op: ir_op(*op),
          right,
        });
        Ok(target)
      }

      Expr::Unary { op, expr } => {
        let operand = self.gen_expr(expr)?;
        let target = self.new_temp();
        match op {
          UnaryOp::Negate => self.emit(Instr::Binary {
            target: target.clone(),
            left: "0".to_string(),
            op: IrOp::Sub,
            right: operand,
          }),
          UnaryOp::Not => self.emit(Instr::Binary {
            target: target.clone(),
            left: operand,
            op: IrOp::Eq,
            right: "0".to_string(),
          }),
        }
        Ok(target)
      }

      Expr::Call { name, args } => {
        if is_builtin(name) {
          let mut arg_values = Vec::new();
          for arg in args {
            arg_values.push(self.gen_expr(arg)?);
          }
          let target = self.new_temp();
          self.emit(Instr::Builtin {
            target: target.clone(),
            name: name.to_ascii_uppercase(),
            args: arg_values,
          });
          return Ok(target);
        }

        for arg in args {
          self.push_arg(arg)?;
        }
        self.emit(Instr::Call {
          label: format!("FUNC_{}", name),
        });
        let target = self.new_temp();
        self.emit(Instr::Assign {
          target: target.clone(),
          value: "RETVAL".to_string(),
        });
        Ok(target)
      }
    }
  }
}

impl Default for IrGenerator {
  fn default() -> Self {
    Self::new()
  }
}

fn ir_op(op: BinaryOp) -> IrOp {
  match op {
    BinaryOp::Add => IrOp::Add,
    BinaryOp::Subtract => IrOp::Sub,
    BinaryOp::Multiply => IrOp::Mul,
    BinaryOp::Divide => IrOp::Div,
    BinaryOp::IntDiv => IrOp::IntDiv,
    BinaryOp::Modulo => IrOp::Mod,
    BinaryOp::Power => IrOp::Pow,
    BinaryOp::Concat => IrOp::Concat,
    BinaryOp::Equal => IrOp::Eq,
    BinaryOp::NotEqual => IrOp::NotEq,
    BinaryOp::Less => IrOp::Lt,
    BinaryOp::Greater => IrOp::Gt,
    BinaryOp::LessEqual => IrOp::LtEq,
    BinaryOp::GreaterEqual => IrOp::GtEq,
    BinaryOp::And => IrOp::And,
    BinaryOp::Or => IrOp::Or,
  }
}
