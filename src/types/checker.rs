use super::DataType;
use crate::error::PseudoError;
use crate::parser::ast::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct SymbolEntry {
  pub data_type: DataType,
  pub assigned: bool,
  pub is_array: bool,
  pub dimensions: Option<Vec<Dimension>>,
  pub is_constant: bool,
}

/// Scope chain: lookups walk toward the root, declarations only write the
/// current scope.
pub struct SymbolTable {
  scopes: Vec<HashMap<String, SymbolEntry>>,
}

impl SymbolTable {
  pub fn new() -> Self {
    Self {
      scopes: vec![HashMap::new()],
    }
  }

  pub fn push_scope(&mut self) {
    self.scopes.push(HashMap::new());
  }

  pub fn pop_scope(&mut self) {
    if self.scopes.len() > 1 {
      self.scopes.pop();
    }
  }

  pub fn declare(&mut self, name: &str, entry: SymbolEntry) -> Result<(), String> {
    let scope = self.scopes.last_mut().expect("scope stack is never empty");
    if scope.contains_key(name) {
      return Err(format!("Variable '{}' is already declared", name));
    }
    scope.insert(name.to_string(), entry);
    Ok(())
  }

  pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
    for scope in self.scopes.iter().rev() {
      if let Some(entry) = scope.get(name) {
        return Some(entry);
      }
    }
    None
  }

  pub fn mark_assigned(&mut self, name: &str) {
    for scope in self.scopes.iter_mut().rev() {
      if let Some(entry) = scope.get_mut(name) {
        entry.assigned = true;
        return;
      }
    }
  }
}

impl Default for SymbolTable {
  fn default() -> Self {
    Self::new()
  }
}

#[derive(Debug, Clone)]
struct ParamSig {
  data_type: DataType,
  mode: ParamMode,
}

#[derive(Debug, Clone)]
struct FunctionSig {
  params: Vec<ParamSig>,
  returns: DataType,
}

enum Routine {
  None,
  Procedure,
  Function,
}

pub struct TypeChecker {
  symbols: SymbolTable,
  records: HashMap<String, Vec<(String, DataType)>>,
  procedures: HashMap<String, Vec<ParamSig>>,
  functions: HashMap<String, FunctionSig>,
  routine: Routine,
}

impl TypeChecker {
  pub fn new() -> Self {
    Self {
      symbols: SymbolTable::new(),
      records: HashMap::new(),
      procedures: HashMap::new(),
      functions: HashMap::new(),
      routine: Routine::None,
    }
  }

  pub fn check_program(&mut self, program: &Program) -> Result<(), PseudoError> {
    // Pass one: register record types and routine signatures so forward
    // calls within the unit are legal.
    for stmt in &program.statements {
      self.register_stmt(stmt)?;
    }

    // Pass two: check every statement.
    for stmt in &program.statements {
      self.check_stmt(stmt)?;
    }
    Ok(())
  }

  fn register_stmt(&mut self, stmt: &Stmt) -> Result<(), PseudoError> {
    match &stmt.kind {
      StmtKind::TypeDef { name, fields } => {
        if self.records.contains_key(name) {
          return Err(PseudoError::type_error(
            format!("Type '{}' is already defined", name),
            stmt.line,
          ));
        }
        let mut resolved = Vec::new();
        for (field_name, field_type) in fields {
          let data_type = self.resolve_type(field_type, stmt.line)?;
          if resolved.iter().any(|(existing, _)| existing == field_name) {
            return Err(PseudoError::type_error(
              format!("Duplicate field '{}' in type '{}'", field_name, name),
              stmt.line,
            ));
          }
          resolved.push((field_name.clone(), data_type));
        }
        self.records.insert(name.clone(), resolved);
      }

      StmtKind::Procedure { name, params, .. } => {
        if self.procedures.contains_key(name) || self.functions.contains_key(name) {
          return Err(PseudoError::type_error(
            format!("Procedure '{}' is already defined", name),
            stmt.line,
          ));
        }
        let sigs = self.param_sigs(params, stmt.line)?;
        self.procedures.insert(name.clone(), sigs);
      }

      StmtKind::Function {
        name,
        params,
        returns,
        ..
      } => {
        if self.procedures.contains_key(name) || self.functions.contains_key(name) {
          return Err(PseudoError::type_error(
            format!("Function '{}' is already defined", name),
            stmt.line,
          ));
        }
        let sigs = self.param_sigs(params, stmt.line)?;
        let returns = self.resolve_type(returns, stmt.line)?;
        self.functions.insert(
          name.clone(),
          FunctionSig {
            params: sigs,
            returns,
          },
        );
      }

      _ => {}
    }
    Ok(())
  }

  fn param_sigs(&self, params: &[Param], line: usize) -> Result<Vec<ParamSig>, PseudoError> {
    params
      .iter()
      .map(|p| {
        Ok(ParamSig {
          data_type: self.resolve_type(&p.type_name, line)?,
          mode: p.mode,
        })
      })
      .collect()
  }

  fn resolve_type(&self, name: &TypeName, line: usize) -> Result<DataType, PseudoError> {
    let data_type = DataType::from_type_name(name);
    if let DataType::User(user) = &data_type {
      if !self.records.contains_key(user) {
        return Err(PseudoError::type_error(
          format!("Unknown type '{}'", user),
          line,
        ));
      }
    }
    Ok(data_type)
  }

  fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), PseudoError> {
    let line = stmt.line;
    match &stmt.kind {
      StmtKind::Declare {
        name,
        type_name,
        dimensions,
      } => {
        let data_type = self.resolve_type(type_name, line)?;
        if let Some(dims) = dimensions {
          for dim in dims {
            if dim.start > dim.end {
              return Err(PseudoError::type_error(
                format!("Invalid array bounds {}:{}", dim.start, dim.end),
                line,
              ));
            }
          }
        }
        self
          .symbols
          .declare(
            name,
            SymbolEntry {
              data_type,
              assigned: false,
              is_array: dimensions.is_some(),
              dimensions: dimensions.clone(),
              is_constant: false,
            },
          )
          .map_err(|message| PseudoError::type_error(message, line))?;
      }

      StmtKind::Constant { name, value } => {
        let data_type = self.infer_expr(value, line)?;
        self
          .symbols
          .declare(
            name,
            SymbolEntry {
              data_type,
              assigned: true,
              is_array: false,
              dimensions: None,
              is_constant: true,
            },
          )
          .map_err(|message| PseudoError::type_error(message, line))?;
      }

      StmtKind::TypeDef { .. } => {
        // Registered during pass one.
      }

      StmtKind::Assignment { target, value } => {
        let value_type = self.infer_expr(value, line)?;
        let target_type = self.check_target(target, line)?;
        if !target_type.accepts(&value_type) {
          return Err(PseudoError::type_error(
            format!(
              "Cannot assign {} to '{}' of type {}",
              value_type,
              target.base_name(),
              target_type
            ),
            line,
          ));
        }
        self.symbols.mark_assigned(target.base_name());
      }

      StmtKind::Output { values } => {
        for value in values {
          self.infer_expr(value, line)?;
        }
      }

      StmtKind::Input { target } => {
        self.check_target(target, line)?;
        self.symbols.mark_assigned(target.base_name());
      }

      StmtKind::If {
        condition,
        then_body,
        else_body,
      } => {
        self.check_condition(condition, "IF", line)?;
        self.check_block(then_body)?;
        if let Some(body) = else_body {
          self.check_block(body)?;
        }
      }

      StmtKind::While { condition, body } => {
        self.check_condition(condition, "WHILE", line)?;
        self.check_block(body)?;
      }

      StmtKind::Repeat { body, condition } => {
        self.check_block(body)?;
        self.check_condition(condition, "UNTIL", line)?;
      }

      StmtKind::For {
        var,
        start,
        end,
        step,
        body,
      } => {
        let entry = self.symbols.lookup(var).ok_or_else(|| {
          PseudoError::type_error(format!("Variable '{}' is not declared", var), line)
        })?;
        if entry.is_constant {
          return Err(PseudoError::type_error(
            format!("Cannot use constant '{}' as loop variable", var),
            line,
          ));
        }
        if entry.data_type != DataType::Integer || entry.is_array {
          return Err(PseudoError::type_error(
            format!("FOR loop variable '{}' must be INTEGER", var),
            line,
          ));
        }
        for (label, expr) in [("start", start), ("end", end)] {
          let expr_type = self.infer_expr(expr, line)?;
          if expr_type != DataType::Integer {
            return Err(PseudoError::type_error(
              format!("FOR {} value must be INTEGER, got {}", label, expr_type),
              line,
            ));
          }
        }
        if let Some(step) = step {
          let step_type = self.infer_expr(step, line)?;
          if step_type != DataType::Integer {
            return Err(PseudoError::type_error(
              format!("FOR STEP value must be INTEGER, got {}", step_type),
              line,
            ));
          }
        }
        self.symbols.mark_assigned(var);
        self.check_block(body)?;
      }

      StmtKind::Case {
        selector,
        branches,
        otherwise,
      } => {
        let selector_type = self.infer_expr(selector, line)?;
        for branch in branches {
          for value in &branch.values {
            let value_type = self.infer_expr(value, line)?;
            let numeric = selector_type.is_numeric() && value_type.is_numeric();
            if !numeric && !selector_type.accepts(&value_type) {
              return Err(PseudoError::type_error(
                format!(
                  "CASE value of type {} is not compatible with selector of type {}",
                  value_type, selector_type
                ),
                line,
              ));
            }
          }
          self.check_block(&branch.body)?;
        }
        if let Some(body) = otherwise {
          self.check_block(body)?;
        }
      }

      StmtKind::Procedure { params, body, .. } => {
        self.check_routine_body(params, body, Routine::Procedure, line)?;
      }

      StmtKind::Function { params, body, .. } => {
        self.check_routine_body(params, body, Routine::Function, line)?;
      }

      StmtKind::Call { name, args } => {
        if self.functions.contains_key(name) {
          return Err(PseudoError::type_error(
            format!("'{}' is a function; CALL expects a procedure", name),
            line,
          ));
        }
        let arity = match self.procedures.get(name) {
          Some(params) => params.len(),
          None => {
            return Err(PseudoError::type_error(
              format!("Unknown procedure '{}'", name),
              line,
            ));
          }
        };
        if args.len() != arity {
          return Err(PseudoError::type_error(
            format!(
              "Procedure '{}' expects {} arguments, got {}",
              name,
              arity,
              args.len()
            ),
            line,
          ));
        }
        for arg in args {
          self.check_arg(arg, line)?;
        }
      }

      StmtKind::Return { value } => {
        match self.routine {
          Routine::None => {
            return Err(PseudoError::type_error(
              "RETURN outside procedure or function",
              line,
            ));
          }
          Routine::Procedure => {
            if value.is_some() {
              return Err(PseudoError::type_error(
                "RETURN with a value is only allowed in a function",
                line,
              ));
            }
          }
          Routine::Function => {
            // The value type is not checked against the declared RETURNS
            // type in this revision.
            if let Some(expr) = value {
              self.infer_expr(expr, line)?;
            }
          }
        }
      }

      StmtKind::OpenFile { name, .. } | StmtKind::CloseFile { name } => {
        self.check_file_name(name, line)?;
      }

      StmtKind::ReadFile { name, target } => {
        self.check_file_name(name, line)?;
        let target_type = self.check_target(target, line)?;
        if !target_type.accepts(&DataType::Str) && target_type != DataType::Char {
          return Err(PseudoError::type_error(
            format!("READFILE target must be STRING or CHAR, got {}", target_type),
            line,
          ));
        }
        self.symbols.mark_assigned(target.base_name());
      }

      StmtKind::WriteFile { name, value } => {
        self.check_file_name(name, line)?;
        self.infer_expr(value, line)?;
      }
    }
    Ok(())
  }

  fn check_block(&mut self, body: &[Stmt]) -> Result<(), PseudoError> {
    // No scope is pushed: pseudocode has flat routine scopes, so a DECLARE
    // inside an IF body is visible for the rest of the routine.
    for stmt in body {
      self.check_stmt(stmt)?;
    }
    Ok(())
  }

  fn check_routine_body(
    &mut self,
    params: &[Param],
    body: &[Stmt],
    routine: Routine,
    line: usize,
  ) -> Result<(), PseudoError> {
    self.symbols.push_scope();
    for param in params {
      let data_type = self.resolve_type(&param.type_name, line)?;
      self
        .symbols
        .declare(
          &param.name,
          SymbolEntry {
            data_type,
            assigned: true,
            is_array: false,
            dimensions: None,
            is_constant: false,
          },
        )
        .map_err(|message| PseudoError::type_error(message, line))?;
    }
    self.routine = routine;
    let result = self.check_block(body);
    self.routine = Routine::None;
    self.symbols.pop_scope();
    result
  }

  fn check_condition(&mut self, expr: &Expr, context: &str, line: usize) -> Result<(), PseudoError> {
    let expr_type = self.infer_expr(expr, line)?;
    if expr_type != DataType::Boolean {
      return Err(PseudoError::type_error(
        format!("{} condition must be BOOLEAN, got {}", context, expr_type),
        line,
      ));
    }
    Ok(())
  }

  fn check_file_name(&mut self, expr: &Expr, line: usize) -> Result<(), PseudoError> {
    let expr_type = self.infer_expr(expr, line)?;
    if !expr_type.is_string_like() {
      return Err(PseudoError::type_error(
        format!("File name must be STRING, got {}", expr_type),
        line,
      ));
    }
    Ok(())
  }

  /// Type of a store target; validates shape but not assignedness.
  fn check_target(&mut self, target: &AssignTarget, line: usize) -> Result<DataType, PseudoError> {
    let entry = self
      .symbols
      .lookup(target.base_name())
      .cloned()
      .ok_or_else(|| {
        PseudoError::type_error(
          format!("Variable '{}' is not declared", target.base_name()),
          line,
        )
      })?;
    if entry.is_constant {
      return Err(PseudoError::type_error(
        format!("Cannot assign to constant '{}'", target.base_name()),
        line,
      ));
    }

    match target {
      AssignTarget::Name(name) => {
        if entry.is_array {
          return Err(PseudoError::type_error(
            format!("Array '{}' must be assigned through an index", name),
            line,
          ));
        }
        Ok(entry.data_type)
      }

      AssignTarget::Element { name, indices } => {
        if !entry.is_array {
          return Err(PseudoError::type_error(
            format!("Variable '{}' is not an array", name),
            line,
          ));
        }
        let dims = entry.dimensions.as_ref().map(|d| d.len()).unwrap_or(0);
        if indices.len() != dims {
          return Err(PseudoError::type_error(
            format!(
              "Array '{}' has {} dimension(s), got {} indices",
              name,
              dims,
              indices.len()
            ),
            line,
          ));
        }
        for index in indices {
          let index_type = self.infer_expr(index, line)?;
          if index_type != DataType::Integer {
            return Err(PseudoError::type_error(
              format!("Array index must be INTEGER, got {}", index_type),
              line,
            ));
          }
        }
        Ok(entry.data_type)
      }

      AssignTarget::Field { name, field } => self.field_type(&entry, name, field, line),
    }
  }

  fn field_type(
    &self,
    entry: &SymbolEntry,
    name: &str,
    field: &str,
    line: usize,
  ) -> Result<DataType, PseudoError> {
    let record = match &entry.data_type {
      DataType::User(type_name) => self.records.get(type_name).ok_or_else(|| {
        PseudoError::type_error(format!("Unknown type '{}'", type_name), line)
      })?,
      other => {
        return Err(PseudoError::type_error(
          format!("Variable '{}' of type {} has no fields", name, other),
          line,
        ));
      }
    };
    record
      .iter()
      .find(|(field_name, _)| field_name == field)
      .map(|(_, data_type)| data_type.clone())
      .ok_or_else(|| {
        PseudoError::type_error(
          format!("Type {} has no field '{}'", entry.data_type, field),
          line,
        )
      })
  }

  /// Call arguments allow one extra form: a bare array name, which is
  /// passed whole (typically to a BYREF parameter).
  fn check_arg(&mut self, arg: &Expr, line: usize) -> Result<(), PseudoError> {
    if let Expr::Ident(name) = arg {
      if let Some(entry) = self.symbols.lookup(name) {
        if entry.is_array {
          if !entry.assigned {
            return Err(PseudoError::type_error(
              format!("Variable '{}' used before assignment", name),
              line,
            ));
          }
          return Ok(());
        }
      }
    }
    self.infer_expr(arg, line)?;
    Ok(())
  }

  fn infer_expr(&mut self, expr: &Expr, line: usize) -> Result<DataType, PseudoError> {
    match expr {
      Expr::IntegerLit(_) => Ok(DataType::Integer),
      Expr::RealLit(_) => Ok(DataType::Real),
      // A one-character string literal is a CHAR; it widens to STRING
      // wherever one is needed.
      Expr::StringLit(s) => {
        if s.chars().count() == 1 {
          Ok(DataType::Char)
        } else {
          Ok(DataType::Str)
        }
      }
      Expr::BooleanLit(_) => Ok(DataType::Boolean),

      Expr::Ident(name) => {
        let entry = self.symbols.lookup(name).ok_or_else(|| {
          PseudoError::type_error(format!("Variable '{}' is not declared", name), line)
        })?;
        if entry.is_array {
          return Err(PseudoError::type_error(
            format!("Array '{}' used without index", name),
            line,
          ));
        }
        if !entry.assigned {
          return Err(PseudoError::type_error(
            format!("Variable '{}' used before assignment", name),
            line,
          ));
        }
        Ok(entry.data_type.clone())
      }

      Expr::ArrayAccess { name, indices } => {
        let entry = self
          .symbols
          .lookup(name)
          .cloned()
          .ok_or_else(|| {
            PseudoError::type_error(format!("Variable '{}' is not declared", name), line)
          })?;
        if !entry.is_array {
          return Err(PseudoError::type_error(
            format!("Variable '{}' is not an array", name),
            line,
          ));
        }
        if !entry.assigned {
          return Err(PseudoError::type_error(
            format!("Variable '{}' used before assignment", name),
            line,
          ));
        }
        let dims = entry.dimensions.as_ref().map(|d| d.len()).unwrap_or(0);
        if indices.len() != dims {
          return Err(PseudoError::type_error(
            format!(
              "Array '{}' has {} dimension(s), got {} indices",
              name,
              dims,
              indices.len()
            ),
            line,
          ));
        }
        for index in indices {
          let index_type = self.infer_expr(index, line)?;
          if index_type != DataType::Integer {
            return Err(PseudoError::type_error(
              format!("Array index must be INTEGER, got {}", index_type),
              line,
            ));
          }
        }
        Ok(entry.data_type)
      }

      Expr::FieldAccess { name, field } => {
        let entry = self
          .symbols
          .lookup(name)
          .cloned()
          .ok_or_else(|| {
            PseudoError::type_error(format!("Variable '{}' is not declared", name), line)
          })?;
        if !entry.assigned {
          return Err(PseudoError::type_error(
            format!("Variable '{}' used before assignment", name),
            line,
          ));
        }
        self.field_type(&entry, name, field, line)
      }

      Expr::Binary { left, op, right } => {
        let left_type = self.infer_expr(left, line)?;
        let right_type = self.infer_expr(right, line)?;
        self.binary_type(&left_type, *op, &right_type, line)
      }

      Expr::Unary { op, expr } => {
        let expr_type = self.infer_expr(expr, line)?;
        match op {
          UnaryOp::Negate => {
            if !expr_type.is_numeric() {
              return Err(PseudoError::type_error(
                format!("Cannot negate {}", expr_type),
                line,
              ));
            }
            Ok(expr_type)
          }
          UnaryOp::Not => {
            if expr_type != DataType::Boolean {
              return Err(PseudoError::type_error(
                format!("NOT requires BOOLEAN, got {}", expr_type),
                line,
              ));
            }
            Ok(DataType::Boolean)
          }
        }
      }

      Expr::Call { name, args } => self.check_call_expr(name, args, line),
    }
  }

  fn binary_type(
    &self,
    left: &DataType,
    op: BinaryOp,
    right: &DataType,
    line: usize,
  ) -> Result<DataType, PseudoError> {
    match op {
      BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Power => {
        if left.is_numeric() && right.is_numeric() {
          if *left == DataType::Real || *right == DataType::Real {
            Ok(DataType::Real)
          } else {
            Ok(DataType::Integer)
          }
        } else {
          Err(self.bad_operands(op, left, right, line))
        }
      }

      BinaryOp::Divide => {
        if left.is_numeric() && right.is_numeric() {
          Ok(DataType::Real)
        } else {
          Err(self.bad_operands(op, left, right, line))
        }
      }

      BinaryOp::IntDiv | BinaryOp::Modulo => {
        if left.is_numeric() && right.is_numeric() {
          Ok(DataType::Integer)
        } else {
          Err(self.bad_operands(op, left, right, line))
        }
      }

      BinaryOp::Concat => {
        if left.is_string_like() || right.is_string_like() {
          Ok(DataType::Str)
        } else {
          Err(self.bad_operands(op, left, right, line))
        }
      }

      BinaryOp::Equal
      | BinaryOp::NotEqual
      | BinaryOp::Less
      | BinaryOp::Greater
      | BinaryOp::LessEqual
      | BinaryOp::GreaterEqual => {
        let comparable = (left.is_numeric() && right.is_numeric())
          || (left.is_string_like() && right.is_string_like())
          || (*left == DataType::Boolean && *right == DataType::Boolean);
        if comparable {
          Ok(DataType::Boolean)
        } else {
          Err(self.bad_operands(op, left, right, line))
        }
      }

      BinaryOp::And | BinaryOp::Or => {
        if *left == DataType::Boolean && *right == DataType::Boolean {
          Ok(DataType::Boolean)
        } else {
          Err(self.bad_operands(op, left, right, line))
        }
      }
    }
  }

  fn bad_operands(&self, op: BinaryOp, left: &DataType, right: &DataType, line: usize) -> PseudoError {
    PseudoError::type_error(
      format!("Cannot apply {:?} to {} and {}", op, left, right),
      line,
    )
  }

  fn check_call_expr(
    &mut self,
    name: &str,
    args: &[Expr],
    line: usize,
  ) -> Result<DataType, PseudoError> {
    if let Some((param_kinds, returns)) = builtin_signature(name) {
      if args.len() != param_kinds.len() {
        return Err(PseudoError::type_error(
          format!(
            "{} expects {} arguments, got {}",
            name,
            param_kinds.len(),
            args.len()
          ),
          line,
        ));
      }
      for (arg, kind) in args.iter().zip(param_kinds.iter()) {
        let arg_type = self.infer_expr(arg, line)?;
        let ok = match kind {
          ArgKind::Numeric => arg_type.is_numeric(),
          ArgKind::Integer => arg_type == DataType::Integer,
          ArgKind::StringLike => arg_type.is_string_like(),
        };
        if !ok {
          return Err(PseudoError::type_error(
            format!("Invalid argument of type {} to {}", arg_type, name),
            line,
          ));
        }
      }
      return Ok(returns);
    }

    if self.procedures.contains_key(name) {
      return Err(PseudoError::type_error(
        format!("'{}' is a procedure and returns no value", name),
        line,
      ));
    }

    let arity = match self.functions.get(name) {
      Some(sig) => sig.params.len(),
      None => {
        return Err(PseudoError::type_error(
          format!("Unknown function '{}'", name),
          line,
        ));
      }
    };
    if args.len() != arity {
      return Err(PseudoError::type_error(
        format!("Function '{}' expects {} arguments, got {}", name, arity, args.len()),
        line,
      ));
    }
    for arg in args {
      self.check_arg(arg, line)?;
    }
    Ok(self.functions[name].returns.clone())
  }
}

impl Default for TypeChecker {
  fn default() -> Self {
    Self::new()
  }
}

enum ArgKind {
  Numeric,
  Integer,
  StringLike,
}

fn builtin_signature(name: &str) -> Option<(&'static [ArgKind], DataType)> {
  use ArgKind::*;
  match name.to_ascii_uppercase().as_str() {
    "LENGTH" => Some((&[StringLike], DataType::Integer)),
    "UCASE" | "LCASE" | "TO_UPPER" | "TO_LOWER" => Some((&[StringLike], DataType::Str)),
    "MID" => Some((&[StringLike, Integer, Integer], DataType::Str)),
    "LEFT" | "RIGHT" => Some((&[StringLike, Integer], DataType::Str)),
    "INT" => Some((&[Numeric], DataType::Integer)),
    "RAND" => Some((&[Numeric], DataType::Integer)),
    "NUM_TO_STR" => Some((&[Numeric], DataType::Str)),
    "STR_TO_NUM" => Some((&[StringLike], DataType::Real)),
    "CHR" => Some((&[Integer], DataType::Char)),
    "ASC" => Some((&[StringLike], DataType::Integer)),
    "EOF" => Some((&[StringLike], DataType::Boolean)),
    _ => None,
  }
}

/// True when `name` is a built-in function recognised at call sites.
pub fn is_builtin(name: &str) -> bool {
  builtin_signature(name).is_some()
}
