pub mod builtins;
pub mod files;
pub mod value;

use crate::error::PseudoError;
use crate::ir::{Instr, IrOp, NO_REF};
use builtins::call_builtin;
use files::FileSystem;
use indexmap::IndexMap;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use value::{ArrayValue, Value};

/// Runaway-program guard.
pub const STEP_LIMIT: u64 = 10_000_000;

const DEFAULT_YIELD_INTERVAL: u64 = 1_000;
const DEFAULT_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Result of a single fetch/execute step. `AwaitInput` is the suspension
/// marker: the program counter stays on the INPUT instruction until the
/// driver supplies a value.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
  Running,
  AwaitInput { target: String },
  Done,
}

/// Host hooks for driver-mode execution.
pub trait Driver {
  fn read_input(&mut self, target: &str) -> Result<String, PseudoError>;
  fn write_output(&mut self, line: &str);
  /// Called every `yield_interval` steps so a host UI can make progress.
  fn yield_now(&mut self) {}
}

#[derive(Debug)]
struct Frame {
  locals: IndexMap<String, Value>,
  byref: HashMap<String, String>,
}

impl Frame {
  fn new() -> Self {
    Self {
      locals: IndexMap::new(),
      byref: HashMap::new(),
    }
  }
}

/// Label-addressed interpreter over the linear IR.
#[derive(Debug)]
pub struct Vm {
  instrs: Vec<Instr>,
  labels: HashMap<String, usize>,
  pc: usize,
  pub globals: IndexMap<String, Value>,
  scopes: Vec<Frame>,
  call_stack: Vec<usize>,
  arg_stack: Vec<Value>,
  ref_stack: Vec<String>,
  ret_val: Value,
  pub files: FileSystem,
  inputs: VecDeque<String>,
  pub output: Vec<String>,
  output_parts: Vec<String>,
  steps: u64,
  rng_state: u64,
  halt: Arc<AtomicBool>,
  yield_interval: u64,
}

impl Vm {
  pub fn new(instrs: Vec<Instr>) -> Result<Self, PseudoError> {
    let mut labels = HashMap::new();
    for (index, instr) in instrs.iter().enumerate() {
      if let Instr::Label(name) = instr {
        if labels.insert(name.clone(), index).is_some() {
          return Err(PseudoError::runtime(format!(
            "Label '{}' is defined more than once",
            name
          )));
        }
      }
    }
    Ok(Self {
      instrs,
      labels,
      pc: 0,
      globals: IndexMap::new(),
      scopes: Vec::new(),
      call_stack: Vec::new(),
      arg_stack: Vec::new(),
      ref_stack: Vec::new(),
      ret_val: Value::Int(0),
      files: FileSystem::new(),
      inputs: VecDeque::new(),
      output: Vec::new(),
      output_parts: Vec::new(),
      steps: 0,
      rng_state: DEFAULT_SEED,
      halt: Arc::new(AtomicBool::new(false)),
      yield_interval: DEFAULT_YIELD_INTERVAL,
    })
  }

  pub fn queue_inputs<I: IntoIterator<Item = String>>(&mut self, inputs: I) {
    self.inputs.extend(inputs);
  }

  pub fn preload_file(&mut self, name: &str, lines: Vec<String>) {
    self
      .files
      .files
      .insert(name.to_string(), files::VirtualFile::from_lines(lines));
  }

  pub fn set_seed(&mut self, seed: u64) {
    // Xorshift state must never be zero.
    self.rng_state = if seed == 0 { DEFAULT_SEED } else { seed };
  }

  pub fn set_yield_interval(&mut self, interval: u64) {
    self.yield_interval = interval.max(1);
  }

  /// Shared flag a host may set from another thread to cancel the run.
  pub fn halt_handle(&self) -> Arc<AtomicBool> {
    Arc::clone(&self.halt)
  }

  pub(crate) fn next_rand(&mut self) -> u64 {
    let mut x = self.rng_state;
    x ^= x >> 12;
    x ^= x << 25;
    x ^= x >> 27;
    self.rng_state = x;
    x.wrapping_mul(0x2545_F491_4F6C_DD1D)
  }

  /// Batch execution: inputs come from the pre-supplied queue and the run
  /// fails if the queue is exhausted at an INPUT.
  pub fn run(&mut self) -> Result<(), PseudoError> {
    loop {
      match self.step()? {
        StepOutcome::Done => return Ok(()),
        StepOutcome::Running => {}
        StepOutcome::AwaitInput { .. } => {
          return Err(self.error_here("No input available for INPUT"));
        }
      }
    }
  }

  /// Driver execution: the host supplies input, receives output lines as
  /// they appear, and gets a cooperative yield every `yield_interval`
  /// steps. The halt flag is checked on every iteration.
  pub fn run_with_driver(&mut self, driver: &mut dyn Driver) -> Result<(), PseudoError> {
    let mut flushed = 0;
    loop {
      if self.halt.load(Ordering::Relaxed) {
        return Err(PseudoError::runtime("Execution cancelled"));
      }
      let outcome = self.step()?;
      while flushed < self.output.len() {
        driver.write_output(&self.output[flushed]);
        flushed += 1;
      }
      match outcome {
        StepOutcome::Done => return Ok(()),
        StepOutcome::AwaitInput { target } => {
          if self.halt.load(Ordering::Relaxed) {
            return Err(PseudoError::runtime("Execution cancelled"));
          }
          let raw = driver.read_input(&target)?;
          self.supply_input(&target, &raw)?;
        }
        StepOutcome::Running => {}
      }
      if self.steps % self.yield_interval == 0 {
        driver.yield_now();
      }
    }
  }

  /// Resume a suspended INPUT: store the (numerically coerced) value and
  /// advance past the instruction.
  pub fn supply_input(&mut self, target: &str, raw: &str) -> Result<(), PseudoError> {
    let value = coerce_input(raw);
    let target = target.to_string();
    self.store(&target, value)?;
    self.pc += 1;
    Ok(())
  }

  fn error_here(&self, message: &str) -> PseudoError {
    let context = self
      .instrs
      .get(self.pc)
      .map(|instr| format!("{} (pc {}: {})", message, self.pc, instr))
      .unwrap_or_else(|| message.to_string());
    PseudoError::runtime(context)
  }

  pub fn step(&mut self) -> Result<StepOutcome, PseudoError> {
    if self.pc >= self.instrs.len() {
      return Ok(StepOutcome::Done);
    }
    self.steps += 1;
    if self.steps > STEP_LIMIT {
      return Err(self.error_here("Step limit exceeded"));
    }

    let instr = self.instrs[self.pc].clone();
    self.execute(&instr).map_err(|mut err| {
      if err.line.is_none() {
        err.message = format!("{} (pc {}: {})", err.message, self.pc, instr);
      }
      err
    })
  }

  fn jump(&mut self, label: &str) -> Result<StepOutcome, PseudoError> {
    match self.labels.get(label) {
      Some(index) => {
        self.pc = *index;
        Ok(StepOutcome::Running)
      }
      None => Err(PseudoError::runtime(format!("Unknown label '{}'", label))),
    }
  }

  fn execute(&mut self, instr: &Instr) -> Result<StepOutcome, PseudoError> {
    match instr {
      Instr::Label(_) => {}

      Instr::Assign { target, value } => {
        let value = self.resolve(value)?;
        self.store(target, value)?;
      }

      Instr::Binary {
        target,
        left,
        op,
        right,
      } => {
        let left = self.resolve(left)?;
        let right = self.resolve(right)?;
        let value = binary_op(&left, *op, &right)?;
        self.store(target, value)?;
      }

      Instr::Builtin { target, name, args } => {
        let mut values = Vec::new();
        for arg in args {
          values.push(self.resolve(arg)?);
        }
        let value = call_builtin(name, values, self)?;
        self.store(target, value)?;
      }

      Instr::DeclareArray { name, dims } => {
        let array = Value::Array(ArrayValue::new(dims.clone()));
        match self.scopes.last_mut() {
          Some(frame) => {
            frame.locals.insert(name.clone(), array);
          }
          None => {
            self.globals.insert(name.clone(), array);
          }
        }
      }

      Instr::DeclareLocal { name } => {
        if let Some(frame) = self.scopes.last_mut() {
          frame.locals.insert(name.clone(), Value::Int(0));
        }
      }

      Instr::Output { value } => {
        let line = self.resolve(value)?.to_string();
        self.output.push(line);
      }

      Instr::OutputPart { value } => {
        let part = self.resolve(value)?.to_string();
        self.output_parts.push(part);
      }

      Instr::OutputEnd => {
        let line = self.output_parts.join("");
        self.output_parts.clear();
        self.output.push(line);
      }

      Instr::Input { target } => {
        match self.inputs.pop_front() {
          Some(raw) => {
            let value = coerce_input(&raw);
            self.store(target, value)?;
          }
          None => {
            return Ok(StepOutcome::AwaitInput {
              target: target.clone(),
            });
          }
        }
      }

      Instr::Goto { label } => return self.jump(label),

      Instr::IfZero { cond, label } => {
        if !self.resolve(cond)?.is_truthy() {
          return self.jump(label);
        }
      }

      Instr::IfNotZero { cond, label } => {
        if self.resolve(cond)?.is_truthy() {
          return self.jump(label);
        }
      }

      Instr::Push { value } => {
        let value = self.resolve(value)?;
        self.arg_stack.push(value);
      }

      Instr::PushRef { target } => {
        self.ref_stack.push(target.clone());
      }

      Instr::EnterScope => {
        self.scopes.push(Frame::new());
      }

      Instr::ExitScope => {
        if self.scopes.pop().is_none() {
          return Err(PseudoError::runtime("EXIT_SCOPE with no open scope"));
        }
      }

      Instr::PopParam { name } => {
        let value = self
          .arg_stack
          .pop()
          .ok_or_else(|| PseudoError::runtime("Argument stack underflow"))?;
        self.ref_stack.pop();
        let frame = self
          .scopes
          .last_mut()
          .ok_or_else(|| PseudoError::runtime("POP_PARAM outside a scope"))?;
        frame.locals.insert(name.clone(), value);
      }

      Instr::PopByRef { name } => {
        let value = self
          .arg_stack
          .pop()
          .ok_or_else(|| PseudoError::runtime("Argument stack underflow"))?;
        let reference = self
          .ref_stack
          .pop()
          .ok_or_else(|| PseudoError::runtime("Reference stack underflow"))?;
        let frame = self
          .scopes
          .last_mut()
          .ok_or_else(|| PseudoError::runtime("POP_BYREF outside a scope"))?;
        frame.locals.insert(name.clone(), value);
        if reference != NO_REF {
          frame.byref.insert(name.clone(), reference);
        }
      }

      Instr::WritebackByRef { name } => {
        // The frame is removed while writing so the reference resolves in
        // the caller's environment, then restored.
        let frame = self
          .scopes
          .pop()
          .ok_or_else(|| PseudoError::runtime("WRITEBACK_BYREF outside a scope"))?;
        let result = match (frame.byref.get(name), frame.locals.get(name)) {
          (Some(reference), Some(value)) => {
            let value = value.clone();
            let reference = reference.clone();
            self.store(&reference, value)
          }
          _ => Ok(()),
        };
        self.scopes.push(frame);
        result?;
      }

      Instr::Call { label } => {
        self.call_stack.push(self.pc + 1);
        return self.jump(label);
      }

      Instr::SetReturn { value } => {
        self.ret_val = self.resolve(value)?;
      }

      Instr::Ret => {
        let target = self
          .call_stack
          .pop()
          .ok_or_else(|| PseudoError::runtime("RET with empty call stack"))?;
        self.pc = target;
        return Ok(StepOutcome::Running);
      }

      Instr::OpenFile { name, mode } => {
        let file_name = self.resolve(name)?.to_string();
        self.files.open(&file_name, *mode);
      }

      Instr::ReadFile { name, target } => {
        let file_name = self.resolve(name)?.to_string();
        let line = self.files.read(&file_name)?;
        self.store(target, Value::Str(line))?;
      }

      Instr::WriteFile { name, value } => {
        let file_name = self.resolve(name)?.to_string();
        let line = self.resolve(value)?.to_string();
        self.files.write(&file_name, line)?;
      }

      Instr::CloseFile { name } => {
        let file_name = self.resolve(name)?.to_string();
        self.files.close(&file_name);
      }
    }

    self.pc += 1;
    Ok(StepOutcome::Running)
  }

  /// The single operand-resolution rule: quoted string literal, number,
  /// `name[i,j]` element, `name.field`, `RETVAL`, else a variable looked
  /// up through the current frame and then the globals.
  fn resolve(&self, operand: &str) -> Result<Value, PseudoError> {
    if operand == "RETVAL" {
      return Ok(self.ret_val.clone());
    }

    if let Some(rest) = operand.strip_prefix('"') {
      let contents = rest.strip_suffix('"').unwrap_or(rest);
      return Ok(Value::Str(contents.to_string()));
    }

    if let Ok(n) = operand.parse::<i64>() {
      return Ok(Value::Int(n));
    }
    if let Ok(r) = operand.parse::<f64>() {
      return Ok(Value::Real(r));
    }

    if let Some((name, index_operands)) = split_element(operand) {
      let indices = self.resolve_indices(&index_operands)?;
      let value = self.lookup(name)?;
      return match value {
        Value::Array(array) => array.get(&indices).cloned().ok_or_else(|| {
          PseudoError::runtime(format!("Array index out of bounds: {}", operand))
        }),
        other => Err(PseudoError::runtime(format!(
          "'{}' is {} and cannot be indexed",
          name,
          other.type_name()
        ))),
      };
    }

    if let Some((name, field)) = operand.split_once('.') {
      let value = self.lookup(name)?;
      return match value {
        Value::Record(fields) => fields.get(field).cloned().ok_or_else(|| {
          PseudoError::runtime(format!("Record '{}' has no field '{}'", name, field))
        }),
        other => Err(PseudoError::runtime(format!(
          "'{}' is {} and has no fields",
          name,
          other.type_name()
        ))),
      };
    }

    Ok(self.lookup(operand)?.clone())
  }

  fn lookup(&self, name: &str) -> Result<&Value, PseudoError> {
    if let Some(frame) = self.scopes.last() {
      if let Some(value) = frame.locals.get(name) {
        return Ok(value);
      }
    }
    self
      .globals
      .get(name)
      .ok_or_else(|| PseudoError::runtime(format!("Undefined variable '{}'", name)))
  }

  fn resolve_indices(&self, operands: &[String]) -> Result<Vec<i64>, PseudoError> {
    operands
      .iter()
      .map(|operand| {
        let value = self.resolve(operand)?;
        match value {
          Value::Int(n) => Ok(n),
          Value::Real(r) if r.fract() == 0.0 => Ok(r as i64),
          other => Err(PseudoError::runtime(format!(
            "Array index must be an integer, got {}",
            other.type_name()
          ))),
        }
      })
      .collect()
  }

  /// Stores mirror the resolve rules structurally.
  fn store(&mut self, target: &str, value: Value) -> Result<(), PseudoError> {
    if let Some((name, index_operands)) = split_element(target) {
      let indices = self.resolve_indices(&index_operands)?;
      let name = name.to_string();
      return self.store_element(&name, &indices, value);
    }

    if let Some((name, field)) = target.split_once('.') {
      let name = name.to_string();
      let field = field.to_string();
      return self.store_field(&name, &field, value);
    }

    self.store_plain(target, value);
    Ok(())
  }

  /// Plain-name placement: an existing frame local wins, then a fresh
  /// frame local unless the name is already a global, else the global map.
  fn store_plain(&mut self, name: &str, value: Value) {
    if let Some(frame) = self.scopes.last_mut() {
      if frame.locals.contains_key(name) {
        frame.locals.insert(name.to_string(), value);
        return;
      }
      if !self.globals.contains_key(name) {
        frame.locals.insert(name.to_string(), value);
        return;
      }
    }
    self.globals.insert(name.to_string(), value);
  }

  fn store_element(
    &mut self,
    name: &str,
    indices: &[i64],
    value: Value,
  ) -> Result<(), PseudoError> {
    if let Some(frame) = self.scopes.last_mut() {
      if let Some(slot) = frame.locals.get_mut(name) {
        return set_array_slot(slot, name, indices, value);
      }
    }
    match self.globals.get_mut(name) {
      Some(slot) => set_array_slot(slot, name, indices, value),
      None => Err(PseudoError::runtime(format!(
        "Undefined array '{}'",
        name
      ))),
    }
  }

  fn store_field(&mut self, name: &str, field: &str, value: Value) -> Result<(), PseudoError> {
    if let Some(frame) = self.scopes.last_mut() {
      if let Some(slot) = frame.locals.get_mut(name) {
        set_record_field(slot, field, value);
        return Ok(());
      }
    }
    if let Some(slot) = self.globals.get_mut(name) {
      set_record_field(slot, field, value);
      return Ok(());
    }
    let mut fields = IndexMap::new();
    fields.insert(field.to_string(), value);
    self.store_plain(name, Value::Record(fields));
    Ok(())
  }
}

/// `name[i]` / `name[i,j]` composites; index operands are split on commas
/// (they are temporaries or literals, never nested composites).
fn split_element(operand: &str) -> Option<(&str, Vec<String>)> {
  let open = operand.find('[')?;
  let close = operand.rfind(']')?;
  if close != operand.len() - 1 || open == 0 {
    return None;
  }
  let name = &operand[..open];
  let indices = operand[open + 1..close]
    .split(',')
    .map(|part| part.trim().to_string())
    .collect();
  Some((name, indices))
}

fn set_array_slot(
  slot: &mut Value,
  name: &str,
  indices: &[i64],
  value: Value,
) -> Result<(), PseudoError> {
  match slot {
    Value::Array(array) => {
      if array.set(indices, value) {
        Ok(())
      } else {
        Err(PseudoError::runtime(format!(
          "Array index out of bounds: {}[{}]",
          name,
          indices
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(",")
        )))
      }
    }
    other => Err(PseudoError::runtime(format!(
      "'{}' is {} and cannot be indexed",
      name,
      other.type_name()
    ))),
  }
}

/// Storing through `name.field` turns a non-record slot (such as the
/// `LOCAL` placeholder) into a fresh record.
fn set_record_field(slot: &mut Value, field: &str, value: Value) {
  if let Value::Record(fields) = slot {
    fields.insert(field.to_string(), value);
    return;
  }
  let mut fields = IndexMap::new();
  fields.insert(field.to_string(), value);
  *slot = Value::Record(fields);
}

/// INPUT coercion: a string that parses as a number is stored as one.
fn coerce_input(raw: &str) -> Value {
  let trimmed = raw.trim();
  if let Ok(n) = trimmed.parse::<i64>() {
    return Value::Int(n);
  }
  if let Ok(r) = trimmed.parse::<f64>() {
    return Value::Real(r);
  }
  Value::Str(raw.to_string())
}

fn numeric_pair(left: &Value, right: &Value) -> Option<(f64, f64)> {
  Some((left.as_number()?, right.as_number()?))
}

fn both_int(left: &Value, right: &Value) -> bool {
  matches!((left, right), (Value::Int(_), Value::Int(_)))
}

fn bool_value(b: bool) -> Value {
  Value::Int(if b { 1 } else { 0 })
}

fn arithmetic_error(op: IrOp, left: &Value, right: &Value) -> PseudoError {
  PseudoError::runtime(format!(
    "Cannot apply {} to {} and {}",
    op,
    left.type_name(),
    right.type_name()
  ))
}

pub fn binary_op(left: &Value, op: IrOp, right: &Value) -> Result<Value, PseudoError> {
  match op {
    // + concatenates as soon as either side is a string.
    IrOp::Add => {
      if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
        return Ok(Value::Str(format!("{}{}", left, right)));
      }
      match (left, right) {
        (Value::Int(a), Value::Int(b)) => match a.checked_add(*b) {
          Some(sum) => Ok(Value::Int(sum)),
          None => Ok(Value::Real(*a as f64 + *b as f64)),
        },
        _ => {
          let (a, b) = numeric_pair(left, right)
            .ok_or_else(|| arithmetic_error(op, left, right))?;
          Ok(Value::Real(a + b))
        }
      }
    }

    IrOp::Concat => Ok(Value::Str(format!("{}{}", left, right))),

    IrOp::Sub => match (left, right) {
      (Value::Int(a), Value::Int(b)) => match a.checked_sub(*b) {
        Some(diff) => Ok(Value::Int(diff)),
        None => Ok(Value::Real(*a as f64 - *b as f64)),
      },
      _ => {
        let (a, b) = numeric_pair(left, right)
          .ok_or_else(|| arithmetic_error(op, left, right))?;
        Ok(Value::Real(a - b))
      }
    },

    IrOp::Mul => match (left, right) {
      (Value::Int(a), Value::Int(b)) => match a.checked_mul(*b) {
        Some(product) => Ok(Value::Int(product)),
        None => Ok(Value::Real(*a as f64 * *b as f64)),
      },
      _ => {
        let (a, b) = numeric_pair(left, right)
          .ok_or_else(|| arithmetic_error(op, left, right))?;
        Ok(Value::Real(a * b))
      }
    },

    IrOp::Div => {
      let (a, b) =
        numeric_pair(left, right).ok_or_else(|| arithmetic_error(op, left, right))?;
      if b == 0.0 {
        return Err(PseudoError::runtime("Division by zero"));
      }
      Ok(Value::Real(a / b))
    }

    IrOp::IntDiv => {
      let (a, b) =
        numeric_pair(left, right).ok_or_else(|| arithmetic_error(op, left, right))?;
      if b == 0.0 {
        return Err(PseudoError::runtime("Division by zero"));
      }
      Ok(Value::Int((a / b).trunc() as i64))
    }

    // Remainder: the result takes the sign of the dividend.
    IrOp::Mod => {
      let (a, b) =
        numeric_pair(left, right).ok_or_else(|| arithmetic_error(op, left, right))?;
      if b == 0.0 {
        return Err(PseudoError::runtime("Division by zero"));
      }
      let result = a % b;
      if both_int(left, right) {
        Ok(Value::Int(result as i64))
      } else {
        Ok(Value::Real(result))
      }
    }

    IrOp::Pow => {
      let (a, b) =
        numeric_pair(left, right).ok_or_else(|| arithmetic_error(op, left, right))?;
      let result = a.powf(b);
      if both_int(left, right) && result.fract() == 0.0 && result.abs() < i64::MAX as f64 {
        Ok(Value::Int(result as i64))
      } else {
        Ok(Value::Real(result))
      }
    }

    IrOp::Eq | IrOp::NotEq => {
      let equal = match numeric_pair(left, right) {
        Some((a, b)) => a == b,
        None => left.to_string() == right.to_string(),
      };
      Ok(bool_value(if op == IrOp::Eq { equal } else { !equal }))
    }

    IrOp::Lt | IrOp::Gt | IrOp::LtEq | IrOp::GtEq => {
      let ordering = match numeric_pair(left, right) {
        Some((a, b)) => a.partial_cmp(&b),
        None => Some(left.to_string().cmp(&right.to_string())),
      };
      let ordering =
        ordering.ok_or_else(|| PseudoError::runtime("Values cannot be compared"))?;
      let result = match op {
        IrOp::Lt => ordering.is_lt(),
        IrOp::Gt => ordering.is_gt(),
        IrOp::LtEq => ordering.is_le(),
        IrOp::GtEq => ordering.is_ge(),
        _ => unreachable!(),
      };
      Ok(bool_value(result))
    }

    IrOp::And => Ok(bool_value(left.is_truthy() && right.is_truthy())),
    IrOp::Or => Ok(bool_value(left.is_truthy() || right.is_truthy())),
  }
}
