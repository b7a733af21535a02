use indexmap::IndexMap;
use std::fmt;

/// Dynamic runtime value. Booleans cross the IR boundary as 0/1, so the
/// VM only ever sees numbers, strings, records and arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Int(i64),
  Real(f64),
  Str(String),
  Record(IndexMap<String, Value>),
  Array(ArrayValue),
}

impl Value {
  pub fn is_truthy(&self) -> bool {
    match self {
      Value::Int(0) => false,
      Value::Real(r) if *r == 0.0 => false,
      _ => true,
    }
  }

  pub fn as_number(&self) -> Option<f64> {
    match self {
      Value::Int(n) => Some(*n as f64),
      Value::Real(r) => Some(*r),
      _ => None,
    }
  }

  pub fn type_name(&self) -> &'static str {
    match self {
      Value::Int(_) => "integer",
      Value::Real(_) => "real",
      Value::Str(_) => "string",
      Value::Record(_) => "record",
      Value::Array(_) => "array",
    }
  }

}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Value::Int(n) => write!(f, "{}", n),
      Value::Real(r) => {
        if r.fract() == 0.0 && r.is_finite() && r.abs() < 1e15 {
          write!(f, "{}", *r as i64)
        } else {
          write!(f, "{}", r)
        }
      }
      Value::Str(s) => write!(f, "{}", s),
      Value::Record(fields) => {
        write!(f, "{{")?;
        for (i, (name, value)) in fields.iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
      }
      Value::Array(array) => {
        write!(f, "[")?;
        for (i, value) in array.data.iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{}", value)?;
        }
        write!(f, "]")
      }
    }
  }
}

/// Dense storage over declared inclusive bounds, 1- or 2-dimensional.
/// Allocation zero-fills every in-range slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
  pub dims: Vec<(i64, i64)>,
  pub data: Vec<Value>,
}

impl ArrayValue {
  pub fn new(dims: Vec<(i64, i64)>) -> Self {
    let size = dims
      .iter()
      .map(|(start, end)| (end - start + 1).max(0) as usize)
      .product();
    Self {
      dims,
      data: vec![Value::Int(0); size],
    }
  }

  fn offset(&self, indices: &[i64]) -> Option<usize> {
    if indices.len() != self.dims.len() {
      return None;
    }
    let mut offset = 0usize;
    for (index, (start, end)) in indices.iter().zip(self.dims.iter()) {
      if index < start || index > end {
        return None;
      }
      let width = (end - start + 1) as usize;
      offset = offset * width + (index - start) as usize;
    }
    Some(offset)
  }

  pub fn get(&self, indices: &[i64]) -> Option<&Value> {
    self.offset(indices).map(|i| &self.data[i])
  }

  pub fn set(&mut self, indices: &[i64], value: Value) -> bool {
    match self.offset(indices) {
      Some(i) => {
        self.data[i] = value;
        true
      }
      None => false,
    }
  }
}
