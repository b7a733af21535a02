use super::value::Value;
use super::Vm;
use crate::error::PseudoError;

fn as_string(value: &Value) -> String {
  value.to_string()
}

fn as_number(name: &str, value: &Value) -> Result<f64, PseudoError> {
  value.as_number().ok_or_else(|| {
    PseudoError::runtime(format!("{} expects a number, got {}", name, value.type_name()))
  })
}

fn as_int(name: &str, value: &Value) -> Result<i64, PseudoError> {
  Ok(as_number(name, value)?.trunc() as i64)
}

fn expect_args(name: &str, args: &[Value], arity: usize) -> Result<(), PseudoError> {
  if args.len() != arity {
    return Err(PseudoError::runtime(format!(
      "{} expects {} argument(s), got {}",
      name,
      arity,
      args.len()
    )));
  }
  Ok(())
}

pub fn call_builtin(name: &str, args: Vec<Value>, vm: &mut Vm) -> Result<Value, PseudoError> {
  match name {
    "LENGTH" => {
      expect_args(name, &args, 1)?;
      Ok(Value::Int(as_string(&args[0]).chars().count() as i64))
    }

    "UCASE" | "TO_UPPER" => {
      expect_args(name, &args, 1)?;
      Ok(Value::Str(as_string(&args[0]).to_uppercase()))
    }

    "LCASE" | "TO_LOWER" => {
      expect_args(name, &args, 1)?;
      Ok(Value::Str(as_string(&args[0]).to_lowercase()))
    }

    // MID is 1-based: MID("ABCDEF", 2, 3) is "BCD".
    "MID" => {
      expect_args(name, &args, 3)?;
      let s = as_string(&args[0]);
      let start = as_int(name, &args[1])?;
      let len = as_int(name, &args[2])?;
      if start < 1 {
        return Err(PseudoError::runtime("MID start position must be >= 1"));
      }
      if len < 0 {
        return Err(PseudoError::runtime("MID length must be >= 0"));
      }
      let result: String = s
        .chars()
        .skip((start - 1) as usize)
        .take(len as usize)
        .collect();
      Ok(Value::Str(result))
    }

    "LEFT" => {
      expect_args(name, &args, 2)?;
      let s = as_string(&args[0]);
      let n = as_int(name, &args[1])?.max(0) as usize;
      Ok(Value::Str(s.chars().take(n).collect()))
    }

    "RIGHT" => {
      expect_args(name, &args, 2)?;
      let s = as_string(&args[0]);
      let n = as_int(name, &args[1])?.max(0) as usize;
      let count = s.chars().count();
      Ok(Value::Str(s.chars().skip(count.saturating_sub(n)).collect()))
    }

    "INT" => {
      expect_args(name, &args, 1)?;
      Ok(Value::Int(as_number(name, &args[0])?.trunc() as i64))
    }

    // Uniform in [0, floor(n)] inclusive, from the VM's seedable generator.
    "RAND" => {
      expect_args(name, &args, 1)?;
      let upper = as_number(name, &args[0])?.floor() as i64;
      if upper < 0 {
        return Err(PseudoError::runtime("RAND expects a non-negative bound"));
      }
      let value = (vm.next_rand() % (upper as u64 + 1)) as i64;
      Ok(Value::Int(value))
    }

    "NUM_TO_STR" => {
      expect_args(name, &args, 1)?;
      as_number(name, &args[0])?;
      Ok(Value::Str(as_string(&args[0])))
    }

    "STR_TO_NUM" => {
      expect_args(name, &args, 1)?;
      let s = as_string(&args[0]);
      let parsed: f64 = s.trim().parse().map_err(|_| {
        PseudoError::runtime(format!("STR_TO_NUM: '{}' is not numeric", s))
      })?;
      Ok(Value::Real(parsed))
    }

    "CHR" => {
      expect_args(name, &args, 1)?;
      let code = as_int(name, &args[0])?;
      let ch = u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| PseudoError::runtime(format!("CHR: invalid code point {}", code)))?;
      Ok(Value::Str(ch.to_string()))
    }

    "ASC" => {
      expect_args(name, &args, 1)?;
      let s = as_string(&args[0]);
      let ch = s
        .chars()
        .next()
        .ok_or_else(|| PseudoError::runtime("ASC expects a non-empty string"))?;
      Ok(Value::Int(ch as i64))
    }

    "EOF" => {
      expect_args(name, &args, 1)?;
      let file_name = as_string(&args[0]);
      Ok(Value::Int(if vm.files.eof(&file_name) { 1 } else { 0 }))
    }

    _ => Err(PseudoError::runtime(format!("Unknown builtin '{}'", name))),
  }
}
