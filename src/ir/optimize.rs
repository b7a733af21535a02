use super::{Instr, IrOp};
use std::collections::HashSet;

#[derive(Debug, Default, Clone, Copy)]
pub struct OptimizeStats {
  pub folded: usize,
  pub removed: usize,
}

/// Runs both peepholes over the linear IR: constant folding, then dead
/// temporary elimination. Purely syntactic; side-effecting instructions
/// (stores to named variables, CALL, I/O, file ops) are never touched.
pub fn optimize(instrs: Vec<Instr>) -> (Vec<Instr>, OptimizeStats) {
  let mut stats = OptimizeStats::default();
  let folded = fold_constants(instrs, &mut stats);
  let live = eliminate_dead_temps(folded, &mut stats);
  (live, stats)
}

fn parse_number(operand: &str) -> Option<f64> {
  operand.parse::<f64>().ok()
}

fn render_number(value: f64) -> String {
  if value.fract() == 0.0 && value.is_finite() {
    format!("{}", value as i64)
  } else {
    value.to_string()
  }
}

/// `t = a OP b` with two numeric operands becomes `t = <computed>`.
/// DIV truncates toward zero; MOD keeps the sign of the dividend.
fn fold_constants(instrs: Vec<Instr>, stats: &mut OptimizeStats) -> Vec<Instr> {
  instrs
    .into_iter()
    .map(|instr| {
      if let Instr::Binary {
        target,
        left,
        op,
        right,
      } = &instr
      {
        if let (Some(a), Some(b)) = (parse_number(left), parse_number(right)) {
          let computed = match op {
            IrOp::Add => Some(a + b),
            IrOp::Sub => Some(a - b),
            IrOp::Mul => Some(a * b),
            IrOp::Div if b != 0.0 => Some(a / b),
            IrOp::Pow => Some(a.powf(b)),
            IrOp::IntDiv if b != 0.0 => Some((a / b).trunc()),
            IrOp::Mod if b != 0.0 => Some(a % b),
            _ => None,
          };
          if let Some(value) = computed {
            stats.folded += 1;
            return Instr::Assign {
              target: target.clone(),
              value: render_number(value),
            };
          }
        }
      }
      instr
    })
    .collect()
}

fn is_temp(operand: &str) -> bool {
  let mut chars = operand.chars();
  chars.next() == Some('T') && {
    let rest = chars.as_str();
    !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())
  }
}

/// Collects every temporary read anywhere in an operand, including index
/// operands inside `name[...]` composites.
fn collect_temps(operand: &str, used: &mut HashSet<String>) {
  if is_temp(operand) {
    used.insert(operand.to_string());
    return;
  }
  if let (Some(open), Some(close)) = (operand.find('['), operand.rfind(']')) {
    for part in operand[open + 1..close].split(',') {
      if is_temp(part) {
        used.insert(part.to_string());
      }
    }
  }
}

/// A store target is not itself a read, but temporaries inside its index
/// brackets are.
fn collect_target_temps(target: &str, used: &mut HashSet<String>) {
  if !is_temp(target) {
    collect_temps(target, used);
  }
}

/// Drops instructions whose target is a temporary no other instruction
/// reads. Labels and stores to named variables are never removed.
fn eliminate_dead_temps(instrs: Vec<Instr>, stats: &mut OptimizeStats) -> Vec<Instr> {
  let mut used = HashSet::new();

  for instr in &instrs {
    match instr {
      Instr::Assign { target, value } => {
        collect_target_temps(target, &mut used);
        collect_temps(value, &mut used);
      }
      Instr::Binary {
        target,
        left,
        right,
        ..
      } => {
        collect_target_temps(target, &mut used);
        collect_temps(left, &mut used);
        collect_temps(right, &mut used);
      }
      Instr::Builtin { target, args, .. } => {
        collect_target_temps(target, &mut used);
        for arg in args {
          collect_temps(arg, &mut used);
        }
      }
      Instr::Output { value }
      | Instr::OutputPart { value }
      | Instr::Push { value }
      | Instr::SetReturn { value } => collect_temps(value, &mut used),
      Instr::Input { target } => collect_target_temps(target, &mut used),
      Instr::IfZero { cond, .. } | Instr::IfNotZero { cond, .. } => collect_temps(cond, &mut used),
      Instr::PushRef { target } => collect_temps(target, &mut used),
      Instr::OpenFile { name, .. } | Instr::CloseFile { name } => collect_temps(name, &mut used),
      Instr::ReadFile { name, target } => {
        collect_temps(name, &mut used);
        collect_target_temps(target, &mut used);
      }
      Instr::WriteFile { name, value } => {
        collect_temps(name, &mut used);
        collect_temps(value, &mut used);
      }
      _ => {}
    }
  }

  instrs
    .into_iter()
    .filter(|instr| {
      let target = match instr {
        Instr::Assign { target, .. } => target,
        Instr::Binary { target, .. } => target,
        Instr::Builtin { target, .. } => target,
        _ => return true,
      };
      if is_temp(target) && !used.contains(target) {
        stats.removed += 1;
        false
      } else {
        true
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn binary(target: &str, left: &str, op: IrOp, right: &str) -> Instr {
    Instr::Binary {
      target: target.to_string(),
      left: left.to_string(),
      op,
      right: right.to_string(),
    }
  }

  #[test]
  fn folds_numeric_binary() {
    let (out, stats) = optimize(vec![
      binary("T0", "3", IrOp::Mul, "4"),
      Instr::Output {
        value: "T0".to_string(),
      },
    ]);

    assert_eq!(stats.folded, 1);
    assert_eq!(
      out[0],
      Instr::Assign {
        target: "T0".to_string(),
        value: "12".to_string(),
      }
    );
  }

  #[test]
  fn int_div_truncates_toward_zero() {
    let (out, _) = optimize(vec![
      binary("T0", "-7", IrOp::IntDiv, "2"),
      Instr::Output {
        value: "T0".to_string(),
      },
    ]);
    assert_eq!(
      out[0],
      Instr::Assign {
        target: "T0".to_string(),
        value: "-3".to_string(),
      }
    );
  }

  #[test]
  fn mod_keeps_dividend_sign() {
    let (out, _) = optimize(vec![
      binary("T0", "-7", IrOp::Mod, "3"),
      Instr::Output {
        value: "T0".to_string(),
      },
    ]);
    assert_eq!(
      out[0],
      Instr::Assign {
        target: "T0".to_string(),
        value: "-1".to_string(),
      }
    );
  }

  #[test]
  fn drops_unreferenced_temporaries() {
    let (out, stats) = optimize(vec![
      binary("T0", "1", IrOp::Add, "2"),
      Instr::Assign {
        target: "X".to_string(),
        value: "5".to_string(),
      },
    ]);

    assert_eq!(stats.removed, 1);
    assert_eq!(out.len(), 1);
    assert_eq!(
      out[0],
      Instr::Assign {
        target: "X".to_string(),
        value: "5".to_string(),
      }
    );
  }

  #[test]
  fn keeps_temps_used_as_indices() {
    let input = vec![
      binary("T0", "I", IrOp::Add, "1"),
      Instr::Assign {
        target: "A[T0]".to_string(),
        value: "9".to_string(),
      },
    ];
    let (out, stats) = optimize(input.clone());

    assert_eq!(stats.removed, 0);
    assert_eq!(out, input);
  }

  #[test]
  fn division_by_zero_is_not_folded() {
    let input = vec![
      binary("T0", "1", IrOp::Div, "0"),
      Instr::Output {
        value: "T0".to_string(),
      },
    ];
    let (out, stats) = optimize(input.clone());

    assert_eq!(stats.folded, 0);
    assert_eq!(out, input);
  }
}
