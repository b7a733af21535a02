use pseudo_lang::compiler::{run, RunOptions};
use pseudo_lang::error::{PseudoError, Stage};
use pseudo_lang::ir::{Instr, IrOp};
use pseudo_lang::vm::value::Value;
use pseudo_lang::vm::{Driver, StepOutcome, Vm};
use std::collections::VecDeque;

fn run_source(source: &str) -> Vec<String> {
  run(source, &RunOptions::new()).expect("run should succeed").output
}

fn run_source_with_inputs(source: &str, inputs: &[&str]) -> Vec<String> {
  let options = RunOptions {
    inputs: inputs.iter().map(|s| s.to_string()).collect(),
    ..RunOptions::new()
  };
  run(source, &options).expect("run should succeed").output
}

fn run_err(source: &str) -> PseudoError {
  let err = run(source, &RunOptions::new()).unwrap_err();
  assert_eq!(err.stage, Stage::Runtime);
  err
}

fn binary(target: &str, left: &str, op: IrOp, right: &str) -> Instr {
  Instr::Binary {
    target: target.to_string(),
    left: left.to_string(),
    op,
    right: right.to_string(),
  }
}

#[test]
fn real_division_always_divides() {
  assert_eq!(run_source("OUTPUT 10 / 4"), vec!["2.5"]);
  assert_eq!(run_source("OUTPUT 10 / 2"), vec!["5"]);
}

#[test]
fn div_truncates_and_mod_follows_the_dividend() {
  assert_eq!(run_source("OUTPUT -7 DIV 2"), vec!["-3"]);
  assert_eq!(run_source("OUTPUT 7 DIV 2"), vec!["3"]);
  assert_eq!(run_source("OUTPUT -7 MOD 3"), vec!["-1"]);
  assert_eq!(run_source("OUTPUT 7 MOD 3"), vec!["1"]);
}

#[test]
fn power_of_integers_stays_integral() {
  assert_eq!(run_source("OUTPUT 2 ^ 10"), vec!["1024"]);
}

#[test]
fn ampersand_concatenates_any_operands() {
  assert_eq!(run_source("OUTPUT \"n=\" & 12"), vec!["n=12"]);
}

#[test]
fn string_builtins_match_their_signatures() {
  assert_eq!(run_source("OUTPUT MID(\"ABCDEF\", 2, 3)"), vec!["BCD"]);
  assert_eq!(run_source("OUTPUT LEFT(\"ABCDEF\", 2)"), vec!["AB"]);
  assert_eq!(run_source("OUTPUT RIGHT(\"ABCDEF\", 2)"), vec!["EF"]);
  assert_eq!(run_source("OUTPUT LENGTH(\"ABCDEF\")"), vec!["6"]);
  assert_eq!(run_source("OUTPUT UCASE(\"aBc\")"), vec!["ABC"]);
  assert_eq!(run_source("OUTPUT LCASE(\"aBc\")"), vec!["abc"]);
  assert_eq!(run_source("OUTPUT CHR(65)"), vec!["A"]);
  assert_eq!(run_source("OUTPUT ASC(\"A\")"), vec!["65"]);
  assert_eq!(run_source("OUTPUT INT(3.9)"), vec!["3"]);
  assert_eq!(run_source("OUTPUT INT(-3.9)"), vec!["-3"]);
}

#[test]
fn str_to_num_fails_on_non_numeric_input() {
  let err = run_err("OUTPUT STR_TO_NUM(\"abc\")");
  assert!(err.message.contains("not numeric"));
}

#[test]
fn rand_is_deterministic_under_a_seed() {
  let source = "DECLARE X : INTEGER\nX <- RAND(100)\nOUTPUT X";
  let options = RunOptions {
    seed: Some(42),
    ..RunOptions::new()
  };

  let first = run(source, &options).unwrap().output;
  let second = run(source, &options).unwrap().output;
  assert_eq!(first, second);

  let value: i64 = first[0].parse().unwrap();
  assert!((0..=100).contains(&value));
}

#[test]
fn input_values_are_numerically_coerced() {
  let output = run_source_with_inputs(
    "DECLARE X : INTEGER\nINPUT X\nOUTPUT X + 1",
    &["41"],
  );
  assert_eq!(output, vec!["42"]);
}

#[test]
fn division_by_zero_is_a_runtime_error() {
  let err = run_err("OUTPUT 1 / 0");
  assert!(err.message.contains("Division by zero"));
}

#[test]
fn runtime_errors_carry_the_failing_instruction() {
  let err = run_err("OUTPUT 1 / 0");
  assert!(err.message.contains("pc"));
}

#[test]
fn array_access_is_bounds_checked() {
  let err = run_err(
    "DECLARE A : ARRAY[1:3] OF INTEGER\nDECLARE I : INTEGER\nI <- 5\nA[I] <- 1",
  );
  assert!(err.message.contains("out of bounds"));
}

#[test]
fn arrays_are_zero_filled() {
  let output = run_source_with_inputs(
    "DECLARE A : ARRAY[1:3] OF INTEGER\nDECLARE I : INTEGER\nINPUT A[2]\nFOR I <- 1 TO 3\nOUTPUT A[I]\nNEXT I",
    &["9"],
  );
  assert_eq!(output, vec!["0", "9", "0"]);
}

#[test]
fn two_dimensional_arrays_store_by_row_and_column() {
  let output = run_source(
    "DECLARE G : ARRAY[1:2,1:3] OF INTEGER\nG[1,2] <- 7\nG[2,3] <- 9\nOUTPUT G[1,2]\nOUTPUT G[2,3]\nOUTPUT G[2,2]",
  );
  assert_eq!(output, vec!["7", "9", "0"]);
}

#[test]
fn byref_writes_back_through_array_elements() {
  let output = run_source(
    "DECLARE Arr : ARRAY[1:3] OF INTEGER\nArr[2] <- 5\nPROCEDURE Bump(BYREF N : INTEGER)\nN <- N + 10\nENDPROCEDURE\nCALL Bump(Arr[2])\nOUTPUT Arr[2]",
  );
  assert_eq!(output, vec!["15"]);
}

#[test]
fn byref_writes_back_through_record_fields() {
  let output = run_source(
    "TYPE Point\nDECLARE X : INTEGER\nENDTYPE\nDECLARE P : Point\nP.X <- 1\nPROCEDURE Bump(BYREF N : INTEGER)\nN <- N + 10\nENDPROCEDURE\nCALL Bump(P.X)\nOUTPUT P.X",
  );
  assert_eq!(output, vec!["11"]);
}

#[test]
fn byval_arguments_do_not_write_back() {
  let output = run_source(
    "DECLARE X : INTEGER\nX <- 1\nPROCEDURE P(N : INTEGER)\nN <- 99\nENDPROCEDURE\nCALL P(X)\nOUTPUT X",
  );
  assert_eq!(output, vec!["1"]);
}

#[test]
fn recursion_supports_nested_frames() {
  let output = run_source(
    "FUNCTION Fact(N : INTEGER) RETURNS INTEGER\nIF N <= 1 THEN\nRETURN 1\nENDIF\nRETURN N * Fact(N - 1)\nENDFUNCTION\nOUTPUT Fact(5)",
  );
  assert_eq!(output, vec!["120"]);
}

#[test]
fn file_write_requires_an_open_mode() {
  let err = run_err("WRITEFILE \"d.txt\", \"x\"");
  assert!(err.message.contains("not open"));
}

#[test]
fn file_read_past_eof_fails() {
  let err = run_err(
    "DECLARE L : STRING\nOPENFILE \"d.txt\" FOR READ\nREADFILE \"d.txt\", L",
  );
  assert!(err.message.contains("end of file"));
}

#[test]
fn eof_is_true_for_unknown_files() {
  let output = run_source("IF EOF(\"nope\") THEN\nOUTPUT \"eof\"\nENDIF");
  assert_eq!(output, vec!["eof"]);
}

#[test]
fn opening_for_write_truncates() {
  let result = run(
    "OPENFILE \"d.txt\" FOR WRITE\nWRITEFILE \"d.txt\", \"a\"\nCLOSEFILE \"d.txt\"\nOPENFILE \"d.txt\" FOR WRITE\nWRITEFILE \"d.txt\", \"b\"\nCLOSEFILE \"d.txt\"",
    &RunOptions::new(),
  )
  .unwrap();
  assert_eq!(result.files["d.txt"].lines, vec!["b"]);
}

#[test]
fn opening_for_append_preserves_content() {
  let result = run(
    "OPENFILE \"d.txt\" FOR WRITE\nWRITEFILE \"d.txt\", \"a\"\nCLOSEFILE \"d.txt\"\nOPENFILE \"d.txt\" FOR APPEND\nWRITEFILE \"d.txt\", \"b\"\nCLOSEFILE \"d.txt\"",
    &RunOptions::new(),
  )
  .unwrap();
  assert_eq!(result.files["d.txt"].lines, vec!["a", "b"]);
}

#[test]
fn preloaded_files_are_readable() {
  let mut options = RunOptions::new();
  options.files.insert(
    "in.txt".to_string(),
    vec!["alpha".to_string(), "beta".to_string()],
  );
  let result = run(
    "DECLARE L : STRING\nOPENFILE \"in.txt\" FOR READ\nWHILE NOT EOF(\"in.txt\") DO\nREADFILE \"in.txt\", L\nOUTPUT L\nENDWHILE\nCLOSEFILE \"in.txt\"",
    &options,
  )
  .unwrap();
  assert_eq!(result.output, vec!["alpha", "beta"]);
}

#[test]
fn globals_keep_final_values_without_temporaries() {
  let result = run("DECLARE X : INTEGER\nX <- 1 + 2", &RunOptions::new()).unwrap();

  assert_eq!(result.globals["X"], Value::Int(3));
  assert!(result.globals.keys().all(|name| !name.starts_with('T')));
}

// Direct-IR tests exercise VM semantics the checked language cannot
// produce, plus the suspension machinery.

#[test]
fn plus_concatenates_when_either_operand_is_a_string() {
  let instrs = vec![
    binary("T0", "\"n=\"", IrOp::Add, "1"),
    Instr::Output {
      value: "T0".to_string(),
    },
  ];
  let mut vm = Vm::new(instrs).unwrap();
  vm.run().unwrap();
  assert_eq!(vm.output, vec!["n=1"]);
}

#[test]
fn comparisons_yield_zero_or_one() {
  let instrs = vec![
    binary("T0", "2", IrOp::Lt, "3"),
    binary("T1", "\"b\"", IrOp::Lt, "\"a\""),
    Instr::Output {
      value: "T0".to_string(),
    },
    Instr::Output {
      value: "T1".to_string(),
    },
  ];
  let mut vm = Vm::new(instrs).unwrap();
  vm.run().unwrap();
  assert_eq!(vm.output, vec!["1", "0"]);
}

#[test]
fn input_suspends_until_a_value_is_supplied() {
  let instrs = vec![
    Instr::Input {
      target: "X".to_string(),
    },
    Instr::Output {
      value: "X".to_string(),
    },
  ];
  let mut vm = Vm::new(instrs).unwrap();

  match vm.step().unwrap() {
    StepOutcome::AwaitInput { target } => assert_eq!(target, "X"),
    other => panic!("expected suspension, found {:?}", other),
  }

  vm.supply_input("X", "7").unwrap();
  vm.run().unwrap();
  assert_eq!(vm.output, vec!["7"]);
}

#[test]
fn batch_mode_fails_when_the_input_queue_is_exhausted() {
  let instrs = vec![Instr::Input {
    target: "X".to_string(),
  }];
  let mut vm = Vm::new(instrs).unwrap();
  let err = vm.run().unwrap_err();
  assert!(err.message.contains("No input available"));
}

struct ScriptedDriver {
  inputs: VecDeque<String>,
  outputs: Vec<String>,
  yields: usize,
}

impl ScriptedDriver {
  fn new(inputs: &[&str]) -> Self {
    Self {
      inputs: inputs.iter().map(|s| s.to_string()).collect(),
      outputs: Vec::new(),
      yields: 0,
    }
  }
}

impl Driver for ScriptedDriver {
  fn read_input(&mut self, _target: &str) -> Result<String, PseudoError> {
    self
      .inputs
      .pop_front()
      .ok_or_else(|| PseudoError::runtime("script exhausted"))
  }

  fn write_output(&mut self, line: &str) {
    self.outputs.push(line.to_string());
  }

  fn yield_now(&mut self) {
    self.yields += 1;
  }
}

fn compile_ir(source: &str) -> Vec<Instr> {
  pseudo_lang::compiler::compile(source, &Default::default())
    .expect("compile should succeed")
    .ir
}

#[test]
fn driver_mode_reads_input_and_receives_output() {
  let ir = compile_ir("DECLARE X : INTEGER\nINPUT X\nOUTPUT X * 2");
  let mut vm = Vm::new(ir).unwrap();
  let mut driver = ScriptedDriver::new(&["21"]);

  vm.run_with_driver(&mut driver).unwrap();
  assert_eq!(driver.outputs, vec!["42"]);
}

#[test]
fn driver_mode_yields_cooperatively() {
  let ir = compile_ir(
    "DECLARE I : INTEGER\nDECLARE S : INTEGER\nS <- 0\nFOR I <- 1 TO 2000\nS <- S + 1\nNEXT I\nOUTPUT S",
  );
  let mut vm = Vm::new(ir).unwrap();
  vm.set_yield_interval(100);
  let mut driver = ScriptedDriver::new(&[]);

  vm.run_with_driver(&mut driver).unwrap();
  assert_eq!(driver.outputs, vec!["2000"]);
  assert!(driver.yields > 10);
}

#[test]
fn halt_cancels_a_driver_run() {
  let instrs = vec![
    Instr::Label("L0".to_string()),
    Instr::Goto {
      label: "L0".to_string(),
    },
  ];
  let mut vm = Vm::new(instrs).unwrap();
  vm.halt_handle().store(true, std::sync::atomic::Ordering::Relaxed);

  let mut driver = ScriptedDriver::new(&[]);
  let err = vm.run_with_driver(&mut driver).unwrap_err();
  assert!(err.message.contains("cancelled"));
}

#[test]
fn the_step_limit_stops_runaway_programs() {
  let instrs = vec![
    Instr::Label("L0".to_string()),
    Instr::Goto {
      label: "L0".to_string(),
    },
  ];
  let mut vm = Vm::new(instrs).unwrap();
  let err = vm.run().unwrap_err();
  assert!(err.message.contains("Step limit exceeded"));
}

#[test]
fn duplicate_labels_are_rejected_at_load() {
  let instrs = vec![
    Instr::Label("L0".to_string()),
    Instr::Label("L0".to_string()),
  ];
  let err = Vm::new(instrs).unwrap_err();
  assert!(err.message.contains("more than once"));
}

#[test]
fn jumps_to_unknown_labels_fail() {
  let instrs = vec![Instr::Goto {
    label: "L9".to_string(),
  }];
  let mut vm = Vm::new(instrs).unwrap();
  let err = vm.run().unwrap_err();
  assert!(err.message.contains("Unknown label"));
}
