use pseudo_lang::compiler::{compile, run, CompileOptions, RunOptions};
use pseudo_lang::error::Stage;
use pseudo_lang::vm::value::Value;

fn run_with_inputs(source: &str, inputs: &[&str]) -> pseudo_lang::compiler::RunResult {
  let options = RunOptions {
    inputs: inputs.iter().map(|s| s.to_string()).collect(),
    ..RunOptions::new()
  };
  run(source, &options).expect("run should succeed")
}

#[test]
fn arithmetic_program_outputs_fourteen() {
  let result = run_with_inputs("DECLARE X : INTEGER\nX <- 2 + 3 * 4\nOUTPUT X", &[]);
  assert_eq!(result.output, vec!["14"]);
}

const SWAP_PROGRAM: &str = "DECLARE A : INTEGER\n\
DECLARE B : INTEGER\n\
A <- 10\n\
B <- 20\n\
PROCEDURE Swap(BYREF X : INTEGER, BYREF Y : INTEGER)\n\
DECLARE T : INTEGER\n\
T <- X\n\
X <- Y\n\
Y <- T\n\
ENDPROCEDURE\n\
OUTPUT \"before A=\", A, \" B=\", B\n\
CALL Swap(A, B)\n\
OUTPUT \"after A=\", A, \" B=\", B";

#[test]
fn swap_via_byref_exchanges_the_caller_variables() {
  let result = run_with_inputs(SWAP_PROGRAM, &[]);

  assert_eq!(result.output.len(), 2);
  assert!(result.output[0].ends_with("A=10 B=20"));
  assert!(result.output[1].ends_with("A=20 B=10"));
  assert_eq!(result.globals["A"], Value::Int(20));
  assert_eq!(result.globals["B"], Value::Int(10));
}

const BUBBLE_SORT: &str = "DECLARE Arr : ARRAY[1:6] OF INTEGER\n\
DECLARE N : INTEGER\n\
DECLARE I : INTEGER\n\
DECLARE J : INTEGER\n\
DECLARE Temp : INTEGER\n\
N <- 6\n\
FOR I <- 1 TO N\n\
INPUT Arr[I]\n\
NEXT I\n\
FOR I <- 1 TO N - 1\n\
FOR J <- 1 TO N - I\n\
IF Arr[J] > Arr[J + 1] THEN\n\
Temp <- Arr[J]\n\
Arr[J] <- Arr[J + 1]\n\
Arr[J + 1] <- Temp\n\
ENDIF\n\
NEXT J\n\
NEXT I\n\
FOR I <- 1 TO N\n\
OUTPUT Arr[I]\n\
NEXT I";

#[test]
fn bubble_sort_sorts_the_queued_inputs() {
  let result = run_with_inputs(BUBBLE_SORT, &["5", "2", "9", "1", "7", "3"]);

  let last_six: Vec<&str> = result
    .output
    .iter()
    .rev()
    .take(6)
    .rev()
    .map(|s| s.as_str())
    .collect();
  assert_eq!(last_six, vec!["1", "2", "3", "5", "7", "9"]);

  match &result.globals["Arr"] {
    Value::Array(array) => {
      let values: Vec<i64> = array
        .data
        .iter()
        .map(|v| match v {
          Value::Int(n) => *n,
          other => panic!("expected integer element, found {:?}", other),
        })
        .collect();
      assert_eq!(values, vec![1, 2, 3, 5, 7, 9]);
    }
    other => panic!("expected array, found {:?}", other),
  }
}

#[test]
fn for_loop_with_negative_step_counts_down() {
  let result = run_with_inputs(
    "DECLARE I : INTEGER\nFOR I <- 5 TO 1 STEP -1\nOUTPUT I\nNEXT I",
    &[],
  );
  assert_eq!(result.output, vec!["5", "4", "3", "2", "1"]);
}

#[test]
fn for_loop_iteration_counts_are_exact() {
  // max(0, floor((b - a) / s) + 1) iterations when the direction matches.
  let count = |src: &str| run_with_inputs(src, &[]).output.len();

  assert_eq!(
    count("DECLARE I : INTEGER\nFOR I <- 1 TO 10 STEP 3\nOUTPUT I\nNEXT I"),
    4
  );
  assert_eq!(
    count("DECLARE I : INTEGER\nFOR I <- 1 TO 1\nOUTPUT I\nNEXT I"),
    1
  );
  assert_eq!(
    count("DECLARE I : INTEGER\nFOR I <- 5 TO 1\nOUTPUT I\nNEXT I"),
    0
  );
  assert_eq!(
    count("DECLARE I : INTEGER\nFOR I <- 1 TO 5 STEP -1\nOUTPUT I\nNEXT I"),
    0
  );
}

const WEEKEND_CASE: &str = "DECLARE D : INTEGER\n\
INPUT D\n\
CASE OF D\n\
6, 7 : OUTPUT \"Weekend\"\n\
OTHERWISE : OUTPUT \"Other\"\n\
ENDCASE";

#[test]
fn case_multi_value_branch_matches_either_value() {
  assert_eq!(run_with_inputs(WEEKEND_CASE, &["7"]).output, vec!["Weekend"]);
  assert_eq!(run_with_inputs(WEEKEND_CASE, &["6"]).output, vec!["Weekend"]);
  assert_eq!(run_with_inputs(WEEKEND_CASE, &["0"]).output, vec!["Other"]);
}

const FILE_ROUND_TRIP: &str = "DECLARE I : INTEGER\n\
DECLARE L : STRING\n\
OPENFILE \"data.txt\" FOR WRITE\n\
FOR I <- 1 TO 5\n\
WRITEFILE \"data.txt\", \"Line \" & I\n\
NEXT I\n\
CLOSEFILE \"data.txt\"\n\
OPENFILE \"data.txt\" FOR READ\n\
WHILE NOT EOF(\"data.txt\") DO\n\
READFILE \"data.txt\", L\n\
OUTPUT \"Read: \" & L\n\
ENDWHILE\n\
CLOSEFILE \"data.txt\"";

#[test]
fn file_round_trip_reads_back_what_it_wrote() {
  let result = run_with_inputs(FILE_ROUND_TRIP, &[]);

  let expected_lines: Vec<String> = (1..=5).map(|i| format!("Line {}", i)).collect();
  assert_eq!(result.files["data.txt"].lines, expected_lines);
  assert!(!result.files["data.txt"].open);

  let expected_output: Vec<String> = (1..=5).map(|i| format!("Read: Line {}", i)).collect();
  assert_eq!(result.output, expected_output);
}

#[test]
fn use_before_assignment_is_a_type_error() {
  let err = run("DECLARE X : INTEGER\nOUTPUT X", &RunOptions::new()).unwrap_err();

  assert_eq!(err.stage, Stage::Type);
  assert_eq!(err.message, "Variable 'X' used before assignment");
  assert_eq!(err.stage.exit_code(), 3);
}

#[test]
fn stage_tags_prefix_rendered_errors() {
  let err = run("DECLARE X : INTEGER\nOUTPUT X", &RunOptions::new()).unwrap_err();
  assert!(err.to_string().starts_with("TypeError line 2:"));

  let err = run("OUTPUT @", &RunOptions::new()).unwrap_err();
  assert!(err.to_string().starts_with("LexError"));
  assert_eq!(err.stage.exit_code(), 1);

  let err = run("IF X", &RunOptions::new()).unwrap_err();
  assert!(err.to_string().starts_with("ParseError"));
  assert_eq!(err.stage.exit_code(), 2);

  let err = run("OUTPUT 1 DIV 0", &RunOptions::new()).unwrap_err();
  assert!(err.to_string().starts_with("RuntimeError"));
  assert_eq!(err.stage.exit_code(), 4);
}

#[test]
fn optimized_and_unoptimized_runs_agree() {
  let sources = [SWAP_PROGRAM, BUBBLE_SORT, FILE_ROUND_TRIP];
  let inputs: [&[&str]; 3] = [&[], &["5", "2", "9", "1", "7", "3"], &[]];

  for (source, inputs) in sources.iter().zip(inputs.iter()) {
    let plain = run(
      source,
      &RunOptions {
        optimize: false,
        inputs: inputs.iter().map(|s| s.to_string()).collect(),
        ..RunOptions::new()
      },
    )
    .unwrap();
    let optimized = run(
      source,
      &RunOptions {
        optimize: true,
        inputs: inputs.iter().map(|s| s.to_string()).collect(),
        ..RunOptions::new()
      },
    )
    .unwrap();

    assert_eq!(plain.output, optimized.output);
    assert_eq!(plain.globals, optimized.globals);
    assert_eq!(
      plain.files.keys().collect::<Vec<_>>(),
      optimized.files.keys().collect::<Vec<_>>()
    );
    for (name, file) in &plain.files {
      assert_eq!(file.lines, optimized.files[name].lines);
    }
  }
}

#[test]
fn repeated_runs_are_deterministic() {
  let options = RunOptions {
    inputs: vec!["5".into(), "2".into(), "9".into(), "1".into(), "7".into(), "3".into()],
    seed: Some(7),
    ..RunOptions::new()
  };
  let first = run(BUBBLE_SORT, &options).unwrap();
  let second = run(BUBBLE_SORT, &options).unwrap();

  assert_eq!(first.output, second.output);
  assert_eq!(first.globals, second.globals);
}

#[test]
fn routine_locals_never_reach_the_global_map() {
  let result = run_with_inputs(
    "PROCEDURE P\nDECLARE Local : INTEGER\nLocal <- 5\nENDPROCEDURE\nCALL P",
    &[],
  );

  assert!(!result.globals.contains_key("Local"));
}

#[test]
fn repeat_runs_its_body_at_least_once() {
  let result = run_with_inputs(
    "DECLARE X : INTEGER\nX <- 10\nREPEAT\nOUTPUT X\nX <- X + 1\nUNTIL X > 10",
    &[],
  );
  assert_eq!(result.output, vec!["10"]);
}

#[test]
fn compile_is_pure_and_reports_all_stages() {
  let compiled = compile(
    "DECLARE X : INTEGER\nX <- 2 + 3 * 4\nOUTPUT X",
    &CompileOptions::default(),
  )
  .unwrap();

  assert!(!compiled.tokens.is_empty());
  assert_eq!(compiled.ast.statements.len(), 3);
  assert!(!compiled.ir.is_empty());
  assert!(compiled.logs.iter().any(|l| l.starts_with("lex:")));
  assert!(compiled.logs.iter().any(|l| l.starts_with("parse:")));
  assert!(compiled.logs.iter().any(|l| l.starts_with("optimize:")));
}

#[test]
fn functions_and_constants_work_together() {
  let result = run_with_inputs(
    "CONSTANT Base = 100\n\
     FUNCTION Price(N : INTEGER) RETURNS INTEGER\n\
     RETURN Base + N\n\
     ENDFUNCTION\n\
     OUTPUT Price(20)",
    &[],
  );
  assert_eq!(result.output, vec!["120"]);
}

#[test]
fn records_round_trip_through_the_pipeline() {
  let result = run_with_inputs(
    "TYPE Point\n\
     DECLARE X : INTEGER\n\
     DECLARE Y : INTEGER\n\
     ENDTYPE\n\
     DECLARE P : Point\n\
     P.X <- 3\n\
     P.Y <- 4\n\
     OUTPUT P.X * P.X + P.Y * P.Y",
    &[],
  );
  assert_eq!(result.output, vec!["25"]);
}
