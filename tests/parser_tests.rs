use pseudo_lang::error::Stage;
use pseudo_lang::lexer::Lexer;
use pseudo_lang::parser::{ast::*, Parser};

fn parse_source(source: &str) -> Program {
  let mut lexer = Lexer::new(source.to_string());
  let tokens = lexer.tokenize().expect("lexer should succeed");
  Parser::new(tokens).parse().expect("parser should succeed")
}

fn parse_error(source: &str) -> pseudo_lang::error::PseudoError {
  let mut lexer = Lexer::new(source.to_string());
  let tokens = lexer.tokenize().expect("lexer should succeed");
  Parser::new(tokens).parse().unwrap_err()
}

#[test]
fn parses_scalar_and_array_declarations() {
  let program = parse_source("DECLARE X : INTEGER\nDECLARE Grid : ARRAY[1:3,1:4] OF REAL");

  assert_eq!(
    program.statements[0].kind,
    StmtKind::Declare {
      name: "X".to_string(),
      type_name: TypeName::Integer,
      dimensions: None,
    }
  );
  assert_eq!(
    program.statements[1].kind,
    StmtKind::Declare {
      name: "Grid".to_string(),
      type_name: TypeName::Real,
      dimensions: Some(vec![
        Dimension { start: 1, end: 3 },
        Dimension { start: 1, end: 4 },
      ]),
    }
  );
}

#[test]
fn parses_assignment_targets() {
  let program = parse_source("X <- 1\nA[2] <- 3\nP.Age <- 4");

  assert!(matches!(
    &program.statements[0].kind,
    StmtKind::Assignment {
      target: AssignTarget::Name(name),
      ..
    } if name == "X"
  ));
  assert!(matches!(
    &program.statements[1].kind,
    StmtKind::Assignment {
      target: AssignTarget::Element { name, indices },
      ..
    } if name == "A" && indices.len() == 1
  ));
  assert!(matches!(
    &program.statements[2].kind,
    StmtKind::Assignment {
      target: AssignTarget::Field { name, field },
      ..
    } if name == "P" && field == "Age"
  ));
}

#[test]
fn expression_precedence_puts_multiplication_first() {
  let program = parse_source("X <- 2 + 3 * 4");

  match &program.statements[0].kind {
    StmtKind::Assignment { value, .. } => match value {
      Expr::Binary { op, right, .. } => {
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(
          right.as_ref(),
          Expr::Binary {
            op: BinaryOp::Multiply,
            ..
          }
        ));
      }
      other => panic!("expected binary expression, found {:?}", other),
    },
    other => panic!("expected assignment, found {:?}", other),
  }
}

#[test]
fn true_and_false_become_boolean_literals() {
  let program = parse_source("Flag <- TRUE AND NOT FALSE");

  match &program.statements[0].kind {
    StmtKind::Assignment { value, .. } => match value {
      Expr::Binary { left, op, .. } => {
        assert_eq!(*op, BinaryOp::And);
        assert_eq!(left.as_ref(), &Expr::BooleanLit(true));
      }
      other => panic!("expected binary expression, found {:?}", other),
    },
    other => panic!("expected assignment, found {:?}", other),
  }
}

#[test]
fn parses_if_with_else() {
  let program = parse_source("IF X > 0 THEN\nOUTPUT 1\nELSE\nOUTPUT 2\nENDIF");

  match &program.statements[0].kind {
    StmtKind::If {
      then_body,
      else_body,
      ..
    } => {
      assert_eq!(then_body.len(), 1);
      assert_eq!(else_body.as_ref().unwrap().len(), 1);
    }
    other => panic!("expected IF, found {:?}", other),
  }
}

#[test]
fn parses_for_with_negative_literal_step() {
  let program = parse_source("FOR I <- 5 TO 1 STEP -1\nOUTPUT I\nNEXT I");

  match &program.statements[0].kind {
    StmtKind::For { var, step, .. } => {
      assert_eq!(var, "I");
      assert!(matches!(
        step.as_ref().unwrap(),
        Expr::Unary {
          op: UnaryOp::Negate,
          ..
        }
      ));
    }
    other => panic!("expected FOR, found {:?}", other),
  }
}

#[test]
fn next_variable_must_match_the_loop_variable() {
  let err = parse_error("FOR I <- 1 TO 3\nOUTPUT I\nNEXT J");

  assert_eq!(err.stage, Stage::Parse);
  assert!(err.message.contains("does not match"));
}

#[test]
fn parses_repeat_until() {
  let program = parse_source("REPEAT\nX <- X + 1\nUNTIL X > 3");

  assert!(matches!(
    &program.statements[0].kind,
    StmtKind::Repeat { body, .. } if body.len() == 1
  ));
}

#[test]
fn parses_case_with_multi_value_branch_and_otherwise() {
  let program = parse_source(
    "CASE OF D\n  1 : OUTPUT \"one\"\n      OUTPUT \"more\"\n  6, 7 : OUTPUT \"weekend\"\n  OTHERWISE : OUTPUT \"other\"\nENDCASE",
  );

  match &program.statements[0].kind {
    StmtKind::Case {
      branches,
      otherwise,
      ..
    } => {
      assert_eq!(branches.len(), 2);
      // The first branch body keeps both statements; the value list of
      // the second branch ends it.
      assert_eq!(branches[0].body.len(), 2);
      assert_eq!(branches[1].values.len(), 2);
      assert_eq!(otherwise.as_ref().unwrap().len(), 1);
    }
    other => panic!("expected CASE, found {:?}", other),
  }
}

#[test]
fn parses_procedure_with_byref_parameter() {
  let program = parse_source("PROCEDURE Swap(BYREF X : INTEGER, Y : INTEGER)\nENDPROCEDURE");

  match &program.statements[0].kind {
    StmtKind::Procedure { name, params, .. } => {
      assert_eq!(name, "Swap");
      assert_eq!(params[0].mode, ParamMode::ByRef);
      assert_eq!(params[1].mode, ParamMode::ByVal);
    }
    other => panic!("expected PROCEDURE, found {:?}", other),
  }
}

#[test]
fn parses_function_with_returns_type() {
  let program = parse_source("FUNCTION Double(N : INTEGER) RETURNS INTEGER\nRETURN N * 2\nENDFUNCTION");

  match &program.statements[0].kind {
    StmtKind::Function { returns, body, .. } => {
      assert_eq!(*returns, TypeName::Integer);
      assert!(matches!(
        &body[0].kind,
        StmtKind::Return { value: Some(_) }
      ));
    }
    other => panic!("expected FUNCTION, found {:?}", other),
  }
}

#[test]
fn parses_record_type_definition() {
  let program = parse_source("TYPE Point\nDECLARE X : INTEGER\nDECLARE Y : INTEGER\nENDTYPE");

  match &program.statements[0].kind {
    StmtKind::TypeDef { name, fields } => {
      assert_eq!(name, "Point");
      assert_eq!(fields.len(), 2);
    }
    other => panic!("expected TYPE, found {:?}", other),
  }
}

#[test]
fn rejects_array_fields_inside_records() {
  let err = parse_error("TYPE Bad\nDECLARE Xs : ARRAY[1:3] OF INTEGER\nENDTYPE");

  assert_eq!(err.stage, Stage::Parse);
  assert!(err.message.contains("ARRAY fields"));
}

#[test]
fn parses_constant_with_negative_literal() {
  let program = parse_source("CONSTANT Floor = -12");

  assert_eq!(
    program.statements[0].kind,
    StmtKind::Constant {
      name: "Floor".to_string(),
      value: Expr::IntegerLit(-12),
    }
  );
}

#[test]
fn parses_output_lists() {
  let program = parse_source("OUTPUT \"A=\", A, \" B=\", B");

  assert!(matches!(
    &program.statements[0].kind,
    StmtKind::Output { values } if values.len() == 4
  ));
}

#[test]
fn parses_file_statements() {
  let program = parse_source(
    "OPENFILE \"d.txt\" FOR APPEND\nWRITEFILE \"d.txt\", \"x\"\nREADFILE \"d.txt\", L\nCLOSEFILE \"d.txt\"",
  );

  assert!(matches!(
    &program.statements[0].kind,
    StmtKind::OpenFile {
      mode: FileMode::Append,
      ..
    }
  ));
  assert!(matches!(&program.statements[1].kind, StmtKind::WriteFile { .. }));
  assert!(matches!(&program.statements[2].kind, StmtKind::ReadFile { .. }));
  assert!(matches!(&program.statements[3].kind, StmtKind::CloseFile { .. }));
}

#[test]
fn parse_errors_carry_the_line_number() {
  let err = parse_error("IF X > 0 THEN\nOUTPUT 1");

  assert_eq!(err.stage, Stage::Parse);
  assert_eq!(err.line, Some(2));
}

#[test]
fn statements_record_their_source_line() {
  let program = parse_source("X <- 1\nY <- 2");

  assert_eq!(program.statements[0].line, 1);
  assert_eq!(program.statements[1].line, 2);
}
