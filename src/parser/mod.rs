pub mod ast;

use crate::error::PseudoError;
use crate::lexer::token::{Token, TokenKind};
use ast::*;

pub struct Parser {
  tokens: Vec<Token>,
  current: usize,
}

impl Parser {
  pub fn new(tokens: Vec<Token>) -> Self {
    Self { tokens, current: 0 }
  }

  fn current_token(&self) -> &Token {
    &self.tokens[self.current]
  }

  fn is_at_end(&self) -> bool {
    self.current_token().kind == TokenKind::Eof
  }

  fn line(&self) -> usize {
    self.current_token().line
  }

  fn advance(&mut self) -> &Token {
    if !self.is_at_end() {
      self.current += 1;
    }
    &self.tokens[self.current - 1]
  }

  fn check(&self, kind: TokenKind) -> bool {
    self.current_token().kind == kind
  }

  fn match_kind(&mut self, kinds: &[TokenKind]) -> bool {
    for kind in kinds {
      if self.check(*kind) {
        self.advance();
        return true;
      }
    }
    false
  }

  fn previous(&self) -> &Token {
    &self.tokens[self.current - 1]
  }

  fn consume(&mut self, kind: TokenKind, message: &str) -> Result<&Token, PseudoError> {
    if self.check(kind) {
      Ok(self.advance())
    } else {
      Err(PseudoError::parse(
        format!("{}, got {:?}", message, self.current_token().kind),
        self.line(),
      ))
    }
  }

  pub fn parse(&mut self) -> Result<Program, PseudoError> {
    let mut statements = Vec::new();

    while !self.is_at_end() {
      statements.push(self.statement()?);
    }

    Ok(Program { statements })
  }

  fn statement(&mut self) -> Result<Stmt, PseudoError> {
    let line = self.line();
    let leading = self.current_token().kind;
    let kind = match leading {
      TokenKind::Declare => self.declare_statement()?,
      TokenKind::Constant => self.constant_statement()?,
      TokenKind::Type => self.type_statement()?,
      TokenKind::If => self.if_statement()?,
      TokenKind::While => self.while_statement()?,
      TokenKind::For => self.for_statement()?,
      TokenKind::Repeat => self.repeat_statement()?,
      TokenKind::Case => self.case_statement()?,
      TokenKind::Procedure => self.procedure_statement()?,
      TokenKind::Function => self.function_statement()?,
      TokenKind::Call => self.call_statement()?,
      TokenKind::Return => self.return_statement()?,
      TokenKind::Output => self.output_statement()?,
      TokenKind::Input => self.input_statement()?,
      TokenKind::OpenFile => self.openfile_statement()?,
      TokenKind::ReadFile => self.readfile_statement()?,
      TokenKind::WriteFile => self.writefile_statement()?,
      TokenKind::CloseFile => self.closefile_statement()?,
      TokenKind::Ident => self.assignment_statement()?,
      _ => {
        return Err(PseudoError::parse(
          format!("Unexpected token {:?}", leading),
          line,
        ));
      }
    };

    Ok(Stmt { line, kind })
  }

  fn block(&mut self, terminators: &[TokenKind]) -> Result<Vec<Stmt>, PseudoError> {
    let mut body = Vec::new();
    while !self.is_at_end() && !terminators.iter().any(|t| self.check(*t)) {
      body.push(self.statement()?);
    }
    Ok(body)
  }

  fn declare_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // DECLARE
    let name = self
      .consume(TokenKind::Ident, "Expected variable name after DECLARE")?
      .lexeme
      .clone();
    self.consume(TokenKind::Colon, "Expected ':' after variable name")?;

    if self.check(TokenKind::Array) {
      self.advance();
      self.consume(TokenKind::LBracket, "Expected '[' after ARRAY")?;
      let mut dimensions = vec![self.dimension()?];
      if self.match_kind(&[TokenKind::Comma]) {
        dimensions.push(self.dimension()?);
      }
      self.consume(TokenKind::RBracket, "Expected ']' after array bounds")?;
      self.consume(TokenKind::Of, "Expected OF after array bounds")?;
      let type_name = self.type_name()?;
      return Ok(StmtKind::Declare {
        name,
        type_name,
        dimensions: Some(dimensions),
      });
    }

    let type_name = self.type_name()?;
    Ok(StmtKind::Declare {
      name,
      type_name,
      dimensions: None,
    })
  }

  fn dimension(&mut self) -> Result<Dimension, PseudoError> {
    let start = self.bound_literal()?;
    self.consume(TokenKind::Colon, "Expected ':' between array bounds")?;
    let end = self.bound_literal()?;
    Ok(Dimension { start, end })
  }

  fn bound_literal(&mut self) -> Result<i64, PseudoError> {
    let negative = self.match_kind(&[TokenKind::Minus]);
    let token = self.consume(TokenKind::IntegerLit, "Expected integer array bound")?;
    let value: i64 = token
      .lexeme
      .parse()
      .map_err(|_| PseudoError::parse("Invalid integer array bound", token.line))?;
    Ok(if negative { -value } else { value })
  }

  fn type_name(&mut self) -> Result<TypeName, PseudoError> {
    let token = self.consume(TokenKind::Ident, "Expected type name")?;
    Ok(TypeName::from_lexeme(&token.lexeme))
  }

  fn constant_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // CONSTANT
    let name = self
      .consume(TokenKind::Ident, "Expected constant name")?
      .lexeme
      .clone();
    if !self.match_kind(&[TokenKind::Eq, TokenKind::Assign]) {
      return Err(PseudoError::parse(
        "Expected '=' after constant name",
        self.line(),
      ));
    }

    // Negation is handled before the literal so that `CONSTANT N = -5`
    // parses in one place.
    if self.match_kind(&[TokenKind::Minus]) {
      let value = match self.literal()? {
        Expr::IntegerLit(n) => Expr::IntegerLit(-n),
        Expr::RealLit(r) => Expr::RealLit(-r),
        _ => {
          return Err(PseudoError::parse(
            "Expected numeric literal after '-'",
            self.line(),
          ));
        }
      };
      return Ok(StmtKind::Constant { name, value });
    }

    let value = self.literal()?;
    Ok(StmtKind::Constant { name, value })
  }

  fn literal(&mut self) -> Result<Expr, PseudoError> {
    let line = self.line();
    let kind = self.current_token().kind;
    match kind {
      TokenKind::IntegerLit => {
        let lexeme = self.advance().lexeme.clone();
        let value: i64 = lexeme
          .parse()
          .map_err(|_| PseudoError::parse(format!("Invalid integer '{}'", lexeme), line))?;
        Ok(Expr::IntegerLit(value))
      }
      TokenKind::RealLit => {
        let lexeme = self.advance().lexeme.clone();
        let value: f64 = lexeme
          .parse()
          .map_err(|_| PseudoError::parse(format!("Invalid real '{}'", lexeme), line))?;
        Ok(Expr::RealLit(value))
      }
      TokenKind::StringLit => Ok(Expr::StringLit(self.advance().lexeme.clone())),
      TokenKind::Ident if self.current_token().lexeme.eq_ignore_ascii_case("TRUE") => {
        self.advance();
        Ok(Expr::BooleanLit(true))
      }
      TokenKind::Ident if self.current_token().lexeme.eq_ignore_ascii_case("FALSE") => {
        self.advance();
        Ok(Expr::BooleanLit(false))
      }
      _ => Err(PseudoError::parse("Expected literal value", line)),
    }
  }

  fn type_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // TYPE
    let name = self
      .consume(TokenKind::Ident, "Expected record type name")?
      .lexeme
      .clone();

    let mut fields = Vec::new();
    while !self.check(TokenKind::EndType) && !self.is_at_end() {
      self.consume(TokenKind::Declare, "Expected DECLARE inside TYPE")?;
      let field_name = self
        .consume(TokenKind::Ident, "Expected field name")?
        .lexeme
        .clone();
      self.consume(TokenKind::Colon, "Expected ':' after field name")?;
      if self.check(TokenKind::Array) {
        return Err(PseudoError::parse(
          "ARRAY fields are not supported inside TYPE",
          self.line(),
        ));
      }
      let field_type = self.type_name()?;
      fields.push((field_name, field_type));
    }

    self.consume(TokenKind::EndType, "Expected ENDTYPE after record fields")?;
    Ok(StmtKind::TypeDef { name, fields })
  }

  fn assign_target(&mut self) -> Result<AssignTarget, PseudoError> {
    let name = self
      .consume(TokenKind::Ident, "Expected variable name")?
      .lexeme
      .clone();

    if self.match_kind(&[TokenKind::LBracket]) {
      let mut indices = vec![self.expression()?];
      if self.match_kind(&[TokenKind::Comma]) {
        indices.push(self.expression()?);
      }
      self.consume(TokenKind::RBracket, "Expected ']' after array indices")?;
      return Ok(AssignTarget::Element { name, indices });
    }

    if self.match_kind(&[TokenKind::Dot]) {
      let field = self
        .consume(TokenKind::Ident, "Expected field name after '.'")?
        .lexeme
        .clone();
      return Ok(AssignTarget::Field { name, field });
    }

    Ok(AssignTarget::Name(name))
  }

  fn assignment_statement(&mut self) -> Result<StmtKind, PseudoError> {
    let target = self.assign_target()?;
    self.consume(TokenKind::Assign, "Expected '<-' in assignment")?;
    let value = self.expression()?;
    Ok(StmtKind::Assignment { target, value })
  }

  fn output_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // OUTPUT
    let mut values = vec![self.expression()?];
    while self.match_kind(&[TokenKind::Comma]) {
      values.push(self.expression()?);
    }
    Ok(StmtKind::Output { values })
  }

  fn input_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // INPUT
    let target = self.assign_target()?;
    Ok(StmtKind::Input { target })
  }

  fn if_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // IF
    let condition = self.expression()?;
    self.consume(TokenKind::Then, "Expected THEN after IF condition")?;

    let then_body = self.block(&[TokenKind::Else, TokenKind::EndIf])?;
    let else_body = if self.match_kind(&[TokenKind::Else]) {
      Some(self.block(&[TokenKind::EndIf])?)
    } else {
      None
    };

    self.consume(TokenKind::EndIf, "Expected ENDIF")?;
    Ok(StmtKind::If {
      condition,
      then_body,
      else_body,
    })
  }

  fn while_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // WHILE
    let condition = self.expression()?;
    self.match_kind(&[TokenKind::Do]);
    let body = self.block(&[TokenKind::EndWhile])?;
    self.consume(TokenKind::EndWhile, "Expected ENDWHILE")?;
    Ok(StmtKind::While { condition, body })
  }

  fn for_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // FOR
    let var = self
      .consume(TokenKind::Ident, "Expected loop variable after FOR")?
      .lexeme
      .clone();
    self.consume(TokenKind::Assign, "Expected '<-' after loop variable")?;
    let start = self.expression()?;
    self.consume(TokenKind::To, "Expected TO in FOR")?;
    let end = self.expression()?;
    let step = if self.match_kind(&[TokenKind::Step]) {
      Some(self.expression()?)
    } else {
      None
    };

    let body = self.block(&[TokenKind::Next])?;
    self.consume(TokenKind::Next, "Expected NEXT after FOR body")?;

    if self.check(TokenKind::Ident) {
      if self.current_token().lexeme == var {
        self.advance();
      } else {
        return Err(PseudoError::parse(
          format!(
            "NEXT variable '{}' does not match loop variable '{}'",
            self.current_token().lexeme,
            var
          ),
          self.line(),
        ));
      }
    }

    Ok(StmtKind::For {
      var,
      start,
      end,
      step,
      body,
    })
  }

  fn repeat_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // REPEAT
    let body = self.block(&[TokenKind::Until])?;
    self.consume(TokenKind::Until, "Expected UNTIL after REPEAT body")?;
    let condition = self.expression()?;
    Ok(StmtKind::Repeat { body, condition })
  }

  fn case_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // CASE
    self.consume(TokenKind::Of, "Expected OF after CASE")?;
    let selector = self.expression()?;

    let mut branches = Vec::new();
    let mut otherwise = None;

    loop {
      if self.is_at_end() {
        return Err(PseudoError::parse("Expected ENDCASE", self.line()));
      }
      if self.check(TokenKind::EndCase) {
        break;
      }
      if self.match_kind(&[TokenKind::Otherwise]) {
        self.match_kind(&[TokenKind::Colon]);
        otherwise = Some(self.case_body()?);
        continue;
      }

      let mut values = vec![self.case_value()?];
      while self.match_kind(&[TokenKind::Comma]) {
        values.push(self.case_value()?);
      }
      self.consume(TokenKind::Colon, "Expected ':' after CASE values")?;
      let body = self.case_body()?;
      branches.push(CaseBranch { values, body });
    }

    self.consume(TokenKind::EndCase, "Expected ENDCASE")?;
    Ok(StmtKind::Case {
      selector,
      branches,
      otherwise,
    })
  }

  fn case_value(&mut self) -> Result<Expr, PseudoError> {
    if self.check(TokenKind::Ident)
      && !self.current_token().lexeme.eq_ignore_ascii_case("TRUE")
      && !self.current_token().lexeme.eq_ignore_ascii_case("FALSE")
    {
      let name = self.advance().lexeme.clone();
      return Ok(Expr::Ident(name));
    }
    self.literal()
  }

  fn case_body(&mut self) -> Result<Vec<Stmt>, PseudoError> {
    let mut body = Vec::new();
    while !self.is_at_end()
      && !self.check(TokenKind::EndCase)
      && !self.check(TokenKind::Otherwise)
      && !self.at_case_branch_start()
    {
      body.push(self.statement()?);
    }
    Ok(body)
  }

  /// Look ahead for the start of the next CASE branch: a value list
  /// (literals/identifiers separated by commas) followed by ':'. The
  /// parse position is restored afterwards.
  fn at_case_branch_start(&mut self) -> bool {
    let saved = self.current;
    let result = self.scan_branch_values();
    self.current = saved;
    result
  }

  fn scan_branch_values(&mut self) -> bool {
    if !self.scan_branch_value() {
      return false;
    }
    while self.match_kind(&[TokenKind::Comma]) {
      if !self.scan_branch_value() {
        return false;
      }
    }
    self.check(TokenKind::Colon)
  }

  fn scan_branch_value(&mut self) -> bool {
    let kind = self.current_token().kind;
    match kind {
      TokenKind::IntegerLit | TokenKind::RealLit | TokenKind::StringLit | TokenKind::Ident => {
        self.advance();
        true
      }
      _ => false,
    }
  }

  fn params(&mut self) -> Result<Vec<Param>, PseudoError> {
    let mut params = Vec::new();
    if !self.match_kind(&[TokenKind::LParen]) {
      return Ok(params);
    }
    if !self.check(TokenKind::RParen) {
      loop {
        let mode = if self.match_kind(&[TokenKind::ByRef]) {
          ParamMode::ByRef
        } else {
          self.match_kind(&[TokenKind::ByVal]);
          ParamMode::ByVal
        };
        let name = self
          .consume(TokenKind::Ident, "Expected parameter name")?
          .lexeme
          .clone();
        self.consume(TokenKind::Colon, "Expected ':' after parameter name")?;
        let type_name = self.type_name()?;
        params.push(Param {
          name,
          type_name,
          mode,
        });
        if !self.match_kind(&[TokenKind::Comma]) {
          break;
        }
      }
    }
    self.consume(TokenKind::RParen, "Expected ')' after parameters")?;
    Ok(params)
  }

  fn procedure_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // PROCEDURE
    let name = self
      .consume(TokenKind::Ident, "Expected procedure name")?
      .lexeme
      .clone();
    let params = self.params()?;
    let body = self.block(&[TokenKind::EndProcedure])?;
    self.consume(TokenKind::EndProcedure, "Expected ENDPROCEDURE")?;
    Ok(StmtKind::Procedure { name, params, body })
  }

  fn function_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // FUNCTION
    let name = self
      .consume(TokenKind::Ident, "Expected function name")?
      .lexeme
      .clone();
    let params = self.params()?;
    self.consume(TokenKind::Returns, "Expected RETURNS in FUNCTION")?;
    let returns = self.type_name()?;
    let body = self.block(&[TokenKind::EndFunction])?;
    self.consume(TokenKind::EndFunction, "Expected ENDFUNCTION")?;
    Ok(StmtKind::Function {
      name,
      params,
      returns,
      body,
    })
  }

  fn call_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // CALL
    let name = self
      .consume(TokenKind::Ident, "Expected procedure name after CALL")?
      .lexeme
      .clone();

    let mut args = Vec::new();
    if self.match_kind(&[TokenKind::LParen]) {
      if !self.check(TokenKind::RParen) {
        loop {
          args.push(self.expression()?);
          if !self.match_kind(&[TokenKind::Comma]) {
            break;
          }
        }
      }
      self.consume(TokenKind::RParen, "Expected ')' after arguments")?;
    }

    Ok(StmtKind::Call { name, args })
  }

  fn return_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // RETURN
    let value = if self.starts_expression() {
      Some(self.expression()?)
    } else {
      None
    };
    Ok(StmtKind::Return { value })
  }

  fn starts_expression(&self) -> bool {
    matches!(
      self.current_token().kind,
      TokenKind::IntegerLit
        | TokenKind::RealLit
        | TokenKind::StringLit
        | TokenKind::Ident
        | TokenKind::LParen
        | TokenKind::Minus
        | TokenKind::Not
    )
  }

  fn openfile_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // OPENFILE
    let name = self.expression()?;
    self.consume(TokenKind::For, "Expected FOR after file name")?;
    let kind = self.current_token().kind;
    let mode = match kind {
      TokenKind::Read => FileMode::Read,
      TokenKind::Write => FileMode::Write,
      TokenKind::Append => FileMode::Append,
      _ => {
        return Err(PseudoError::parse(
          "Expected READ, WRITE or APPEND file mode",
          self.line(),
        ));
      }
    };
    self.advance();
    Ok(StmtKind::OpenFile { name, mode })
  }

  fn readfile_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // READFILE
    let name = self.expression()?;
    self.consume(TokenKind::Comma, "Expected ',' after file name")?;
    let target = self.assign_target()?;
    Ok(StmtKind::ReadFile { name, target })
  }

  fn writefile_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // WRITEFILE
    let name = self.expression()?;
    self.consume(TokenKind::Comma, "Expected ',' after file name")?;
    let value = self.expression()?;
    Ok(StmtKind::WriteFile { name, value })
  }

  fn closefile_statement(&mut self) -> Result<StmtKind, PseudoError> {
    self.advance(); // CLOSEFILE
    let name = self.expression()?;
    Ok(StmtKind::CloseFile { name })
  }

  // Expression parsing, lowest precedence first.
  fn expression(&mut self) -> Result<Expr, PseudoError> {
    self.or_expr()
  }

  fn or_expr(&mut self) -> Result<Expr, PseudoError> {
    let mut expr = self.and_expr()?;

    while self.match_kind(&[TokenKind::Or]) {
      let right = self.and_expr()?;
      expr = Expr::Binary {
        left: Box::new(expr),
        op: BinaryOp::Or,
        right: Box::new(right),
      };
    }

    Ok(expr)
  }

  fn and_expr(&mut self) -> Result<Expr, PseudoError> {
    let mut expr = self.comparison()?;

    while self.match_kind(&[TokenKind::And]) {
      let right = self.comparison()?;
      expr = Expr::Binary {
        left: Box::new(expr),
        op: BinaryOp::And,
        right: Box::new(right),
      };
    }

    Ok(expr)
  }

  fn comparison(&mut self) -> Result<Expr, PseudoError> {
    let mut expr = self.additive()?;

    while self.match_kind(&[
      TokenKind::Eq,
      TokenKind::NotEq,
      TokenKind::Lt,
      TokenKind::Gt,
      TokenKind::LtEq,
      TokenKind::GtEq,
    ]) {
      let op = match self.previous().kind {
        TokenKind::Eq => BinaryOp::Equal,
        TokenKind::NotEq => BinaryOp::NotEqual,
        TokenKind::Lt => BinaryOp::Less,
        TokenKind::Gt => BinaryOp::Greater,
        TokenKind::LtEq => BinaryOp::LessEqual,
        TokenKind::GtEq => BinaryOp::GreaterEqual,
        _ => unreachable!(),
      };
      let right = self.additive()?;
      expr = Expr::Binary {
        left: Box::new(expr),
        op,
        right: Box::new(right),
      };
    }

    Ok(expr)
  }

  fn additive(&mut self) -> Result<Expr, PseudoError> {
    let mut expr = self.multiplicative()?;

    while self.match_kind(&[TokenKind::Plus, TokenKind::Minus, TokenKind::Amp]) {
      let op = match self.previous().kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Subtract,
        TokenKind::Amp => BinaryOp::Concat,
        _ => unreachable!(),
      };
      let right = self.multiplicative()?;
      expr = Expr::Binary {
        left: Box::new(expr),
        op,
        right: Box::new(right),
      };
    }

    Ok(expr)
  }

  fn multiplicative(&mut self) -> Result<Expr, PseudoError> {
    let mut expr = self.unary()?;

    while self.match_kind(&[
      TokenKind::Star,
      TokenKind::Slash,
      TokenKind::Div,
      TokenKind::Mod,
      TokenKind::Caret,
    ]) {
      let op = match self.previous().kind {
        TokenKind::Star => BinaryOp::Multiply,
        TokenKind::Slash => BinaryOp::Divide,
        TokenKind::Div => BinaryOp::IntDiv,
        TokenKind::Mod => BinaryOp::Modulo,
        TokenKind::Caret => BinaryOp::Power,
        _ => unreachable!(),
      };
      let right = self.unary()?;
      expr = Expr::Binary {
        left: Box::new(expr),
        op,
        right: Box::new(right),
      };
    }

    Ok(expr)
  }

  fn unary(&mut self) -> Result<Expr, PseudoError> {
    if self.match_kind(&[TokenKind::Minus, TokenKind::Not]) {
      let op = match self.previous().kind {
        TokenKind::Minus => UnaryOp::Negate,
        TokenKind::Not => UnaryOp::Not,
        _ => unreachable!(),
      };
      let expr = self.unary()?;
      return Ok(Expr::Unary {
        op,
        expr: Box::new(expr),
      });
    }

    self.primary()
  }

  fn primary(&mut self) -> Result<Expr, PseudoError> {
    let line = self.line();
    let kind = self.current_token().kind;

    match kind {
      TokenKind::IntegerLit | TokenKind::RealLit | TokenKind::StringLit => self.literal(),

      TokenKind::LParen => {
        self.advance();
        let expr = self.expression()?;
        self.consume(TokenKind::RParen, "Expected ')' after expression")?;
        Ok(expr)
      }

      TokenKind::Ident => {
        let name = self.advance().lexeme.clone();

        if name.eq_ignore_ascii_case("TRUE") {
          return Ok(Expr::BooleanLit(true));
        }
        if name.eq_ignore_ascii_case("FALSE") {
          return Ok(Expr::BooleanLit(false));
        }

        if self.match_kind(&[TokenKind::LBracket]) {
          let mut indices = vec![self.expression()?];
          if self.match_kind(&[TokenKind::Comma]) {
            indices.push(self.expression()?);
          }
          self.consume(TokenKind::RBracket, "Expected ']' after array indices")?;
          return Ok(Expr::ArrayAccess { name, indices });
        }

        if self.match_kind(&[TokenKind::Dot]) {
          let field = self
            .consume(TokenKind::Ident, "Expected field name after '.'")?
            .lexeme
            .clone();
          return Ok(Expr::FieldAccess { name, field });
        }

        if self.match_kind(&[TokenKind::LParen]) {
          let mut args = Vec::new();
          if !self.check(TokenKind::RParen) {
            loop {
              args.push(self.expression()?);
              if !self.match_kind(&[TokenKind::Comma]) {
                break;
              }
            }
          }
          self.consume(TokenKind::RParen, "Expected ')' after arguments")?;
          return Ok(Expr::Call { name, args });
        }

        Ok(Expr::Ident(name))
      }

      _ => Err(PseudoError::parse(
        format!("Unexpected token {:?}", self.current_token().kind),
        line,
      )),
    }
  }
}
