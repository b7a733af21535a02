pub mod token;

use crate::error::PseudoError;
use token::{keyword_or_ident, Token, TokenKind};

pub struct Lexer {
  input: Vec<char>,
  position: usize,
  line: usize,
  column: usize,
}

impl Lexer {
  pub fn new(input: String) -> Self {
    Self {
      input: input.chars().collect(),
      position: 0,
      line: 1,
      column: 1,
    }
  }

  fn current_char(&self) -> Option<char> {
    self.input.get(self.position).copied()
  }

  fn peek_char(&self) -> Option<char> {
    self.input.get(self.position + 1).copied()
  }

  fn advance(&mut self) -> Option<char> {
    let ch = self.current_char()?;
    self.position += 1;
    if ch == '\n' {
      self.line += 1;
      self.column = 1;
    } else {
      self.column += 1;
    }
    Some(ch)
  }

  fn skip_whitespace(&mut self) {
    while let Some(ch) = self.current_char() {
      if ch.is_whitespace() {
        self.advance();
      } else {
        break;
      }
    }
  }

  fn skip_comment(&mut self) {
    // Line comment: // to end of line
    while self.current_char().is_some() && self.current_char() != Some('\n') {
      self.advance();
    }
  }

  fn read_number(&mut self) -> Token {
    let start_line = self.line;
    let start_column = self.column;
    let mut num = String::new();
    let mut is_real = false;

    while let Some(ch) = self.current_char() {
      if ch.is_ascii_digit() {
        num.push(ch);
        self.advance();
      } else if ch == '.' && !is_real {
        is_real = true;
        num.push(ch);
        self.advance();
      } else {
        break;
      }
    }

    Token::new(
      if is_real {
        TokenKind::RealLit
      } else {
        TokenKind::IntegerLit
      },
      num,
      start_line,
      start_column,
    )
  }

  fn read_string(&mut self, quote: char) -> Result<Token, PseudoError> {
    let start_line = self.line;
    let start_column = self.column;
    let mut string = String::new();
    let mut terminated = false;

    self.advance(); // opening quote

    while let Some(ch) = self.current_char() {
      if ch == quote {
        self.advance();
        terminated = true;
        break;
      } else if ch == '\\' {
        // The backslash is dropped; the next character is kept literally.
        self.advance();
        if let Some(escaped) = self.current_char() {
          string.push(escaped);
          self.advance();
        } else {
          break;
        }
      } else {
        string.push(ch);
        self.advance();
      }
    }

    if !terminated {
      Err(PseudoError::lex(
        "Unterminated string literal",
        start_line,
        start_column,
      ))
    } else {
      Ok(Token::new(
        TokenKind::StringLit,
        string,
        start_line,
        start_column,
      ))
    }
  }

  fn read_identifier(&mut self) -> Token {
    let start_line = self.line;
    let start_column = self.column;
    let mut ident = String::new();

    while let Some(ch) = self.current_char() {
      if ch.is_ascii_alphanumeric() || ch == '_' {
        ident.push(ch);
        self.advance();
      } else {
        break;
      }
    }

    let kind = keyword_or_ident(&ident.to_ascii_uppercase());
    // Keyword lexemes are canonicalised to upper case; identifiers keep
    // their original spelling.
    let lexeme = if kind == TokenKind::Ident {
      ident
    } else {
      ident.to_ascii_uppercase()
    };
    Token::new(kind, lexeme, start_line, start_column)
  }

  pub fn next_token(&mut self) -> Result<Token, PseudoError> {
    loop {
      self.skip_whitespace();

      if self.current_char() == Some('/') && self.peek_char() == Some('/') {
        self.skip_comment();
        continue;
      }

      break;
    }

    let line = self.line;
    let column = self.column;

    let token = match self.current_char() {
      None => Token::new(TokenKind::Eof, String::new(), line, column),

      Some(ch) if ch.is_ascii_digit() => self.read_number(),

      Some(ch @ '"') | Some(ch @ '\'') => return self.read_string(ch),

      Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => self.read_identifier(),

      Some('<') => {
        self.advance();
        match self.current_char() {
          Some('-') => {
            self.advance();
            Token::new(TokenKind::Assign, "<-".to_string(), line, column)
          }
          Some('=') => {
            self.advance();
            Token::new(TokenKind::LtEq, "<=".to_string(), line, column)
          }
          Some('>') => {
            self.advance();
            Token::new(TokenKind::NotEq, "<>".to_string(), line, column)
          }
          _ => Token::new(TokenKind::Lt, "<".to_string(), line, column),
        }
      }

      Some('>') => {
        self.advance();
        if self.current_char() == Some('=') {
          self.advance();
          Token::new(TokenKind::GtEq, ">=".to_string(), line, column)
        } else {
          Token::new(TokenKind::Gt, ">".to_string(), line, column)
        }
      }

      Some('+') => {
        self.advance();
        Token::new(TokenKind::Plus, "+".to_string(), line, column)
      }

      Some('-') => {
        self.advance();
        Token::new(TokenKind::Minus, "-".to_string(), line, column)
      }

      Some('*') => {
        self.advance();
        Token::new(TokenKind::Star, "*".to_string(), line, column)
      }

      Some('/') => {
        self.advance();
        Token::new(TokenKind::Slash, "/".to_string(), line, column)
      }

      Some('^') => {
        self.advance();
        Token::new(TokenKind::Caret, "^".to_string(), line, column)
      }

      Some('=') => {
        self.advance();
        Token::new(TokenKind::Eq, "=".to_string(), line, column)
      }

      Some('&') => {
        self.advance();
        Token::new(TokenKind::Amp, "&".to_string(), line, column)
      }

      Some('(') => {
        self.advance();
        Token::new(TokenKind::LParen, "(".to_string(), line, column)
      }

      Some(')') => {
        self.advance();
        Token::new(TokenKind::RParen, ")".to_string(), line, column)
      }

      Some('[') => {
        self.advance();
        Token::new(TokenKind::LBracket, "[".to_string(), line, column)
      }

      Some(']') => {
        self.advance();
        Token::new(TokenKind::RBracket, "]".to_string(), line, column)
      }

      Some(',') => {
        self.advance();
        Token::new(TokenKind::Comma, ",".to_string(), line, column)
      }

      Some(':') => {
        self.advance();
        Token::new(TokenKind::Colon, ":".to_string(), line, column)
      }

      Some('.') => {
        self.advance();
        Token::new(TokenKind::Dot, ".".to_string(), line, column)
      }

      Some(ch) => {
        return Err(PseudoError::lex(
          format!("Unexpected character '{}'", ch),
          line,
          column,
        ));
      }
    };

    Ok(token)
  }

  pub fn tokenize(&mut self) -> Result<Vec<Token>, PseudoError> {
    let mut tokens = Vec::new();

    loop {
      let token = self.next_token()?;
      let is_eof = token.kind == TokenKind::Eof;
      tokens.push(token);
      if is_eof {
        break;
      }
    }

    Ok(tokens)
  }
}
