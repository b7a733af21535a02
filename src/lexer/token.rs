#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  // Literals
  IntegerLit,
  RealLit,
  StringLit,

  // Identifiers
  Ident,

  // Keywords
  Declare,
  Constant,
  Type,
  EndType,
  If,
  Then,
  Else,
  EndIf,
  While,
  Do,
  EndWhile,
  For,
  To,
  Step,
  Next,
  Repeat,
  Until,
  Case,
  Of,
  Otherwise,
  EndCase,
  Procedure,
  EndProcedure,
  Function,
  EndFunction,
  Returns,
  Return,
  Call,
  ByRef,
  ByVal,
  Output,
  Input,
  OpenFile,
  ReadFile,
  WriteFile,
  CloseFile,
  Read,
  Write,
  Append,
  Array,
  Div,
  Mod,
  And,
  Or,
  Not,

  // Operators
  Assign, // <-
  Plus,   // +
  Minus,  // -
  Star,   // *
  Slash,  // /
  Caret,  // ^
  Eq,     // =
  NotEq,  // <>
  Lt,     // <
  Gt,     // >
  LtEq,   // <=
  GtEq,   // >=
  Amp,    // &

  // Delimiters
  LParen,   // (
  RParen,   // )
  LBracket, // [
  RBracket, // ]
  Comma,    // ,
  Colon,    // :
  Dot,      // .

  // Special
  Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
  pub kind: TokenKind,
  pub lexeme: String,
  pub line: usize,
  pub column: usize,
}

impl Token {
  pub fn new(kind: TokenKind, lexeme: String, line: usize, column: usize) -> Self {
    Self {
      kind,
      lexeme,
      line,
      column,
    }
  }
}

/// Keyword lookup on the upper-cased lexeme. `TRUE`/`FALSE` are not
/// keywords; the parser promotes those identifiers to boolean literals.
pub fn keyword_or_ident(word: &str) -> TokenKind {
  match word {
    "DECLARE" => TokenKind::Declare,
    "CONSTANT" => TokenKind::Constant,
    "TYPE" => TokenKind::Type,
    "ENDTYPE" => TokenKind::EndType,
    "IF" => TokenKind::If,
    "THEN" => TokenKind::Then,
    "ELSE" => TokenKind::Else,
    "ENDIF" => TokenKind::EndIf,
    "WHILE" => TokenKind::While,
    "DO" => TokenKind::Do,
    "ENDWHILE" => TokenKind::EndWhile,
    "FOR" => TokenKind::For,
    "TO" => TokenKind::To,
    "STEP" => TokenKind::Step,
    "NEXT" => TokenKind::Next,
    "REPEAT" => TokenKind::Repeat,
    "UNTIL" => TokenKind::Until,
    "CASE" => TokenKind::Case,
    "OF" => TokenKind::Of,
    "OTHERWISE" => TokenKind::Otherwise,
    "ENDCASE" => TokenKind::EndCase,
    "PROCEDURE" => TokenKind::Procedure,
    "ENDPROCEDURE" => TokenKind::EndProcedure,
    "FUNCTION" => TokenKind::Function,
    "ENDFUNCTION" => TokenKind::EndFunction,
    "RETURNS" => TokenKind::Returns,
    "RETURN" => TokenKind::Return,
    "CALL" => TokenKind::Call,
    "BYREF" => TokenKind::ByRef,
    "BYVAL" => TokenKind::ByVal,
    "OUTPUT" => TokenKind::Output,
    "INPUT" => TokenKind::Input,
    "OPENFILE" => TokenKind::OpenFile,
    "READFILE" => TokenKind::ReadFile,
    "WRITEFILE" => TokenKind::WriteFile,
    "CLOSEFILE" => TokenKind::CloseFile,
    "READ" => TokenKind::Read,
    "WRITE" => TokenKind::Write,
    "APPEND" => TokenKind::Append,
    "ARRAY" => TokenKind::Array,
    "DIV" => TokenKind::Div,
    "MOD" => TokenKind::Mod,
    "AND" => TokenKind::And,
    "OR" => TokenKind::Or,
    "NOT" => TokenKind::Not,
    _ => TokenKind::Ident,
  }
}
