//! Token types and definitions for the quill lexer.

use quill_core::Span;
use std::fmt;

/// A token from the source code.
///
/// The `'ast` lifetime refers to the arena where the lexeme string is allocated,
/// so the source string can be dropped once parsing is done.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    /// The type of token.
    pub kind: TokenKind,
    /// The source text of this token (allocated in arena).
    pub lexeme: &'ast str,
    /// Location in source.
    pub span: Span,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// All token types in quill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals and names
    // =========================================
    /// Integer literal: `42`
    IntLiteral,
    /// User-defined identifier
    Identifier,

    // =========================================
    // Keywords
    // =========================================
    Func,
    Struct,
    Var,
    If,
    Else,
    While,
    Break,
    Continue,
    Return,
    New,

    // =========================================
    // Delimiters
    // =========================================
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `?`
    Question,
    /// `->`
    Arrow,

    // =========================================
    // Operators
    // =========================================
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `!`
    Bang,
    /// `=`
    Equal,
    /// `==`
    EqualEqual,
    /// `!=`
    BangEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `&`
    Amp,
    /// `|`
    Pipe,

    // =========================================
    // Special
    // =========================================
    /// End of input.
    Eof,
    /// Lexing failed at this position.
    Error,
}

impl TokenKind {
    /// Whether this is a reserved word.
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Func | Struct | Var | If | Else | While | Break | Continue | Return | New
        )
    }

    /// Get the string representation of this token kind for error messages.
    pub fn description(self) -> &'static str {
        use TokenKind::*;
        match self {
            IntLiteral => "integer literal",
            Identifier => "identifier",
            Func => "'func'",
            Struct => "'struct'",
            Var => "'var'",
            If => "'if'",
            Else => "'else'",
            While => "'while'",
            Break => "'break'",
            Continue => "'continue'",
            Return => "'return'",
            New => "'new'",
            LeftBrace => "'{'",
            RightBrace => "'}'",
            LeftBracket => "'['",
            RightBracket => "']'",
            LeftParen => "'('",
            RightParen => "')'",
            Comma => "','",
            Dot => "'.'",
            Semicolon => "';'",
            Colon => "':'",
            Question => "'?'",
            Arrow => "'->'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            Bang => "'!'",
            Equal => "'='",
            EqualEqual => "'=='",
            BangEqual => "'!='",
            Less => "'<'",
            LessEqual => "'<='",
            Greater => "'>'",
            GreaterEqual => "'>='",
            AmpAmp => "'&&'",
            PipePipe => "'||'",
            Amp => "'&'",
            Pipe => "'|'",
            Eof => "end of file",
            Error => "error",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Map a keyword string to its [`TokenKind`], or `None` if not a keyword.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ident {
        "func" => Func,
        "struct" => Struct,
        "var" => Var,
        "if" => If,
        "else" => Else,
        "while" => While,
        "break" => Break,
        "continue" => Continue,
        "return" => Return,
        "new" => New,
        _ => return None,
    })
}
