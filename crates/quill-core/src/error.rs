//! Unified error types for quill.
//!
//! Every phase of the pipeline has its own error type, and [`QuillError`]
//! wraps them for callers that drive the whole pipeline.
//!
//! ## Error Hierarchy
//!
//! ```text
//! QuillError (top-level wrapper)
//! ├── LexError          - tokenization errors
//! ├── ParseError        - syntax errors (with ParseErrorKind)
//! └── CompilationError  - declaration, type resolution, type check and control flow errors
//! ```
//!
//! Compilation is fail-fast: the first error aborts the unit, so each phase
//! returns a single error rather than a collection.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur during lexical analysis (tokenization).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// An unexpected character was encountered.
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    /// A numeric literal could not be parsed.
    #[error("invalid number at {span}: {detail}")]
    InvalidNumber { span: Span, detail: String },
}

impl LexError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A specific token was expected but not found.
    ExpectedToken,
    /// An expression was expected.
    ExpectedExpression,
    /// A type was expected.
    ExpectedType,
    /// An identifier was expected.
    ExpectedIdentifier,
    /// A `struct` or `func` declaration was expected.
    ExpectedDeclaration,
    /// Unexpected end of file.
    UnexpectedEof,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::ExpectedDeclaration => "expected declaration",
            ParseErrorKind::UnexpectedEof => "unexpected end of file",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parse error with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// The source location where the error occurred.
    pub span: Span,
    /// A detailed error message.
    pub message: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Create an "expected token" error.
    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    /// Create an "unexpected EOF" error.
    pub fn unexpected_eof(span: Span) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedEof,
            span,
            "unexpected end of file".to_string(),
        )
    }

    /// Create an "expected identifier" error.
    pub fn expected_identifier(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedIdentifier,
            span,
            format!("expected identifier, found {found}"),
        )
    }

    /// Create an "expected expression" error.
    pub fn expected_expression(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedExpression,
            span,
            format!("expected expression, found {found}"),
        )
    }

    /// Create an "expected type" error.
    pub fn expected_type(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedType,
            span,
            format!("expected type, found {found}"),
        )
    }

    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        self.span
    }
}

// ============================================================================
// Compilation Errors
// ============================================================================

/// What kind of declaration collided in a [`CompilationError::DuplicateDeclaration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Struct,
    Function,
    Field,
    Parameter,
    Variable,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Struct => "struct",
            DeclKind::Function => "function",
            DeclKind::Field => "field",
            DeclKind::Parameter => "parameter",
            DeclKind::Variable => "variable",
        }
    }
}

impl std::fmt::Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad classification of a [`CompilationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A name was declared twice.
    Declaration,
    /// A type expression names a type that cannot exist.
    TypeResolution,
    /// An expression or statement is ill-typed.
    TypeCheck,
    /// `break`/`continue` outside a loop.
    ControlFlow,
}

/// Errors that occur during compilation (semantic analysis and code generation).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    // ------------------------------------------------------------------
    // Declaration
    // ------------------------------------------------------------------
    /// A struct, function, field, parameter or variable was declared twice.
    #[error("at {span}: {kind} '{name}' is already declared")]
    DuplicateDeclaration {
        kind: DeclKind,
        name: String,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Type resolution
    // ------------------------------------------------------------------
    /// `Int?` and friends: nullability is reserved for struct and array types.
    #[error("at {span}: cannot make nullable instance of primitive type '{type_name}'")]
    NullablePrimitive { type_name: String, span: Span },

    /// `[[T]]`
    #[error("at {span}: array of array type not supported")]
    ArrayOfArray { span: Span },

    /// An array element type other than `Int`, a struct or a nullable struct.
    #[error("at {span}: unsupported array element type '{type_name}'")]
    UnsupportedArrayElement { type_name: String, span: Span },

    /// A name in type position that is bound to something other than a type.
    #[error("at {span}: '{name}' is not a type")]
    NotAType { name: String, span: Span },

    // ------------------------------------------------------------------
    // Type check
    // ------------------------------------------------------------------
    #[error("at {span}: unknown symbol '{name}'")]
    UnknownSymbol { name: String, span: Span },

    /// The symbol exists but never received a concrete type.
    #[error("at {span}: symbol '{name}' has no defined type")]
    UntypedSymbol { name: String, span: Span },

    /// A type name used where a value is required.
    #[error("at {span}: type '{name}' cannot be used as a value")]
    NotAValue { name: String, span: Span },

    #[error("at {span}: operator '{op}' not supported for operand of type '{type_name}'")]
    OperandMismatch {
        op: String,
        type_name: String,
        span: Span,
    },

    #[error("at {span}: call target of type '{type_name}' is not a function")]
    NotCallable { type_name: String, span: Span },

    #[error("at {span}: {name} expects {expected} argument(s), got {got}")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        got: usize,
        span: Span,
    },

    /// A value whose type cannot be stored where it is used.
    #[error("at {span}: expected '{expected}', found '{found}'")]
    TypeMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("at {span}: type '{type_name}' is not a struct")]
    NotAStruct { type_name: String, span: Span },

    #[error("at {span}: struct '{type_name}' does not have field named '{field}'")]
    UnknownField {
        field: String,
        type_name: String,
        span: Span,
    },

    #[error("at {span}: type '{type_name}' is not an array")]
    NotAnArray { type_name: String, span: Span },

    #[error("at {span}: cannot create instance of type '{type_name}' with new")]
    InvalidNewType { type_name: String, span: Span },

    /// An initializer inside `new` that does not fit the constructed type.
    #[error("at {span}: {message}")]
    InvalidInitializer { message: String, span: Span },

    #[error("at {span}: cannot merge types '{left}' and '{right}'")]
    IncompatibleMerge {
        left: String,
        right: String,
        span: Span,
    },

    #[error("at {span}: expression cannot be assigned to")]
    InvalidAssignmentTarget { span: Span },

    #[error("at {span}: function returns '{expected}', found '{found}'")]
    ReturnTypeMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("at {span}: condition must be of type 'Int', found '{type_name}'")]
    ConditionNotInteger { type_name: String, span: Span },

    // ------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------
    #[error("at {span}: 'break' outside of a loop")]
    BreakOutsideLoop { span: Span },

    #[error("at {span}: 'continue' outside of a loop")]
    ContinueOutsideLoop { span: Span },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::DuplicateDeclaration { span, .. } => *span,
            CompilationError::NullablePrimitive { span, .. } => *span,
            CompilationError::ArrayOfArray { span } => *span,
            CompilationError::UnsupportedArrayElement { span, .. } => *span,
            CompilationError::NotAType { span, .. } => *span,
            CompilationError::UnknownSymbol { span, .. } => *span,
            CompilationError::UntypedSymbol { span, .. } => *span,
            CompilationError::NotAValue { span, .. } => *span,
            CompilationError::OperandMismatch { span, .. } => *span,
            CompilationError::NotCallable { span, .. } => *span,
            CompilationError::ArgumentCountMismatch { span, .. } => *span,
            CompilationError::TypeMismatch { span, .. } => *span,
            CompilationError::NotAStruct { span, .. } => *span,
            CompilationError::UnknownField { span, .. } => *span,
            CompilationError::NotAnArray { span, .. } => *span,
            CompilationError::InvalidNewType { span, .. } => *span,
            CompilationError::InvalidInitializer { span, .. } => *span,
            CompilationError::IncompatibleMerge { span, .. } => *span,
            CompilationError::InvalidAssignmentTarget { span } => *span,
            CompilationError::ReturnTypeMismatch { span, .. } => *span,
            CompilationError::ConditionNotInteger { span, .. } => *span,
            CompilationError::BreakOutsideLoop { span } => *span,
            CompilationError::ContinueOutsideLoop { span } => *span,
        }
    }

    /// Which phase of analysis rejected the program.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CompilationError::DuplicateDeclaration { .. } => ErrorCategory::Declaration,

            CompilationError::NullablePrimitive { .. }
            | CompilationError::ArrayOfArray { .. }
            | CompilationError::UnsupportedArrayElement { .. }
            | CompilationError::NotAType { .. } => ErrorCategory::TypeResolution,

            CompilationError::BreakOutsideLoop { .. }
            | CompilationError::ContinueOutsideLoop { .. } => ErrorCategory::ControlFlow,

            _ => ErrorCategory::TypeCheck,
        }
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Top-level error covering every phase of the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuillError {
    /// A lexer error.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// A parse error.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A compilation error.
    #[error(transparent)]
    Compilation(#[from] CompilationError),
}

impl QuillError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            QuillError::Lex(e) => e.span(),
            QuillError::Parse(e) => e.span(),
            QuillError::Compilation(e) => e.span(),
        }
    }

    /// The 1-based source line of the error.
    pub fn line(&self) -> u32 {
        self.span().line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = LexError::UnexpectedChar {
            ch: '#',
            span: Span::new(2, 5, 1),
        };
        assert_eq!(err.to_string(), "unexpected character '#' at line 2:5");
        assert_eq!(err.span(), Span::new(2, 5, 1));
    }

    #[test]
    fn parse_error_helpers() {
        let err = ParseError::expected_token(Span::new(1, 1, 1), "'('", "'{'");
        assert_eq!(err.kind, ParseErrorKind::ExpectedToken);
        assert!(err.to_string().contains("expected '(', found '{'"));
    }

    #[test]
    fn duplicate_declaration_display() {
        let err = CompilationError::DuplicateDeclaration {
            kind: DeclKind::Field,
            name: "left".into(),
            span: Span::new(3, 9, 4),
        };
        assert_eq!(err.to_string(), "at line 3:9: field 'left' is already declared");
        assert_eq!(err.category(), ErrorCategory::Declaration);
    }

    #[test]
    fn categories() {
        let span = Span::default();
        assert_eq!(
            CompilationError::ArrayOfArray { span }.category(),
            ErrorCategory::TypeResolution
        );
        assert_eq!(
            CompilationError::UnknownSymbol {
                name: "x".into(),
                span
            }
            .category(),
            ErrorCategory::TypeCheck
        );
        assert_eq!(
            CompilationError::BreakOutsideLoop { span }.category(),
            ErrorCategory::ControlFlow
        );
    }

    #[test]
    fn quill_error_wraps_and_reports_line() {
        let err: QuillError = CompilationError::InvalidAssignmentTarget {
            span: Span::new(7, 3, 1),
        }
        .into();
        assert_eq!(err.line(), 7);
        assert!(matches!(err, QuillError::Compilation(_)));
    }
}
