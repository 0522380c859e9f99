use std::num::{ParseFloatError, ParseIntError};

/// Result alias used by every parser in this crate.
pub type Result<T> = std::result::Result<T, ParseError>;

/// A parse error from a `.tml` document or a `.tss` style sheet.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at {line}:{col}: {kind}")]
pub struct ParseError {
    pub kind: ErrorKind,
    /// 1-based source line number where the error occurred.
    pub line: usize,
    /// 1-based source column number where the error occurred.
    pub col: usize,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, line: usize, col: usize) -> Self {
        Self { kind, line, col }
    }
}

/// Failure of the numeric conversion behind a style literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumberError {
    #[error(transparent)]
    Int(#[from] ParseIntError),
    #[error(transparent)]
    Float(#[from] ParseFloatError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    // ── Cursor ────────────────────────────────────────────────────────────
    #[error("unexpected end of input")]
    UnexpectedEof,

    // ── Elements ──────────────────────────────────────────────────────────
    #[error("incomplete element definition")]
    Incomplete,
    #[error("'<' must be followed by an element identifier")]
    Identifier,
    #[error("element identifier has to be followed by ' ', '/' or '>'")]
    AfterIdent,
    #[error("'/' must always be followed by '>' when it is part of an element")]
    AfterSlash,
    #[error("found closing syntax but there is no element to close")]
    ExtraClosure,
    #[error("document ended with unclosed elements")]
    MissingClosure,
    #[error("use of unknown identifier {0:?}")]
    Unknown(String),
    #[error("'<#' must be followed by '>'")]
    CommentAfterHash,
    #[error("comment is not closed, expected '<#>'")]
    CommentNotClosed,

    // ── Prefabs ───────────────────────────────────────────────────────────
    #[error("prefab {0:?} cannot shadow an existing element or prefab")]
    PrefabShadow(String),
    #[error("template syntax outside a prefab block is not allowed")]
    TemplateOutside,
    #[error("only an identifier is allowed between '{{}}', spaces cannot be there")]
    TemplateIdent,
    #[error("prefab definition cannot have attributes")]
    PrefabAttributes,
    #[error("prefab definitions cannot be nested")]
    NestedPrefab,
    #[error("'<!/>' must close the prefab definition, an element inside it is still open")]
    PrefabClosure,

    // ── Attributes ────────────────────────────────────────────────────────
    #[error("attribute can be assigned with '=' or set to true by following it with ' '")]
    Assignment,
    #[error("attribute definition is incomplete")]
    AttribIncomplete,
    #[error("'=' can be followed only by '[' (list), '\"' (single value) or '{{' (template)")]
    ValueStart,
    #[error("extra space after a list value is not allowed")]
    ExtraSpace,
    #[error("unexpected in-between byte in list definition, use just one ' ' to separate values")]
    BetweenByte,
    #[error("list is incomplete")]
    ListIncomplete,
    #[error("invalid style attribute: {0}")]
    Style(Box<ParseError>),

    // ── Strings and escapes ───────────────────────────────────────────────
    #[error("string is not terminated")]
    StringNotTerminated,
    #[error("rune is not terminated or cannot be decoded as utf8")]
    InvalidRune,
    #[error("escape sequence is not terminated")]
    EscapeIncomplete,
    #[error("illegal character in escape, only {0} are allowed")]
    EscapeIllegal(&'static str),
    #[error("escape value overflow, max is {0}")]
    EscapeOverflow(u32),
    #[error("invalid escape identifier")]
    EscapeIdent,

    // ── Styles ────────────────────────────────────────────────────────────
    #[error("expected identifier")]
    StyleIdent,
    #[error("expected {expected} but found {found:?}")]
    ExpectedByte { expected: &'static str, found: char },
    #[error("field {0:?} has no values")]
    NoValues(String),
    #[error("field is incomplete, it has to be terminated with ';'")]
    FieldIncomplete,
    #[error("style is incomplete, it has to be terminated with '}}'")]
    StyleIncomplete,
    #[error("failed to parse number {text:?}")]
    Number {
        text: String,
        #[source]
        source: NumberError,
    },
    #[error("expected value after ' '")]
    ExpectedValue,
}
