use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OscError {
    #[error("truncated {context}: need {needed} bytes, have {available}")]
    Truncated {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("packet too large: {size} bytes (max {max})")]
    PacketTooLarge { size: usize, max: usize },

    #[error("unterminated string in {0}")]
    UnterminatedString(&'static str),

    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    #[error("invalid address pattern: {0:?}")]
    InvalidAddress(String),

    #[error("type tag string does not start with ','")]
    MissingTypeTags,

    #[error("unsupported type tag {0:?}")]
    UnsupportedTypeTag(char),

    #[error("invalid bundle element size {size} with {remaining} bytes remaining")]
    InvalidElementSize { size: i32, remaining: usize },

    #[error("invalid blob size {0}")]
    InvalidBlobSize(i32),

    #[error("bundle nesting exceeds depth {0}")]
    NestingTooDeep(usize),

    #[error("string contains an interior NUL byte")]
    InteriorNul,

    #[error("missing argument {index}")]
    MissingArgument { index: usize },

    #[error("argument {index}: expected {expected}, found {found}")]
    ArgumentType {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
}

pub type OscResult<T> = Result<T, OscError>;
