use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("missing sequence counter")]
    MissingCounter,
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("invalid {name} (field {index}): {value:?}")]
    InvalidField {
        index: usize,
        name: &'static str,
        value: String,
    },
}
