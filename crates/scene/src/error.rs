use std::fmt;

use foundation::ObjectId;

use crate::entity::ObjectKind;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    NotFound { kind: ObjectKind, id: ObjectId },
    ResourceExhausted { what: &'static str },
    MalformedGeometry(String),
    KindMismatch { expected: ObjectKind, found: ObjectKind },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound { kind, id } => write!(f, "no {kind} with id {id}"),
            StoreError::ResourceExhausted { what } => {
                write!(f, "out of memory while building {what}")
            }
            StoreError::MalformedGeometry(msg) => write!(f, "malformed geometry: {msg}"),
            StoreError::KindMismatch { expected, found } => {
                write!(f, "expected a {expected}, found a {found}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;
