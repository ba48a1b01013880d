use crate::DocId;

pub type Result<T> = std::result::Result<T, SearchError>;

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("can't add empty document")]
    EmptyDocument,

    #[error("document with id {0} already exists")]
    DuplicateId(DocId),

    #[error("can't add document with negative id {0}")]
    NegativeId(DocId),

    #[error("term {0:?} contains control characters")]
    InvalidTerm(String),

    #[error("invalid minus term {0:?}")]
    InvalidMinusTerm(String),

    #[error("page size must be positive")]
    ZeroPageSize,

    #[error("no document with id {0}")]
    DocumentNotFound(DocId),
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::DocumentNotFound(_) => ErrorKind::NotFound,
            SearchError::EmptyDocument
            | SearchError::DuplicateId(_)
            | SearchError::NegativeId(_)
            | SearchError::InvalidTerm(_)
            | SearchError::InvalidMinusTerm(_)
            | SearchError::ZeroPageSize => ErrorKind::InvalidArgument,
        }
    }
}
