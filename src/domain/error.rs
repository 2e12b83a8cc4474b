use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid {kind}: `{value}`")]
    InvalidIdentifier { kind: &'static str, value: String },
    #[error("content exceeds {limit} characters (got {chars})")]
    ContentTooLarge { chars: usize, limit: usize },
}

impl DomainError {
    pub fn invalid_identifier(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            kind,
            value: value.into(),
        }
    }

    pub fn content_too_large(chars: usize, limit: usize) -> Self {
        Self::ContentTooLarge { chars, limit }
    }
}
