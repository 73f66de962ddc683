use thiserror::Error;

use crate::document::ElementKind;

/// Failure of an editing tool, before or while talking to the document service
#[derive(Error, Debug)]
pub enum EditError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Element not found: {object_id}")]
    ElementNotFound { object_id: String },

    #[error("Element {object_id} is a {found}, expected {expected}")]
    WrongElementKind {
        object_id: String,
        expected: &'static str,
        found: ElementKind,
    },

    #[error("Paragraph index {index} is out of range ({count} paragraphs)")]
    ParagraphOutOfRange { index: usize, count: usize },

    #[error("Document service error: {0:#}")]
    Service(#[from] anyhow::Error),
}

impl EditError {
    pub fn invalid(message: impl Into<String>) -> Self {
        EditError::InvalidInput(message.into())
    }

    /// Whether the caller can fix the request by changing its arguments
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, EditError::Service(_))
    }
}

pub type EditResult<T> = std::result::Result<T, EditError>;
