//! Error types shared across the editor crates (thiserror-based).

use thiserror::Error;

use crate::id::{ElementId, SectionId};

/// Why an editor operation left the state untouched.
///
/// Rejections are not failures of the editor: every operation that returns one
/// is a no-op, so callers may ignore them. They exist so hosts and tests can
/// tell *why* nothing happened.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("no section with id {0}")]
    SectionNotFound(SectionId),

    #[error("no element with id {0}")]
    UnknownElement(ElementId),

    #[error("no element {element} in section {section}")]
    ElementNotFound {
        section: SectionId,
        element: ElementId,
    },

    #[error("a template must keep at least one section")]
    LastSection,

    #[error("already at the edge of the list")]
    AtBoundary,

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("operation would not change anything")]
    Unchanged,

    #[error("element {0} is locked against move, resize and rotate")]
    ElementLocked(ElementId),

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,
}

/// Coarse category of a [`Rejection`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RejectionKind {
    /// A section or element id that does not exist.
    InvalidReference,
    /// The operation would break a structural invariant or has nothing to do.
    InvariantViolation,
    /// Geometric edit on a locked element.
    LockedElementViolation,
    /// Undo or redo with an empty stack.
    HistoryUnderflow,
}

impl Rejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Rejection::SectionNotFound(_)
            | Rejection::UnknownElement(_)
            | Rejection::ElementNotFound { .. } => RejectionKind::InvalidReference,
            Rejection::LastSection
            | Rejection::AtBoundary
            | Rejection::InvalidValue { .. }
            | Rejection::Unchanged => RejectionKind::InvariantViolation,
            Rejection::ElementLocked(_) => RejectionKind::LockedElementViolation,
            Rejection::NothingToUndo | Rejection::NothingToRedo => RejectionKind::HistoryUnderflow,
        }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Rejection::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Result of an editor operation.
pub type EditResult<T> = Result<T, Rejection>;

/// Errors loading editor configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reject non-finite numbers for the named field.
pub fn ensure_finite(field: &'static str, value: f64) -> EditResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Rejection::invalid(field, format!("{value} is not a finite number")))
    }
}
