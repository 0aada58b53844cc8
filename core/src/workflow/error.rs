use thiserror::Error;

use super::state::{
    WorkflowStatus, INVALID_EXTENSION_MESSAGE, NO_DOCUMENT_MESSAGE, TRANSLATION_FAILED_MESSAGE,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("unsupported document type: {file_name}")]
    InvalidExtension { file_name: String },

    #[error("no document selected")]
    NoDocument,

    #[error("the gate has not finished yet")]
    GateNotReady,

    #[error("a translation attempt is already in progress")]
    Busy,

    #[error("cannot {action} while {status}")]
    InvalidTransition {
        action: &'static str,
        status: WorkflowStatus,
    },

    #[error("translation failed: {0}")]
    TranslationFailed(String),

    #[error("unknown language code: {0}")]
    UnknownLanguage(String),

    #[error("workflow is no longer running")]
    Closed,
}

impl WorkflowError {
    /// Inline message shown to the user, for errors the UI surfaces.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            WorkflowError::InvalidExtension { .. } => Some(INVALID_EXTENSION_MESSAGE),
            WorkflowError::NoDocument => Some(NO_DOCUMENT_MESSAGE),
            WorkflowError::TranslationFailed(_) => Some(TRANSLATION_FAILED_MESSAGE),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_error_names_state() {
        let err = WorkflowError::InvalidTransition {
            action: "retry",
            status: WorkflowStatus::Completed,
        };
        assert_eq!(err.to_string(), "cannot retry while completed");
        assert_eq!(err.user_message(), None);
    }

    #[test]
    fn validation_errors_have_user_messages() {
        let err = WorkflowError::InvalidExtension {
            file_name: "scan.png".into(),
        };
        assert_eq!(err.user_message(), Some(INVALID_EXTENSION_MESSAGE));
        assert_eq!(
            WorkflowError::NoDocument.user_message(),
            Some(NO_DOCUMENT_MESSAGE)
        );
    }
}
