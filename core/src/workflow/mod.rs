//! Document translation workflow: the state machine and the task that
//! drives it.

mod error;
mod events;
mod machine;
mod runner;
mod state;

pub use error::WorkflowError;
pub use events::WorkflowEvent;
pub use machine::{CloseGateOutcome, Effect, TranslationWorkflow};
pub use runner::WorkflowRunner;
pub use state::{
    DocumentSummary, GateSnapshot, TranslationResult, WorkflowSnapshot, WorkflowStatus,
    INVALID_EXTENSION_MESSAGE, NO_DOCUMENT_MESSAGE, TRANSLATION_FAILED_MESSAGE,
};
