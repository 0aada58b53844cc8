use serde::Serialize;
use uuid::Uuid;

use super::state::{TranslationResult, WorkflowSnapshot};
use crate::gate::GateStage;

/// Notifications broadcast by a running workflow.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum WorkflowEvent {
    StatusChanged {
        snapshot: WorkflowSnapshot,
    },
    GateProgress {
        percent: f32,
        stage: GateStage,
    },
    /// The gate reached 100 %; sent once per gate run.
    GateReady,
    ValidationFailed {
        message: String,
    },
    Completed {
        result: TranslationResult,
    },
    Failed {
        message: String,
        detail: String,
    },
    StaleResultDiscarded {
        attempt: Uuid,
    },
}

impl WorkflowEvent {
    pub fn snapshot(&self) -> Option<&WorkflowSnapshot> {
        match self {
            WorkflowEvent::StatusChanged { snapshot } => Some(snapshot),
            _ => None,
        }
    }
}
