use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::document::{Document, DocumentExtension};
use crate::gate::GateStage;
use crate::languages::{LanguageOption, LanguagePair};
use crate::paginator::{render_line, Paginator};
use crate::time::format_local_date;

pub const INVALID_EXTENSION_MESSAGE: &str =
    "Please upload a valid document (PDF, TXT, MD, DOC, or CSV).";
pub const NO_DOCUMENT_MESSAGE: &str = "Please upload a valid document.";
pub const TRANSLATION_FAILED_MESSAGE: &str = "Translation failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Idle,
    FileSelected,
    WatchingGate,
    Translating,
    Completed,
    Cancelled,
    Error,
}

impl WorkflowStatus {
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowStatus::Idle => "idle",
            WorkflowStatus::FileSelected => "file selected",
            WorkflowStatus::WatchingGate => "watching the gate",
            WorkflowStatus::Translating => "translating",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Cancelled => "cancelled",
            WorkflowStatus::Error => "failed",
        }
    }

    /// A translation attempt owns the workflow in these states.
    pub fn is_busy(&self) -> bool {
        matches!(self, WorkflowStatus::WatchingGate | WorkflowStatus::Translating)
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of a finished translation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub text: String,
    pub source: &'static LanguageOption,
    pub target: &'static LanguageOption,
    pub document_name: String,
    pub document_fingerprint: String,
    pub completed_at: DateTime<Utc>,
}

impl TranslationResult {
    pub fn new(text: String, document: &Document, pair: LanguagePair) -> Self {
        Self {
            text,
            source: pair.source,
            target: pair.target,
            document_name: document.name().to_string(),
            document_fingerprint: document.fingerprint(),
            completed_at: Utc::now(),
        }
    }

    /// First `count` lines as drawn in the result card.
    pub fn preview(&self, count: usize) -> Vec<String> {
        self.text
            .split('\n')
            .take(count)
            .map(|line| render_line(line.strip_suffix('\r').unwrap_or(line)).to_string())
            .collect()
    }

    pub fn paginate(&self, lines_per_page: usize) -> Paginator {
        Paginator::new(&self.text, lines_per_page)
    }

    /// `<stem>.<target-code>.txt`
    pub fn download_file_name(&self) -> String {
        let stem = match self.document_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => self.document_name.as_str(),
        };
        let stem = if stem.trim().is_empty() { "translated" } else { stem };
        format!("{stem}.{}.txt", self.target.code)
    }

    pub fn completed_on(&self) -> String {
        format_local_date(self.completed_at)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub name: String,
    pub size: u64,
    pub extension: Option<DocumentExtension>,
}

impl From<&Document> for DocumentSummary {
    fn from(document: &Document) -> Self {
        Self {
            name: document.name().to_string(),
            size: document.size(),
            extension: document.extension(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateSnapshot {
    pub percent: f32,
    pub stage: GateStage,
    pub ready: bool,
}

/// Point-in-time view of a workflow, sent to the UI on every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub workflow_id: Uuid,
    pub status: WorkflowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentSummary>,
    pub source_language: &'static str,
    pub target_language: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<GateSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub has_result: bool,
    pub translation_in_flight: bool,
}
