//! The translation workflow as a synchronous state machine.
//!
//! Every operation mutates the machine and queues [`Effect`]s describing the
//! work the caller must perform (start or stop the gate timer, schedule the
//! return from `Cancelled`, call the translator, broadcast events). The
//! machine itself never sleeps or spawns, so each transition is atomic and
//! the runner only has to execute effects in order.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use uuid::Uuid;

use super::error::WorkflowError;
use super::events::WorkflowEvent;
use super::state::{
    DocumentSummary, GateSnapshot, TranslationResult, WorkflowSnapshot, WorkflowStatus,
    INVALID_EXTENSION_MESSAGE, NO_DOCUMENT_MESSAGE, TRANSLATION_FAILED_MESSAGE,
};
use crate::config::WorkflowConfig;
use crate::document::Document;
use crate::gate::{GateTick, GateTicker};
use crate::languages::{find_language, LanguagePair};
use crate::translate::{TranslateError, TranslateRequest};

/// Work requested by a transition.
#[derive(Debug)]
pub enum Effect {
    StartGate { gate_id: u64, period: Duration },
    StopGate,
    /// Deliver `return_elapsed(token)` after `delay`.
    ScheduleReturn { token: u64, delay: Duration },
    Translate {
        attempt: Uuid,
        request: TranslateRequest,
    },
    Emit(WorkflowEvent),
}

/// Outcome of the gate's close button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseGateOutcome {
    /// Progress is below 100 %; the user has to confirm before cancelling.
    ConfirmationRequired,
    Cancelled,
}

#[derive(Debug)]
struct ActiveGate {
    id: u64,
    ticker: GateTicker,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    attempt: Uuid,
    pair: LanguagePair,
}

#[derive(Debug)]
pub struct TranslationWorkflow {
    id: Uuid,
    status: WorkflowStatus,
    document: Option<Arc<Document>>,
    pair: LanguagePair,
    result: Option<TranslationResult>,
    error: Option<String>,
    gate: Option<ActiveGate>,
    in_flight: Option<InFlight>,
    pending_return: Option<u64>,
    generation: u64,
    gate_period: Duration,
    gate_step: u32,
    cancel_return_delay: Duration,
    effects: Vec<Effect>,
}

impl TranslationWorkflow {
    pub fn new(config: &WorkflowConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: WorkflowStatus::Idle,
            document: None,
            pair: config.language_pair(),
            result: None,
            error: None,
            gate: None,
            in_flight: None,
            pending_return: None,
            generation: 0,
            gate_period: config.gate.tick_interval(),
            gate_step: config.gate.step_hundredths(),
            cancel_return_delay: config.cancel_return_delay(),
            effects: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_deref()
    }

    pub fn language_pair(&self) -> LanguagePair {
        self.pair
    }

    pub fn result(&self) -> Option<&TranslationResult> {
        self.result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_gate_ready(&self) -> bool {
        self.gate
            .as_ref()
            .map(|gate| gate.ticker.is_ready())
            .unwrap_or(false)
    }

    pub fn translation_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Take the effects queued since the last call.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            workflow_id: self.id,
            status: self.status,
            document: self.document.as_deref().map(DocumentSummary::from),
            source_language: self.pair.source.code,
            target_language: self.pair.target.code,
            gate: self.gate.as_ref().map(|gate| {
                let progress = gate.ticker.progress();
                GateSnapshot {
                    percent: progress.percent(),
                    stage: progress.stage(),
                    ready: gate.ticker.is_ready(),
                }
            }),
            error: self.error.clone(),
            has_result: self.result.is_some(),
            translation_in_flight: self.in_flight.is_some(),
        }
    }

    pub fn select_file(&mut self, document: Document) -> Result<(), WorkflowError> {
        if self.status.is_busy() {
            return Err(WorkflowError::Busy);
        }

        if !document.is_supported() {
            info!("rejected document with unsupported type: {}", document.name());
            self.fail_validation(INVALID_EXTENSION_MESSAGE);
            return Err(WorkflowError::InvalidExtension {
                file_name: document.name().to_string(),
            });
        }

        info!(
            "workflow {} selected {} ({} bytes)",
            self.id,
            document.name(),
            document.size()
        );
        self.document = Some(Arc::new(document));
        self.result = None;
        self.error = None;
        self.pending_return = None;
        self.status = WorkflowStatus::FileSelected;
        self.emit_status();
        Ok(())
    }

    pub fn start_translation(&mut self) -> Result<(), WorkflowError> {
        match self.status {
            WorkflowStatus::FileSelected => {}
            WorkflowStatus::Idle => {
                self.fail_validation(NO_DOCUMENT_MESSAGE);
                return Err(WorkflowError::NoDocument);
            }
            status if status.is_busy() => return Err(WorkflowError::Busy),
            status => return Err(self.invalid("start translation", status)),
        }

        if self.document.is_none() {
            self.fail_validation(NO_DOCUMENT_MESSAGE);
            return Err(WorkflowError::NoDocument);
        }

        self.generation += 1;
        let gate_id = self.generation;
        self.gate = Some(ActiveGate {
            id: gate_id,
            ticker: GateTicker::new(self.gate_step),
        });
        self.error = None;
        self.status = WorkflowStatus::WatchingGate;
        debug!("workflow {} started gate {}", self.id, gate_id);

        self.effects.push(Effect::StartGate {
            gate_id,
            period: self.gate_period,
        });
        self.emit_status();
        Ok(())
    }

    /// Apply one timer tick. Ticks from a stopped or replaced gate are
    /// ignored and yield `None`.
    pub fn gate_tick(&mut self, gate_id: u64) -> Option<GateTick> {
        if self.status != WorkflowStatus::WatchingGate {
            debug!("ignoring gate tick {} while {}", gate_id, self.status);
            return None;
        }
        let gate = self.gate.as_mut().filter(|gate| gate.id == gate_id)?;

        let tick = gate.ticker.tick();
        let progress = gate.ticker.progress();
        match tick {
            GateTick::Advanced(_) => {
                self.emit(WorkflowEvent::GateProgress {
                    percent: progress.percent(),
                    stage: progress.stage(),
                });
            }
            GateTick::Ready => {
                self.emit(WorkflowEvent::GateProgress {
                    percent: progress.percent(),
                    stage: progress.stage(),
                });
                self.emit(WorkflowEvent::GateReady);
                self.effects.push(Effect::StopGate);
                info!("workflow {} gate {} ready", self.id, gate_id);
                self.emit_status();
            }
            GateTick::Finished => {}
        }
        Some(tick)
    }

    pub fn close_gate(&mut self) -> Result<CloseGateOutcome, WorkflowError> {
        if self.status != WorkflowStatus::WatchingGate {
            return Err(self.invalid("close the gate", self.status));
        }
        if !self.is_gate_ready() {
            return Ok(CloseGateOutcome::ConfirmationRequired);
        }
        self.cancel_gate()?;
        Ok(CloseGateOutcome::Cancelled)
    }

    pub fn cancel_gate(&mut self) -> Result<(), WorkflowError> {
        if self.status != WorkflowStatus::WatchingGate {
            return Err(self.invalid("cancel the gate", self.status));
        }

        self.gate = None;
        self.effects.push(Effect::StopGate);

        self.generation += 1;
        let token = self.generation;
        self.pending_return = Some(token);
        self.status = WorkflowStatus::Cancelled;
        info!("workflow {} gate cancelled", self.id);

        self.effects.push(Effect::ScheduleReturn {
            token,
            delay: self.cancel_return_delay,
        });
        self.emit_status();
        Ok(())
    }

    /// Automatic `Cancelled -> FileSelected` once the delay has passed.
    /// Returns whether the transition happened.
    pub fn return_elapsed(&mut self, token: u64) -> bool {
        if self.status != WorkflowStatus::Cancelled || self.pending_return != Some(token) {
            debug!("ignoring stale cancel return {}", token);
            return false;
        }

        self.pending_return = None;
        self.status = WorkflowStatus::FileSelected;
        self.emit_status();
        true
    }

    pub fn confirm_gate(&mut self) -> Result<(), WorkflowError> {
        match self.status {
            WorkflowStatus::WatchingGate => {}
            WorkflowStatus::Translating => return Err(WorkflowError::Busy),
            status => return Err(self.invalid("confirm the gate", status)),
        }
        if !self.is_gate_ready() {
            return Err(WorkflowError::GateNotReady);
        }
        let document = self.document.clone().ok_or(WorkflowError::NoDocument)?;

        self.gate = None;
        self.effects.push(Effect::StopGate);

        let attempt = Uuid::new_v4();
        self.in_flight = Some(InFlight {
            attempt,
            pair: self.pair,
        });
        self.status = WorkflowStatus::Translating;
        info!(
            "workflow {} translating {} ({} -> {}), attempt {}",
            self.id,
            document.name(),
            self.pair.source.code,
            self.pair.target.code,
            attempt
        );

        self.effects.push(Effect::Translate {
            attempt,
            request: TranslateRequest::new(document, self.pair),
        });
        self.emit_status();
        Ok(())
    }

    /// Apply the outcome of a translate call. Outcomes for any attempt other
    /// than the one in flight are discarded; returns whether it was applied.
    pub fn translation_finished(
        &mut self,
        attempt: Uuid,
        outcome: Result<String, TranslateError>,
    ) -> bool {
        let in_flight = match self.in_flight {
            Some(in_flight)
                if in_flight.attempt == attempt && self.status == WorkflowStatus::Translating =>
            {
                in_flight
            }
            _ => {
                debug!("discarding stale translation result for attempt {}", attempt);
                self.emit(WorkflowEvent::StaleResultDiscarded { attempt });
                return false;
            }
        };
        self.in_flight = None;

        let Some(document) = self.document.clone() else {
            // Translating always has a document; treat a missing one as a failure
            self.fail_translation(WorkflowError::NoDocument.to_string());
            return true;
        };

        match outcome {
            Ok(text) => {
                let result = TranslationResult::new(text, &document, in_flight.pair);
                info!(
                    "workflow {} completed {} ({} chars)",
                    self.id,
                    document.name(),
                    result.text.chars().count()
                );
                self.result = Some(result.clone());
                self.error = None;
                self.status = WorkflowStatus::Completed;
                self.emit(WorkflowEvent::Completed { result });
                self.emit_status();
            }
            Err(err) => {
                let failure = WorkflowError::TranslationFailed(err.to_string());
                self.fail_translation(failure.to_string());
            }
        }
        true
    }

    pub fn retry(&mut self) -> Result<(), WorkflowError> {
        if self.status != WorkflowStatus::Error {
            return Err(self.invalid("retry", self.status));
        }

        self.error = None;
        self.status = WorkflowStatus::FileSelected;
        self.emit_status();
        Ok(())
    }

    /// Return to `Idle` from any state. A translation still in flight is not
    /// aborted; its outcome will be discarded when it arrives.
    pub fn reset(&mut self) {
        if self.gate.take().is_some() {
            self.effects.push(Effect::StopGate);
        }
        if let Some(in_flight) = self.in_flight.take() {
            info!(
                "workflow {} reset with attempt {} in flight; its result will be discarded",
                self.id, in_flight.attempt
            );
        }

        self.generation += 1;
        self.document = None;
        self.result = None;
        self.error = None;
        self.pending_return = None;
        self.status = WorkflowStatus::Idle;
        self.emit_status();
    }

    pub fn swap_languages(&mut self) -> Result<(), WorkflowError> {
        self.ensure_languages_editable("swap languages")?;
        self.pair.swap();
        self.emit_status();
        Ok(())
    }

    pub fn set_languages(&mut self, source: &str, target: &str) -> Result<(), WorkflowError> {
        self.ensure_languages_editable("change languages")?;
        let source = find_language(source)
            .ok_or_else(|| WorkflowError::UnknownLanguage(source.to_string()))?;
        let target = find_language(target)
            .ok_or_else(|| WorkflowError::UnknownLanguage(target.to_string()))?;

        self.pair = LanguagePair::new(source, target);
        self.emit_status();
        Ok(())
    }

    fn ensure_languages_editable(&self, action: &'static str) -> Result<(), WorkflowError> {
        match self.status {
            WorkflowStatus::Idle | WorkflowStatus::FileSelected => Ok(()),
            status => Err(self.invalid(action, status)),
        }
    }

    fn fail_validation(&mut self, message: &str) {
        self.error = Some(message.to_string());
        self.emit(WorkflowEvent::ValidationFailed {
            message: message.to_string(),
        });
        self.emit_status();
    }

    fn fail_translation(&mut self, detail: String) {
        warn!("workflow {} translation failed: {}", self.id, detail);
        self.error = Some(TRANSLATION_FAILED_MESSAGE.to_string());
        self.status = WorkflowStatus::Error;
        self.emit(WorkflowEvent::Failed {
            message: TRANSLATION_FAILED_MESSAGE.to_string(),
            detail,
        });
        self.emit_status();
    }

    fn invalid(&self, action: &'static str, status: WorkflowStatus) -> WorkflowError {
        debug!("workflow {} rejected '{}' while {}", self.id, action, status);
        WorkflowError::InvalidTransition { action, status }
    }

    fn emit(&mut self, event: WorkflowEvent) {
        self.effects.push(Effect::Emit(event));
    }

    fn emit_status(&mut self) {
        let snapshot = self.snapshot();
        self.emit(WorkflowEvent::StatusChanged { snapshot });
    }
}
