use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::error::WorkflowError;
use super::events::WorkflowEvent;
use super::machine::{CloseGateOutcome, Effect, TranslationWorkflow};
use super::state::{TranslationResult, WorkflowSnapshot};
use crate::config::{ViewerOptions, WorkflowConfig};
use crate::document::Document;
use crate::gate::GateTimer;
use crate::paginator::Paginator;
use crate::translate::{DocumentTranslator, SimulatedTranslator, TranslateError, TranslateRequest};

const COMMAND_CAPACITY: usize = 16;
const INTERNAL_CAPACITY: usize = 64;
const EVENT_CAPACITY: usize = 512;

type Reply<T> = oneshot::Sender<T>;

#[derive(Debug)]
enum Command {
    SelectFile {
        document: Document,
        reply: Reply<Result<(), WorkflowError>>,
    },
    StartTranslation {
        reply: Reply<Result<(), WorkflowError>>,
    },
    CloseGate {
        reply: Reply<Result<CloseGateOutcome, WorkflowError>>,
    },
    CancelGate {
        reply: Reply<Result<(), WorkflowError>>,
    },
    ConfirmGate {
        reply: Reply<Result<(), WorkflowError>>,
    },
    Retry {
        reply: Reply<Result<(), WorkflowError>>,
    },
    Reset {
        reply: Reply<()>,
    },
    SwapLanguages {
        reply: Reply<Result<(), WorkflowError>>,
    },
    SetLanguages {
        source: String,
        target: String,
        reply: Reply<Result<(), WorkflowError>>,
    },
    Snapshot {
        reply: Reply<WorkflowSnapshot>,
    },
    Result {
        reply: Reply<Option<TranslationResult>>,
    },
}

/// Messages produced by the actor's own timers and translate tasks.
#[derive(Debug)]
enum Internal {
    GateTick(u64),
    ReturnElapsed(u64),
    TranslateFinished {
        attempt: Uuid,
        outcome: Result<String, TranslateError>,
    },
}

/// Cloneable handle to one running workflow instance.
///
/// The instance lives in its own task and stops once every handle has been
/// dropped; its gate timer and pending cancel-return go with it.
#[derive(Clone)]
pub struct WorkflowRunner {
    id: Uuid,
    tx: mpsc::Sender<Command>,
    events: broadcast::Sender<WorkflowEvent>,
    viewer: ViewerOptions,
}

impl WorkflowRunner {
    /// Spawn a workflow onto the current tokio runtime.
    pub fn spawn(config: WorkflowConfig, translator: Arc<dyn DocumentTranslator>) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
        let (internal_tx, internal_rx) = mpsc::channel(INTERNAL_CAPACITY);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let workflow = TranslationWorkflow::new(&config);
        let id = workflow.id();
        debug!("spawning workflow {} with translator '{}'", id, translator.name());

        let actor = WorkflowActor {
            workflow,
            translator,
            events: events.clone(),
            internal_tx,
            gate_timer: None,
            return_timer: None,
        };
        tokio::spawn(actor.run(rx, internal_rx));

        Self {
            id,
            tx,
            events,
            viewer: config.viewer,
        }
    }

    pub fn with_simulator(config: WorkflowConfig) -> Self {
        let translator = Arc::new(SimulatedTranslator::from_options(&config.simulator));
        Self::spawn(config, translator)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    pub async fn select_file(&self, document: Document) -> Result<(), WorkflowError> {
        self.request(|reply| Command::SelectFile { document, reply })
            .await?
    }

    pub async fn start_translation(&self) -> Result<(), WorkflowError> {
        self.request(|reply| Command::StartTranslation { reply })
            .await?
    }

    pub async fn close_gate(&self) -> Result<CloseGateOutcome, WorkflowError> {
        self.request(|reply| Command::CloseGate { reply }).await?
    }

    pub async fn cancel_gate(&self) -> Result<(), WorkflowError> {
        self.request(|reply| Command::CancelGate { reply }).await?
    }

    pub async fn confirm_gate(&self) -> Result<(), WorkflowError> {
        self.request(|reply| Command::ConfirmGate { reply }).await?
    }

    pub async fn retry(&self) -> Result<(), WorkflowError> {
        self.request(|reply| Command::Retry { reply }).await?
    }

    pub async fn reset(&self) -> Result<(), WorkflowError> {
        self.request(|reply| Command::Reset { reply }).await
    }

    pub async fn swap_languages(&self) -> Result<(), WorkflowError> {
        self.request(|reply| Command::SwapLanguages { reply })
            .await?
    }

    pub async fn set_languages(&self, source: &str, target: &str) -> Result<(), WorkflowError> {
        let source = source.to_string();
        let target = target.to_string();
        self.request(|reply| Command::SetLanguages {
            source,
            target,
            reply,
        })
        .await?
    }

    pub async fn snapshot(&self) -> Result<WorkflowSnapshot, WorkflowError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    pub async fn result(&self) -> Result<Option<TranslationResult>, WorkflowError> {
        self.request(|reply| Command::Result { reply }).await
    }

    /// Leading lines of the current result, as shown in the result card.
    pub async fn preview(&self) -> Result<Option<Vec<String>>, WorkflowError> {
        let result = self.result().await?;
        Ok(result.map(|result| result.preview(self.viewer.preview_lines)))
    }

    /// Full-screen viewer over the current result, starting at page 1.
    pub async fn open_viewer(&self) -> Result<Option<Paginator>, WorkflowError> {
        let result = self.result().await?;
        Ok(result.map(|result| result.paginate(self.viewer.lines_per_page)))
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, WorkflowError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| WorkflowError::Closed)?;
        rx.await.map_err(|_| WorkflowError::Closed)
    }
}

struct WorkflowActor {
    workflow: TranslationWorkflow,
    translator: Arc<dyn DocumentTranslator>,
    events: broadcast::Sender<WorkflowEvent>,
    internal_tx: mpsc::Sender<Internal>,
    gate_timer: Option<GateTimer>,
    return_timer: Option<JoinHandle<()>>,
}

impl WorkflowActor {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut internal: mpsc::Receiver<Internal>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(message) = internal.recv() => self.handle_internal(message),
            }
        }

        debug!("workflow {} stopped", self.workflow.id());
        self.gate_timer = None;
        if let Some(handle) = self.return_timer.take() {
            handle.abort();
        }
    }

    fn handle_command(&mut self, command: Command) {
        // Events are broadcast before the reply is sent.
        match command {
            Command::SelectFile { document, reply } => {
                let outcome = self.workflow.select_file(document);
                self.flush(reply, outcome);
            }
            Command::StartTranslation { reply } => {
                let outcome = self.workflow.start_translation();
                self.flush(reply, outcome);
            }
            Command::CloseGate { reply } => {
                let outcome = self.workflow.close_gate();
                self.flush(reply, outcome);
            }
            Command::CancelGate { reply } => {
                let outcome = self.workflow.cancel_gate();
                self.flush(reply, outcome);
            }
            Command::ConfirmGate { reply } => {
                let outcome = self.workflow.confirm_gate();
                self.flush(reply, outcome);
            }
            Command::Retry { reply } => {
                let outcome = self.workflow.retry();
                self.flush(reply, outcome);
            }
            Command::Reset { reply } => {
                self.workflow.reset();
                self.flush(reply, ());
            }
            Command::SwapLanguages { reply } => {
                let outcome = self.workflow.swap_languages();
                self.flush(reply, outcome);
            }
            Command::SetLanguages {
                source,
                target,
                reply,
            } => {
                let outcome = self.workflow.set_languages(&source, &target);
                self.flush(reply, outcome);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.workflow.snapshot());
            }
            Command::Result { reply } => {
                let _ = reply.send(self.workflow.result().cloned());
            }
        }
    }

    fn handle_internal(&mut self, message: Internal) {
        match message {
            Internal::GateTick(gate_id) => {
                self.workflow.gate_tick(gate_id);
            }
            Internal::ReturnElapsed(token) => {
                if self.workflow.return_elapsed(token) {
                    self.return_timer = None;
                }
            }
            Internal::TranslateFinished { attempt, outcome } => {
                self.workflow.translation_finished(attempt, outcome);
            }
        }
        self.apply_effects();
    }

    fn flush<T>(&mut self, reply: Reply<T>, value: T) {
        self.apply_effects();
        let _ = reply.send(value);
    }

    fn apply_effects(&mut self) {
        for effect in self.workflow.drain_effects() {
            match effect {
                Effect::StartGate { gate_id, period } => {
                    let tx = self.internal_tx.clone();
                    self.gate_timer =
                        Some(GateTimer::spawn(period, tx, move || Internal::GateTick(gate_id)));
                }
                Effect::StopGate => {
                    if let Some(timer) = self.gate_timer.take() {
                        timer.stop();
                    }
                }
                Effect::ScheduleReturn { token, delay } => {
                    if let Some(previous) = self.return_timer.take() {
                        previous.abort();
                    }
                    let tx = self.internal_tx.clone();
                    self.return_timer = Some(tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(Internal::ReturnElapsed(token)).await;
                    }));
                }
                Effect::Translate { attempt, request } => self.spawn_translation(attempt, request),
                Effect::Emit(event) => {
                    // No subscribers is fine
                    let _ = self.events.send(event);
                }
            }
        }
    }

    fn spawn_translation(&self, attempt: Uuid, request: TranslateRequest) {
        let translator = Arc::clone(&self.translator);
        let tx = self.internal_tx.clone();

        tokio::spawn(async move {
            let call = tokio::spawn(async move { translator.translate(request).await });
            let outcome = match call.await {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    warn!("translate task for attempt {} ended: {}", attempt, join_err);
                    Err(TranslateError::Aborted(join_err.to_string()))
                }
            };
            let _ = tx
                .send(Internal::TranslateFinished { attempt, outcome })
                .await;
        });
    }
}
