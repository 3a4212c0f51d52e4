use std::sync::Arc;

use shared::domain::{District, RamenType};
use thiserror::Error;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{
    form::FormState,
    render::{render, RenderedContent},
    submission::{Resolution, SubmissionController, SubmissionOutcome, SubmitDecision},
    transport::RecommendationService,
};

pub const COMMAND_QUEUE_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    ToggleDistrict(District),
    ToggleRamenType(RamenType),
    /// Raw value of the minimum price control.
    SelectMinPrice(String),
    /// Raw value of the maximum price control.
    SelectMaxPrice(String),
    Submit,
}

impl SessionCommand {
    fn name(&self) -> &'static str {
        match self {
            SessionCommand::ToggleDistrict(_) => "toggle_district",
            SessionCommand::ToggleRamenType(_) => "toggle_ramen_type",
            SessionCommand::SelectMinPrice(_) => "select_min_price",
            SessionCommand::SelectMaxPrice(_) => "select_max_price",
            SessionCommand::Submit => "submit",
        }
    }
}

/// What a host renders. `content` is present exactly when `outcome` is
/// `Success`, and holds that text already rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub form: FormState,
    pub outcome: SubmissionOutcome,
    pub content: Option<Arc<RenderedContent>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("session command queue is full; please retry")]
    QueueFull,
    #[error("form session has stopped")]
    Closed,
}

/// Handle to a task that owns one form. Commands are applied in arrival
/// order; requests run on spawned tasks and report back to it.
pub struct FormSession {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<()>,
}

impl FormSession {
    /// Starts the session task on the current tokio runtime.
    pub fn spawn(service: Arc<dyn RecommendationService>) -> Self {
        let (commands, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (snapshot_tx, snapshots) = watch::channel(SessionSnapshot::default());
        let task = tokio::spawn(run_session(service, command_rx, snapshot_tx));
        Self {
            commands,
            snapshots,
            task,
        }
    }

    /// Queues a command without waiting.
    pub fn dispatch(&self, command: SessionCommand) -> Result<(), DispatchError> {
        let name = command.name();
        match self.commands.try_send(command) {
            Ok(()) => {
                debug!(command = name, "queued session command");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => Err(DispatchError::QueueFull),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(DispatchError::Closed),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }
}

impl Drop for FormSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct SessionState {
    form: FormState,
    controller: SubmissionController,
    content: Option<Arc<RenderedContent>>,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            form: self.form.clone(),
            outcome: self.controller.outcome().clone(),
            content: self.content.clone(),
        }
    }

    fn refresh_content(&mut self) {
        self.content = self
            .controller
            .outcome()
            .text()
            .map(|text| Arc::new(render(text)));
    }
}

async fn run_session(
    service: Arc<dyn RecommendationService>,
    mut commands: mpsc::Receiver<SessionCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
) {
    let mut state = SessionState {
        form: FormState::default(),
        controller: SubmissionController::new(),
        content: None,
    };
    let (resolved_tx, mut resolved_rx) = mpsc::unbounded_channel::<Resolution>();

    loop {
        // Finished requests are drained before the next command.
        tokio::select! {
            biased;
            Some(resolution) = resolved_rx.recv() => {
                if state.controller.apply(resolution) {
                    state.refresh_content();
                }
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("form session closed");
                    break;
                };
                handle_command(&mut state, command, &service, &resolved_tx);
            }
        }

        let next = state.snapshot();
        snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

fn handle_command(
    state: &mut SessionState,
    command: SessionCommand,
    service: &Arc<dyn RecommendationService>,
    resolved_tx: &mpsc::UnboundedSender<Resolution>,
) {
    match command {
        SessionCommand::ToggleDistrict(district) => {
            state.form = state.form.toggle_district(district);
        }
        SessionCommand::ToggleRamenType(ramen_type) => {
            state.form = state.form.toggle_ramen_type(ramen_type);
        }
        SessionCommand::SelectMinPrice(raw) => match state.form.price_range.parse_min(&raw) {
            Ok(range) => state.form = state.form.with_price_range(range),
            Err(err) => warn!(error = %err, "ignoring minimum price selection"),
        },
        SessionCommand::SelectMaxPrice(raw) => match state.form.price_range.parse_max(&raw) {
            Ok(range) => state.form = state.form.with_price_range(range),
            Err(err) => warn!(error = %err, "ignoring maximum price selection"),
        },
        SessionCommand::Submit => {
            let decision = state.controller.submit(&state.form);
            state.refresh_content();
            if let SubmitDecision::Issued(ticket) = decision {
                let service = Arc::clone(service);
                let resolved_tx = resolved_tx.clone();
                tokio::spawn(async move {
                    let resolution = ticket.dispatch(service.as_ref()).await;
                    // The session may already be gone.
                    let _ = resolved_tx.send(resolution);
                });
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
