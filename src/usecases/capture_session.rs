//! Capture session: owns one workflow snapshot and runs the effects its transitions emit.
//!
//! - The lock is held only while a pure transition is applied, never across
//!   processing or dispatch, so other actions can queue up meanwhile
//! - Completions are fed back as actions tagged with the generation they were issued under

use crate::domain::{Action, DispatchOutcome, DomainError, Effect, WorkflowState, transition};
use crate::ports::{CapturePort, DispatchPort, ProcessingPort};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Fallback shown when the service reply carries no error text.
const SEND_FAILED_FALLBACK: &str = "Грешка при изпращане";

pub struct CaptureSession {
    state: Mutex<WorkflowState>,
    camera: Arc<dyn CapturePort>,
    processor: Arc<dyn ProcessingPort>,
    dispatcher: Arc<dyn DispatchPort>,
}

impl CaptureSession {
    pub fn new(
        camera: Arc<dyn CapturePort>,
        processor: Arc<dyn ProcessingPort>,
        dispatcher: Arc<dyn DispatchPort>,
    ) -> Self {
        Self {
            state: Mutex::new(WorkflowState::new()),
            camera,
            processor,
            dispatcher,
        }
    }

    /// Current snapshot.
    pub async fn snapshot(&self) -> WorkflowState {
        self.state.lock().await.clone()
    }

    pub async fn start(&self) -> WorkflowState {
        self.apply(Action::StartScanning).await
    }

    /// Take one picture through the capture port and append it.
    pub async fn capture(&self) -> Result<WorkflowState, DomainError> {
        let image = self.camera.capture().await?;
        debug!(mime = image.mime_type(), "image captured");
        Ok(self.apply(Action::ImageCaptured(image)).await)
    }

    /// Run the processing strategy and advance to `process` when it finishes.
    pub async fn process(&self) -> WorkflowState {
        self.apply(Action::ProcessRequested).await
    }

    /// Dispatch the first image. No-op while a send is in flight or after a successful send.
    pub async fn send(&self) -> WorkflowState {
        let millis = chrono::Utc::now().timestamp_millis();
        self.apply(Action::SendRequested { millis }).await
    }

    pub async fn finish(&self) -> WorkflowState {
        self.apply(Action::Finish).await
    }

    pub async fn back(&self) -> WorkflowState {
        self.apply(Action::Back).await
    }

    pub async fn new_document(&self) -> WorkflowState {
        self.apply(Action::NewDocument).await
    }

    pub async fn add_more(&self) -> WorkflowState {
        self.apply(Action::AddMore).await
    }

    /// Apply an action, run resulting effects to completion, return the final snapshot.
    pub async fn apply(&self, action: Action) -> WorkflowState {
        let mut pending = vec![action];
        let mut latest = None;

        while let Some(action) = pending.pop() {
            let effects = {
                let mut state = self.state.lock().await;
                let (next, effects) = transition(&state, action);
                *state = next;
                latest = Some(state.clone());
                effects
            };

            for effect in effects {
                pending.push(self.run_effect(effect).await);
            }
        }

        match latest {
            Some(state) => state,
            None => self.snapshot().await,
        }
    }

    async fn run_effect(&self, effect: Effect) -> Action {
        match effect {
            Effect::RunProcessing { generation, images } => {
                info!(count = images.len(), "processing captured images");
                let result = self
                    .processor
                    .process(&images)
                    .await
                    .map_err(|e| e.to_string());
                if let Err(e) = &result {
                    warn!(error = %e, "processing failed");
                }
                Action::ProcessingFinished { generation, result }
            }
            Effect::Dispatch {
                generation,
                request,
            } => {
                info!(file_name = ?request.file_name, "dispatching capture");
                let outcome = match self.dispatcher.dispatch(&request).await {
                    Ok(DispatchOutcome::Rejected { error }) if error.is_empty() => {
                        DispatchOutcome::Rejected {
                            error: SEND_FAILED_FALLBACK.to_string(),
                        }
                    }
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(error = %e, "dispatch call failed");
                        DispatchOutcome::Rejected {
                            error: e.to_string(),
                        }
                    }
                };
                Action::DispatchFinished {
                    generation,
                    outcome,
                }
            }
        }
    }
}
