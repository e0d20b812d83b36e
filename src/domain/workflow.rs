//! Capture workflow state machine.
//!
//! Pure transitions: every user action or async completion takes the current
//! snapshot and returns the next one plus the effects the session must run.
//! Effects carry the `generation` they were issued under; completions from an
//! older generation are dropped, so a late result never lands on a reset session.

use crate::domain::{
    CapturedImage, DispatchOutcome, EmailDispatchRequest, Notice, ProcessedImages, Stage,
};

/// Snapshot of one capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowState {
    pub stage: Stage,
    pub images: Vec<CapturedImage>,
    pub is_processing: bool,
    pub is_sending_email: bool,
    pub email_sent: bool,
    /// Bumped on every full reset.
    pub generation: u64,
    pub last_notice: Option<Notice>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowState {
    pub fn new() -> Self {
        Self {
            stage: Stage::Welcome,
            images: Vec::new(),
            is_processing: false,
            is_sending_email: false,
            email_sent: false,
            generation: 0,
            last_notice: None,
        }
    }

    /// "Continue" from capture is offered.
    pub fn can_process(&self) -> bool {
        self.stage == Stage::Capture && !self.images.is_empty() && !self.is_processing
    }

    /// "Send by email" is offered.
    pub fn can_send(&self) -> bool {
        self.stage == Stage::Process
            && !self.email_sent
            && !self.is_sending_email
            && !self.images.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// welcome → capture
    StartScanning,
    /// Append one image while in capture.
    ImageCaptured(CapturedImage),
    /// capture → (busy) → process
    ProcessRequested,
    ProcessingFinished {
        generation: u64,
        result: Result<ProcessedImages, String>,
    },
    /// Dispatch the first image; stage unchanged.
    SendRequested { millis: i64 },
    DispatchFinished {
        generation: u64,
        outcome: DispatchOutcome,
    },
    /// process → complete
    Finish,
    /// process → capture, capture → welcome
    Back,
    /// complete → welcome with full reset.
    NewDocument,
    /// complete → capture, images and sent flag kept.
    AddMore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RunProcessing {
        generation: u64,
        images: Vec<CapturedImage>,
    },
    Dispatch {
        generation: u64,
        request: EmailDispatchRequest,
    },
}

/// Apply one action. Actions not enabled in the current state return the snapshot unchanged.
pub fn transition(state: &WorkflowState, action: Action) -> (WorkflowState, Vec<Effect>) {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match action {
        Action::StartScanning => {
            if next.stage == Stage::Welcome {
                next.stage = Stage::Capture;
            }
        }
        Action::ImageCaptured(image) => {
            if next.stage == Stage::Capture {
                next.images.push(image);
            }
        }
        Action::ProcessRequested => {
            if next.can_process() {
                next.is_processing = true;
                effects.push(Effect::RunProcessing {
                    generation: next.generation,
                    images: next.images.clone(),
                });
            }
        }
        Action::ProcessingFinished { generation, result } => {
            if generation != next.generation || !next.is_processing {
                return (next, effects);
            }
            next.is_processing = false;
            match result {
                Ok(ProcessedImages(processed)) => {
                    // Images captured while processing ran stay after the processed prefix.
                    let tail = next.images.split_off(processed.len().min(next.images.len()));
                    next.images = processed;
                    next.images.extend(tail);
                    if next.stage == Stage::Capture {
                        next.stage = Stage::Process;
                    }
                }
                Err(reason) => {
                    next.last_notice = Some(Notice::Failure(reason));
                }
            }
        }
        Action::SendRequested { millis } => {
            if next.can_send() {
                if let Some(request) = EmailDispatchRequest::for_images(&next.images, millis) {
                    next.is_sending_email = true;
                    effects.push(Effect::Dispatch {
                        generation: next.generation,
                        request,
                    });
                }
            }
        }
        Action::DispatchFinished {
            generation,
            outcome,
        } => {
            if generation != next.generation {
                return (next, effects);
            }
            next.is_sending_email = false;
            match outcome {
                DispatchOutcome::Sent { .. } => {
                    next.email_sent = true;
                    next.last_notice = Some(Notice::Success(
                        crate::domain::classify::SENT_MESSAGE.to_string(),
                    ));
                }
                DispatchOutcome::Rejected { error } => {
                    next.last_notice = Some(Notice::Failure(error));
                }
            }
        }
        Action::Finish => {
            if next.stage == Stage::Process {
                next.stage = Stage::Complete;
            }
        }
        Action::Back => match next.stage {
            Stage::Process => next.stage = Stage::Capture,
            Stage::Capture => next.stage = Stage::Welcome,
            Stage::Welcome | Stage::Complete => {}
        },
        Action::NewDocument => {
            if next.stage == Stage::Complete {
                next = WorkflowState {
                    generation: state.generation + 1,
                    ..WorkflowState::new()
                };
            }
        }
        Action::AddMore => {
            if next.stage == Stage::Complete {
                next.stage = Stage::Capture;
            }
        }
    }

    (next, effects)
}
