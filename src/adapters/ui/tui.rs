//! Implements InputPort. Inquire-based interactive scanner.
//!
//! One menu per workflow stage; every choice maps to a CaptureSession action.

use crate::adapters::capture::FileCapture;
use crate::adapters::ui::progress::with_spinner;
use crate::domain::{Action, DomainError, Notice, Stage, WorkflowState};
use crate::ports::{CapturePort, InputPort};
use crate::usecases::CaptureSession;
use async_trait::async_trait;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{InquireError, Select, Text};
use std::fmt;
use std::sync::Arc;

/// Applies the prompt theme globally. Call once before the first prompt.
pub fn apply_theme() {
    let config = RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("▸").with_fg(Color::LightBlue))
        .with_highlighted_option_prefix(Styled::new("➜").with_fg(Color::LightMagenta));
    inquire::set_global_render_config(config);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    StartScanning,
    CaptureDemo,
    CaptureFile,
    Continue(usize),
    Send,
    AlreadySent,
    Finish,
    Back,
    NewDocument,
    AddMore,
    Quit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::StartScanning => write!(f, "Start scanning"),
            MenuItem::CaptureDemo => write!(f, "Capture page (demo)"),
            MenuItem::CaptureFile => write!(f, "Capture page from file"),
            MenuItem::Continue(n) => write!(f, "Continue ({} images)", n),
            MenuItem::Send => write!(f, "Send by email"),
            MenuItem::AlreadySent => write!(f, "Sent ✓"),
            MenuItem::Finish => write!(f, "Finish"),
            MenuItem::Back => write!(f, "← Back"),
            MenuItem::NewDocument => write!(f, "New document"),
            MenuItem::AddMore => write!(f, "Add more"),
            MenuItem::Quit => write!(f, "Quit"),
        }
    }
}

/// Menu entries offered for a snapshot. Disabled actions are simply not listed.
fn menu_for(state: &WorkflowState) -> Vec<MenuItem> {
    match state.stage {
        Stage::Welcome => vec![MenuItem::StartScanning, MenuItem::Quit],
        Stage::Capture => {
            let mut items = vec![MenuItem::CaptureDemo, MenuItem::CaptureFile];
            if state.can_process() {
                items.push(MenuItem::Continue(state.images.len()));
            }
            items.push(MenuItem::Back);
            items
        }
        Stage::Process => {
            let mut items = Vec::new();
            if state.can_send() {
                items.push(MenuItem::Send);
            } else if state.email_sent {
                items.push(MenuItem::AlreadySent);
            }
            items.extend([MenuItem::Finish, MenuItem::Back]);
            items
        }
        Stage::Complete => vec![MenuItem::NewDocument, MenuItem::AddMore, MenuItem::Quit],
    }
}

fn heading(state: &WorkflowState) -> String {
    match state.stage {
        Stage::Welcome => "Document Scanner".to_string(),
        Stage::Capture => format!("Scanning ({} captured)", state.images.len()),
        Stage::Process => format!("Processed documents ({})", state.images.len()),
        Stage::Complete => "Done! Documents processed".to_string(),
    }
}

fn print_notice(notice: &Option<Notice>) {
    match notice {
        Some(Notice::Success(msg)) => println!("✅ {}", msg),
        Some(Notice::Failure(msg)) => println!("❌ {}", msg),
        None => {}
    }
}

/// TUI adapter. Inquire prompts over one capture session.
pub struct TuiInputPort {
    session: Arc<CaptureSession>,
}

impl TuiInputPort {
    pub fn new(session: Arc<CaptureSession>) -> Self {
        Self { session }
    }

    async fn capture_from_file(&self) -> Result<WorkflowState, DomainError> {
        let path = Text::new("Image path:")
            .prompt()
            .map_err(|e| DomainError::Ui(e.to_string()))?;
        let image = FileCapture::new(path.trim()).capture().await?;
        Ok(self.session.apply(Action::ImageCaptured(image)).await)
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let mut state = self.session.snapshot().await;
        loop {
            let items = menu_for(&state);
            let choice = match Select::new(&heading(&state), items).prompt() {
                Ok(choice) => choice,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    return Ok(());
                }
                Err(e) => return Err(DomainError::Ui(e.to_string())),
            };

            let before = state.last_notice.clone();
            state = match choice {
                MenuItem::StartScanning => self.session.start().await,
                MenuItem::CaptureDemo => self.session.capture().await?,
                MenuItem::CaptureFile => match self.capture_from_file().await {
                    Ok(s) => s,
                    Err(e) => {
                        println!("❌ {}", e);
                        self.session.snapshot().await
                    }
                },
                MenuItem::Continue(_) => {
                    with_spinner("Обработвам документите...", self.session.process()).await
                }
                MenuItem::Send => with_spinner("Изпращам...", self.session.send()).await,
                MenuItem::AlreadySent => self.session.snapshot().await,
                MenuItem::Finish => self.session.finish().await,
                MenuItem::Back => self.session.back().await,
                MenuItem::NewDocument => self.session.new_document().await,
                MenuItem::AddMore => self.session.add_more().await,
                MenuItem::Quit => return Ok(()),
            };

            if state.last_notice != before || choice == MenuItem::Send {
                print_notice(&state.last_notice);
            }
        }
    }
}
