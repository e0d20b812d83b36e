//! Application use cases. Orchestrate domain logic via ports.

pub mod capture_session;
pub mod dispatch_service;

pub use capture_session::CaptureSession;
pub use dispatch_service::DispatchService;
