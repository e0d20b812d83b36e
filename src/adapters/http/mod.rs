//! HTTP adapter. Exposes DispatchService as `POST /api/send-email`.

pub mod server;

pub use server::{AppState, create_router, serve};
