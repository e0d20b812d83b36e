//! Dispatch adapters. Implement DispatchPort.
//!
//! HTTP client for a remote dispatch server, and an in-process adapter that
//! calls DispatchService directly (offline runs and tests).

pub mod http_client;
pub mod in_process;

pub use http_client::HttpDispatchClient;
pub use in_process::InProcessDispatch;
