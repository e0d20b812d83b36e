//! Infrastructure adapters. Implement ports.
//!
//! SMTP, HTTP server and client, capture sources, processing, terminal UI.
//! Map errors to DomainError.

pub mod capture;
pub mod dispatch;
pub mod http;
pub mod mail;
pub mod processing;
pub mod ui;
