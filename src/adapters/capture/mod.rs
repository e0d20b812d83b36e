//! Capture adapters. Implement CapturePort.
//!
//! Demo page generator (no camera needed) and image files from disk.

pub mod demo;
pub mod file;

pub use demo::DemoCapture;
pub use file::FileCapture;
