//! Processing adapters. Implement ProcessingPort.

pub mod fixed_delay;

pub use fixed_delay::FixedDelayProcessor;
