//! Core types and shared functionality for cfpdf.
//!
//! This crate provides:
//! - The problem/document domain model
//! - Unified error types
//! - Layered configuration
//! - The injected progress `Reporter`

pub mod config;
pub mod error;
pub mod model;
pub mod report;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use model::{NormalizedDocument, ProblemReference, RenderMode, RenderedDocument, SampleTest};
pub use report::{MemoryReporter, Reporter, TracingReporter};
