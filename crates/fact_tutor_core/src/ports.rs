//! crates/fact_tutor_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! The analysis engine is an external collaborator: the core only knows the
//! `ContentAnalyzer` boundary, so a mock or a network-backed implementation can
//! be swapped in without touching the store or the web layer.

use async_trait::async_trait;
use crate::domain::{AnalysisResult, Attachment};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g. network, LLM).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid response from service: {0}")]
    InvalidResponse(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    /// Produces a credibility analysis for submitted content and its attachments.
    async fn analyze(&self, content: &str, attachments: &[Attachment]) -> PortResult<AnalysisResult>;
}
