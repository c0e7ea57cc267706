//! Error types for Cairn operations.
//!
//! This module defines [`CairnError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - A failing leaf surfaces as [`CairnError::StepFailed`], carrying the
//!   leaf's declared key and the rendered cause
//! - Work items return `anyhow::Result` so business closures can use `?`
//!   freely; unexpected errors travel through `CairnError::Other`
//! - Registry and renderer operations never fail: drawing I/O errors are
//!   swallowed and unknown-handle operations are silent no-ops

use thiserror::Error;

/// Core error type for Cairn operations.
#[derive(Debug, Error)]
pub enum CairnError {
    /// A leaf step's work item failed. Remaining leaves are never started.
    #[error("Step '{step}' failed: {message}")]
    StepFailed { step: String, message: String },

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Cairn operations.
pub type Result<T> = std::result::Result<T, CairnError>;
