// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Lesewerk.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Lesewerk operations.
#[derive(Debug, Error)]
pub enum LesewerkError {
    // -- Recognition errors (absorbed per page unless the policy is strict) --
    #[error("text recognition failed on page {page}: {reason}")]
    RecognitionFailure { page: usize, reason: String },

    #[error("page {page} has no usable image")]
    MissingImage { page: usize },

    #[error("invalid page set: {0}")]
    InvalidPageSet(String),

    #[error("OCR engine unavailable: {0}")]
    OcrError(String),

    // -- Export errors --
    #[error("font {font} unavailable at {size_pt}pt: {reason}")]
    FontUnavailable {
        font: String,
        size_pt: f32,
        reason: String,
    },

    #[error("could not write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("nothing has been scanned yet")]
    NothingScanned,

    // -- Runtime / platform --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    TaskFailed(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LesewerkError>;
