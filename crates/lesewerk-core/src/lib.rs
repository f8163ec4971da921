// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lesewerk: Core types, render configuration, and error definitions shared
// across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use config::{
    ExportConfig, PageFailurePolicy, Palette, PipelineConfig, RenderConfig, RenderConfigStore, Rgb,
};
pub use error::LesewerkError;
pub use types::*;
