// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lesewerk: service layer for a host UI.
//
// Owns the live render settings and the displayed document, and runs scans
// and exports off the UI thread. The host supplies a text recognizer and a
// platform bridge; this crate has no UI of its own.

pub mod logging;
pub mod services;
pub mod state;

pub use services::app_services::LesewerkServices;
pub use state::{DocumentState, ScannedDocument};
