// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: text layout, accessible font loading, and export.

pub mod export;
pub mod font;
pub mod layout;

pub use export::{PdfExporter, RenderedPdf};
pub use layout::{FixedAdvance, PageGeometry, TextMetrics};
