// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lesewerk-document: the scan-to-accessible-text pipeline.
//
// Drives a text recognizer over the pages of a capture session, merges the
// results into one document in page order, and renders that document as a
// paginated PDF in the accessible typeface.

pub mod integrity;
pub mod pdf;
pub mod recognize;

// Re-export the primary structs so callers can use `lesewerk_document::PdfExporter` etc.
pub use pdf::export::{PdfExporter, RenderedPdf};
pub use recognize::aggregate::RecognitionAggregator;
pub use recognize::TextRecognizer;

#[cfg(feature = "ocr")]
pub use recognize::ocr::OcrsRecognizer;
