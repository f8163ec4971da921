// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition: the text recognizer capability and the aggregator that drives
// it over a capture session.

pub mod aggregate;

#[cfg(feature = "ocr")]
pub mod ocr;

use image::DynamicImage;
use lesewerk_core::error::Result;
use lesewerk_core::{RecognitionLevel, RecognizedRegion};

pub use aggregate::RecognitionAggregator;

#[cfg(feature = "ocr")]
pub use ocr::OcrsRecognizer;

/// Turns one page image into text regions.
///
/// Regions are returned in the recognizer's own reading order, which the
/// aggregator keeps as-is. Each region lists its candidate strings best first.
/// Implementations must be shareable across worker threads.
pub trait TextRecognizer: Send + Sync {
    /// Engine identifier for logs (e.g. "ocrs").
    fn name(&self) -> &str;

    /// Recognise the text in `image`.
    ///
    /// An `Err` means this page produced no usable result; the aggregator
    /// decides what that means for the scan.
    fn recognize(&self, image: &DynamicImage, level: RecognitionLevel)
    -> Result<Vec<RecognizedRegion>>;
}
