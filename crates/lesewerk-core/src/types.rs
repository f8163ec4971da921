// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the scan-to-accessible-text pipeline.

use std::borrow::Cow;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LesewerkError, Result};

/// Unique identifier for one capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanId(pub Uuid);

impl ScanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -- Captured pages -----------------------------------------------------------

/// The raster behind one captured page.
#[derive(Debug, Clone)]
pub enum PageRaster {
    /// Already decoded by the capture collaborator.
    Decoded(DynamicImage),
    /// Encoded bytes (JPEG, PNG, HEIC-converted, ...) decoded on demand.
    Encoded(Vec<u8>),
    /// The capture produced no usable image for this page.
    Missing,
}

/// One captured page and its zero-based position in the capture session.
#[derive(Debug, Clone)]
pub struct PageImage {
    index: usize,
    raster: PageRaster,
}

impl PageImage {
    pub fn new(index: usize, raster: PageRaster) -> Self {
        Self { index, raster }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn raster(&self) -> &PageRaster {
        &self.raster
    }

    /// Produce a decoded image for recognition.
    ///
    /// Fails with [`LesewerkError::MissingImage`] when the page has no raster or
    /// its bytes do not decode.
    pub fn materialize(&self) -> Result<Cow<'_, DynamicImage>> {
        match &self.raster {
            PageRaster::Decoded(image) => Ok(Cow::Borrowed(image)),
            PageRaster::Encoded(bytes) => image::load_from_memory(bytes)
                .map(Cow::Owned)
                .map_err(|err| {
                    tracing::debug!(page = self.index, %err, "Page image failed to decode");
                    LesewerkError::MissingImage { page: self.index }
                }),
            PageRaster::Missing => Err(LesewerkError::MissingImage { page: self.index }),
        }
    }
}

/// The ordered pages of one capture session.
///
/// Indices are contiguous from zero and match physical page order. The set is
/// immutable once built and is consumed by the scan that recognises it.
#[derive(Debug, Clone, Default)]
pub struct PageImageSet {
    pages: Vec<PageImage>,
}

impl PageImageSet {
    /// Build a set from rasters in capture order, assigning indices 0, 1, 2, ...
    pub fn new(rasters: Vec<PageRaster>) -> Self {
        let pages = rasters
            .into_iter()
            .enumerate()
            .map(|(index, raster)| PageImage::new(index, raster))
            .collect();
        Self { pages }
    }

    /// Build a set from already-indexed pages.
    ///
    /// Pages may arrive in any order; they are sorted by index and the indices
    /// must then read exactly `0..len` (no gaps, no duplicates).
    pub fn from_pages(mut pages: Vec<PageImage>) -> Result<Self> {
        pages.sort_by_key(PageImage::index);
        for (expected, page) in pages.iter().enumerate() {
            if page.index != expected {
                return Err(LesewerkError::InvalidPageSet(format!(
                    "expected page index {expected}, found {}",
                    page.index
                )));
            }
        }
        Ok(Self { pages })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageImage> {
        self.pages.iter()
    }

    pub fn into_pages(self) -> Vec<PageImage> {
        self.pages
    }
}

impl<'a> IntoIterator for &'a PageImageSet {
    type Item = &'a PageImage;
    type IntoIter = std::slice::Iter<'a, PageImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

// -- Recognition results ------------------------------------------------------

/// How hard the recognizer should try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionLevel {
    Fast,
    #[default]
    Accurate,
}

/// One text region reported by a recognizer: candidate strings, best first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecognizedRegion {
    pub candidates: Vec<String>,
}

impl RecognizedRegion {
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates }
    }

    /// A region with exactly one candidate.
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![text.into()],
        }
    }

    /// The highest-ranked candidate, if the recognizer reported any.
    pub fn top_candidate(&self) -> Option<&str> {
        self.candidates.first().map(String::as_str)
    }
}

/// A retained line of text and its rank among the region's candidates.
///
/// Only rank 0 lines are ever stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedLine {
    pub text: String,
    pub rank: usize,
}

/// The retained lines of one page, in recognizer region order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecognizedPage {
    pub index: usize,
    pub lines: Vec<RecognizedLine>,
}

impl RecognizedPage {
    pub fn empty(index: usize) -> Self {
        Self {
            index,
            lines: Vec::new(),
        }
    }

    pub fn has_text(&self) -> bool {
        !self.lines.is_empty()
    }

    /// The page's lines joined by `\n`.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// What happened to one page during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Recognized(RecognizedPage),
    Failed { page: usize, reason: String },
    MissingImage { page: usize },
}

impl PageOutcome {
    pub fn page_index(&self) -> usize {
        match self {
            Self::Recognized(page) => page.index,
            Self::Failed { page, .. } | Self::MissingImage { page } => *page,
        }
    }
}

/// Per-scan summary handed back alongside the document so the host can tell
/// the reader which pages produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub page_count: usize,
    /// Pages the recognizer processed (with or without text).
    pub recognized_pages: Vec<usize>,
    /// Pages whose recognition reported an error.
    pub failed_pages: Vec<usize>,
    /// Pages skipped because no image could be materialised.
    pub missing_pages: Vec<usize>,
}

impl ScanReport {
    pub fn is_complete(&self) -> bool {
        self.failed_pages.is_empty() && self.missing_pages.is_empty()
    }
}

/// The merged plain text of one capture session.
///
/// Lines within a page are separated by `\n`; pages that contain text are
/// separated by a blank line (`\n\n`). There is no trailing newline. A fresh
/// scan replaces the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct AggregatedDocument {
    text: String,
}

impl AggregatedDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn lines(&self) -> std::str::Lines<'_> {
        self.text.lines()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl std::fmt::Display for AggregatedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

// -- Export -------------------------------------------------------------------

/// A rendered PDF ready to hand to the save surface.
///
/// The pipeline keeps no reference once the artifact is handed off.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    /// Suggested file name; the same for every export.
    pub file_name: String,
    /// Where the bytes were staged before hand-off.
    pub staged_path: PathBuf,
    pub page_count: usize,
    /// SHA-256 of `bytes`, lowercase hex.
    pub digest: String,
    pub created_at: DateTime<Utc>,
}

impl ExportArtifact {
    pub fn mime_type(&self) -> &'static str {
        "application/pdf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn new_page_set_assigns_contiguous_indices() {
        let set = PageImageSet::new(vec![PageRaster::Missing, PageRaster::Missing]);
        let indices: Vec<usize> = set.iter().map(PageImage::index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn from_pages_sorts_and_validates() {
        let set = PageImageSet::from_pages(vec![
            PageImage::new(1, PageRaster::Missing),
            PageImage::new(0, PageRaster::Missing),
        ])
        .unwrap();
        assert_eq!(set.iter().next().map(PageImage::index), Some(0));

        let gap = PageImageSet::from_pages(vec![
            PageImage::new(0, PageRaster::Missing),
            PageImage::new(2, PageRaster::Missing),
        ]);
        assert!(matches!(gap, Err(LesewerkError::InvalidPageSet(_))));

        let duplicate = PageImageSet::from_pages(vec![
            PageImage::new(0, PageRaster::Missing),
            PageImage::new(0, PageRaster::Missing),
        ]);
        assert!(duplicate.is_err());
    }

    #[test]
    fn materialize_reports_missing_and_undecodable_pages() {
        let missing = PageImage::new(3, PageRaster::Missing);
        assert!(matches!(
            missing.materialize(),
            Err(LesewerkError::MissingImage { page: 3 })
        ));

        let garbage = PageImage::new(4, PageRaster::Encoded(vec![0, 1, 2, 3]));
        assert!(matches!(
            garbage.materialize(),
            Err(LesewerkError::MissingImage { page: 4 })
        ));

        let decoded = PageImage::new(
            0,
            PageRaster::Decoded(DynamicImage::ImageLuma8(GrayImage::from_pixel(
                4,
                4,
                Luma([255u8]),
            ))),
        );
        assert_eq!(decoded.materialize().unwrap().width(), 4);
    }

    #[test]
    fn top_candidate_is_first() {
        let region = RecognizedRegion::new(vec!["best".into(), "worse".into()]);
        assert_eq!(region.top_candidate(), Some("best"));
        assert_eq!(RecognizedRegion::default().top_candidate(), None);
    }

    #[test]
    fn recognized_page_joins_lines() {
        let page = RecognizedPage {
            index: 0,
            lines: vec![
                RecognizedLine {
                    text: "one".into(),
                    rank: 0,
                },
                RecognizedLine {
                    text: "two".into(),
                    rank: 0,
                },
            ],
        };
        assert_eq!(page.text(), "one\ntwo");
        assert!(!RecognizedPage::empty(1).has_text());
    }
}
