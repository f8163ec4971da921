// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition aggregator: runs a recognizer over every captured page and
// merges the per-page results into one document in capture order.

use lesewerk_core::error::{LesewerkError, Result};
use lesewerk_core::{
    AggregatedDocument, PageFailurePolicy, PageImage, PageImageSet, PageOutcome, RecognitionLevel,
    RecognizedLine, RecognizedPage, ScanReport,
};
use tracing::{debug, info, instrument, warn};

use super::TextRecognizer;

/// Separator between the text of two pages.
const PAGE_SEPARATOR: &str = "\n\n";

/// Merges recognition results into an [`AggregatedDocument`].
///
/// Output is a pure function of page order and each region's top candidate:
/// the same pages against a deterministic recognizer always yield the same
/// bytes. Pages are never reordered, and regions keep the order the
/// recognizer reported them in.
///
/// Per-page work ([`recognize_page`](Self::recognize_page)) and the ordered
/// merge ([`assemble`](Self::assemble)) are separate so callers can recognise
/// pages concurrently and still get capture order out.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecognitionAggregator {
    policy: PageFailurePolicy,
}

impl RecognitionAggregator {
    pub fn new(policy: PageFailurePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PageFailurePolicy {
        self.policy
    }

    /// Recognise every page in order, one at a time.
    pub fn aggregate<R>(&self, pages: PageImageSet, recognizer: &R) -> Result<AggregatedDocument>
    where
        R: TextRecognizer + ?Sized,
    {
        self.aggregate_with_report(pages, recognizer)
            .map(|(document, _)| document)
    }

    /// Like [`aggregate`](Self::aggregate), also returning which pages failed.
    ///
    /// Page N+1 is not started until page N has returned. Under
    /// [`PageFailurePolicy::Strict`] the first failing page stops the scan.
    #[instrument(skip_all, fields(pages = pages.len(), recognizer = recognizer.name()))]
    pub fn aggregate_with_report<R>(
        &self,
        pages: PageImageSet,
        recognizer: &R,
    ) -> Result<(AggregatedDocument, ScanReport)>
    where
        R: TextRecognizer + ?Sized,
    {
        info!(policy = ?self.policy, "Starting sequential recognition");

        let mut outcomes = Vec::with_capacity(pages.len());
        for page in &pages {
            let outcome = self.recognize_page(recognizer, page);
            if self.policy == PageFailurePolicy::Strict {
                check_strict(&outcome)?;
            }
            outcomes.push(outcome);
        }

        self.assemble(outcomes)
    }

    /// Recognise a single page, keeping only each region's top candidate.
    ///
    /// Never fails: an image that cannot be materialised or a recognizer error
    /// is recorded in the returned outcome.
    pub fn recognize_page<R>(&self, recognizer: &R, page: &PageImage) -> PageOutcome
    where
        R: TextRecognizer + ?Sized,
    {
        let index = page.index();
        let image = match page.materialize() {
            Ok(image) => image,
            Err(err) => {
                warn!(page = index, %err, "Skipping page without a usable image");
                return PageOutcome::MissingImage { page: index };
            }
        };

        match recognizer.recognize(&image, RecognitionLevel::Accurate) {
            Ok(regions) => {
                let lines: Vec<RecognizedLine> = regions
                    .iter()
                    .filter_map(|region| region.top_candidate())
                    // A blank candidate would add an empty line inside the
                    // page and could turn a textless page into a paragraph.
                    .filter(|text| !text.trim().is_empty())
                    .map(|text| RecognizedLine {
                        text: text.to_owned(),
                        rank: 0,
                    })
                    .collect();
                debug!(
                    page = index,
                    regions = regions.len(),
                    lines = lines.len(),
                    "Page recognised"
                );
                PageOutcome::Recognized(RecognizedPage { index, lines })
            }
            Err(err) => {
                warn!(page = index, %err, "Recognition failed, page contributes no text");
                PageOutcome::Failed {
                    page: index,
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Merge per-page outcomes into the document, in page-index order
    /// regardless of the order the outcomes arrive in.
    ///
    /// Lines of one page are joined by `\n`; pages with text are separated by
    /// a blank line. Failed and missing pages contribute nothing.
    pub fn assemble(
        &self,
        mut outcomes: Vec<PageOutcome>,
    ) -> Result<(AggregatedDocument, ScanReport)> {
        outcomes.sort_by_key(PageOutcome::page_index);

        let mut report = ScanReport {
            page_count: outcomes.len(),
            ..ScanReport::default()
        };
        let mut page_texts: Vec<String> = Vec::new();

        for outcome in &outcomes {
            if self.policy == PageFailurePolicy::Strict {
                check_strict(outcome)?;
            }
            match outcome {
                PageOutcome::Recognized(page) => {
                    report.recognized_pages.push(page.index);
                    if page.has_text() {
                        page_texts.push(page.text());
                    }
                }
                PageOutcome::Failed { page, .. } => report.failed_pages.push(*page),
                PageOutcome::MissingImage { page } => report.missing_pages.push(*page),
            }
        }

        let document = AggregatedDocument::new(page_texts.join(PAGE_SEPARATOR));

        info!(
            pages = report.page_count,
            failed = report.failed_pages.len(),
            missing = report.missing_pages.len(),
            chars = document.as_str().len(),
            "Aggregation complete"
        );

        Ok((document, report))
    }
}

fn check_strict(outcome: &PageOutcome) -> Result<()> {
    match outcome {
        PageOutcome::Recognized(_) => Ok(()),
        PageOutcome::Failed { page, reason } => Err(LesewerkError::RecognitionFailure {
            page: *page,
            reason: reason.clone(),
        }),
        PageOutcome::MissingImage { page } => Err(LesewerkError::MissingImage { page: *page }),
    }
}
