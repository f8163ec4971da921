// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Displayed-document state.

use chrono::{DateTime, Utc};
use lesewerk_core::{AggregatedDocument, ScanId, ScanReport};

/// Shown until the first scan completes.
pub const PLACEHOLDER_TEXT: &str = "This is where the scanned text will appear.\n\nTo start the process, tap the camera button below.";

/// The result of the most recent scan.
#[derive(Debug, Clone)]
pub struct ScannedDocument {
    pub scan_id: ScanId,
    pub document: AggregatedDocument,
    pub report: ScanReport,
    pub scanned_at: DateTime<Utc>,
}

/// What the reader currently sees: the placeholder, or the last scan.
///
/// A new scan replaces the previous document wholesale; nothing is patched.
#[derive(Debug, Clone, Default)]
pub struct DocumentState {
    scanned: Option<ScannedDocument>,
}

impl DocumentState {
    /// Text for the display, speech, and clipboard consumers.
    pub fn display_text(&self) -> &str {
        match &self.scanned {
            Some(scan) => scan.document.as_str(),
            None => PLACEHOLDER_TEXT,
        }
    }

    pub fn scanned(&self) -> Option<&ScannedDocument> {
        self.scanned.as_ref()
    }

    /// Whether there is real, non-empty scanned text to copy, read, or export.
    pub fn has_scanned_text(&self) -> bool {
        self.scanned
            .as_ref()
            .is_some_and(|scan| !scan.document.is_empty())
    }

    /// Install the result of a fresh scan, returning its id.
    pub fn replace(&mut self, document: AggregatedDocument, report: ScanReport) -> ScanId {
        let scan_id = ScanId::new();
        self.scanned = Some(ScannedDocument {
            scan_id,
            document,
            report,
            scanned_at: Utc::now(),
        });
        scan_id
    }
}
