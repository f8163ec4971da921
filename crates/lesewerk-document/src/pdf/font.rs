// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Accessible font loading for PDF export.
//
// The export typeface is a dyslexia-oriented font (OpenDyslexic by default)
// read from disk and embedded in every PDF. A missing font is a hard failure
// unless the export config explicitly allows the built-in fallback.

use std::path::Path;

use lesewerk_core::ExportConfig;
use lesewerk_core::error::{LesewerkError, Result};
use printpdf::{BuiltinFont, ParsedFont, PdfWarnMsg};
use tracing::{debug, info, instrument, warn};

use super::layout::TextMetrics;

/// Helvetica advance widths (1/1000 em) for U+0020..=U+007E, from the
/// standard Adobe font metrics.
#[rustfmt::skip]
const HELVETICA_ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 222, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Advance assumed for Helvetica characters outside ASCII: its widest glyph.
const HELVETICA_WIDEST_EM: f32 = 1.015;

/// The typeface a PDF export will be set in.
pub enum AccessibleFont {
    /// A font file parsed from disk, embedded in the PDF.
    Embedded { name: String, font: Box<ParsedFont> },
    /// One of the 14 standard PDF fonts; only used when fallback is allowed.
    Builtin(BuiltinFont),
}

impl AccessibleFont {
    /// Locate and parse the accessible font for a `size_pt` export.
    ///
    /// # Errors
    ///
    /// [`LesewerkError::FontUnavailable`] when the file is missing, unreadable,
    /// or not a font, and the config does not allow the fallback typeface.
    #[instrument(skip(export))]
    pub fn load(export: &ExportConfig, size_pt: f32) -> Result<Self> {
        let path = export.resolved_font_path();
        match parse_font_file(&path) {
            Ok(font) => {
                let name = font_name(&path);
                info!(font = %name, size_pt, "Accessible font loaded");
                Ok(Self::Embedded {
                    name,
                    font: Box::new(font),
                })
            }
            Err(reason) if export.allow_fallback_font => {
                warn!(
                    path = %path.display(),
                    %reason,
                    "Accessible font unavailable, rendering with Helvetica"
                );
                Ok(Self::Builtin(BuiltinFont::Helvetica))
            }
            Err(reason) => Err(LesewerkError::FontUnavailable {
                font: font_name(&path),
                size_pt,
                reason,
            }),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Builtin(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Embedded { name, .. } => name,
            Self::Builtin(_) => "Helvetica",
        }
    }
}

impl TextMetrics for AccessibleFont {
    fn advance_em(&self, ch: char) -> f32 {
        match self {
            Self::Embedded { font, .. } => {
                let units_per_em = f32::from(font.font_metrics.units_per_em.max(1));
                // Characters without a glyph are drawn as .notdef (glyph 0).
                let glyph = font.lookup_glyph_index(u32::from(ch)).unwrap_or(0);
                f32::from(font.get_horizontal_advance(glyph)) / units_per_em
            }
            Self::Builtin(_) => helvetica_advance_em(ch),
        }
    }
}

fn helvetica_advance_em(ch: char) -> f32 {
    match u32::from(ch).checked_sub(0x20) {
        Some(offset) if (offset as usize) < HELVETICA_ASCII_WIDTHS.len() => {
            f32::from(HELVETICA_ASCII_WIDTHS[offset as usize]) / 1000.0
        }
        _ => HELVETICA_WIDEST_EM,
    }
}

fn parse_font_file(path: &Path) -> std::result::Result<ParsedFont, String> {
    let bytes = std::fs::read(path).map_err(|err| format!("{}: {err}", path.display()))?;

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let font = ParsedFont::from_bytes(&bytes, 0, &mut warnings)
        .ok_or_else(|| format!("{} is not a usable font file", path.display()))?;

    debug!(
        bytes = bytes.len(),
        warnings = warnings.len(),
        "Font file parsed"
    );
    Ok(font)
}

fn font_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
