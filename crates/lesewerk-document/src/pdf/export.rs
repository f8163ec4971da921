// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF exporter: renders an aggregated document in the accessible typeface
// using `printpdf` 0.8 and stages the bytes for the save surface.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use lesewerk_core::config::EXPORT_FILE_NAME;
use lesewerk_core::error::{LesewerkError, Result};
use lesewerk_core::{AggregatedDocument, ExportArtifact, ExportConfig, RenderConfig};
use printpdf::{
    BuiltinFont, FontId, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt,
    TextItem,
};
use tracing::{debug, info, instrument};

use super::font::AccessibleFont;
use super::layout::{MM_PER_PT, PageGeometry, TextLayout};
use crate::integrity::hash_bytes;

/// PDF bytes produced by [`PdfExporter::render`].
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Whether the built-in fallback typeface was used.
    pub fallback_font: bool,
}

/// Font reference inside one `PdfDocument`.
enum TextFont {
    Embedded(FontId),
    Builtin(BuiltinFont),
}

/// Renders [`AggregatedDocument`]s to paginated PDFs.
///
/// Every export uses the same page geometry (US Letter, 20 pt margins, one
/// column, left-aligned) and the same file name, so repeated exports
/// overwrite the staged file. Text that does not fit on one page flows onto
/// as many further pages as needed. High contrast never affects the PDF.
pub struct PdfExporter {
    config: ExportConfig,
    geometry: PageGeometry,
}

impl PdfExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            geometry: PageGeometry::letter(),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Where [`export`](Self::export) stages the PDF.
    pub fn staged_path(&self) -> PathBuf {
        self.config.resolved_staging_dir().join(EXPORT_FILE_NAME)
    }

    /// Render `document` at `render`'s font size without touching the disk.
    ///
    /// # Errors
    ///
    /// [`LesewerkError::FontUnavailable`] if the accessible font cannot be
    /// loaded and fallback is not allowed.
    #[instrument(skip_all, fields(
        chars = document.as_str().len(),
        font_size_pt = render.font_size_pt(),
    ))]
    pub fn render(&self, document: &AggregatedDocument, render: &RenderConfig) -> Result<RenderedPdf> {
        let font_size_pt = render.font_size_pt();
        let font = AccessibleFont::load(&self.config, font_size_pt)?;
        let fallback_font = font.is_fallback();

        let layout = TextLayout::new(document.as_str(), &self.geometry, font_size_pt, &font);

        info!(
            font = font.name(),
            pages = layout.page_count(),
            "Rendering PDF"
        );

        let mut doc = PdfDocument::new(&self.config.title);
        doc.metadata.info.creator = self.config.creator.clone();
        doc.metadata.info.author = self.config.author.clone();
        let text_font = match font {
            AccessibleFont::Embedded { font, .. } => TextFont::Embedded(doc.add_font(&font)),
            AccessibleFont::Builtin(builtin) => TextFont::Builtin(builtin),
        };

        let page_w = Mm(self.geometry.width_pt * MM_PER_PT);
        let page_h = Mm(self.geometry.height_pt * MM_PER_PT);

        let pages: Vec<PdfPage> = layout
            .pages
            .iter()
            .map(|lines| PdfPage::new(page_w, page_h, self.page_ops(&layout, lines, &text_font)))
            .collect();
        let page_count = pages.len();
        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);

        debug!(
            bytes = bytes.len(),
            page_count,
            warnings = warnings.len(),
            "PDF serialised"
        );

        Ok(RenderedPdf {
            bytes,
            page_count,
            fallback_font,
        })
    }

    /// Render `document` and stage it as `RecognisedText.pdf`.
    ///
    /// The returned artifact owns the bytes; the exporter keeps nothing.
    ///
    /// # Errors
    ///
    /// [`LesewerkError::FontUnavailable`] as for [`render`](Self::render), and
    /// [`LesewerkError::WriteFailure`] if the staging directory or file cannot
    /// be written. No artifact is produced in either case.
    #[instrument(skip_all, fields(chars = document.as_str().len()))]
    pub fn export(
        &self,
        document: &AggregatedDocument,
        render: &RenderConfig,
    ) -> Result<ExportArtifact> {
        let rendered = self.render(document, render)?;

        let staging_dir = self.config.resolved_staging_dir();
        let staged_path = staging_dir.join(EXPORT_FILE_NAME);
        stage(&staging_dir, &staged_path, &rendered.bytes)?;

        let digest = hash_bytes(&rendered.bytes);
        info!(
            path = %staged_path.display(),
            pages = rendered.page_count,
            %digest,
            "PDF staged for export"
        );

        Ok(ExportArtifact {
            bytes: rendered.bytes,
            file_name: EXPORT_FILE_NAME.to_owned(),
            staged_path,
            page_count: rendered.page_count,
            digest,
            created_at: Utc::now(),
        })
    }

    /// Drawing operations for one physical page, top to bottom.
    fn page_ops(&self, layout: &TextLayout, lines: &[String], text_font: &TextFont) -> Vec<Op> {
        let size = Pt(layout.font_size_pt);
        let mut ops: Vec<Op> = Vec::new();

        for (line_idx, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }

            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(self.geometry.margin_pt),
                    y: Pt(layout.baseline_pt(&self.geometry, line_idx)),
                },
            });
            match text_font {
                TextFont::Embedded(font_id) => {
                    ops.push(Op::SetFontSize {
                        size,
                        font: font_id.clone(),
                    });
                    ops.push(Op::WriteText {
                        items: vec![TextItem::Text(line.clone())],
                        font: font_id.clone(),
                    });
                }
                TextFont::Builtin(builtin) => {
                    ops.push(Op::SetFontSizeBuiltinFont {
                        size,
                        font: builtin.clone(),
                    });
                    ops.push(Op::WriteTextBuiltinFont {
                        items: vec![TextItem::Text(line.clone())],
                        font: builtin.clone(),
                    });
                }
            }
            ops.push(Op::EndTextSection);
        }

        ops
    }
}

/// Write `bytes` to `path`, creating `dir` first. A partially written file is
/// removed.
fn stage(dir: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| LesewerkError::WriteFailure {
        path: dir.to_path_buf(),
        source,
    })?;

    if let Err(source) = std::fs::write(path, bytes) {
        let _ = std::fs::remove_file(path);
        return Err(LesewerkError::WriteFailure {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}
