// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text layout: page geometry, word wrapping, and pagination for PDF export.
//
// Layout works in PDF points (1/72 inch) with the origin at the bottom-left of
// the page, matching printpdf.

/// Millimetres per PDF point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Line height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.4;

/// Fixed page geometry: one page size, equal margins, single column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
}

impl PageGeometry {
    /// US Letter (612 × 792 pt) with a 20 pt inset on every side.
    pub fn letter() -> Self {
        Self {
            width_pt: 612.0,
            height_pt: 792.0,
            margin_pt: 20.0,
        }
    }

    pub fn usable_width_pt(&self) -> f32 {
        self.width_pt - 2.0 * self.margin_pt
    }

    pub fn usable_height_pt(&self) -> f32 {
        self.height_pt - 2.0 * self.margin_pt
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::letter()
    }
}

/// Horizontal advance of characters in a typeface.
pub trait TextMetrics {
    /// Advance width of `ch` as a fraction of the font size.
    fn advance_em(&self, ch: char) -> f32;

    /// Advance width of `text` as a fraction of the font size.
    fn width_em(&self, text: &str) -> f32 {
        text.chars().map(|ch| self.advance_em(ch)).sum()
    }
}

/// Every character has the same advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvance(pub f32);

impl TextMetrics for FixedAdvance {
    fn advance_em(&self, _ch: char) -> f32 {
        self.0
    }
}

/// Text broken into lines and pages for a given font size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub pages: Vec<Vec<String>>,
    pub font_size_pt: f32,
    pub line_height_pt: f32,
}

impl TextLayout {
    /// Lay `text` out on `geometry`, measuring every line with `metrics` so
    /// that no line is wider than the usable width. Always produces at least
    /// one page.
    pub fn new<M>(text: &str, geometry: &PageGeometry, font_size_pt: f32, metrics: &M) -> Self
    where
        M: TextMetrics + ?Sized,
    {
        let line_height_pt = font_size_pt * LINE_HEIGHT_FACTOR;

        // The first baseline sits one font size below the top margin; each
        // further line needs one more line height.
        let spare_height = (geometry.usable_height_pt() - font_size_pt).max(0.0);
        let lines_per_page = (spare_height / line_height_pt) as usize + 1;

        let max_width_em = geometry.usable_width_pt() / font_size_pt;
        let lines = wrap_text(text, max_width_em, |ch| metrics.advance_em(ch));
        let mut pages = paginate(lines, lines_per_page);
        if pages.is_empty() {
            pages.push(Vec::new());
        }

        Self {
            pages,
            font_size_pt,
            line_height_pt,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Baseline y-coordinate of line `line_idx` on any page.
    pub fn baseline_pt(&self, geometry: &PageGeometry, line_idx: usize) -> f32 {
        geometry.height_pt
            - geometry.margin_pt
            - self.font_size_pt
            - line_idx as f32 * self.line_height_pt
    }
}

/// Wrap a multi-line string so that no line is wider than `max_width`, where
/// `advance` gives each character's width in the same unit.
///
/// Splits on existing newlines first (blank lines are kept), then word-wraps
/// each paragraph. Words wider than `max_width` are broken on character
/// boundaries; a line always takes at least one character.
pub fn wrap_text<F>(text: &str, max_width: f32, advance: F) -> Vec<String>
where
    F: Fn(char) -> f32,
{
    let measure = |s: &str| -> f32 { s.chars().map(&advance).sum() };
    let space = advance(' ');
    let mut result = Vec::new();

    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        let mut current_width = 0.0f32;

        for word in words {
            let word_width = measure(word);
            if word_width > max_width {
                if !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                }
                current_width = 0.0;
                for ch in word.chars() {
                    let ch_width = advance(ch);
                    if !current_line.is_empty() && current_width + ch_width > max_width {
                        result.push(std::mem::take(&mut current_line));
                        current_width = 0.0;
                    }
                    current_line.push(ch);
                    current_width += ch_width;
                }
            } else if current_line.is_empty() {
                current_line.push_str(word);
                current_width = word_width;
            } else if current_width + space + word_width <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
                current_width += space + word_width;
            } else {
                result.push(std::mem::replace(&mut current_line, word.to_owned()));
                current_width = word_width;
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}

/// Split lines into pages of at most `lines_per_page` lines, keeping order.
pub fn paginate(lines: Vec<String>, lines_per_page: usize) -> Vec<Vec<String>> {
    let lines_per_page = lines_per_page.max(1);
    let mut pages = Vec::with_capacity(lines.len().div_ceil(lines_per_page));
    let mut current = Vec::with_capacity(lines_per_page);

    for line in lines {
        current.push(line);
        if current.len() == lines_per_page {
            pages.push(std::mem::replace(
                &mut current,
                Vec::with_capacity(lines_per_page),
            ));
        }
    }
    if !current.is_empty() {
        pages.push(current);
    }

    pages
}
