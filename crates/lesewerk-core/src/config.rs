// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration: the live render settings shared by display and
// export, and the pipeline settings supplied by the host application.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Smallest font size the reader can select, in points.
pub const FONT_SIZE_MIN: f32 = 15.0;
/// Largest font size the reader can select, in points.
pub const FONT_SIZE_MAX: f32 = 50.0;
/// Font size used until the reader changes it.
pub const FONT_SIZE_DEFAULT: f32 = 25.0;

/// File name of the accessible typeface looked up in the font directory.
pub const ACCESSIBLE_FONT_FILENAME: &str = "OpenDyslexic-Regular.otf";
/// Canonical file name for every PDF export.
pub const EXPORT_FILE_NAME: &str = "RecognisedText.pdf";

// -- Render settings ----------------------------------------------------------

/// Accessible rendering parameters.
///
/// The font size is always within [`FONT_SIZE_MIN`]..=[`FONT_SIZE_MAX`]; every
/// constructor clamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    font_size_pt: f32,
    high_contrast: bool,
}

impl RenderConfig {
    /// Build a config, clamping `font_size_pt` into range. Non-finite sizes
    /// fall back to the default.
    pub fn new(font_size_pt: f32, high_contrast: bool) -> Self {
        Self {
            font_size_pt: clamp_font_size(font_size_pt),
            high_contrast,
        }
    }

    pub fn font_size_pt(&self) -> f32 {
        self.font_size_pt
    }

    pub fn high_contrast(&self) -> bool {
        self.high_contrast
    }

    /// On-screen colours for the displayed text.
    ///
    /// Only the display path uses this. PDF output is always dark ink on white.
    pub fn palette(&self) -> Palette {
        if self.high_contrast {
            Palette {
                foreground: Rgb(0xFF, 0xD6, 0x0A),
                background: Rgb(0x00, 0x00, 0x00),
            }
        } else {
            Palette {
                foreground: Rgb(0x1C, 0x1C, 0x1E),
                background: Rgb(0xF2, 0xF2, 0xF7),
            }
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_size_pt: FONT_SIZE_DEFAULT,
            high_contrast: false,
        }
    }
}

fn clamp_font_size(size: f32) -> f32 {
    if size.is_finite() {
        size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX)
    } else {
        FONT_SIZE_DEFAULT
    }
}

/// An 8-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Foreground/background colour pair for on-screen text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub foreground: Rgb,
    pub background: Rgb,
}

/// The one live [`RenderConfig`] for an application session.
///
/// Cloning the store clones the handle, not the value: every clone observes
/// the same settings. Last write wins. Nothing is persisted, so a new store
/// always starts from [`RenderConfig::default`].
#[derive(Debug, Clone, Default)]
pub struct RenderConfigStore {
    inner: Arc<RwLock<RenderConfig>>,
}

impl RenderConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current settings.
    pub fn get(&self) -> RenderConfig {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the settings. Out-of-range sizes are clamped, never rejected.
    /// Returns the value actually stored.
    pub fn update(&self, font_size_pt: f32, high_contrast: bool) -> RenderConfig {
        let config = RenderConfig::new(font_size_pt, high_contrast);
        if config.font_size_pt() != font_size_pt {
            debug!(
                requested = font_size_pt,
                stored = config.font_size_pt(),
                "Font size clamped"
            );
        }
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = config;
        config
    }

    /// Restore the defaults.
    pub fn reset(&self) -> RenderConfig {
        let config = RenderConfig::default();
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = config;
        config
    }
}

// -- Pipeline settings --------------------------------------------------------

/// What the aggregator does when a single page cannot be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageFailurePolicy {
    /// The page contributes no text and the scan carries on.
    #[default]
    Silent,
    /// The whole scan fails with the first page's recognition error.
    Strict,
}

/// Settings for the scan and export pipeline, supplied by the host app.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub page_failure_policy: PageFailurePolicy,
    /// Recognise pages on concurrent worker tasks (output order is unchanged).
    pub parallel_recognition: bool,
    /// Upper bound on concurrently recognised pages.
    pub max_recognition_workers: usize,
    pub export: ExportConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            page_failure_policy: PageFailurePolicy::Silent,
            parallel_recognition: true,
            max_recognition_workers: 4,
            export: ExportConfig::default(),
        }
    }
}

/// PDF export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Path to the accessible typeface. `None` means the default font
    /// directory plus [`ACCESSIBLE_FONT_FILENAME`].
    pub font_path: Option<PathBuf>,
    /// Render with a built-in typeface when the accessible one is missing.
    pub allow_fallback_font: bool,
    /// Where the PDF is staged before hand-off. `None` means the OS temp dir.
    pub staging_dir: Option<PathBuf>,
    /// `/Title` in the PDF info dictionary.
    pub title: String,
    /// `/Creator` in the PDF info dictionary.
    pub creator: String,
    /// `/Author` in the PDF info dictionary.
    pub author: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            allow_fallback_font: false,
            staging_dir: None,
            title: "Recognised Text".into(),
            creator: "Lesewerk".into(),
            author: "User".into(),
        }
    }
}

impl ExportConfig {
    /// The font file to load, resolving the default location when unset.
    pub fn resolved_font_path(&self) -> PathBuf {
        self.font_path
            .clone()
            .unwrap_or_else(|| default_font_dir().join(ACCESSIBLE_FONT_FILENAME))
    }

    /// The directory the PDF is staged in.
    pub fn resolved_staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Default directory searched for the accessible typeface.
///
/// `$LESEWERK_FONT_DIR`, then `$XDG_DATA_HOME/fonts`, then
/// `~/.local/share/fonts`, and `./fonts` when `$HOME` is unset too.
pub fn default_font_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LESEWERK_FONT_DIR") {
        PathBuf::from(dir)
    } else if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg).join("fonts")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".local").join("share").join("fonts")
    } else {
        PathBuf::from("fonts")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_render_config() {
        let config = RenderConfig::default();
        assert_eq!(config.font_size_pt(), 25.0);
        assert!(!config.high_contrast());
    }

    #[test]
    fn font_size_is_clamped_into_range() {
        assert_eq!(RenderConfig::new(60.0, false).font_size_pt(), 50.0);
        assert_eq!(RenderConfig::new(3.0, false).font_size_pt(), 15.0);
        assert_eq!(RenderConfig::new(15.0, false).font_size_pt(), 15.0);
        assert_eq!(RenderConfig::new(50.0, false).font_size_pt(), 50.0);
        assert_eq!(RenderConfig::new(f32::NAN, true).font_size_pt(), 25.0);
    }

    #[test]
    fn store_updates_are_visible_to_every_clone() {
        let store = RenderConfigStore::new();
        let display = store.clone();

        let stored = store.update(60.0, true);
        assert_eq!(stored.font_size_pt(), 50.0);
        assert_eq!(display.get(), stored);

        store.update(18.0, false);
        assert_eq!(display.get().font_size_pt(), 18.0);
        assert!(!display.get().high_contrast());
    }

    #[test]
    fn store_reset_restores_defaults() {
        let store = RenderConfigStore::new();
        store.update(40.0, true);
        assert_eq!(store.reset(), RenderConfig::default());
        assert_eq!(store.get(), RenderConfig::default());
    }

    #[test]
    fn high_contrast_palette_is_yellow_on_black() {
        let palette = RenderConfig::new(25.0, true).palette();
        assert_eq!(palette.background, Rgb(0, 0, 0));
        assert_ne!(palette, RenderConfig::default().palette());
    }

    #[test]
    fn pipeline_config_fills_missing_fields_with_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "page_failure_policy": "strict" }"#).unwrap();
        assert_eq!(config.page_failure_policy, PageFailurePolicy::Strict);
        assert!(config.parallel_recognition);
        assert_eq!(config.max_recognition_workers, 4);
        assert!(!config.export.allow_fallback_font);
        assert_eq!(config.export.creator, "Lesewerk");
        assert_eq!(config.export.author, "User");
    }

    #[test]
    fn explicit_font_path_wins() {
        let export = ExportConfig {
            font_path: Some(PathBuf::from("/opt/fonts/Reader.otf")),
            ..ExportConfig::default()
        };
        assert_eq!(
            export.resolved_font_path(),
            PathBuf::from("/opt/fonts/Reader.otf")
        );
        assert!(
            ExportConfig::default()
                .resolved_font_path()
                .ends_with(ACCESSIBLE_FONT_FILENAME)
        );
    }
}
