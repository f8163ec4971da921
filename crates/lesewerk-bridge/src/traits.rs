// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capabilities.

use lesewerk_core::error::Result;
use lesewerk_core::{ExportArtifact, PageImageSet};

/// Default voice language for reading text aloud.
pub const DEFAULT_SPEECH_LANGUAGE: &str = "en-US";

/// Unified bridge that groups all native capabilities.
pub trait PlatformBridge:
    NativeDocumentCamera + NativeExportSurface + NativeSpeech + NativeClipboard + Send + Sync
{
    /// Human-readable platform name (e.g. "iOS 18", "Android 15").
    fn platform_name(&self) -> &str;
}

/// Multi-page document capture.
pub trait NativeDocumentCamera {
    /// Run one capture session and return its pages in physical order.
    /// Returns Ok(None) if the user cancelled.
    fn capture_pages(&self) -> Result<Option<PageImageSet>>;
}

/// The OS save/export sheet.
pub trait NativeExportSurface {
    /// Present the artifact so the user can choose where it lands.
    ///
    /// Takes ownership: the caller keeps no reference after hand-off.
    /// Returns Ok(()) once the sheet was presented (the user may still cancel).
    fn present_export(&self, artifact: ExportArtifact) -> Result<()>;
}

/// Text-to-speech.
pub trait NativeSpeech {
    /// Start reading `text` aloud in `language` (BCP 47, e.g. "en-US").
    fn speak(&self, text: &str, language: &str) -> Result<()>;
}

/// System clipboard.
pub trait NativeClipboard {
    /// Replace the clipboard contents with `text`.
    fn set_text(&self, text: &str) -> Result<()>;
}
