// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where native mobile APIs are unavailable.
//
// Every trait method returns `PlatformUnavailable`.

use lesewerk_core::error::{LesewerkError, Result};
use lesewerk_core::{ExportArtifact, PageImageSet};

use crate::traits::*;

/// No-op bridge returned on non-mobile platforms.
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl NativeDocumentCamera for StubBridge {
    fn capture_pages(&self) -> Result<Option<PageImageSet>> {
        tracing::warn!("NativeDocumentCamera::capture_pages called on stub bridge");
        Err(LesewerkError::PlatformUnavailable)
    }
}

impl NativeExportSurface for StubBridge {
    fn present_export(&self, artifact: ExportArtifact) -> Result<()> {
        tracing::warn!(
            staged = %artifact.staged_path.display(),
            "NativeExportSurface::present_export called on stub bridge"
        );
        Err(LesewerkError::PlatformUnavailable)
    }
}

impl NativeSpeech for StubBridge {
    fn speak(&self, _text: &str, _language: &str) -> Result<()> {
        tracing::warn!("NativeSpeech::speak called on stub bridge");
        Err(LesewerkError::PlatformUnavailable)
    }
}

impl NativeClipboard for StubBridge {
    fn set_text(&self, _text: &str) -> Result<()> {
        Err(LesewerkError::PlatformUnavailable)
    }
}
