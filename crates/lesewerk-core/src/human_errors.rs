// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language error messages for readers with dyslexia.
//
// Every technical error maps to one short sentence and one short suggestion.
// Severity drives how the host UI presents it.

use crate::error::LesewerkError;

/// Severity of an error from the reader's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Trying again may work.
    Transient,
    /// The reader must do something first (install a font, free space).
    ActionRequired,
    /// Retrying will not help.
    Permanent,
}

/// A reader-facing error: short message, short suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Shown as a heading.
    pub message: String,
    /// Shown as body text.
    pub suggestion: String,
    /// Whether offering a "Try again" button makes sense.
    pub retriable: bool,
    /// Drives icon/colour in the UI.
    pub severity: Severity,
}

impl HumanError {
    fn new(message: &str, suggestion: &str, retriable: bool, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            retriable,
            severity,
        }
    }
}

/// Convert a `LesewerkError` into short, plain sentences.
pub fn humanize_error(err: &LesewerkError) -> HumanError {
    match err {
        LesewerkError::RecognitionFailure { page, .. } => HumanError {
            message: format!("We could not read page {}.", page + 1),
            suggestion: "Scan that page again in good light. Hold the camera still.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        LesewerkError::MissingImage { page } => HumanError {
            message: format!("Page {} has no picture.", page + 1),
            suggestion: "Scan the page again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        LesewerkError::InvalidPageSet(_) => HumanError::new(
            "The scan did not work.",
            "Please scan the pages again.",
            true,
            Severity::Transient,
        ),

        LesewerkError::OcrError(_) => HumanError::new(
            "Text reading is not set up.",
            "The reading models are missing. Ask for help to install them.",
            false,
            Severity::ActionRequired,
        ),

        LesewerkError::FontUnavailable { .. } => HumanError::new(
            "The reading font is missing.",
            "Install the OpenDyslexic font, then save again.",
            false,
            Severity::ActionRequired,
        ),

        LesewerkError::WriteFailure { source, .. } => {
            if source.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError::new(
                    "We could not save the PDF.",
                    "The app may not be allowed to save here. Try another place.",
                    true,
                    Severity::ActionRequired,
                )
            } else {
                HumanError::new(
                    "We could not save the PDF.",
                    "Your device may be full. Free some space and try again.",
                    true,
                    Severity::Transient,
                )
            }
        }

        LesewerkError::NothingScanned => HumanError::new(
            "There is no text yet.",
            "Tap the camera button to scan a page first.",
            false,
            Severity::ActionRequired,
        ),

        LesewerkError::Io(_) | LesewerkError::TaskFailed(_) => HumanError::new(
            "Something went wrong.",
            "Please try again.",
            true,
            Severity::Transient,
        ),

        LesewerkError::PlatformUnavailable => HumanError::new(
            "This is not available on your device.",
            "Some features need a phone or tablet.",
            false,
            Severity::Permanent,
        ),
    }
}
