// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lesewerk: native platform collaborators.
//
// The scan pipeline consumes page images from a document camera and hands
// finished PDFs to a save surface; speech and clipboard read the displayed
// text. These traits keep the pipeline independent of the platform SDKs.

pub mod traits;

#[cfg(not(any(target_os = "ios", target_os = "android")))]
pub mod stub;

/// The bridge for the target operating system.
///
/// Desktop and CI builds get [`stub::StubBridge`]; mobile hosts supply their
/// own `PlatformBridge` implementation.
#[cfg(not(any(target_os = "ios", target_os = "android")))]
pub fn platform_bridge() -> Box<dyn traits::PlatformBridge> {
    Box::new(stub::StubBridge)
}
