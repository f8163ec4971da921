// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Staging directory resolution.

use std::path::PathBuf;

/// Directory exported PDFs are staged in before the save sheet takes over.
///
/// `$LESEWERK_STAGING_DIR` if set, otherwise `lesewerk` inside the OS temp
/// directory. The directory is created on first export, not here.
pub fn staging_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LESEWERK_STAGING_DIR") {
        return PathBuf::from(dir);
    }
    std::env::temp_dir().join("lesewerk")
}
