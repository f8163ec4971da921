// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `ocrs`-backed text recognizer.
//
// A pure-Rust OCR engine running neural network models via `rten`. Only
// available with the `ocr` feature:
//
// ```toml
// lesewerk-document = { path = "crates/lesewerk-document", features = ["ocr"] }
// ```
//
// # Model Setup
//
// Two model files are required:
//
// - **Detection model** (`text-detection.rten`): locates words in the image.
// - **Recognition model** (`text-recognition.rten`): decodes each text line.
//
// Running `ocrs-cli` once downloads both into `$XDG_CACHE_HOME/ocrs`
// (typically `~/.cache/ocrs`), which is where [`OcrConfig::default`] looks.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use lesewerk_core::error::{LesewerkError, Result};
use lesewerk_core::{RecognitionLevel, RecognizedRegion};
use ocrs::{DecodeMethod, ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use tracing::{debug, info, instrument};

use super::TextRecognizer;

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Beam width used for [`RecognitionLevel::Accurate`].
const ACCURATE_BEAM_WIDTH: u32 = 100;

fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Where to find the models, and which decoding mode to build the engine in.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
    pub level: RecognitionLevel,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Expect `text-detection.rten` and `text-recognition.rten` in `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
            level: RecognitionLevel::Accurate,
        }
    }

    /// Verify that both model files exist.
    pub fn validate(&self) -> Result<()> {
        for path in [&self.detection_model_path, &self.recognition_model_path] {
            if !path.exists() {
                return Err(LesewerkError::OcrError(format!(
                    "model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// [`TextRecognizer`] backed by the `ocrs` engine.
///
/// Each detected text line becomes one region with a single candidate; `ocrs`
/// does not report alternatives. Model loading is the expensive step, so build
/// one recognizer and reuse it for every page.
pub struct OcrsRecognizer {
    engine: OcrEngine,
    level: RecognitionLevel,
}

impl OcrsRecognizer {
    /// Load the models named in `config`.
    ///
    /// # Errors
    ///
    /// [`LesewerkError::OcrError`] if a model file is missing or corrupt.
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: OcrConfig) -> Result<Self> {
        config.validate()?;

        let detection_model = load_model(&config.detection_model_path)?;
        let recognition_model = load_model(&config.recognition_model_path)?;

        let decode_method = match config.level {
            RecognitionLevel::Accurate => DecodeMethod::BeamSearch {
                width: ACCURATE_BEAM_WIDTH,
            },
            RecognitionLevel::Fast => DecodeMethod::Greedy,
        };

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method,
            ..Default::default()
        })
        .map_err(|err| LesewerkError::OcrError(format!("failed to initialise OCR engine: {err}")))?;

        info!(level = ?config.level, "OCR engine initialised");
        Ok(Self {
            engine,
            level: config.level,
        })
    }

    /// Load models from the default cache directory.
    pub fn with_defaults() -> Result<Self> {
        Self::new(OcrConfig::default())
    }
}

impl TextRecognizer for OcrsRecognizer {
    fn name(&self) -> &str {
        "ocrs"
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize(
        &self,
        image: &DynamicImage,
        level: RecognitionLevel,
    ) -> Result<Vec<RecognizedRegion>> {
        if level != self.level {
            debug!(requested = ?level, built = ?self.level, "Engine decodes at its built level");
        }

        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            LesewerkError::OcrError(format!("bad image source ({width}x{height}): {err}"))
        })?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| LesewerkError::OcrError(format!("preprocessing failed: {err}")))?;

        let words = self
            .engine
            .detect_words(&input)
            .map_err(|err| LesewerkError::OcrError(format!("word detection failed: {err}")))?;
        let line_rects = self.engine.find_text_lines(&input, &words);
        let lines = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|err| LesewerkError::OcrError(format!("line recognition failed: {err}")))?;

        let regions: Vec<RecognizedRegion> = lines
            .iter()
            .flatten()
            .map(|line| line.to_string())
            .filter(|text| !text.trim().is_empty())
            .map(RecognizedRegion::single)
            .collect();

        debug!(
            words = words.len(),
            regions = regions.len(),
            "Page recognised by ocrs"
        );
        Ok(regions)
    }
}

fn load_model(path: &Path) -> Result<Model> {
    info!(path = %path.display(), "Loading OCR model");
    Model::load_file(path).map_err(|err| {
        LesewerkError::OcrError(format!("failed to load model {}: {err}", path.display()))
    })
}
