// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer: owns the live render settings and the displayed
// document, and runs scans and exports on blocking worker tasks so the host
// UI stays responsive.
//
// The displayed document sits behind a `Mutex`; the lock is only held to swap
// or clone the document, never across recognition or rendering.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lesewerk_bridge::traits::{
    DEFAULT_SPEECH_LANGUAGE, NativeClipboard, NativeDocumentCamera, NativeExportSurface,
    NativeSpeech,
};
use lesewerk_core::error::{LesewerkError, Result};
use lesewerk_core::{
    AggregatedDocument, ExportArtifact, PageImageSet, PipelineConfig, RenderConfig,
    RenderConfigStore, ScanReport,
};
use lesewerk_document::{PdfExporter, RecognitionAggregator, TextRecognizer};
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use super::data_dir;
use crate::state::DocumentState;

/// Shared application services for the host UI.
///
/// All fields are cheaply cloneable (Arc-wrapped) so the struct can be moved
/// into closures and async blocks freely.
#[derive(Clone)]
pub struct LesewerkServices {
    render: RenderConfigStore,
    pipeline: Arc<PipelineConfig>,
    recognizer: Arc<dyn TextRecognizer>,
    exporter: Arc<PdfExporter>,
    document: Arc<Mutex<DocumentState>>,
    scanning: Arc<AtomicBool>,
    exporting: Arc<AtomicBool>,
}

impl LesewerkServices {
    /// Wire up the services around `recognizer`.
    ///
    /// Exports are staged in [`data_dir::staging_dir`] unless the pipeline
    /// config names a directory.
    pub fn new(recognizer: Arc<dyn TextRecognizer>, mut pipeline: PipelineConfig) -> Self {
        if pipeline.export.staging_dir.is_none() {
            pipeline.export.staging_dir = Some(data_dir::staging_dir());
        }

        info!(
            recognizer = recognizer.name(),
            policy = ?pipeline.page_failure_policy,
            parallel = pipeline.parallel_recognition,
            "Lesewerk services initialised"
        );

        Self {
            render: RenderConfigStore::new(),
            exporter: Arc::new(PdfExporter::new(pipeline.export.clone())),
            pipeline: Arc::new(pipeline),
            recognizer,
            document: Arc::new(Mutex::new(DocumentState::default())),
            scanning: Arc::new(AtomicBool::new(false)),
            exporting: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Services backed by the `ocrs` engine with models from the default cache.
    #[cfg(feature = "ocr")]
    pub fn with_ocrs(pipeline: PipelineConfig) -> Result<Self> {
        let recognizer = lesewerk_document::OcrsRecognizer::with_defaults()?;
        Ok(Self::new(Arc::new(recognizer), pipeline))
    }

    // -- Render settings -----------------------------------------------------

    /// Handle to the live settings, for the display path.
    pub fn render_store(&self) -> RenderConfigStore {
        self.render.clone()
    }

    pub fn render_config(&self) -> RenderConfig {
        self.render.get()
    }

    /// Apply a settings change from the settings screen.
    pub fn update_render_config(&self, font_size_pt: f32, high_contrast: bool) -> RenderConfig {
        let config = self.render.update(font_size_pt, high_contrast);
        info!(
            font_size_pt = config.font_size_pt(),
            high_contrast = config.high_contrast(),
            "Render settings updated"
        );
        config
    }

    // -- Document ------------------------------------------------------------

    /// Snapshot of what the reader currently sees.
    pub fn document(&self) -> DocumentState {
        self.lock_document().clone()
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::SeqCst)
    }

    // -- Scanning ------------------------------------------------------------

    /// Recognise a capture session and replace the displayed document.
    ///
    /// With `parallel_recognition`, pages run on concurrent blocking tasks
    /// (at most `max_recognition_workers` at once) and are merged in page
    /// order; otherwise they run one after another on a single task. On error
    /// the displayed document is left unchanged.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub async fn scan(&self, pages: PageImageSet) -> Result<ScanReport> {
        let _busy = BusyFlag::raise(&self.scanning);
        let aggregator = RecognitionAggregator::new(self.pipeline.page_failure_policy);

        let (document, report) = if self.pipeline.parallel_recognition && pages.len() > 1 {
            self.recognize_concurrently(aggregator, pages).await?
        } else {
            let recognizer = Arc::clone(&self.recognizer);
            tokio::task::spawn_blocking(move || {
                aggregator.aggregate_with_report(pages, recognizer.as_ref())
            })
            .await
            .map_err(|err| LesewerkError::TaskFailed(err.to_string()))??
        };

        if !report.is_complete() {
            warn!(
                failed = ?report.failed_pages,
                missing = ?report.missing_pages,
                "Some pages produced no text"
            );
        }

        let scan_id = self.lock_document().replace(document, report.clone());
        info!(%scan_id, pages = report.page_count, "Scan complete");
        Ok(report)
    }

    /// Run the platform document camera, then scan what it captured.
    ///
    /// Returns Ok(None) if the user cancelled the capture.
    pub async fn capture_and_scan<C>(&self, camera: &C) -> Result<Option<ScanReport>>
    where
        C: NativeDocumentCamera + ?Sized,
    {
        match camera.capture_pages()? {
            Some(pages) => self.scan(pages).await.map(Some),
            None => {
                info!("Capture cancelled");
                Ok(None)
            }
        }
    }

    async fn recognize_concurrently(
        &self,
        aggregator: RecognitionAggregator,
        pages: PageImageSet,
    ) -> Result<(AggregatedDocument, ScanReport)> {
        let workers = self.pipeline.max_recognition_workers.max(1);
        let semaphore = Arc::new(Semaphore::new(workers));
        info!(workers, "Starting concurrent recognition");

        let mut handles = Vec::with_capacity(pages.len());
        for page in pages.into_pages() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|err| LesewerkError::TaskFailed(err.to_string()))?;
            let recognizer = Arc::clone(&self.recognizer);
            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                aggregator.recognize_page(recognizer.as_ref(), &page)
            }));
        }

        // Every handle is awaited, even after a failure, so no recognition
        // work outlives the scan.
        let mut outcomes = Vec::with_capacity(handles.len());
        let mut first_failure: Option<String> = None;
        for handle in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    warn!(%err, "Recognition task failed");
                    first_failure.get_or_insert_with(|| err.to_string());
                }
            }
        }

        match first_failure {
            Some(reason) => Err(LesewerkError::TaskFailed(reason)),
            None => aggregator.assemble(outcomes),
        }
    }

    // -- Export --------------------------------------------------------------

    /// Render the displayed document under the current settings and stage it.
    ///
    /// Fails with [`LesewerkError::NothingScanned`] before the first scan.
    #[instrument(skip_all)]
    pub async fn export_pdf(&self) -> Result<ExportArtifact> {
        let document = self
            .lock_document()
            .scanned()
            .map(|scan| scan.document.clone())
            .ok_or(LesewerkError::NothingScanned)?;
        let render = self.render.get();

        let _busy = BusyFlag::raise(&self.exporting);
        let exporter = Arc::clone(&self.exporter);
        tokio::task::spawn_blocking(move || exporter.export(&document, &render))
            .await
            .map_err(|err| LesewerkError::TaskFailed(err.to_string()))?
    }

    /// Export and hand the artifact to the platform save sheet.
    pub async fn export_and_present<S>(&self, surface: &S) -> Result<()>
    where
        S: NativeExportSurface + ?Sized,
    {
        let artifact = self.export_pdf().await?;
        info!(
            file = %artifact.file_name,
            mime = artifact.mime_type(),
            bytes = artifact.bytes.len(),
            "Presenting export"
        );
        surface.present_export(artifact)
    }

    // -- Speech and clipboard ------------------------------------------------

    /// Read the scanned text aloud.
    pub fn read_aloud<S>(&self, speech: &S) -> Result<()>
    where
        S: NativeSpeech + ?Sized,
    {
        let text = self.scanned_text()?;
        speech.speak(&text, DEFAULT_SPEECH_LANGUAGE)
    }

    /// Put the scanned text on the clipboard.
    pub fn copy_to_clipboard<C>(&self, clipboard: &C) -> Result<()>
    where
        C: NativeClipboard + ?Sized,
    {
        let text = self.scanned_text()?;
        clipboard.set_text(&text)
    }

    // -- Helpers -------------------------------------------------------------

    fn scanned_text(&self) -> Result<String> {
        let state = self.lock_document();
        if state.has_scanned_text() {
            Ok(state.display_text().to_owned())
        } else {
            Err(LesewerkError::NothingScanned)
        }
    }

    fn lock_document(&self) -> MutexGuard<'_, DocumentState> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds a busy flag up for as long as it lives.
struct BusyFlag<'a>(&'a AtomicBool);

impl<'a> BusyFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for BusyFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use image::{DynamicImage, GrayImage};
    use lesewerk_core::{
        ExportConfig, PageFailurePolicy, PageRaster, RecognitionLevel, RecognizedRegion,
    };

    use super::*;

    /// Page `n` is an image `n` pixels wide; the recognizer answers with the
    /// scripted lines for that width after a scripted delay.
    #[derive(Default)]
    struct SlowRecognizer {
        script: HashMap<u32, (Duration, Option<Vec<&'static str>>)>,
        panics_on: Option<u32>,
        finished: AtomicUsize,
    }

    impl SlowRecognizer {
        fn page(mut self, key: u32, delay_ms: u64, lines: &[&'static str]) -> Self {
            self.script
                .insert(key, (Duration::from_millis(delay_ms), Some(lines.to_vec())));
            self
        }

        fn failing(mut self, key: u32) -> Self {
            self.script.insert(key, (Duration::ZERO, None));
            self
        }

        fn panicking(mut self, key: u32) -> Self {
            self.panics_on = Some(key);
            self
        }
    }

    impl TextRecognizer for SlowRecognizer {
        fn name(&self) -> &str {
            "slow"
        }

        fn recognize(
            &self,
            image: &DynamicImage,
            _level: RecognitionLevel,
        ) -> Result<Vec<RecognizedRegion>> {
            if self.panics_on == Some(image.width()) {
                panic!("recognizer crashed on page {}", image.width());
            }
            let (delay, lines) = self.script.get(&image.width()).cloned().unwrap_or_default();
            std::thread::sleep(delay);
            self.finished.fetch_add(1, Ordering::SeqCst);
            match lines {
                Some(lines) => Ok(lines.into_iter().map(RecognizedRegion::single).collect()),
                None => Err(LesewerkError::OcrError("blurred".into())),
            }
        }
    }

    fn pages(keys: &[u32]) -> PageImageSet {
        PageImageSet::new(
            keys.iter()
                .map(|k| PageRaster::Decoded(DynamicImage::ImageLuma8(GrayImage::new(*k, 1))))
                .collect(),
        )
    }

    fn pipeline(staging: &Path, parallel: bool) -> PipelineConfig {
        PipelineConfig {
            parallel_recognition: parallel,
            export: ExportConfig {
                font_path: Some(staging.join("missing-font.otf")),
                allow_fallback_font: true,
                staging_dir: Some(staging.to_path_buf()),
                ..ExportConfig::default()
            },
            ..PipelineConfig::default()
        }
    }

    /// Earlier pages finish last, so completion order is the reverse of
    /// capture order.
    fn reverse_latency_recognizer() -> SlowRecognizer {
        SlowRecognizer::default()
            .page(1, 120, &["one"])
            .page(2, 80, &["two", "zwei"])
            .page(3, 40, &["three"])
            .page(4, 0, &["four"])
    }

    #[derive(Default)]
    struct Recorder {
        spoken: Mutex<Vec<(String, String)>>,
        clipboard: Mutex<Option<String>>,
        exported: Mutex<Vec<ExportArtifact>>,
    }

    impl NativeSpeech for Recorder {
        fn speak(&self, text: &str, language: &str) -> Result<()> {
            self.spoken
                .lock()
                .unwrap()
                .push((text.to_owned(), language.to_owned()));
            Ok(())
        }
    }

    impl NativeClipboard for Recorder {
        fn set_text(&self, text: &str) -> Result<()> {
            *self.clipboard.lock().unwrap() = Some(text.to_owned());
            Ok(())
        }
    }

    impl NativeExportSurface for Recorder {
        fn present_export(&self, artifact: ExportArtifact) -> Result<()> {
            self.exported.lock().unwrap().push(artifact);
            Ok(())
        }
    }

    impl NativeDocumentCamera for Recorder {
        fn capture_pages(&self) -> Result<Option<PageImageSet>> {
            Ok(None)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_scan_keeps_capture_order() {
        let dir = tempfile::tempdir().unwrap();
        let services = LesewerkServices::new(
            Arc::new(reverse_latency_recognizer()),
            pipeline(dir.path(), true),
        );

        let report = services.scan(pages(&[1, 2, 3, 4])).await.unwrap();
        assert_eq!(report.page_count, 4);
        assert_eq!(
            services.document().display_text(),
            "one\n\ntwo\nzwei\n\nthree\n\nfour"
        );
        assert!(!services.is_scanning());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn sequential_and_concurrent_scans_agree() {
        let dir = tempfile::tempdir().unwrap();
        let recognizer: Arc<dyn TextRecognizer> = Arc::new(reverse_latency_recognizer());
        let sequential = LesewerkServices::new(Arc::clone(&recognizer), pipeline(dir.path(), false));
        let concurrent = LesewerkServices::new(recognizer, pipeline(dir.path(), true));

        sequential.scan(pages(&[4, 3, 2, 1])).await.unwrap();
        concurrent.scan(pages(&[4, 3, 2, 1])).await.unwrap();
        assert_eq!(
            sequential.document().display_text(),
            concurrent.document().display_text()
        );
        assert_eq!(
            concurrent.document().display_text(),
            "four\n\nthree\n\ntwo\nzwei\n\none"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failed_page_leaves_a_gap_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let recognizer = SlowRecognizer::default()
            .page(1, 0, &["kept"])
            .failing(2)
            .page(3, 0, &["also kept"]);
        let services = LesewerkServices::new(Arc::new(recognizer), pipeline(dir.path(), true));

        let report = services.scan(pages(&[1, 2, 3])).await.unwrap();
        assert_eq!(report.failed_pages, vec![1]);
        assert_eq!(services.document().display_text(), "kept\n\nalso kept");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn strict_failure_keeps_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let recognizer = SlowRecognizer::default().page(1, 0, &["first scan"]).failing(2);
        let mut config = pipeline(dir.path(), true);
        config.page_failure_policy = PageFailurePolicy::Strict;
        let services = LesewerkServices::new(Arc::new(recognizer), config);

        services.scan(pages(&[1])).await.unwrap();
        let result = services.scan(pages(&[1, 2])).await;

        assert!(matches!(
            result,
            Err(LesewerkError::RecognitionFailure { page: 1, .. })
        ));
        assert_eq!(services.document().display_text(), "first scan");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn crashed_worker_fails_the_scan_after_the_rest_finish() {
        let dir = tempfile::tempdir().unwrap();
        let recognizer = Arc::new(
            SlowRecognizer::default()
                .panicking(1)
                .page(2, 100, &["two"])
                .page(3, 100, &["three"]),
        );
        let services = LesewerkServices::new(recognizer.clone(), pipeline(dir.path(), true));

        let result = services.scan(pages(&[1, 2, 3])).await;

        assert!(matches!(result, Err(LesewerkError::TaskFailed(_))));
        assert_eq!(recognizer.finished.load(Ordering::SeqCst), 2);
        assert!(services.document().scanned().is_none());
        assert!(!services.is_scanning());
    }

    #[tokio::test]
    async fn export_before_any_scan_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let services = LesewerkServices::new(
            Arc::new(SlowRecognizer::default()),
            pipeline(dir.path(), false),
        );
        assert!(matches!(
            services.export_pdf().await,
            Err(LesewerkError::NothingScanned)
        ));
        assert!(!services.is_exporting());
    }

    #[tokio::test]
    async fn export_uses_current_settings_and_hands_off_the_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let services = LesewerkServices::new(
            Arc::new(SlowRecognizer::default().page(1, 0, &["Hello"]).page(2, 0, &["World"])),
            pipeline(dir.path(), false),
        );
        services.scan(pages(&[1, 2])).await.unwrap();

        let stored = services.update_render_config(60.0, true);
        assert_eq!(stored.font_size_pt(), 50.0);
        assert_eq!(services.render_store().get(), stored);

        let surface = Recorder::default();
        services.export_and_present(&surface).await.unwrap();

        let exported = surface.exported.lock().unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].file_name, "RecognisedText.pdf");
        assert_eq!(exported[0].mime_type(), "application/pdf");
        assert_eq!(exported[0].staged_path, dir.path().join("RecognisedText.pdf"));
        assert!(exported[0].bytes.starts_with(b"%PDF"));
        assert!(!services.is_exporting());
    }

    #[tokio::test]
    async fn speech_and_clipboard_get_the_scanned_text() {
        let dir = tempfile::tempdir().unwrap();
        let services = LesewerkServices::new(
            Arc::new(SlowRecognizer::default().page(1, 0, &["Read me"])),
            pipeline(dir.path(), false),
        );
        let recorder = Recorder::default();

        assert!(matches!(
            services.read_aloud(&recorder),
            Err(LesewerkError::NothingScanned)
        ));
        assert!(services.copy_to_clipboard(&recorder).is_err());

        services.scan(pages(&[1])).await.unwrap();
        services.read_aloud(&recorder).unwrap();
        services.copy_to_clipboard(&recorder).unwrap();

        assert_eq!(
            *recorder.spoken.lock().unwrap(),
            vec![("Read me".to_owned(), "en-US".to_owned())]
        );
        assert_eq!(recorder.clipboard.lock().unwrap().as_deref(), Some("Read me"));
    }

    #[tokio::test]
    async fn cancelled_capture_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let services = LesewerkServices::new(
            Arc::new(SlowRecognizer::default()),
            pipeline(dir.path(), false),
        );
        let outcome = services.capture_and_scan(&Recorder::default()).await.unwrap();
        assert!(outcome.is_none());
        assert!(services.document().scanned().is_none());
    }

    #[tokio::test]
    async fn empty_capture_yields_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let services = LesewerkServices::new(
            Arc::new(SlowRecognizer::default()),
            pipeline(dir.path(), true),
        );
        let report = services.scan(PageImageSet::default()).await.unwrap();
        assert_eq!(report.page_count, 0);
        assert_eq!(services.document().display_text(), "");
        assert!(services.document().scanned().is_some());
    }
}
