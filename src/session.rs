//! Per-user working state: the selected frame, pending product photos, and the last batch.
//!
//! The pipeline itself stays stateless; a [`Session`] decides when to call it and keeps the
//! detected opening for the current frame so repeated runs with the same detection settings
//! do not rescan the frame.

use std::sync::Arc;

use crate::{
    assets::{
        decode::{SourceFile, decode_image, ingest, validate_mime},
        library::{FrameAsset, FrameId, FrameLibrary},
    },
    config::PipelineConfig,
    detect::{DetectionConfig, detect_opening},
    foundation::{
        core::{PixelBuffer, Progress, Rectangle},
        error::{FramefitError, FramefitResult},
    },
    pipeline::{BatchObserver, BatchOutcome, CompositeResult, ProductId, ProductItem, run_batch},
    render::CompositeBackend,
};

/// Callbacks for session-level events. All methods default to no-ops.
pub trait SessionObserver {
    fn on_upload_progress(&mut self, _progress: Progress) {}
    fn on_processing_progress(&mut self, _progress: Progress) {}
    fn on_item_ready(&mut self, _result: &CompositeResult) {}
}

pub struct NoopSessionObserver;

impl SessionObserver for NoopSessionObserver {}

/// Routes pipeline events into the session observer's processing channel.
struct ProcessingEvents<'a>(&'a mut dyn SessionObserver);

impl BatchObserver for ProcessingEvents<'_> {
    fn on_progress(&mut self, progress: Progress) {
        self.0.on_processing_progress(progress);
    }

    fn on_item_ready(&mut self, result: &CompositeResult) {
        self.0.on_item_ready(result);
    }
}

/// A file from an upload set that was not added.
#[derive(Debug)]
pub struct UploadFailure {
    pub name: String,
    pub error: FramefitError,
}

#[derive(Debug, Default)]
pub struct UploadReport {
    pub added: Vec<ProductId>,
    /// Validation and decode failures, in upload order.
    pub rejected: Vec<UploadFailure>,
}

#[derive(Debug, Default)]
pub struct Session {
    frame_id: Option<FrameId>,
    frame: Option<Arc<PixelBuffer>>,
    /// Detected opening and the settings it was detected with.
    opening: Option<(DetectionConfig, Rectangle)>,
    products: Vec<ProductItem>,
    next_id: u64,
    last_batch: BatchOutcome,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with `initial` already selected.
    pub fn with_frame(library: &FrameLibrary, initial: FrameId) -> FramefitResult<Self> {
        let mut sess = Self::new();
        sess.select_frame(initial, library)?;
        Ok(sess)
    }

    /// Switch frames. Choosing [`FrameId::Custom`] clears the frame until one is uploaded.
    pub fn select_frame(&mut self, id: FrameId, library: &FrameLibrary) -> FramefitResult<()> {
        if id == FrameId::Custom {
            self.set_frame(Some(id), None);
            return Ok(());
        }
        let FrameAsset { id, pixels } = library.get(id).ok_or_else(|| {
            FramefitError::validation(format!("prebuilt frame '{id}' is not available"))
        })?;
        tracing::debug!(%id, "prebuilt frame selected");
        self.set_frame(Some(id), Some(pixels));
        Ok(())
    }

    /// Use a user-supplied frame image. On error the current frame is left untouched.
    pub fn upload_custom_frame(&mut self, file: &SourceFile) -> FramefitResult<()> {
        let pixels = ingest(file)?;
        tracing::debug!(name = %file.name, width = pixels.width(), height = pixels.height(), "custom frame uploaded");
        self.set_frame(Some(FrameId::Custom), Some(Arc::new(pixels)));
        Ok(())
    }

    fn set_frame(&mut self, id: Option<FrameId>, frame: Option<Arc<PixelBuffer>>) {
        self.frame_id = id;
        self.frame = frame;
        self.opening = None;
    }

    pub fn frame_id(&self) -> Option<FrameId> {
        self.frame_id
    }

    pub fn frame(&self) -> Option<&PixelBuffer> {
        self.frame.as_deref()
    }

    /// Add product photos.
    ///
    /// Files with unsupported MIME types and files that fail to decode are reported in
    /// [`UploadReport::rejected`] without stopping the others. If no file in `files` has an
    /// accepted type the whole call fails and nothing changes.
    pub fn upload_products(
        &mut self,
        files: &[SourceFile],
        observer: &mut dyn SessionObserver,
    ) -> FramefitResult<UploadReport> {
        let mut report = UploadReport::default();
        let mut valid = Vec::with_capacity(files.len());
        for file in files {
            match validate_mime(&file.mime) {
                Ok(()) => valid.push(file),
                Err(error) => report.rejected.push(UploadFailure {
                    name: file.name.clone(),
                    error,
                }),
            }
        }
        if valid.is_empty() {
            return Err(FramefitError::validation(
                "no valid image files: upload JPG, PNG, GIF or WEBP images",
            ));
        }

        let total = valid.len();
        for (i, file) in valid.into_iter().enumerate() {
            match decode_image(&file.bytes) {
                Ok(pixels) => {
                    let id = ProductId(self.next_id);
                    self.next_id += 1;
                    self.products.push(ProductItem {
                        id,
                        source: file.clone(),
                        pixels,
                    });
                    report.added.push(id);
                }
                Err(error) => {
                    tracing::warn!(name = %file.name, %error, "product upload failed");
                    report.rejected.push(UploadFailure {
                        name: file.name.clone(),
                        error,
                    });
                }
            }
            observer.on_upload_progress(Progress::new(i + 1, total));
        }
        Ok(report)
    }

    /// Returns `false` when no pending product has `id`.
    pub fn remove_product(&mut self, id: ProductId) -> bool {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        self.products.len() != before
    }

    pub fn products(&self) -> &[ProductItem] {
        &self.products
    }

    pub fn can_generate(&self) -> bool {
        self.frame.is_some() && !self.products.is_empty()
    }

    /// Opening of the current frame, detected on first use and cached until the frame or
    /// `cfg.detection` changes.
    pub fn opening(&mut self, cfg: &PipelineConfig) -> Option<Rectangle> {
        let frame = self.frame.as_deref()?;
        match self.opening {
            Some((used, rect)) if used == cfg.detection => Some(rect),
            _ => {
                let rect = detect_opening(frame, &cfg.detection);
                self.opening = Some((cfg.detection, rect));
                Some(rect)
            }
        }
    }

    /// Run the batch over every pending product, replacing any previous results.
    pub fn generate(
        &mut self,
        cfg: &PipelineConfig,
        backend: &mut dyn CompositeBackend,
        observer: &mut dyn SessionObserver,
    ) -> &BatchOutcome {
        self.last_batch = BatchOutcome::default();
        if !self.can_generate() {
            return &self.last_batch;
        }
        let opening = self.opening(cfg);
        self.last_batch = run_batch(
            self.frame.as_deref(),
            &self.products,
            opening,
            &cfg.detection,
            backend,
            &mut ProcessingEvents(observer),
        );
        &self.last_batch
    }

    pub fn last_batch(&self) -> &BatchOutcome {
        &self.last_batch
    }

    pub fn results(&self) -> &[CompositeResult] {
        &self.last_batch.results
    }
}
