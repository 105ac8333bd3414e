//! framefit places product photos inside decorative picture frames.
//!
//! Given a frame image with a transparent or light interior, framefit finds that opening,
//! scales each product photo to fit inside it (aspect ratio preserved, centered on the slack
//! axis), draws the frame on top, and exports the results as PNG files named `1.png`, `2.png`, ...
//!
//! # Pipeline overview
//!
//! 1. **Ingest**: [`SourceFile`] -> [`PixelBuffer`] (MIME allow-list, then decode)
//! 2. **Detect**: frame -> opening [`Rectangle`], once per frame selection
//! 3. **Composite**: frame + product + opening -> frame-sized [`PixelBuffer`] (product under frame)
//! 4. **Export**: [`CompositeResult`] -> PNG bytes -> [`ExportSink`]
//!
//! [`Session`] holds the mutable working state (selected frame, pending products, last batch);
//! [`run_batch`] and everything below it are stateless.
#![forbid(unsafe_code)]

pub mod assets;
pub mod config;
pub mod detect;
pub mod export;
pub mod foundation;
pub mod pipeline;
pub mod render;
pub mod session;

pub use assets::decode::{
    ACCEPTED_MIME_TYPES, SourceFile, decode_image, ingest, sniff_mime, validate_mime,
};
pub use assets::library::{FrameAsset, FrameId, FrameLibrary};
pub use config::PipelineConfig;
pub use detect::{DetectionConfig, detect_opening, fallback_opening};
pub use export::{
    DirSink, ExportConfig, ExportMode, ExportReport, ExportSink, MemorySink, encode_png, export,
    export_individually, export_sequential,
};
pub use foundation::core::{PixelBuffer, Progress, Rectangle};
pub use foundation::error::{FramefitError, FramefitResult};
pub use pipeline::{
    BatchObserver, BatchOutcome, CompositeResult, ItemFailure, NoopObserver, ProductId,
    ProductItem, result_name, run_batch,
};
pub use render::cpu::CpuCompositor;
pub use render::placement::{Placement, place_product};
pub use render::{BackendKind, ComposeConfig, CompositeBackend, ResampleFilter, create_backend};
pub use session::{
    NoopSessionObserver, Session, SessionObserver, UploadFailure, UploadReport,
};
