use std::{
    io::Cursor,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::PixelBuffer,
        error::{FramefitError, FramefitResult},
    },
    pipeline::CompositeResult,
};

/// Destination for exported files.
///
/// Ordering contract: `write` is called in result order, one file at a time.
pub trait ExportSink {
    fn write(&mut self, name: &str, bytes: &[u8]) -> FramefitResult<()>;
}

/// Writes each file into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirSink {
    fn write(&mut self, name: &str, bytes: &[u8]) -> FramefitResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        let path = self.dir.join(name);
        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "exported");
        Ok(())
    }
}

/// Keeps exported files in memory, in write order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub(crate) files: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[(String, Vec<u8>)] {
        &self.files
    }
}

impl ExportSink for MemorySink {
    fn write(&mut self, name: &str, bytes: &[u8]) -> FramefitResult<()> {
        self.files.push((name.to_string(), bytes.to_vec()));
        Ok(())
    }
}

/// Pause inserted between consecutive writes, to stay under host download throttling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub sequential_spacing_ms: u64,
    pub individual_spacing_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sequential_spacing_ms: 100,
            individual_spacing_ms: 200,
        }
    }
}

impl ExportConfig {
    /// No pauses at all, for non-interactive hosts.
    pub fn unthrottled() -> Self {
        Self {
            sequential_spacing_ms: 0,
            individual_spacing_ms: 0,
        }
    }

    pub fn spacing(&self, mode: ExportMode) -> Duration {
        Duration::from_millis(match mode {
            ExportMode::Sequential => self.sequential_spacing_ms,
            ExportMode::Individual => self.individual_spacing_ms,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportMode {
    /// The "download everything" path. No archive is built; files go out one by one.
    #[default]
    Sequential,
    /// One file per result with wider spacing.
    Individual,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Names written, in order.
    pub written: Vec<String>,
}

pub fn encode_png(pixels: &PixelBuffer) -> FramefitResult<Vec<u8>> {
    let mut buf = Vec::new();
    image::write_buffer_with_format(
        &mut Cursor::new(&mut buf),
        pixels.as_raw(),
        pixels.width(),
        pixels.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| FramefitError::export(format!("encode png: {e}")))?;
    Ok(buf)
}

pub fn export_sequential(
    results: &[CompositeResult],
    sink: &mut dyn ExportSink,
    cfg: &ExportConfig,
) -> FramefitResult<ExportReport> {
    export_results(results, sink, cfg.spacing(ExportMode::Sequential))
}

pub fn export_individually(
    results: &[CompositeResult],
    sink: &mut dyn ExportSink,
    cfg: &ExportConfig,
) -> FramefitResult<ExportReport> {
    export_results(results, sink, cfg.spacing(ExportMode::Individual))
}

pub fn export(
    mode: ExportMode,
    results: &[CompositeResult],
    sink: &mut dyn ExportSink,
    cfg: &ExportConfig,
) -> FramefitResult<ExportReport> {
    match mode {
        ExportMode::Sequential => export_sequential(results, sink, cfg),
        ExportMode::Individual => export_individually(results, sink, cfg),
    }
}

fn export_results(
    results: &[CompositeResult],
    sink: &mut dyn ExportSink,
    spacing: Duration,
) -> FramefitResult<ExportReport> {
    let mut report = ExportReport::default();
    for (i, result) in results.iter().enumerate() {
        if i > 0 && !spacing.is_zero() {
            std::thread::sleep(spacing);
        }
        let png = encode_png(&result.pixels)?;
        sink.write(&result.name, &png)
            .map_err(|e| FramefitError::export(format!("'{}': {e}", result.name)))?;
        report.written.push(result.name.clone());
    }
    tracing::info!(files = report.written.len(), "export finished");
    Ok(report)
}
