pub mod composite;
pub mod cpu;
pub mod placement;

use image::imageops::FilterType;

use crate::foundation::{
    core::{PixelBuffer, Rectangle},
    error::FramefitResult,
};

/// Renders one product photo into one frame.
///
/// Implementations must produce a buffer with the frame's exact dimensions, with the product
/// drawn underneath the frame.
pub trait CompositeBackend {
    fn compose(
        &mut self,
        frame: &PixelBuffer,
        product: &PixelBuffer,
        opening: Rectangle,
    ) -> FramefitResult<PixelBuffer>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Cpu,
}

/// Resampling filter used when scaling a product photo into the opening.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResampleFilter {
    pub fn to_filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    pub filter: ResampleFilter,
}

pub fn create_backend(kind: BackendKind, cfg: &ComposeConfig) -> Box<dyn CompositeBackend> {
    match kind {
        BackendKind::Cpu => Box::new(cpu::CpuCompositor::new(*cfg)),
    }
}
