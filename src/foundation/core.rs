use crate::foundation::error::{FramefitError, FramefitResult};

pub use kurbo::Rect;

/// Straight (non-premultiplied) RGBA8 pixel grid.
///
/// Layout is row-major and tightly packed: the pixel at `(x, y)` starts at byte
/// `(y * width + x) * 4`. Dimensions are always non-zero.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> FramefitResult<Self> {
        if width == 0 || height == 0 {
            return Err(FramefitError::decode(format!(
                "image has zero dimensions ({width}x{height})"
            )));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| FramefitError::decode("image buffer size overflow"))?;
        if rgba.len() != expected {
            return Err(FramefitError::decode(format!(
                "rgba buffer has {} bytes, expected {expected} for {width}x{height}",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// A buffer filled with a single straight RGBA color.
    pub fn filled(width: u32, height: u32, px: [u8; 4]) -> FramefitResult<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| FramefitError::decode("image buffer size overflow"))?;
        Self::new(width, height, px.repeat(len))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Returns `None` when `(x, y)` is outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.rgba[i],
            self.rgba[i + 1],
            self.rgba[i + 2],
            self.rgba[i + 3],
        ])
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.rgba
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.rgba
    }

    pub fn to_rgba_image(&self) -> FramefitResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
            .ok_or_else(|| FramefitError::decode("rgba buffer does not match its dimensions"))
    }

    pub fn from_rgba_image(img: image::RgbaImage) -> FramefitResult<Self> {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rgba_len", &self.rgba.len())
            .finish()
    }
}

/// Axis-aligned rectangle in source-image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    pub fn aspect_ratio(self) -> f64 {
        self.width / self.height
    }

    /// Positive, finite width and height.
    pub fn is_drawable(self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    /// `other` lies inside `self`, allowing `eps` of floating-point slack on every edge.
    pub fn contains_rect(self, other: Rectangle, eps: f64) -> bool {
        other.x >= self.x - eps
            && other.y >= self.y - eps
            && other.right() <= self.right() + eps
            && other.bottom() <= self.bottom() + eps
    }

    pub fn to_kurbo(self) -> Rect {
        Rect::new(self.x, self.y, self.right(), self.bottom())
    }
}

/// `(current, total)` progress pair shared by upload and processing reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(current: usize, total: usize) -> Self {
        Self { current, total }
    }

    pub fn percent(self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.current as f64 / self.total as f64) * 100.0
    }

    pub fn is_complete(self) -> bool {
        self.current >= self.total
    }
}
