//! Frame-opening detection.
//!
//! A frame's opening is the bounding box of every pixel that is either nearly transparent or
//! very bright. When nothing qualifies (or the box collapses to a line) a centered rectangle
//! inset by a fraction of the shorter side is used instead, so callers always get a drawable
//! region.

use crate::foundation::{
    core::{PixelBuffer, Rectangle},
    error::{FramefitError, FramefitResult},
};

/// Thresholds used to classify opening pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Pixels with alpha strictly below this count as opening.
    pub alpha_threshold: u8,
    /// Pixels whose mean of r, g, b is strictly above this count as opening.
    pub brightness_threshold: f32,
    /// Fallback inset as a fraction of `min(width, height)`.
    pub fallback_padding_ratio: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            alpha_threshold: 50,
            brightness_threshold: 200.0,
            fallback_padding_ratio: 0.2,
        }
    }
}

impl DetectionConfig {
    pub fn is_opening_pixel(&self, px: [u8; 4]) -> bool {
        let brightness = (f32::from(px[0]) + f32::from(px[1]) + f32::from(px[2])) / 3.0;
        px[3] < self.alpha_threshold || brightness > self.brightness_threshold
    }

    pub fn validate(&self) -> FramefitResult<()> {
        if !self.brightness_threshold.is_finite() {
            return Err(FramefitError::validation(
                "detection.brightness_threshold must be finite",
            ));
        }
        if !(0.0..0.5).contains(&self.fallback_padding_ratio) {
            return Err(FramefitError::validation(
                "detection.fallback_padding_ratio must be in [0, 0.5)",
            ));
        }
        Ok(())
    }
}

/// Locate the opening of `frame`.
///
/// Pure and deterministic. Bounds are exclusive pixel edges, so a frame that is transparent
/// everywhere yields the full frame rectangle.
#[tracing::instrument(skip(frame), fields(width = frame.width(), height = frame.height()))]
pub fn detect_opening(frame: &PixelBuffer, cfg: &DetectionConfig) -> Rectangle {
    let (w, h) = (frame.width(), frame.height());
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (i, px) in frame.as_raw().chunks_exact(4).enumerate() {
        if !cfg.is_opening_pixel([px[0], px[1], px[2], px[3]]) {
            continue;
        }
        let x = (i % w as usize) as u32;
        let y = (i / w as usize) as u32;
        bounds = Some(match bounds {
            None => (x, y, x + 1, y + 1),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x + 1), y1.max(y + 1)),
        });
    }

    match bounds {
        // A one-pixel-wide or one-pixel-tall band is treated as no opening at all.
        Some((x0, y0, x1, y1)) if x1 - x0 >= 2 && y1 - y0 >= 2 => {
            let rect = Rectangle::new(
                f64::from(x0),
                f64::from(y0),
                f64::from(x1 - x0),
                f64::from(y1 - y0),
            );
            tracing::debug!(?rect, "detected frame opening");
            rect
        }
        _ => {
            let rect = fallback_opening(w, h, cfg.fallback_padding_ratio);
            tracing::debug!(?rect, "no usable opening pixels, using centered fallback");
            rect
        }
    }
}

/// Centered rectangle inset by `ratio * min(width, height)` on every side.
///
/// The inset is capped so at least one pixel of width and height remains, whatever `ratio` is.
pub fn fallback_opening(width: u32, height: u32, ratio: f64) -> Rectangle {
    let (w, h) = (f64::from(width), f64::from(height));
    let short = w.min(h);
    let ratio = if ratio.is_finite() { ratio.max(0.0) } else { 0.0 };
    let padding = (short * ratio).min(((short - 1.0) / 2.0).max(0.0));
    Rectangle::new(padding, padding, w - 2.0 * padding, h - 2.0 * padding)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPAQUE_DARK: [u8; 4] = [20, 20, 20, 255];

    fn frame_with_hole(w: u32, h: u32, hole: (u32, u32, u32, u32)) -> PixelBuffer {
        let mut raw = OPAQUE_DARK.repeat((w * h) as usize);
        let (hx, hy, hw, hh) = hole;
        for y in hy..hy + hh {
            for x in hx..hx + hw {
                let i = ((y * w + x) * 4) as usize;
                raw[i..i + 4].copy_from_slice(&[0, 0, 0, 0]);
            }
        }
        PixelBuffer::new(w, h, raw).unwrap()
    }

    #[test]
    fn fully_transparent_frame_is_all_opening() {
        let frame = PixelBuffer::filled(400, 300, [0, 0, 0, 0]).unwrap();
        let rect = detect_opening(&frame, &DetectionConfig::default());
        assert_eq!(rect, Rectangle::new(0.0, 0.0, 400.0, 300.0));
    }

    #[test]
    fn transparent_hole_is_found() {
        let frame = frame_with_hole(100, 80, (10, 20, 50, 30));
        let rect = detect_opening(&frame, &DetectionConfig::default());
        assert_eq!(rect, Rectangle::new(10.0, 20.0, 50.0, 30.0));
    }

    #[test]
    fn bright_region_counts_as_opening() {
        let mut raw = OPAQUE_DARK.repeat(10 * 10);
        for y in 2..6 {
            for x in 3..8 {
                let i = (y * 10 + x) * 4;
                raw[i..i + 4].copy_from_slice(&[250, 250, 250, 255]);
            }
        }
        let frame = PixelBuffer::new(10, 10, raw).unwrap();
        let rect = detect_opening(&frame, &DetectionConfig::default());
        assert_eq!(rect, Rectangle::new(3.0, 2.0, 5.0, 4.0));
    }

    #[test]
    fn thresholds_are_strict() {
        let cfg = DetectionConfig::default();
        assert!(!cfg.is_opening_pixel([200, 200, 200, 255]));
        assert!(cfg.is_opening_pixel([201, 200, 200, 255]));
        assert!(!cfg.is_opening_pixel([0, 0, 0, 50]));
        assert!(cfg.is_opening_pixel([0, 0, 0, 49]));
    }

    #[test]
    fn no_opening_pixels_falls_back() {
        let frame = PixelBuffer::filled(200, 100, OPAQUE_DARK).unwrap();
        let rect = detect_opening(&frame, &DetectionConfig::default());
        assert_eq!(rect, Rectangle::new(20.0, 20.0, 160.0, 60.0));
    }

    #[test]
    fn single_row_opening_is_degenerate() {
        let frame = frame_with_hole(50, 50, (5, 10, 30, 1));
        let rect = detect_opening(&frame, &DetectionConfig::default());
        assert_eq!(rect, fallback_opening(50, 50, 0.2));
    }

    #[test]
    fn detection_is_deterministic() {
        let frame = frame_with_hole(64, 48, (7, 9, 20, 11));
        let cfg = DetectionConfig::default();
        let first = detect_opening(&frame, &cfg);
        for _ in 0..3 {
            assert_eq!(detect_opening(&frame, &cfg), first);
        }
    }

    #[test]
    fn custom_thresholds_change_classification() {
        let frame = PixelBuffer::filled(40, 40, [180, 180, 180, 255]).unwrap();
        let strict = detect_opening(&frame, &DetectionConfig::default());
        assert_eq!(strict, fallback_opening(40, 40, 0.2));

        let loose = DetectionConfig {
            brightness_threshold: 150.0,
            ..DetectionConfig::default()
        };
        assert_eq!(
            detect_opening(&frame, &loose),
            Rectangle::new(0.0, 0.0, 40.0, 40.0)
        );

        let padded = DetectionConfig {
            fallback_padding_ratio: 0.1,
            ..DetectionConfig::default()
        };
        assert_eq!(
            detect_opening(&frame, &padded),
            Rectangle::new(4.0, 4.0, 32.0, 32.0)
        );
    }

    #[test]
    fn oversized_padding_ratio_still_leaves_a_drawable_opening() {
        let frame = PixelBuffer::filled(40, 40, OPAQUE_DARK).unwrap();
        for ratio in [0.5, 0.75, 3.0, f64::INFINITY, f64::NAN, -0.2] {
            let cfg = DetectionConfig {
                fallback_padding_ratio: ratio,
                ..DetectionConfig::default()
            };
            let rect = detect_opening(&frame, &cfg);
            assert!(rect.is_drawable(), "ratio {ratio} gave {rect:?}");
            assert!(Rectangle::new(0.0, 0.0, 40.0, 40.0).contains_rect(rect, 0.0));
        }

        let half = fallback_opening(40, 40, 0.5);
        assert_eq!(half, Rectangle::new(19.5, 19.5, 1.0, 1.0));
        assert_eq!(fallback_opening(1, 1, 0.4), Rectangle::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        DetectionConfig::default().validate().unwrap();
        for cfg in [
            DetectionConfig {
                fallback_padding_ratio: 0.5,
                ..DetectionConfig::default()
            },
            DetectionConfig {
                fallback_padding_ratio: -0.1,
                ..DetectionConfig::default()
            },
            DetectionConfig {
                brightness_threshold: f32::NAN,
                ..DetectionConfig::default()
            },
        ] {
            assert!(matches!(cfg.validate(), Err(FramefitError::Validation(_))));
        }
    }
}
