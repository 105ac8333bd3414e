use crate::{
    foundation::{
        core::{PixelBuffer, Rectangle},
        error::{FramefitError, FramefitResult},
        math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place},
    },
    render::{
        ComposeConfig, CompositeBackend,
        composite::over_at,
        placement::place_product,
    },
};

/// CPU compositor: product first, frame on top, premultiplied internally.
#[derive(Clone, Debug, Default)]
pub struct CpuCompositor {
    cfg: ComposeConfig,
}

impl CpuCompositor {
    pub fn new(cfg: ComposeConfig) -> Self {
        Self { cfg }
    }
}

impl CompositeBackend for CpuCompositor {
    fn compose(
        &mut self,
        frame: &PixelBuffer,
        product: &PixelBuffer,
        opening: Rectangle,
    ) -> FramefitResult<PixelBuffer> {
        if !opening.is_drawable() {
            return Err(FramefitError::composition(format!(
                "opening {opening:?} has no drawable area"
            )));
        }

        let (fw, fh) = (frame.width(), frame.height());
        let placement = place_product(opening, product.width(), product.height());
        let (px, py, pw, ph) = placement.pixel_rect();
        tracing::debug!(
            draw_x = placement.rect.x,
            draw_y = placement.rect.y,
            draw_w = placement.rect.width,
            draw_h = placement.rect.height,
            "placing product"
        );

        let mut canvas = vec![0u8; (fw as usize) * (fh as usize) * 4];

        // Resample in premultiplied space so transparent product pixels do not bleed color.
        let mut product_premul = product.to_rgba_image()?;
        premultiply_rgba8_in_place(&mut product_premul);
        let scaled = if (pw, ph) == (product.width(), product.height()) {
            product_premul
        } else {
            image::imageops::resize(&product_premul, pw, ph, self.cfg.filter.to_filter_type())
        };

        let covered = over_at(&mut canvas, fw, fh, scaled.as_raw(), pw, ph, (px, py))?;
        if covered == 0 {
            return Err(FramefitError::composition(format!(
                "product placement ({px}, {py}, {pw}x{ph}) lies outside the {fw}x{fh} frame"
            )));
        }

        let mut frame_premul = frame.as_raw().to_vec();
        premultiply_rgba8_in_place(&mut frame_premul);
        over_at(&mut canvas, fw, fh, &frame_premul, fw, fh, (0, 0))?;

        unpremultiply_rgba8_in_place(&mut canvas);
        PixelBuffer::new(fw, fh, canvas)
    }
}
