use crate::foundation::core::{Rect, Rectangle};

/// Where a product photo lands inside an opening.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Exact fit in frame coordinates.
    pub rect: Rectangle,
    /// True when the product was fit to the opening's width and centered vertically.
    pub fit_width: bool,
}

impl Placement {
    /// Whole-pixel region `(x, y, width, height)` used for rendering, never smaller than 1x1.
    pub fn pixel_rect(&self) -> (i64, i64, u32, u32) {
        let r: Rect = self.rect.to_kurbo().round();
        let w = r.width().max(1.0) as u32;
        let h = r.height().max(1.0) as u32;
        (r.x0 as i64, r.y0 as i64, w, h)
    }
}

/// Scale a `product_w x product_h` photo to fit `opening`, preserving aspect ratio and
/// centering it along the axis that has slack.
pub fn place_product(opening: Rectangle, product_w: u32, product_h: u32) -> Placement {
    let frame_ar = opening.aspect_ratio();
    let product_ar = f64::from(product_w) / f64::from(product_h);

    if product_ar > frame_ar {
        let draw_w = opening.width;
        let draw_h = opening.width / product_ar;
        Placement {
            rect: Rectangle::new(
                opening.x,
                opening.y + (opening.height - draw_h) / 2.0,
                draw_w,
                draw_h,
            ),
            fit_width: true,
        }
    } else {
        let draw_h = opening.height;
        let draw_w = opening.height * product_ar;
        Placement {
            rect: Rectangle::new(
                opening.x + (opening.width - draw_w) / 2.0,
                opening.y,
                draw_w,
                draw_h,
            ),
            fit_width: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn wide_product_fits_width_and_centers_vertically() {
        let p = place_product(Rectangle::new(0.0, 0.0, 400.0, 300.0), 800, 400);
        assert!(p.fit_width);
        assert_eq!(p.rect, Rectangle::new(0.0, 50.0, 400.0, 200.0));
        assert_eq!(p.pixel_rect(), (0, 50, 400, 200));
    }

    #[test]
    fn tall_product_fits_height_and_centers_horizontally() {
        let p = place_product(Rectangle::new(10.0, 20.0, 300.0, 200.0), 100, 200);
        assert!(!p.fit_width);
        assert_eq!(p.rect, Rectangle::new(110.0, 20.0, 100.0, 200.0));
    }

    #[test]
    fn equal_aspect_fills_opening() {
        let opening = Rectangle::new(5.0, 5.0, 40.0, 20.0);
        let p = place_product(opening, 4, 2);
        assert_eq!(p.rect, opening);
    }

    #[test]
    fn placement_preserves_aspect_and_stays_inside() {
        let openings = [
            Rectangle::new(0.0, 0.0, 400.0, 300.0),
            Rectangle::new(13.5, 7.25, 91.0, 333.0),
            Rectangle::new(80.0, 80.0, 240.0, 140.0),
            Rectangle::new(0.0, 0.0, 1.0, 1.0),
        ];
        let products = [(1u32, 1u32), (800, 400), (3, 1000), (1920, 1080), (7, 5)];
        for opening in openings {
            for (pw, ph) in products {
                let p = place_product(opening, pw, ph);
                let want = f64::from(pw) / f64::from(ph);
                let got = p.rect.width / p.rect.height;
                assert!((got - want).abs() <= want * 1e-9, "{opening:?} {pw}x{ph}");
                assert!(opening.contains_rect(p.rect, EPS), "{opening:?} {pw}x{ph}");

                // Slack on the constrained axis is split evenly.
                let (lead, trail) = if p.fit_width {
                    (p.rect.y - opening.y, opening.bottom() - p.rect.bottom())
                } else {
                    (p.rect.x - opening.x, opening.right() - p.rect.right())
                };
                assert!((lead - trail).abs() <= 1.0, "{opening:?} {pw}x{ph}");
            }
        }
    }

    #[test]
    fn tiny_placement_snaps_to_at_least_one_pixel() {
        let p = place_product(Rectangle::new(0.0, 0.0, 100.0, 100.0), 10_000, 1);
        let (_, _, w, h) = p.pixel_rect();
        assert_eq!(w, 100);
        assert_eq!(h, 1);
    }
}
