use crate::foundation::{
    error::{FramefitError, FramefitResult},
    math::mul_div255_u8,
};

pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(sa);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Draw premultiplied `src` (`src_w x src_h`) onto premultiplied `dst` (`dst_w x dst_h`) with its
/// top-left corner at `(ox, oy)`. Pixels falling outside `dst` are clipped.
///
/// Returns the number of destination pixels touched.
pub fn over_at(
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
    src: &[u8],
    src_w: u32,
    src_h: u32,
    (ox, oy): (i64, i64),
) -> FramefitResult<usize> {
    let dst_len = (dst_w as usize) * (dst_h as usize) * 4;
    let src_len = (src_w as usize) * (src_h as usize) * 4;
    if dst.len() != dst_len || src.len() != src_len {
        return Err(FramefitError::composition(
            "over_at expects buffers matching width*height*4",
        ));
    }

    let x_start = ox.max(0);
    let y_start = oy.max(0);
    let x_end = (ox + i64::from(src_w)).min(i64::from(dst_w));
    let y_end = (oy + i64::from(src_h)).min(i64::from(dst_h));
    if x_start >= x_end || y_start >= y_end {
        return Ok(0);
    }

    for y in y_start..y_end {
        let sy = (y - oy) as usize;
        for x in x_start..x_end {
            let sx = (x - ox) as usize;
            let si = (sy * src_w as usize + sx) * 4;
            let di = ((y as usize) * (dst_w as usize) + (x as usize)) * 4;
            let d = [dst[di], dst[di + 1], dst[di + 2], dst[di + 3]];
            let s = [src[si], src[si + 1], src[si + 2], src[si + 3]];
            dst[di..di + 4].copy_from_slice(&over(d, s));
        }
    }

    Ok(((x_end - x_start) * (y_end - y_start)) as usize)
}
