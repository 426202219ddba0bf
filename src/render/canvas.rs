use image::{ Rgb, RgbImage };

use super::layout::Rect;

pub fn blank(width: u32, height: u32, background: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(background))
}

/// Mixes `color` into the pixel at (x, y) with the given coverage in `[0, 1]`.
/// Out-of-bounds coordinates are ignored.
pub fn blend_pixel(canvas: &mut RgbImage, x: i32, y: i32, color: [u8; 3], coverage: f32) {
    if x < 0 || y < 0 || (x as u32) >= canvas.width() || (y as u32) >= canvas.height() {
        return;
    }
    let coverage = coverage.clamp(0.0, 1.0);
    if coverage == 0.0 {
        return;
    }
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for (dst, src) in pixel.0.iter_mut().zip(color) {
        let mixed = (src as f32) * coverage + (*dst as f32) * (1.0 - coverage);
        *dst = mixed.round() as u8;
    }
}

/// Blends an 8-bit coverage mask (row-major, `mask_width` wide) with its
/// top-left corner at (x, y).
pub fn blend_mask(
    canvas: &mut RgbImage,
    x: i32,
    y: i32,
    mask: &[u8],
    mask_width: usize,
    color: [u8; 3]
) {
    if mask_width == 0 {
        return;
    }
    for (row, chunk) in mask.chunks(mask_width).enumerate() {
        for (col, &value) in chunk.iter().enumerate() {
            if value == 0 {
                continue;
            }
            blend_pixel(canvas, x + (col as i32), y + (row as i32), color, (value as f32) / 255.0);
        }
    }
}

/// Signed distance from (px, py) to a rounded rectangle; negative inside.
fn rounded_rect_distance(px: f32, py: f32, rect: &Rect, radius: f32) -> f32 {
    let half_w = (rect.width() as f32) / 2.0;
    let half_h = (rect.height() as f32) / 2.0;
    let cx = (rect.left as f32) + half_w;
    let cy = (rect.top as f32) + half_h;
    let r = radius.min(half_w).min(half_h).max(0.0);

    let qx = (px - cx).abs() - (half_w - r);
    let qy = (py - cy).abs() - (half_h - r);
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    let inside = qx.max(qy).min(0.0);
    outside + inside - r
}

/// Draws an anti-aliased rounded rectangle. The outline is `outline_width`
/// pixels thick and sits inside `rect`.
pub fn rounded_rect(
    canvas: &mut RgbImage,
    rect: &Rect,
    radius: u32,
    fill: [u8; 3],
    outline: [u8; 3],
    outline_width: u32
) {
    if rect.width() <= 0 || rect.height() <= 0 {
        return;
    }
    let x0 = rect.left.max(0);
    let y0 = rect.top.max(0);
    let x1 = rect.right.min(canvas.width() as i32);
    let y1 = rect.bottom.min(canvas.height() as i32);
    let inset = outline_width as f32;

    for y in y0..y1 {
        for x in x0..x1 {
            let d = rounded_rect_distance((x as f32) + 0.5, (y as f32) + 0.5, rect, radius as f32);
            let outer = 0.5 - d;
            if outer <= 0.0 {
                continue;
            }
            let inner = 0.5 - (d + inset);
            if outline_width > 0 {
                blend_pixel(canvas, x, y, outline, outer);
                blend_pixel(canvas, x, y, fill, inner);
            } else {
                blend_pixel(canvas, x, y, fill, outer);
            }
        }
    }
}
