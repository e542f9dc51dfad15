//! Raster primitives used to paint the app icon
//!
//! Shapes are rasterized on integer pixel positions without anti-aliasing, so the
//! output only depends on the geometry and is identical from run to run. Every
//! shape is clipped to the image bounds.

use anyhow::{anyhow, ensure, Result};
use image::{GenericImage, Rgb, RgbImage, Rgba, RgbaImage};
use std::str::FromStr;

/// A pixel position; may lie outside the image.
pub type Point = (i64, i64);

/// Parse a CSS hex color (e.g. `#1a1a2e`) into an opaque 8-bit RGB pixel
pub fn parse_hex_color(color: &str) -> Result<Rgb<u8>> {
    let srgb = css_color::Srgb::from_str(color).map_err(|_| anyhow!("Invalid color: {color}"))?;

    Ok(Rgb([
        to_channel(srgb.red),
        to_channel(srgb.green),
        to_channel(srgb.blue),
    ]))
}

/// Same as [`parse_hex_color`] with an explicit alpha value
pub fn parse_hex_color_with_alpha(color: &str, alpha: u8) -> Result<Rgba<u8>> {
    let Rgb([r, g, b]) = parse_hex_color(color)?;
    Ok(Rgba([r, g, b, alpha]))
}

fn to_channel(value: f32) -> u8 {
    (value * 255.).round().clamp(0., 255.) as u8
}

/// Fill a disc of `radius` around `center`
///
/// Each row is filled out to the pixel nearest the true circle, see
/// [`row_half_width`].
pub fn fill_circle<I: GenericImage>(img: &mut I, center: Point, radius: u32, color: I::Pixel) {
    for_each_row(img, center, radius, |img, y, dy| {
        if let Some(half) = row_half_width(radius, dy) {
            fill_row(img, y, center.0 - half, center.0 + half, color);
        }
    });
}

/// Draw a circle outline of the given stroke `width`, measured inwards from `radius`
///
/// Both edges follow [`row_half_width`]: the outer one on `radius`, the inner one
/// on `radius - width`. A stroke at least as wide as the radius fills the whole disc.
pub fn stroke_circle<I: GenericImage>(
    img: &mut I,
    center: Point,
    radius: u32,
    width: u32,
    color: I::Pixel,
) {
    if width >= radius {
        fill_circle(img, center, radius, color);
        return;
    }

    let inner_radius = radius - width;
    for_each_row(img, center, radius, |img, y, dy| {
        let Some(outer) = row_half_width(radius, dy) else {
            return;
        };
        match row_half_width(inner_radius, dy) {
            Some(inner) => {
                fill_row(img, y, center.0 - outer, center.0 - inner - 1, color);
                fill_row(img, y, center.0 + inner + 1, center.0 + outer, color);
            }
            None => fill_row(img, y, center.0 - outer, center.0 + outer, color),
        }
    });
}

/// Half-width of a circle's span on the row `dy` pixels away from its center
///
/// Picks the `x >= 0` for which `x² + dy²` is nearest to `radius²`, so every row
/// ends on the pixel closest to the true circle. Returns `None` for rows above or
/// below the circle.
pub fn row_half_width(radius: u32, dy: i64) -> Option<i64> {
    let r = i64::from(radius);
    if dy.abs() > r {
        return None;
    }

    let target = r * r - dy * dy;
    let mut x = (target as f64).sqrt() as i64;
    while x * x > target {
        x -= 1;
    }
    while (x + 1) * (x + 1) <= target {
        x += 1;
    }
    // x² <= target < (x + 1)²; ties cannot happen on integers
    if (x + 1) * (x + 1) - target < target - x * x {
        x += 1;
    }
    Some(x)
}

/// Fill the rectangle spanning `top_left..=bottom_right` (both corners included)
pub fn fill_rect<I: GenericImage>(
    img: &mut I,
    top_left: Point,
    bottom_right: Point,
    color: I::Pixel,
) {
    let (width, height) = img.dimensions();
    let (Some((x0, x1)), Some((y0, y1))) = (
        clip_span(top_left.0, bottom_right.0, width),
        clip_span(top_left.1, bottom_right.1, height),
    ) else {
        return;
    };

    for y in y0..=y1 {
        for x in x0..=x1 {
            img.put_pixel(x, y, color);
        }
    }
}

/// Alpha-composite `layer` over the opaque `canvas`, in place
///
/// The canvas keeps no alpha channel: the result of each blend is already the
/// flattened color, as the canvas is opaque everywhere. Both images must have the
/// same dimensions.
pub fn composite_over(canvas: &mut RgbImage, layer: &RgbaImage) -> Result<()> {
    ensure!(
        canvas.dimensions() == layer.dimensions(),
        "Layer size {:?} does not match canvas size {:?}",
        layer.dimensions(),
        canvas.dimensions()
    );

    for (dst, src) in canvas.pixels_mut().zip(layer.pixels()) {
        let alpha = src[3];
        if alpha == 0 {
            continue;
        }
        for c in 0..3 {
            dst[c] = blend_channel(src[c], dst[c], alpha);
        }
    }
    Ok(())
}

/// `src * alpha + dst * (1 - alpha)` on 8-bit channels, rounded to nearest
pub fn blend_channel(src: u8, dst: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    let blended = u32::from(src) * a + u32::from(dst) * (255 - a);
    ((blended + 127) / 255) as u8
}

/// Calls `paint` for every image row within `radius` of `center`, with the row's
/// offset from the center
fn for_each_row<I, F>(img: &mut I, center: Point, radius: u32, mut paint: F)
where
    I: GenericImage,
    F: FnMut(&mut I, u32, i64),
{
    let r = i64::from(radius);
    let Some((y0, y1)) = clip_span(center.1 - r, center.1 + r, img.height()) else {
        return;
    };

    for y in y0..=y1 {
        paint(img, y, i64::from(y) - center.1);
    }
}

/// Paint `x0..=x1` on row `y`, clipped to the image
fn fill_row<I: GenericImage>(img: &mut I, y: u32, x0: i64, x1: i64, color: I::Pixel) {
    let Some((x0, x1)) = clip_span(x0, x1, img.width()) else {
        return;
    };
    for x in x0..=x1 {
        img.put_pixel(x, y, color);
    }
}

/// Clamp the inclusive span `lo..=hi` to `0..len`
fn clip_span(lo: i64, hi: i64, len: u32) -> Option<(u32, u32)> {
    let lo = lo.max(0);
    let hi = hi.min(i64::from(len) - 1);
    (lo <= hi).then(|| (lo as u32, hi as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn count(img: &RgbImage, color: Rgb<u8>) -> usize {
        img.pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#1a1a2e").unwrap(), Rgb([26, 26, 46]));
        assert_eq!(parse_hex_color("#4a5fff").unwrap(), Rgb([74, 95, 255]));
        assert_eq!(parse_hex_color("#ffffff").unwrap(), WHITE);
        assert_eq!(
            parse_hex_color_with_alpha("#1a2ecc", 100).unwrap(),
            Rgba([26, 46, 204, 100])
        );
    }

    #[test]
    fn test_parse_hex_color_rejects_garbage() {
        let err = parse_hex_color("#zzzzzz").unwrap_err();
        assert!(err.to_string().contains("#zzzzzz"));
    }

    #[test]
    fn test_every_hex_byte_survives_parsing() {
        for value in 0..=255u8 {
            let hex = format!("#{value:02x}{value:02x}{value:02x}");
            assert_eq!(parse_hex_color(&hex).unwrap(), Rgb([value; 3]), "{hex}");
        }
    }

    #[test]
    fn test_blend_channel_extremes() {
        assert_eq!(blend_channel(74, 26, 255), 74);
        assert_eq!(blend_channel(74, 26, 0), 26);
        // 200 * 100 + 0 * 155 = 20000 -> 78.4
        assert_eq!(blend_channel(200, 0, 100), 78);
        // 255 * 128 = 32640 -> 128.0
        assert_eq!(blend_channel(255, 0, 128), 128);
    }

    #[test]
    fn test_fill_circle_bounds() {
        let mut img = RgbImage::from_pixel(21, 21, BLACK);
        fill_circle(&mut img, (10, 10), 5, WHITE);

        assert_eq!(*img.get_pixel(10, 10), WHITE);
        assert_eq!(*img.get_pixel(15, 10), WHITE);
        assert_eq!(*img.get_pixel(10, 5), WHITE);
        assert_eq!(*img.get_pixel(16, 10), BLACK);
        // (4, 4) away: 32 > 25
        assert_eq!(*img.get_pixel(14, 14), BLACK);
        // (3, 4) away: exactly on the radius
        assert_eq!(*img.get_pixel(13, 14), WHITE);
    }

    #[test]
    fn test_circle_rows_end_on_nearest_pixel() {
        let mut img = RgbImage::from_pixel(21, 21, BLACK);
        fill_circle(&mut img, (10, 10), 5, WHITE);

        // Row dy=2: 5² + 2² = 29 is nearer to 25 than 4² + 2² = 20
        assert_eq!(*img.get_pixel(15, 12), WHITE);
        assert_eq!(*img.get_pixel(5, 8), WHITE);
        // Row dy=3: 4² + 3² = 25 is exact, 5² + 3² = 34 is not
        assert_eq!(*img.get_pixel(14, 13), WHITE);
        assert_eq!(*img.get_pixel(15, 13), BLACK);
    }

    #[test]
    fn test_row_half_width() {
        assert_eq!(row_half_width(5, 0), Some(5));
        assert_eq!(row_half_width(5, 2), Some(5));
        assert_eq!(row_half_width(5, -3), Some(4));
        assert_eq!(row_half_width(5, 5), Some(0));
        assert_eq!(row_half_width(5, 6), None);
        assert_eq!(row_half_width(60, 20), Some(57));
        assert_eq!(row_half_width(40, 20), Some(35));
        assert_eq!(row_half_width(0, 0), Some(0));
    }

    #[test]
    fn test_fill_circle_is_clipped() {
        let mut img = RgbImage::from_pixel(8, 8, BLACK);
        fill_circle(&mut img, (0, 0), 3, WHITE);
        assert_eq!(*img.get_pixel(0, 0), WHITE);
        assert_eq!(*img.get_pixel(3, 0), WHITE);
        assert_eq!(*img.get_pixel(4, 0), BLACK);

        // Entirely outside: nothing happens
        fill_circle(&mut img, (-20, -20), 3, WHITE);
        fill_circle(&mut img, (100, 3), 3, WHITE);
        // Rows of 4, 4, 3 and 1 pixels
        assert_eq!(count(&img, WHITE), 12);
    }

    #[test]
    fn test_stroke_circle_leaves_center_untouched() {
        let mut img = RgbImage::from_pixel(41, 41, BLACK);
        stroke_circle(&mut img, (20, 20), 15, 5, WHITE);

        assert_eq!(*img.get_pixel(20, 20), BLACK);
        // distance 10 is the inner edge, which is not part of the stroke
        assert_eq!(*img.get_pixel(30, 20), BLACK);
        assert_eq!(*img.get_pixel(31, 20), WHITE);
        assert_eq!(*img.get_pixel(35, 20), WHITE);
        assert_eq!(*img.get_pixel(36, 20), BLACK);
        assert_eq!(*img.get_pixel(20, 7), WHITE);
    }

    #[test]
    fn test_stroke_circle_edges_use_nearest_pixel() {
        let mut img = RgbImage::from_pixel(141, 141, BLACK);
        stroke_circle(&mut img, (70, 70), 60, 20, WHITE);

        // Row dy=20 spans from the inner edge (35) to the outer edge (57)
        let y = 90;
        assert_eq!(*img.get_pixel(70 + 35, y), BLACK);
        assert_eq!(*img.get_pixel(70 + 36, y), WHITE);
        assert_eq!(*img.get_pixel(70 + 57, y), WHITE);
        assert_eq!(*img.get_pixel(70 + 58, y), BLACK);
        assert_eq!(*img.get_pixel(70 - 57, y), WHITE);
        assert_eq!(*img.get_pixel(70 - 36, y), WHITE);
        assert_eq!(*img.get_pixel(70 - 35, y), BLACK);
    }

    #[test]
    fn test_wide_stroke_fills_disc() {
        let mut stroked = RgbImage::from_pixel(21, 21, BLACK);
        let mut filled = stroked.clone();
        stroke_circle(&mut stroked, (10, 10), 6, 6, WHITE);
        fill_circle(&mut filled, (10, 10), 6, WHITE);
        assert_eq!(stroked, filled);
    }

    #[test]
    fn test_fill_rect_is_inclusive() {
        let mut img = RgbImage::from_pixel(10, 10, BLACK);
        fill_rect(&mut img, (2, 3), (4, 6), WHITE);

        assert_eq!(count(&img, WHITE), 3 * 4);
        assert_eq!(*img.get_pixel(2, 3), WHITE);
        assert_eq!(*img.get_pixel(4, 6), WHITE);
        assert_eq!(*img.get_pixel(5, 6), BLACK);
        assert_eq!(*img.get_pixel(4, 7), BLACK);
    }

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut img = RgbImage::from_pixel(10, 10, BLACK);
        fill_rect(&mut img, (-5, 8), (1, 50), WHITE);
        assert_eq!(count(&img, WHITE), 2 * 2);

        fill_rect(&mut img, (20, 0), (30, 9), WHITE);
        fill_rect(&mut img, (6, 5), (3, 7), WHITE);
        assert_eq!(count(&img, WHITE), 2 * 2);
    }

    #[test]
    fn test_fill_circle_on_rgba_layer() {
        let mut layer = RgbaImage::new(9, 9);
        fill_circle(&mut layer, (4, 4), 2, Rgba([1, 2, 3, 4]));
        assert_eq!(*layer.get_pixel(4, 4), Rgba([1, 2, 3, 4]));
        assert_eq!(*layer.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_composite_over() {
        let mut canvas = RgbImage::from_pixel(4, 1, Rgb([26, 26, 46]));
        let mut layer = RgbaImage::new(4, 1);
        layer.put_pixel(0, 0, Rgba([74, 95, 255, 255]));
        layer.put_pixel(1, 0, Rgba([26, 46, 204, 100]));
        layer.put_pixel(2, 0, Rgba([255, 255, 255, 0]));

        composite_over(&mut canvas, &layer).unwrap();

        assert_eq!(*canvas.get_pixel(0, 0), Rgb([74, 95, 255]));
        assert_eq!(*canvas.get_pixel(1, 0), Rgb([26, 34, 108]));
        assert_eq!(*canvas.get_pixel(2, 0), Rgb([26, 26, 46]));
        assert_eq!(*canvas.get_pixel(3, 0), Rgb([26, 26, 46]));
    }

    #[test]
    fn test_composite_over_rejects_mismatched_layer() {
        let mut canvas = RgbImage::from_pixel(4, 4, Rgb([26, 26, 46]));
        let layer = RgbaImage::from_pixel(4, 2, Rgba([255, 255, 255, 255]));

        let err = composite_over(&mut canvas, &layer).unwrap_err();

        assert!(err.to_string().contains("does not match"));
        assert!(canvas.pixels().all(|p| *p == Rgb([26, 26, 46])));
    }
}
