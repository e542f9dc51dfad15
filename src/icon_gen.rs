use crate::contents_json::{write_contents_json, ContentsFile, ImageEntry, Info};
use crate::draw::{
    composite_over, fill_circle, fill_rect, parse_hex_color, parse_hex_color_with_alpha,
    stroke_circle, Point,
};
use anyhow::{Context, Result};
use image::{
    codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder},
    ColorType, ImageEncoder, RgbImage, RgbaImage,
};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Width and height of the App Store icon, in pixels
pub const ICON_SIZE: u32 = 1024;

/// File name of the rendered icon inside the `.appiconset` folder
pub const ICON_FILENAME: &str = "icon_1024.png";

/// Dark navy backdrop, also used to punch the hole in the lock
pub const BACKGROUND_COLOR: &str = "#1a1a2e";

/// Color of the lock glyph
pub const LOCK_COLOR: &str = "#ffffff";

/// One of the concentric circles fading out from the middle of the icon
#[derive(Debug, Clone, Copy)]
pub struct FadeCircle {
    pub radius: u32,
    pub color: &'static str,
    pub alpha: u8,
}

/// Composited in order: each circle is larger and more transparent than the
/// previous one, so the blue fades out towards the edges.
pub const FADE_CIRCLES: [FadeCircle; 4] = [
    FadeCircle {
        radius: 300,
        color: "#4a5fff",
        alpha: 255,
    },
    FadeCircle {
        radius: 400,
        color: "#3a4fee",
        alpha: 200,
    },
    FadeCircle {
        radius: 500,
        color: "#2a3edd",
        alpha: 150,
    },
    FadeCircle {
        radius: 600,
        color: "#1a2ecc",
        alpha: 100,
    },
];

// Lock glyph geometry, relative to the canvas center
const RING_OFFSET_Y: i64 = -80;
const RING_RADIUS: u32 = 60;
const RING_STROKE: u32 = 20;
const HOLE_RADIUS: u32 = 30;
const SHANK_WIDTH: i64 = 40;
const SHANK_HEIGHT: i64 = 120;
/// How far the shank reaches up into the ring
const SHANK_OVERLAP: i64 = 10;
const NOTCH_WIDTH: i64 = 60;
const NOTCH_HEIGHT: i64 = 20;
/// Distance from the bottom of the shank to the top of each notch
const NOTCH_OFFSETS: [i64; 2] = [40, 10];

/// Paths of the files written by [`generate_app_icon`]
#[derive(Debug, Clone)]
pub struct GeneratedFiles {
    pub icon: PathBuf,
    pub contents: PathBuf,
}

/// Render the icon and write it, together with its Contents.json, into `out_dir`
///
/// Both files are overwritten. `out_dir` must exist: it is never created, and if
/// it is missing the run fails before anything is written.
pub fn generate_app_icon(out_dir: &Path) -> Result<GeneratedFiles> {
    println!("Generating {ICON_FILENAME}...");
    let icon = render_icon()?;

    let icon_path = out_dir.join(ICON_FILENAME);
    save_png(&icon, &icon_path)?;
    drop(icon);
    println!("✓ Generated {}", icon_path.display());

    let contents_path = write_contents_json(out_dir, &app_icon_contents())?;
    println!("✓ Generated {}", contents_path.display());

    Ok(GeneratedFiles {
        icon: icon_path,
        contents: contents_path,
    })
}

/// Render the full icon: background, fading circles, then the lock glyph
pub fn render_icon() -> Result<RgbImage> {
    let mut canvas = render_backdrop(&FADE_CIRCLES)?;
    let center = canvas_center(&canvas);
    draw_lock(&mut canvas, center)?;
    Ok(canvas)
}

/// Fill the canvas with the background color and composite `circles` over it,
/// one transparent layer per circle
pub fn render_backdrop(circles: &[FadeCircle]) -> Result<RgbImage> {
    let background = parse_hex_color(BACKGROUND_COLOR)?;
    let mut canvas = RgbImage::from_pixel(ICON_SIZE, ICON_SIZE, background);
    let center = canvas_center(&canvas);

    for circle in circles {
        let color = parse_hex_color_with_alpha(circle.color, circle.alpha)
            .with_context(|| format!("Bad color for the {}px circle", circle.radius))?;

        let mut layer = RgbaImage::new(ICON_SIZE, ICON_SIZE);
        fill_circle(&mut layer, center, circle.radius, color);
        composite_over(&mut canvas, &layer)?;
    }

    Ok(canvas)
}

/// Draw the opaque padlock glyph: a ring with a hole, a shank and two notches
fn draw_lock(canvas: &mut RgbImage, center: Point) -> Result<()> {
    let white = parse_hex_color(LOCK_COLOR)?;
    let background = parse_hex_color(BACKGROUND_COLOR)?;

    let (cx, cy) = center;
    let ring_center = (cx, cy + RING_OFFSET_Y);
    stroke_circle(canvas, ring_center, RING_RADIUS, RING_STROKE, white);
    fill_circle(canvas, ring_center, HOLE_RADIUS, background);

    let shank_left = cx - SHANK_WIDTH / 2;
    let shank_right = cx + SHANK_WIDTH / 2;
    let shank_top = ring_center.1 + i64::from(RING_RADIUS) - SHANK_OVERLAP;
    let shank_bottom = shank_top + SHANK_HEIGHT;
    fill_rect(
        canvas,
        (shank_left, shank_top),
        (shank_right, shank_bottom),
        white,
    );

    for offset in NOTCH_OFFSETS {
        let notch_top = shank_bottom - offset;
        fill_rect(
            canvas,
            (shank_right, notch_top),
            (shank_right + NOTCH_WIDTH, notch_top + NOTCH_HEIGHT),
            white,
        );
    }

    Ok(())
}

fn canvas_center(canvas: &RgbImage) -> Point {
    (
        i64::from(canvas.width() / 2),
        i64::from(canvas.height() / 2),
    )
}

/// The descriptor Xcode expects next to a single-size iOS app icon
pub fn app_icon_contents() -> ContentsFile {
    let mut contents = ContentsFile::new(Info::default().author);
    contents.add_image(ImageEntry::new_single_size_icon(
        ICON_FILENAME.to_string(),
        "ios".to_string(),
        format!("{ICON_SIZE}x{ICON_SIZE}"),
    ));
    contents
}

/// Encode `image` as an RGB PNG at `path`, replacing any existing file
pub fn save_png(image: &RgbImage, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create PNG file: {}", path.display()))?;
    let mut out_file = BufWriter::new(file);
    write_png(image, &mut out_file).context("Failed to write PNG")?;
    out_file.flush()?;
    Ok(())
}

// Encode image data as PNG with compression
fn write_png<W: Write>(image: &RgbImage, w: W) -> Result<()> {
    let encoder = PngEncoder::new_with_quality(w, CompressionType::Best, PngFilterType::Adaptive);
    encoder.write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgb8)?;
    Ok(())
}
