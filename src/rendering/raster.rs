/// Rasterizer: draws a display list onto an RGBA canvas and encodes PNG

use crate::data_url;
use crate::region::ImageRef;
use crate::rendering::layout::CELL;
use crate::rendering::paint::PaintCommand;
use crate::rendering::{ImageResolver, Screenshot, Viewport};
use crate::{CaptureOptions, Error, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Logical rect -> clamped pixel rect `(x0, y0, x1, y1)`
fn to_pixels(canvas: &RgbaImage, x: i32, y: i32, width: u32, height: u32, scale: f32) -> (u32, u32, u32, u32) {
    let clamp_x = |v: f32| v.round().clamp(0.0, canvas.width() as f32) as u32;
    let clamp_y = |v: f32| v.round().clamp(0.0, canvas.height() as f32) as u32;
    let x0 = clamp_x(x as f32 * scale);
    let y0 = clamp_y(y as f32 * scale);
    let x1 = clamp_x((x as f32 + width as f32) * scale);
    let y1 = clamp_y((y as f32 + height as f32) * scale);
    (x0, y0, x1, y1)
}

fn fill_rect(canvas: &mut RgbaImage, x: i32, y: i32, width: u32, height: u32, rgba: (u8, u8, u8, u8), scale: f32) {
    let (x0, y0, x1, y1) = to_pixels(canvas, x, y, width, height, scale);
    let px = Rgba([rgba.0, rgba.1, rgba.2, rgba.3]);
    for py in y0..y1 {
        for pxx in x0..x1 {
            canvas.put_pixel(pxx, py, px);
        }
    }
}

/// Block glyphs: every non-space character fills its cell minus a one-unit gutter
fn draw_text(canvas: &mut RgbaImage, x: i32, y: i32, text: &str, text_scale: usize, scale: f32) {
    let unit = text_scale.max(1) as u32;
    let cell = CELL * unit;
    for (row, line) in text.lines().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let gx = x + (col as u32 * cell + unit) as i32;
            let gy = y + (row as u32 * cell + unit) as i32;
            fill_rect(canvas, gx, gy, cell - unit * 2, cell - unit * 2, super::paint::INK, scale);
        }
    }
}

/// Same-origin sources always pass. Remote sources need both the element's
/// `crossorigin` attribute and the capture's CORS option.
pub fn check_origin(source: &ImageRef, options: &CaptureOptions) -> Result<()> {
    let url = source.url.as_str();
    if data_url::is_data_url(url) || url.starts_with("blob:") {
        return Ok(());
    }
    match url::Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "file" => Ok(()),
        Ok(_) if options.use_cors && source.cross_origin => Ok(()),
        Ok(_) => Err(Error::TaintedImage(url.to_string())),
        // Relative reference, same origin as the page
        Err(_) => Ok(()),
    }
}

fn load_source(source: &ImageRef, resolver: &dyn ImageResolver) -> Result<DynamicImage> {
    let bytes = if data_url::is_data_url(&source.url) {
        data_url::decode(&source.url)?.bytes
    } else {
        resolver.resolve(&source.url)?
    };
    Ok(image::load_from_memory(&bytes)?)
}

fn draw_image(canvas: &mut RgbaImage, x: i32, y: i32, width: u32, height: u32, img: &DynamicImage, scale: f32) {
    let (x0, y0, x1, y1) = to_pixels(canvas, x, y, width, height, scale);
    if x1 <= x0 || y1 <= y0 {
        return;
    }
    let fitted = img.resize(x1 - x0, y1 - y0, FilterType::Triangle).to_rgba8();
    imageops::overlay(canvas, &fitted, x0 as i64, y0 as i64);
}

/// Draw `commands` at `options.scale` and encode the result as PNG
pub fn rasterize(
    commands: &[PaintCommand],
    viewport: Viewport,
    options: &CaptureOptions,
    resolver: &dyn ImageResolver,
) -> Result<Screenshot> {
    let scale = options.scale;
    let (width, height) = options.checked_output_size(viewport.width, viewport.height)?;
    let mut canvas = RgbaImage::new(width, height);

    for cmd in commands {
        match cmd {
            PaintCommand::SolidRect { x, y, width, height, rgba } => {
                fill_rect(&mut canvas, *x, *y, *width, *height, *rgba, scale)
            }
            PaintCommand::Text { x, y, text, scale: text_scale } => {
                draw_text(&mut canvas, *x, *y, text, *text_scale, scale)
            }
            PaintCommand::Image { x, y, width, height, source } => {
                check_origin(source, options)?;
                let img = load_source(source, resolver)?;
                draw_image(&mut canvas, *x, *y, *width, *height, &img, scale);
            }
        }
    }

    let mut png_data = Vec::new();
    DynamicImage::ImageRgba8(canvas).write_to(&mut Cursor::new(&mut png_data), ImageFormat::Png)?;
    Ok(Screenshot { width, height, png_data })
}
