use crate::math::{luma, Color};
use crate::renderer::Framebuffer;
use crossterm::style::{self, Stylize};
use image::RgbImage;
use std::io::{self, Write};

/// Terminal encodings for the post-render preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewMode {
    /// Half-block cells (▀) carrying two vertical pixels each in 24-bit
    /// color.
    HalfBlock,
    /// Glyph density ramp for terminals without true color.
    Ascii,
}

/// Renders the tone-mapped framebuffer into the terminal. Purely a
/// convenience for eyeballing a result without opening the PNG.
pub fn display(fb: &Framebuffer, mode: PreviewMode) {
    let image = fb.to_image();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    let result = match mode {
        PreviewMode::HalfBlock => display_halfblock(&mut out, &image),
        PreviewMode::Ascii => display_ascii(&mut out, &image),
    };
    let _ = result.and_then(|()| out.flush());
}

/// Pixel fetch that tolerates reads past the bottom edge, so an odd-height
/// image still fills its last half-block line.
fn cell(image: &RgbImage, x: u32, y: u32) -> image::Rgb<u8> {
    if y < image.height() {
        *image.get_pixel(x, y)
    } else {
        image::Rgb([0, 0, 0])
    }
}

fn term_color(pixel: image::Rgb<u8>) -> style::Color {
    let [r, g, b] = pixel.0;
    style::Color::Rgb { r, g, b }
}

/// Luminance of an already gamma-encoded pixel, in [0, 1]. Not linear-light
/// exact, but it only has to rank glyph densities.
fn luminance(pixel: image::Rgb<u8>) -> f64 {
    let [r, g, b] = pixel.0;
    luma(Color::new(r as f64, g as f64, b as f64) / 255.0)
}

fn display_halfblock(out: &mut impl Write, image: &RgbImage) -> io::Result<()> {
    for top in (0..image.height()).step_by(2) {
        for x in 0..image.width() {
            let upper = term_color(cell(image, x, top));
            let lower = term_color(cell(image, x, top + 1));
            write!(out, "{}", "▀".with(upper).on(lower))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn display_ascii(out: &mut impl Write, image: &RgbImage) -> io::Result<()> {
    const SHADES: &[u8] = b" .,:;+*oO8@";
    for row in image.rows() {
        for pixel in row {
            let index = (luminance(*pixel) * (SHADES.len() - 1) as f64).round() as usize;
            write!(out, "{}", SHADES[index] as char)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
