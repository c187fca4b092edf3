//! Image encoding: 8-bit quantization, PPM and other formats.

use crate::{Color, ImageBuffer};
use glint_math::Interval;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type OutputResult<T> = Result<T, OutputError>;

/// Display range a channel is clamped to before quantization.
const CHANNEL_RANGE: Interval = Interval {
    min: 0.0,
    max: 0.999,
};

/// Quantize a gamma-corrected color to 8 bits per channel.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let quantize = |c: f32| (256.0 * CHANNEL_RANGE.clamp(c)) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Write the image as plain-text PPM (`P3`), one pixel per line.
pub fn write_ppm<W: Write>(image: &ImageBuffer, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for row in image.rows() {
        for color in row {
            let [r, g, b] = color_to_rgb8(*color);
            writeln!(writer, "{} {} {}", r, g, b)?;
        }
    }

    Ok(())
}

/// Save the image, picking the format from the file extension.
///
/// `.ppm` is written as plain-text PPM; anything else goes through the
/// `image` crate (png, jpg, bmp, ...).
pub fn save_image(buffer: &ImageBuffer, path: impl AsRef<Path>) -> OutputResult<()> {
    let path = path.as_ref();
    let is_ppm = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));

    if is_ppm {
        let mut writer = BufWriter::new(File::create(path)?);
        write_ppm(buffer, &mut writer)?;
        writer.flush()?;
    } else {
        let mut rgb = image::RgbImage::new(buffer.width, buffer.height);
        for (x, y, pixel) in rgb.enumerate_pixels_mut() {
            *pixel = image::Rgb(color_to_rgb8(buffer.get(x, y)));
        }
        rgb.save(path)?;
    }

    log::info!("Saved {}x{} image to {}", buffer.width, buffer.height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_to_rgb8() {
        assert_eq!(color_to_rgb8(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::new(0.5, 0.25, 2.0)), [128, 64, 255]);
        assert_eq!(color_to_rgb8(Color::new(-1.0, 0.999, 0.998)), [0, 255, 255]);
    }

    #[test]
    fn test_write_ppm() {
        let mut image = ImageBuffer::new(2, 2);
        image.set(0, 0, Color::ONE);
        image.set(1, 1, Color::new(0.5, 0.0, 0.25));

        let mut out = Vec::new();
        write_ppm(&image, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text, "P3\n2 2\n255\n255 255 255\n0 0 0\n0 0 0\n128 0 64\n");
    }

    #[test]
    fn test_save_image_formats() {
        let dir = std::env::temp_dir().join(format!("glint_output_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut buffer = ImageBuffer::new(3, 2);
        buffer.set(2, 1, Color::new(1.0, 0.5, 0.0));

        let ppm = dir.join("out.ppm");
        save_image(&buffer, &ppm).unwrap();
        let text = std::fs::read_to_string(&ppm).unwrap();
        assert!(text.starts_with("P3\n3 2\n255\n"));
        assert_eq!(text.lines().count(), 3 + 6);

        let png = dir.join("out.png");
        save_image(&buffer, &png).unwrap();
        let decoded = image::open(&png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1).0, [255, 128, 0]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
