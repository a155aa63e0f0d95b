//! Image preparation before text extraction.
//!
//! Embedded images come in whatever format and size the author pasted.
//! Before an image is sent to the extraction service it is decoded,
//! shrunk so that its longer side fits `max_image_size`, flattened to RGB,
//! given a mild contrast boost and re-encoded as PNG.

use std::io::Cursor;

use image::{DynamicImage, ImageError, ImageFormat, imageops::FilterType};

/// Contrast adjustment applied to every prepared image.
///
/// Roughly a 1.2x stretch around mid grey.
const CONTRAST_BOOST: f32 = 9.5;

/// Turns an embedded image payload into a PNG ready for extraction.
///
/// Images whose longer side exceeds `max_image_size` are downscaled with
/// their aspect ratio kept. Smaller images keep their size.
///
/// # Errors
///
/// Returns an [`ImageError`] when the payload is not a raster format the
/// `image` crate can decode (EMF and WMF drawings, for instance) or when
/// re-encoding fails.
pub fn prepare_image(payload: &[u8], max_image_size: u32) -> Result<Vec<u8>, ImageError> {
    let image = image::load_from_memory(payload)?;

    let image = if image.width().max(image.height()) > max_image_size {
        image.resize(max_image_size, max_image_size, FilterType::Lanczos3)
    } else {
        image
    };

    let image = DynamicImage::ImageRgb8(image.to_rgb8()).adjust_contrast(CONTRAST_BOOST);

    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageFormat::Png)?;
    Ok(png.into_inner())
}

#[cfg(test)]
mod tests {
    use image::{GenericImageView, Rgba, RgbaImage};

    use super::*;

    fn encode(image: RgbaImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut bytes, format)
            .unwrap();
        bytes.into_inner()
    }

    fn decode(png: &[u8]) -> DynamicImage {
        image::load_from_memory_with_format(png, ImageFormat::Png).unwrap()
    }

    #[test]
    fn test_large_image_is_downscaled() {
        let payload = encode(
            RgbaImage::from_pixel(2000, 500, Rgba([10, 20, 30, 255])),
            ImageFormat::Png,
        );

        let prepared = prepare_image(&payload, 1024).unwrap();
        let image = decode(&prepared);

        assert_eq!(image.dimensions(), (1024, 256));
        assert_eq!(image.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn test_small_image_keeps_its_size() {
        let payload = encode(
            RgbaImage::from_pixel(40, 30, Rgba([200, 200, 200, 128])),
            ImageFormat::Png,
        );

        let prepared = prepare_image(&payload, 1024).unwrap();

        assert!(prepared.starts_with(b"\x89PNG\r\n\x1a\n"));
        assert_eq!(decode(&prepared).dimensions(), (40, 30));
    }

    #[test]
    fn test_other_raster_formats_become_png() {
        let payload = encode(
            RgbaImage::from_pixel(12, 12, Rgba([0, 0, 0, 255])),
            ImageFormat::Bmp,
        );

        let prepared = prepare_image(&payload, 8).unwrap();

        assert!(prepared.starts_with(b"\x89PNG"));
        assert_eq!(decode(&prepared).dimensions(), (8, 8));
    }

    #[test]
    fn test_vector_payload_is_rejected() {
        // EMF header record type followed by padding.
        let emf = [0x01, 0x00, 0x00, 0x00, 0x6C, 0x00, 0x00, 0x00, 0x00, 0x00];

        assert!(prepare_image(&emf, 1024).is_err());
        assert!(prepare_image(b"", 1024).is_err());
    }
}
