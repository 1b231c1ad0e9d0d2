mod settings;

pub use settings::*;

use coloring_mesh_core::{buffer::ColorBuffer, error::RasterError, mask::ForegroundMask, Scalar};
use image::{DynamicImage, GenericImageView, GrayImage, RgbaImage};

/// Generate foreground mask image: white foreground, black background.
///
/// # Arguments
/// * `image` - Input image to process.
/// * `settings` - Mask extraction settings.
///
/// # Returns
/// Grayscale image or error.
pub fn generate_mask_image(
    image: &DynamicImage,
    settings: &GenerateMaskSettings,
) -> Result<DynamicImage, RasterError> {
    let mask = generate_mask_from_image(image, settings)?;
    let data = mask
        .foreground_iter()
        .map(|(_, _, foreground)| if foreground { 255 } else { 0 })
        .collect::<Vec<_>>();
    let expected = mask.width() * mask.height();
    GrayImage::from_raw(mask.width() as _, mask.height() as _, data)
        .map(DynamicImage::ImageLuma8)
        .ok_or(RasterError::WrongDataLength(expected, expected))
}

/// Generate foreground mask from image.
///
/// # Arguments
/// * `image` - Input image to process.
/// * `settings` - Mask extraction settings.
///
/// # Returns
/// Foreground mask or error.
pub fn generate_mask_from_image(
    image: &DynamicImage,
    settings: &GenerateMaskSettings,
) -> Result<ForegroundMask, RasterError> {
    let (w, h) = image.dimensions();
    let mut data = match settings.source {
        MaskSource::Luma => image.to_luma8().into_raw(),
        MaskSource::LumaAlpha => image
            .to_luma_alpha8()
            .into_raw()
            .chunks(2)
            .map(|c| ((c[0] as Scalar / 255.0) * (c[1] as Scalar / 255.0) * 255.0) as u8)
            .collect::<Vec<_>>(),
        MaskSource::Red => channel(image, 0),
        MaskSource::Green => channel(image, 1),
        MaskSource::Blue => channel(image, 2),
        MaskSource::Alpha => channel(image, 3),
    };
    if settings.invert {
        for value in &mut data {
            *value = 255 - *value;
        }
    }
    log::debug!(
        "Mask {}x{} from {:?} channel, threshold {}",
        w,
        h,
        settings.source,
        settings.threshold
    );
    ForegroundMask::new(w as _, h as _, data, settings.threshold)
}

fn channel(image: &DynamicImage, index: usize) -> Vec<u8> {
    image
        .to_rgba8()
        .into_raw()
        .chunks(4)
        .map(|c| c[index])
        .collect::<Vec<_>>()
}

/// Convert image into core color buffer.
pub fn color_buffer_from_image(image: &DynamicImage) -> Result<ColorBuffer, RasterError> {
    let (w, h) = image.dimensions();
    ColorBuffer::from_rgba_bytes(w as _, h as _, &image.to_rgba8().into_raw())
}

/// Convert core color buffer into image.
pub fn image_from_color_buffer(buffer: &ColorBuffer) -> Result<DynamicImage, RasterError> {
    let data = buffer.to_rgba_bytes();
    let provided = data.len();
    RgbaImage::from_raw(buffer.width() as _, buffer.height() as _, data)
        .map(DynamicImage::ImageRgba8)
        .ok_or(RasterError::WrongDataLength(
            provided,
            buffer.width() * buffer.height() * 4,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coloring_mesh_core::color::Color;
    use image::Rgba;

    fn disc() -> DynamicImage {
        // opaque white disc of radius 6 on transparent black background
        DynamicImage::ImageRgba8(RgbaImage::from_fn(20, 20, |x, y| {
            let dx = x as i32 - 10;
            let dy = y as i32 - 10;
            if dx * dx + dy * dy <= 36 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        }))
    }

    #[test]
    fn test_mask_sources() {
        let image = disc();
        let mask = generate_mask_from_image(&image, &Default::default()).unwrap();
        assert_eq!(mask.width(), 20);
        assert!(mask.is_foreground((10, 10)));
        assert!(!mask.is_foreground((0, 0)));

        let settings = GenerateMaskSettings {
            source: MaskSource::Red,
            invert: true,
            ..Default::default()
        };
        let mask = generate_mask_from_image(&image, &settings).unwrap();
        assert!(!mask.is_foreground((10, 10)));
        assert!(mask.is_foreground((0, 0)));

        let settings = GenerateMaskSettings {
            source: MaskSource::Alpha,
            threshold: 0.99,
            ..Default::default()
        };
        let mask = generate_mask_from_image(&image, &settings).unwrap();
        assert!(mask.is_foreground((10, 4)));
        assert!(!mask.is_foreground((10, 3)));
    }

    #[test]
    fn test_mask_image() {
        let mask = generate_mask_image(&disc(), &Default::default()).unwrap();
        let gray = mask.to_luma8();
        assert_eq!(gray.get_pixel(10, 10).0, [255]);
        assert_eq!(gray.get_pixel(19, 0).0, [0]);
    }

    #[test]
    fn test_color_buffer_conversion() {
        let image = disc();
        let buffer = color_buffer_from_image(&image).unwrap();
        assert_eq!(buffer.get((10, 10)), Some(Color::WHITE));
        assert_eq!(buffer.get((0, 0)), Some(Color::TRANSPARENT));
        let back = image_from_color_buffer(&buffer).unwrap();
        assert_eq!(back.to_rgba8(), image.to_rgba8());
    }

    #[test]
    fn test_empty_image() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(0, 5));
        assert_eq!(
            color_buffer_from_image(&image),
            Err(RasterError::Empty {
                width: 0,
                height: 5
            })
        );
    }

    #[test]
    fn test_settings_from_json() {
        let settings: GenerateMaskSettings =
            serde_json::from_str(r#"{ "source": "luma-alpha", "invert": true }"#).unwrap();
        assert_eq!(settings.source, MaskSource::LumaAlpha);
        assert_eq!(settings.threshold, 0.5);
        assert!(settings.invert);
    }
}
