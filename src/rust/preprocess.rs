//! Turns uploaded image bytes into the `[1, 224, 224, 3]` tensor the classifier expects.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader, RgbImage};
use ndarray::Array4;

/// Height and width of the classifier input.
pub const INPUT_SIZE: u32 = 224;
/// Colour channels of the classifier input.
pub const CHANNELS: usize = 3;

/// Batch of one NHWC image with values in `[0.0, 1.0]`.
pub type ImageTensor = Array4<f32>;

#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("Uploaded file is empty")]
    Empty,
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Decode(#[from] image::ImageError),
    #[error("Expected RGB image with 3 channels")]
    ChannelMismatch { channels: u8 },
    #[error("Failed to build input tensor: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Decodes, converts, resizes and normalises an uploaded image.
///
/// The format is sniffed from the bytes themselves. Channel validation happens
/// before resizing so grayscale inputs are rejected regardless of how the
/// resampler would treat them.
///
/// # Errors
/// - `Empty` if no bytes were uploaded
/// - `Io`/`Decode` if the bytes are not a supported image
/// - `ChannelMismatch` if the image is not RGB or RGBA
pub fn preprocess(bytes: &[u8]) -> Result<ImageTensor, PreprocessError> {
    let image = decode_image(bytes)?;
    let rgb = to_rgb(image)?;
    let resized = imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);
    to_tensor(resized)
}

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, PreprocessError> {
    if bytes.is_empty() {
        return Err(PreprocessError::Empty);
    }
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    Ok(image)
}

/// Converts RGB and RGBA images of any bit depth to 8-bit RGB. Alpha is dropped,
/// not composited.
pub fn to_rgb(image: DynamicImage) -> Result<RgbImage, PreprocessError> {
    let color = image.color();
    match color.channel_count() {
        3 => Ok(image.into_rgb8()),
        4 if color.has_alpha() => Ok(image.into_rgb8()),
        channels => Err(PreprocessError::ChannelMismatch { channels }),
    }
}

fn to_tensor(image: RgbImage) -> Result<ImageTensor, PreprocessError> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let data: Vec<f32> = image
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / 255.0)
        .collect();
    // RgbImage stores rows of interleaved RGB, which is already HWC order
    Ok(Array4::from_shape_vec((1, height, width, CHANNELS), data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma, Rgb, Rgba, RgbaImage};

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_rgba_png_is_accepted() {
        let img = RgbaImage::from_pixel(40, 30, Rgba([255, 0, 0, 10]));
        let tensor = preprocess(&encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        // alpha is dropped, so the red channel stays saturated
        assert!((tensor[[0, 100, 100, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 100, 100, 1]].abs() < 1e-6);
    }

    #[test]
    fn test_values_are_normalised() {
        let img = RgbImage::from_fn(17, 23, |x, y| Rgb([(x * 15) as u8, (y * 11) as u8, 128]));
        let tensor = preprocess(&encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)).unwrap();
        assert!(tensor.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_grayscale_is_rejected_before_resize() {
        let img = GrayImage::from_pixel(8, 8, Luma([200]));
        let err = preprocess(&encode(DynamicImage::ImageLuma8(img), ImageFormat::Png)).unwrap_err();
        assert!(matches!(err, PreprocessError::ChannelMismatch { channels: 1 }));
        assert_eq!(err.to_string(), "Expected RGB image with 3 channels");
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = preprocess(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PreprocessError::Decode(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_empty_upload() {
        assert!(matches!(preprocess(&[]), Err(PreprocessError::Empty)));
    }

    #[test]
    fn test_sixteen_bit_rgb_is_converted() {
        let img = image::ImageBuffer::<Rgb<u16>, Vec<u16>>::from_pixel(5, 5, Rgb([65535, 0, 0]));
        let tensor = preprocess(&encode(DynamicImage::ImageRgb16(img), ImageFormat::Png)).unwrap();
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_preprocessing_is_deterministic() {
        let img = RgbImage::from_fn(64, 48, |x, y| Rgb([x as u8, y as u8, (x ^ y) as u8]));
        let bytes = encode(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg);
        assert_eq!(preprocess(&bytes).unwrap(), preprocess(&bytes).unwrap());
    }
}
