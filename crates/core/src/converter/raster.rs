//! Image converter backed by the `image` crate.

use async_trait::async_trait;
use image::{imageops, DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::ConverterError;
use super::traits::Converter;
use super::types::output_path_for;
use crate::format::IMAGE_FORMATS;

/// Re-encodes still images between png, jpeg and webp.
#[derive(Debug, Clone, Default)]
pub struct ImageConverter;

impl ImageConverter {
    pub fn new() -> Self {
        Self
    }

    fn image_format(target: &str) -> Option<ImageFormat> {
        match target {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    fn load(input: &Path) -> Result<DynamicImage, ConverterError> {
        let reader = ImageReader::open(input)?
            .with_guessed_format()
            .map_err(ConverterError::Io)?;

        reader.decode().map_err(|e| ConverterError::DecodeError {
            reason: e.to_string(),
        })
    }

    /// Composites the image onto an opaque white canvas.
    fn flatten_on_white(img: &DynamicImage) -> DynamicImage {
        let mut canvas =
            RgbaImage::from_pixel(img.width(), img.height(), Rgba([255, 255, 255, 255]));
        imageops::overlay(&mut canvas, &img.to_rgba8(), 0, 0);
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
    }

    /// Prepares pixel data for an encoder that only accepts 8-bit layouts.
    fn prepare(img: DynamicImage, format: ImageFormat) -> DynamicImage {
        match format {
            ImageFormat::Jpeg if img.color().has_alpha() => Self::flatten_on_white(&img),
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
            ImageFormat::WebP if img.color().has_alpha() => {
                DynamicImage::ImageRgba8(img.to_rgba8())
            }
            ImageFormat::WebP => DynamicImage::ImageRgb8(img.to_rgb8()),
            _ => img,
        }
    }

    fn convert_blocking(
        input: &Path,
        output: &Path,
        format: ImageFormat,
    ) -> Result<(), ConverterError> {
        let img = Self::load(input)?;
        debug!(
            "Decoded {} ({}x{}, {:?})",
            input.display(),
            img.width(),
            img.height(),
            img.color()
        );

        Self::prepare(img, format)
            .save_with_format(output, format)
            .map_err(|e| ConverterError::conversion_failed(format!("Failed to encode image: {}", e)))
    }
}

#[async_trait]
impl Converter for ImageConverter {
    fn name(&self) -> &str {
        "image"
    }

    fn supported_formats(&self) -> &'static [&'static str] {
        IMAGE_FORMATS
    }

    async fn convert(
        &self,
        input: &Path,
        target_format: &str,
    ) -> Result<PathBuf, ConverterError> {
        let target = target_format.to_ascii_lowercase();
        let format = Self::image_format(&target).ok_or_else(|| {
            ConverterError::UnsupportedFormat {
                format: target.clone(),
                supported: IMAGE_FORMATS,
            }
        })?;

        if !input.exists() {
            return Err(ConverterError::InputNotFound {
                path: input.to_path_buf(),
            });
        }

        let output = output_path_for(input, &target);
        let input = input.to_path_buf();
        let task_output = output.clone();

        tokio::task::spawn_blocking(move || Self::convert_blocking(&input, &task_output, format))
            .await
            .map_err(|e| ConverterError::Internal(e.to_string()))??;

        Ok(output)
    }
}
