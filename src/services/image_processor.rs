// src/services/image_processor.rs
use crate::errors::CarspotError;
use base64::{Engine as _, engine::general_purpose};
use image::GenericImageView;

const MAX_DIMENSION: u32 = 8192;

pub struct ImageProcessor;

impl ImageProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Rejects anything whose declared media type is not `image/*`.
    pub fn check_media_type(&self, content_type: &str) -> Result<(), CarspotError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence.starts_with("image/") && essence.len() > "image/".len() {
            Ok(())
        } else if essence.is_empty() {
            Err(CarspotError::InvalidImage("a file without a media type".to_string()))
        } else {
            Err(CarspotError::InvalidImage(essence))
        }
    }

    pub fn validate_image(&self, data: &[u8]) -> Result<(u32, u32), CarspotError> {
        let img = image::load_from_memory(data)
            .map_err(|e| CarspotError::InvalidImage(format!("an unreadable image ({})", e)))?;

        let (width, height) = img.dimensions();

        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(CarspotError::InvalidImage(format!(
                "an image of {}x{}, larger than {}x{}",
                width, height, MAX_DIMENSION, MAX_DIMENSION
            )));
        }

        Ok((width, height))
    }

    /// Encodes the raw upload as a `data:` URL after checking it decodes.
    pub fn preview_data_url(&self, data: &[u8], content_type: &str) -> Result<String, CarspotError> {
        self.validate_image(data)?;
        let mime = content_type.split(';').next().unwrap_or("image/jpeg").trim();
        Ok(format!(
            "data:{};base64,{}",
            mime,
            general_purpose::STANDARD.encode(data)
        ))
    }
}

#[cfg(test)]
pub(crate) fn tiny_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(2, 2, image::Rgb([200, 30, 30]));
    let mut output = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut output),
            image::ImageOutputFormat::Png,
        )
        .unwrap();
    output
}
