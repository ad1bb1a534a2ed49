//! Rendered page bitmaps
//!
//! A [`Raster`] is an immutable, cheaply clonable RGBA image. Cloning shares
//! the pixel buffer, so unchanged pages can be compared by pointer.

use std::io::Cursor;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{CropError, RasterError};

#[derive(Debug, Clone)]
pub struct Raster {
    image: Arc<RgbaImage>,
}

/// Crop rectangle in raster pixel coordinates, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a region from the floating point box a crop widget reports.
    ///
    /// Negative origins are clipped to zero, shrinking the box accordingly.
    pub fn from_box(x: f64, y: f64, width: f64, height: f64) -> Result<Self, CropError> {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return Err(CropError::EmptyRegion);
        }

        let left = x.max(0.0);
        let top = y.max(0.0);
        let right = x + width;
        let bottom = y + height;
        if right <= left || bottom <= top {
            return Err(CropError::EmptyRegion);
        }

        Ok(Self {
            x: left.round() as u32,
            y: top.round() as u32,
            width: (right - left).round().max(1.0) as u32,
            height: (bottom - top).round().max(1.0) as u32,
        })
    }

    /// Clip this region to an image of the given size.
    pub fn clamp_to(&self, image_width: u32, image_height: u32) -> Result<Self, CropError> {
        if self.width == 0 || self.height == 0 {
            return Err(CropError::EmptyRegion);
        }

        if self.x >= image_width || self.y >= image_height {
            return Err(CropError::OutsideImage {
                x: self.x,
                y: self.y,
                width: image_width,
                height: image_height,
            });
        }

        Ok(Self {
            x: self.x,
            y: self.y,
            width: self.width.min(image_width - self.x),
            height: self.height.min(image_height - self.y),
        })
    }
}

impl Raster {
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    /// Decode PNG or JPEG bytes.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, RasterError> {
        let image =
            image::load_from_memory(bytes).map_err(|e| RasterError::DecodeError(e.to_string()))?;
        Ok(Self::from_image(image.to_rgba8()))
    }

    /// Decode a `data:image/...;base64,` URL as produced by `canvas.toDataURL()`.
    pub fn from_data_url(url: &str) -> Result<Self, RasterError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| RasterError::InvalidDataUrl("missing data: scheme".into()))?;

        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| RasterError::InvalidDataUrl("missing ',' separator".into()))?;

        if !meta.starts_with("image/") {
            return Err(RasterError::InvalidDataUrl(format!(
                "unsupported media type: {}",
                meta
            )));
        }
        if !meta.ends_with(";base64") {
            return Err(RasterError::InvalidDataUrl(
                "only base64 payloads are supported".into(),
            ));
        }

        let bytes = STANDARD.decode(payload.trim())?;
        Self::from_encoded(&bytes)
    }

    /// Wrap raw pixels, either RGB or RGBA, as produced by a renderer.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RasterError> {
        let area = width as usize * height as usize;
        let actual = pixels.len();

        let image = if actual == area * 4 {
            RgbaImage::from_raw(width, height, pixels)
        } else if actual == area * 3 {
            image::RgbImage::from_raw(width, height, pixels)
                .map(|rgb| DynamicImage::ImageRgb8(rgb).to_rgba8())
        } else {
            None
        };

        image.map(Self::from_image).ok_or(RasterError::BufferSize {
            width,
            height,
            actual,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// True when both rasters share the same pixel buffer.
    pub fn ptr_eq(&self, other: &Raster) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }

    /// True if any pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.image.pixels().any(|p| p.0[3] < u8::MAX)
    }

    /// Cut a region out of this raster into a new raster.
    pub fn crop(&self, region: CropRegion) -> Result<Raster, CropError> {
        let region = region.clamp_to(self.width(), self.height())?;
        let cropped =
            image::imageops::crop_imm(&*self.image, region.x, region.y, region.width, region.height)
                .to_image();
        Ok(Self::from_image(cropped))
    }

    pub fn to_png(&self) -> Result<Vec<u8>, RasterError> {
        let mut buffer = Cursor::new(Vec::new());
        self.image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| RasterError::EncodeError(e.to_string()))?;
        Ok(buffer.into_inner())
    }

    /// Encode as a PNG data URL for display in an `<img>` element.
    pub fn to_data_url(&self) -> Result<String, RasterError> {
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(self.to_png()?)))
    }

    /// Split into packed RGB samples and an optional alpha channel.
    pub(crate) fn split_channels(&self) -> (Vec<u8>, Option<Vec<u8>>) {
        let pixel_count = self.width() as usize * self.height() as usize;
        let mut rgb = Vec::with_capacity(pixel_count * 3);
        let mut alpha = Vec::with_capacity(pixel_count);
        for px in self.image.pixels() {
            rgb.extend_from_slice(&px.0[..3]);
            alpha.push(px.0[3]);
        }
        let alpha = self.has_transparency().then_some(alpha);
        (rgb, alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> Raster {
        Raster::from_image(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([x as u8, y as u8, 0, 255])
        }))
    }

    #[test]
    fn test_crop_takes_requested_pixels() {
        let raster = gradient(20, 10);
        let cropped = raster.crop(CropRegion::new(5, 2, 4, 3)).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (4, 3));
        assert_eq!(cropped.image().get_pixel(0, 0).0, [5, 2, 0, 255]);
        assert_eq!(cropped.image().get_pixel(3, 2).0, [8, 4, 0, 255]);
    }

    #[test]
    fn test_crop_clamps_to_bounds() {
        let raster = gradient(20, 10);
        let cropped = raster.crop(CropRegion::new(15, 5, 100, 100)).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (5, 5));
    }

    #[test]
    fn test_crop_outside_image_rejected() {
        let raster = gradient(20, 10);
        assert_eq!(
            raster.crop(CropRegion::new(20, 0, 5, 5)).unwrap_err(),
            CropError::OutsideImage {
                x: 20,
                y: 0,
                width: 20,
                height: 10
            }
        );
    }

    #[test]
    fn test_empty_crop_rejected() {
        let raster = gradient(20, 10);
        assert_eq!(
            raster.crop(CropRegion::new(0, 0, 0, 5)).unwrap_err(),
            CropError::EmptyRegion
        );
    }

    #[test]
    fn test_crop_does_not_touch_source() {
        let raster = gradient(20, 10);
        let cropped = raster.crop(CropRegion::new(0, 0, 5, 5)).unwrap();
        assert!(!raster.ptr_eq(&cropped));
        assert_eq!((raster.width(), raster.height()), (20, 10));
    }

    #[test]
    fn test_from_box_clips_negative_origin() {
        let region = CropRegion::from_box(-10.0, 5.0, 30.0, 10.4).unwrap();
        assert_eq!(region, CropRegion::new(0, 5, 20, 10));
    }

    #[test]
    fn test_from_box_rejects_degenerate_boxes() {
        assert_eq!(
            CropRegion::from_box(0.0, 0.0, 0.0, 10.0),
            Err(CropError::EmptyRegion)
        );
        assert_eq!(
            CropRegion::from_box(-20.0, 0.0, 10.0, 10.0),
            Err(CropError::EmptyRegion)
        );
        assert_eq!(
            CropRegion::from_box(f64::NAN, 0.0, 10.0, 10.0),
            Err(CropError::EmptyRegion)
        );
    }

    #[test]
    fn test_data_url_decodes_png() {
        let raster = gradient(7, 3);
        let url = raster.to_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let decoded = Raster::from_data_url(&url).unwrap();
        assert_eq!(decoded.image(), raster.image());
    }

    #[test]
    fn test_data_url_rejects_other_schemes() {
        assert!(matches!(
            Raster::from_data_url("https://example.com/a.png"),
            Err(RasterError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            Raster::from_data_url("data:text/plain;base64,aGVsbG8="),
            Err(RasterError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            Raster::from_data_url("data:image/png;base64,***"),
            Err(RasterError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_from_pixels_accepts_rgb_and_rgba() {
        let rgb = Raster::from_pixels(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(rgb.image().get_pixel(1, 0).0, [4, 5, 6, 255]);

        let rgba = Raster::from_pixels(1, 1, vec![9, 9, 9, 10]).unwrap();
        assert!(rgba.has_transparency());

        assert!(matches!(
            Raster::from_pixels(2, 2, vec![0; 5]),
            Err(RasterError::BufferSize { actual: 5, .. })
        ));
    }

    #[test]
    fn test_split_channels_omits_opaque_alpha() {
        let raster = gradient(2, 2);
        let (rgb, alpha) = raster.split_channels();
        assert_eq!(rgb.len(), 12);
        assert!(alpha.is_none());
    }
}
