//! Crop, resize and pad operations that turn a photo into a classifier
//! input tensor.
//!
//! Rounding is round-half-to-even throughout: box coordinates, resized
//! dimensions and padding offsets must land on the same pixels the models
//! were trained with.

use crate::config::{ClassifierConfig, ResizeFilter, ResizeMode};
use crate::constants::geometry::{CHANNELS, PAD_OFFSET_BIAS, PIXEL_MAX};
use crate::pipeline::{DetectionBox, NormalizedImage};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

/// How to fit an image into a square classifier input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalization {
    /// Output side length.
    pub side: u32,
    /// Fitting mode.
    pub mode: ResizeMode,
    /// Border color (letterbox only).
    pub pad_color: [u8; 3],
    /// Resampling filter.
    pub filter: ResizeFilter,
}

impl From<&ClassifierConfig> for Normalization {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            side: config.side,
            mode: config.resize,
            pad_color: config.pad_color,
            filter: config.filter,
        }
    }
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => Self::Nearest,
            ResizeFilter::Bilinear => Self::Triangle,
            ResizeFilter::Bicubic => Self::CatmullRom,
            ResizeFilter::Lanczos3 => Self::Lanczos3,
        }
    }
}

/// Placement of a letterboxed image inside its square canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxLayout {
    /// Scale applied to the source image.
    pub ratio: f64,
    /// Width of the resized content.
    pub width: u32,
    /// Height of the resized content.
    pub height: u32,
    /// Left padding.
    pub left: u32,
    /// Top padding.
    pub top: u32,
}

impl LetterboxLayout {
    /// Map a point in canvas coordinates back to source-image coordinates.
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        #[allow(clippy::cast_possible_truncation)]
        let ratio = self.ratio as f32;
        #[allow(clippy::cast_precision_loss)]
        let (left, top) = (self.left as f32, self.top as f32);
        ((x - left) / ratio, (y - top) / ratio)
    }
}

/// Round half to even and clamp into `[lo, hi]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_clamped(value: f64, lo: u32, hi: u32) -> u32 {
    let rounded = value.round_ties_even();
    if rounded.is_nan() || rounded <= f64::from(lo) {
        lo
    } else if rounded >= f64::from(hi) {
        hi
    } else {
        rounded as u32
    }
}

/// Compute where a `width × height` image lands in a `side × side`
/// letterbox canvas.
pub fn letterbox_layout(width: u32, height: u32, side: u32) -> LetterboxLayout {
    let longest = width.max(height).max(1);
    let ratio = f64::from(side) / f64::from(longest);

    let new_width = round_clamped(f64::from(width) * ratio, 1, side);
    let new_height = round_clamped(f64::from(height) * ratio, 1, side);

    let dw = f64::from(side - new_width) / 2.0;
    let dh = f64::from(side - new_height) / 2.0;

    LetterboxLayout {
        ratio,
        width: new_width,
        height: new_height,
        left: round_clamped(dw - PAD_OFFSET_BIAS, 0, side - new_width),
        top: round_clamped(dh - PAD_OFFSET_BIAS, 0, side - new_height),
    }
}

/// Aspect-preserving resize onto a `side × side` canvas filled with
/// `pad_color`.
pub fn letterbox(
    image: &RgbImage,
    side: u32,
    pad_color: [u8; 3],
    filter: ResizeFilter,
) -> (RgbImage, LetterboxLayout) {
    let (width, height) = image.dimensions();
    let layout = letterbox_layout(width, height, side);

    let resized = if (layout.width, layout.height) == (width, height) {
        image.clone()
    } else {
        image::imageops::resize(image, layout.width, layout.height, filter.into())
    };

    let mut canvas = RgbImage::from_pixel(side, side, Rgb(pad_color));
    image::imageops::replace(
        &mut canvas,
        &resized,
        i64::from(layout.left),
        i64::from(layout.top),
    );

    (canvas, layout)
}

/// Stretch to `side × side`, discarding the aspect ratio.
pub fn direct_square(image: &RgbImage, side: u32, filter: ResizeFilter) -> RgbImage {
    if image.dimensions() == (side, side) {
        return image.clone();
    }
    image::imageops::resize(image, side, side, filter.into())
}

/// Integer pixel rectangle `(x, y, width, height)` covered by `bbox`,
/// clamped to a `width × height` image and at least one pixel large.
pub fn crop_rect(bbox: &DetectionBox, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let max_x = width.max(1);
    let max_y = height.max(1);

    let x0 = round_clamped(f64::from(bbox.xmin), 0, max_x - 1);
    let y0 = round_clamped(f64::from(bbox.ymin), 0, max_y - 1);
    let x1 = round_clamped(f64::from(bbox.xmax), 0, max_x).max(x0 + 1);
    let y1 = round_clamped(f64::from(bbox.ymax), 0, max_y).max(y0 + 1);

    (x0, y0, x1 - x0, y1 - y0)
}

/// Cut the region covered by `bbox` out of `image`.
pub fn crop(image: &DynamicImage, bbox: &DetectionBox) -> DynamicImage {
    let (width, height) = image.dimensions();
    let (x, y, w, h) = crop_rect(bbox, width, height);
    image.crop_imm(x, y, w, h)
}

/// Convert a square RGB image into a channel-first `[0, 1]` tensor.
pub fn to_tensor(image: &RgbImage) -> Option<NormalizedImage> {
    let (width, height) = image.dimensions();
    if width != height {
        return None;
    }

    let plane = (width as usize) * (height as usize);
    let mut data = vec![0.0f32; CHANNELS * plane];
    for (idx, pixel) in image.pixels().enumerate() {
        for channel in 0..CHANNELS {
            data[channel * plane + idx] = f32::from(pixel[channel]) / PIXEL_MAX;
        }
    }

    NormalizedImage::from_raw(width, data)
}

/// Fit `image` to the configured square input and normalize its pixels.
///
/// Alpha is discarded and palette or grayscale images are expanded to RGB.
pub fn normalize(image: &DynamicImage, normalization: &Normalization) -> NormalizedImage {
    let rgb = image.to_rgb8();
    let square = match normalization.mode {
        ResizeMode::Letterbox => {
            letterbox(
                &rgb,
                normalization.side,
                normalization.pad_color,
                normalization.filter,
            )
            .0
        }
        ResizeMode::DirectSquare => direct_square(&rgb, normalization.side, normalization.filter),
    };

    // Both branches yield a side × side canvas.
    to_tensor(&square).unwrap_or_else(|| NormalizedImage::zeros(normalization.side))
}
