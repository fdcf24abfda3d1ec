//! Wrapped bilinear sampling of decoded height images.

use bevy::image::Image;
use bevy::render::render_resource::TextureFormat;
use thiserror::Error;

/// Rec. 709 luminance weights used for multi-channel texels.
const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Reasons a [`Sampler`] cannot be built from an image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SamplerError {
    #[error("image has zero size: {width}x{height}")]
    ZeroSize { width: u32, height: u32 },

    #[error("image has no pixel data")]
    EmptyPixels,

    #[error("image has zero channels")]
    ZeroChannels,

    #[error("unsupported texture format {0:?}")]
    UnsupportedFormat(TextureFormat),
}

/// A decoded 2D image with repeat addressing and bilinear filtering.
///
/// Pixels are stored row-major as `[0, 1]` floats with `channels` values per
/// texel. Images with three or more channels are reduced to luminance.
///
/// # Example
/// ```
/// use bevy_heightfill::sampler::Sampler;
///
/// let sampler = Sampler::new(2, 1, 1, vec![0.0, 1.0]).unwrap();
/// assert_eq!(sampler.sample(0.0, 0.0), 0.0);
/// assert_eq!(sampler.sample(1.0, 0.0), 0.0); // wraps
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Sampler {
    width: u32,
    height: u32,
    channels: u32,
    pixels: Vec<f32>,
}

impl Sampler {
    /// Builds a sampler over a flat pixel buffer.
    ///
    /// A buffer shorter than `width * height * channels` is accepted; missing
    /// texels read as 0.
    pub fn new(
        width: u32,
        height: u32,
        channels: u32,
        pixels: Vec<f32>,
    ) -> Result<Self, SamplerError> {
        if width == 0 || height == 0 {
            return Err(SamplerError::ZeroSize { width, height });
        }
        if channels == 0 {
            return Err(SamplerError::ZeroChannels);
        }
        if pixels.is_empty() {
            return Err(SamplerError::EmptyPixels);
        }

        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// A 1x1 single-channel sampler that returns `value` everywhere.
    pub fn constant(value: f32) -> Self {
        Self {
            width: 1,
            height: 1,
            channels: 1,
            pixels: vec![value],
        }
    }

    /// Decodes a CPU-side Bevy image into a sampler.
    ///
    /// Only the first array layer / mip level is read.
    pub fn from_image(image: &Image) -> Result<Self, SamplerError> {
        let size = image.texture_descriptor.size;
        let format = image.texture_descriptor.format;
        let data = image.data.as_deref().unwrap_or_default();

        let (channels, pixels) = decode_texels(format, data)?;
        let texel_count = size.width as usize * size.height as usize;
        let pixels = pixels
            .into_iter()
            .take(texel_count * channels as usize)
            .collect();

        Self::new(size.width, size.height, channels, pixels)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Samples the image at `(u, v)` with wraparound and bilinear filtering.
    ///
    /// The result is always within `[0, 1]`.
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        let u = wrap_unit(u);
        let v = wrap_unit(v);

        let x = u * (self.width - 1) as f32;
        let y = v * (self.height - 1) as f32;

        let x0 = x as u32;
        let y0 = y as u32;
        let x1 = (x0 + 1) % self.width;
        let y1 = (y0 + 1) % self.height;
        let tx = x - x0 as f32;
        let ty = y - y0 as f32;

        let c00 = self.texel(x0, y0);
        let c10 = self.texel(x1, y0);
        let c01 = self.texel(x0, y1);
        let c11 = self.texel(x1, y1);

        let c0 = c00 * (1.0 - tx) + c10 * tx;
        let c1 = c01 * (1.0 - tx) + c11 * tx;
        let value = c0 * (1.0 - ty) + c1 * ty;

        if value.is_nan() {
            return 0.0;
        }
        value.clamp(0.0, 1.0)
    }

    /// Scalar value of a single texel (luminance for 3+ channels).
    fn texel(&self, x: u32, y: u32) -> f32 {
        let x = x % self.width;
        let y = y % self.height;
        let idx = (y as usize * self.width as usize + x as usize) * self.channels as usize;

        let r = self.pixels.get(idx).copied().unwrap_or(0.0);
        if self.channels < 3 {
            return r;
        }
        let g = self.pixels.get(idx + 1).copied().unwrap_or(r);
        let b = self.pixels.get(idx + 2).copied().unwrap_or(r);
        LUMA[0] * r + LUMA[1] * g + LUMA[2] * b
    }
}

/// Reduces a coordinate to `[0, 1)` with true modulo semantics.
#[inline]
fn wrap_unit(t: f32) -> f32 {
    let f = t - t.trunc();
    if f < 0.0 { f + 1.0 } else { f }
}

/// Converts raw texel bytes into normalized floats.
fn decode_texels(format: TextureFormat, data: &[u8]) -> Result<(u32, Vec<f32>), SamplerError> {
    let unorm8 = |b: &u8| *b as f32 / 255.0;

    let decoded = match format {
        TextureFormat::R8Unorm => (1, data.iter().map(unorm8).collect()),
        TextureFormat::Rg8Unorm => (2, data.iter().map(unorm8).collect()),
        TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => {
            (4, data.iter().map(unorm8).collect())
        }
        TextureFormat::Bgra8Unorm | TextureFormat::Bgra8UnormSrgb => {
            let swizzled = data
                .chunks_exact(4)
                .flat_map(|px| [px[2], px[1], px[0], px[3]])
                .map(|b| b as f32 / 255.0)
                .collect();
            (4, swizzled)
        }
        TextureFormat::R16Unorm => {
            let texels: Vec<u16> = bytemuck::allocation::pod_collect_to_vec(data);
            (1, texels.into_iter().map(|t| t as f32 / 65535.0).collect())
        }
        TextureFormat::R32Float => (1, bytemuck::allocation::pod_collect_to_vec(data)),
        TextureFormat::Rgba32Float => (4, bytemuck::allocation::pod_collect_to_vec(data)),
        other => return Err(SamplerError::UnsupportedFormat(other)),
    };

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::RenderAssetUsages;
    use bevy::render::render_resource::{Extent3d, TextureDimension};

    fn gradient() -> Sampler {
        // 4x4 single channel, value = x / 3
        let pixels = (0..16).map(|i| (i % 4) as f32 / 3.0).collect();
        Sampler::new(4, 4, 1, pixels).unwrap()
    }

    #[test]
    fn test_rejects_degenerate_images() {
        assert_eq!(
            Sampler::new(0, 4, 1, vec![1.0]),
            Err(SamplerError::ZeroSize {
                width: 0,
                height: 4
            })
        );
        assert_eq!(Sampler::new(2, 2, 1, Vec::new()), Err(SamplerError::EmptyPixels));
        assert_eq!(Sampler::new(2, 2, 0, vec![1.0]), Err(SamplerError::ZeroChannels));
    }

    #[test]
    fn test_wrap_unit() {
        assert_eq!(wrap_unit(0.25), 0.25);
        assert_eq!(wrap_unit(1.25), 0.25);
        assert_eq!(wrap_unit(-0.75), 0.25);
        assert_eq!(wrap_unit(-1.0), 0.0);
    }

    #[test]
    fn test_sample_is_periodic() {
        let s = gradient();
        for &(u, v) in &[(0.25, 0.5), (0.5, 0.75), (0.125, 0.0), (0.0, 0.25)] {
            let base = s.sample(u, v);
            assert_eq!(base, s.sample(u + 1.0, v));
            assert_eq!(base, s.sample(u - 1.0, v));
            assert_eq!(base, s.sample(u, v + 1.0));
            assert_eq!(base, s.sample(u, v - 1.0));
        }
    }

    #[test]
    fn test_sample_bilinear_midpoint() {
        let s = Sampler::new(2, 1, 1, vec![0.0, 1.0]).unwrap();
        // x = u * (w - 1) so u = 0.5 lands halfway between texel 0 and 1
        assert!((s.sample(0.5, 0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sample_stays_in_range() {
        let s = Sampler::new(2, 2, 1, vec![-3.0, 4.0, 2.0, -1.0]).unwrap();
        for i in -20..20 {
            let t = i as f32 * 0.173;
            let value = s.sample(t, t * 0.7);
            assert!((0.0..=1.0).contains(&value), "value {value} at {t}");
        }
        assert_eq!(s.sample(f32::NAN, 0.0), 0.0);
    }

    #[test]
    fn test_luminance_for_rgb() {
        let s = Sampler::new(1, 1, 3, vec![1.0, 0.0, 0.0]).unwrap();
        assert!((s.sample(0.3, 0.3) - 0.2126).abs() < 1e-6);

        let white = Sampler::new(1, 1, 4, vec![1.0, 1.0, 1.0, 0.0]).unwrap();
        assert!((white.sample(0.0, 0.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_short_buffer_reads_zero() {
        let s = Sampler::new(2, 1, 1, vec![1.0]).unwrap();
        assert_eq!(s.sample(0.0, 0.0), 1.0);
        assert_eq!(s.texel(1, 0), 0.0);
        assert!((s.sample(0.5, 0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_constant() {
        let s = Sampler::constant(0.7);
        assert_eq!(s.sample(12.3, -4.5), 0.7);
    }

    #[test]
    fn test_from_image_r8() {
        let image = Image::new(
            Extent3d {
                width: 2,
                height: 1,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            vec![0, 255],
            TextureFormat::R8Unorm,
            RenderAssetUsages::default(),
        );
        let s = Sampler::from_image(&image).unwrap();
        assert_eq!((s.width(), s.height(), s.channels()), (2, 1, 1));
        assert_eq!(s.sample(0.0, 0.0), 0.0);
        assert_eq!(s.sample(0.999_999, 0.0).round(), 1.0);
    }

    #[test]
    fn test_from_image_r32float() {
        let data: Vec<u8> = bytemuck::cast_slice::<f32, u8>(&[0.25]).to_vec();
        let image = Image::new(
            Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            data,
            TextureFormat::R32Float,
            RenderAssetUsages::default(),
        );
        let s = Sampler::from_image(&image).unwrap();
        assert_eq!(s.sample(0.5, 0.5), 0.25);
    }

    #[test]
    fn test_from_image_unsupported() {
        let image = Image::new(
            Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            vec![0; 8],
            TextureFormat::Rg32Float,
            RenderAssetUsages::default(),
        );
        assert!(matches!(
            Sampler::from_image(&image),
            Err(SamplerError::UnsupportedFormat(TextureFormat::Rg32Float))
        ));
    }
}
