use super::raster::*;
use crate::color::*;
use crate::error::*;

use std::sync::*;

///
/// Describes how the bands of a raster make up the colour of each pixel
///
#[derive(Clone, Debug, PartialEq)]
pub enum ImageColor {
    /// Three bands: red, green and blue
    Rgb,

    /// Four bands: red, green, blue and alpha, where the colour bands are optionally multiplied by the alpha
    Rgba { premultiplied: bool },

    /// A single band of intensity values
    Gray,

    /// A single band of indexes into a palette
    Indexed(Arc<IndexPalette>),
}

impl ImageColor {
    ///
    /// The number of bands a raster needs to hold pixels in this format
    ///
    #[inline]
    pub fn bands(&self) -> usize {
        match self {
            ImageColor::Rgb             => 3,
            ImageColor::Rgba { .. }     => 4,
            ImageColor::Gray            => 1,
            ImageColor::Indexed(_)      => 1,
        }
    }

    ///
    /// True if pixels in this format can be transparent
    ///
    pub fn has_alpha(&self) -> bool {
        match self {
            ImageColor::Rgba { .. }         => true,
            ImageColor::Indexed(palette)    => palette.has_alpha(),
            ImageColor::Rgb | ImageColor::Gray => false,
        }
    }

    #[inline]
    pub fn is_premultiplied(&self) -> bool {
        matches!(self, ImageColor::Rgba { premultiplied: true })
    }
}

///
/// A raster together with a description of the colour of its pixels
///
#[derive(Clone, Debug, PartialEq)]
pub struct RasterImage {
    raster: Raster,
    color:  ImageColor,
}

///
/// The gray level of an ARGB colour
///
#[inline]
fn luma([_, r, g, b]: [u8; 4]) -> i32 {
    round_component(0.30 * (r as f32) + 0.59 * (g as f32) + 0.11 * (b as f32)) as i32
}

impl RasterImage {
    ///
    /// Pairs a raster with a colour description. Direct and gray images must use byte samples
    ///
    pub fn new(raster: Raster, color: ImageColor) -> Result<RasterImage> {
        if raster.bands() != color.bands() {
            return Err(PixelStreamError::configuration(format!("{:?} pixels need {} bands, but the raster has {}", color, color.bands(), raster.bands())));
        }

        match (&color, raster.sample_type()) {
            (ImageColor::Indexed(_), SampleType::Int)   => Err(PixelStreamError::unsupported("indexed images must use byte or short samples")),
            (ImageColor::Indexed(_), _)                 => Ok(RasterImage { raster, color }),
            (_, SampleType::Byte)                       => Ok(RasterImage { raster, color }),
            (_, _)                                      => Err(PixelStreamError::unsupported(format!("{:?} images must use byte samples", color))),
        }
    }

    ///
    /// Converts a set of packed samples to a raster image
    ///
    /// Direct colours are unpacked into RGB or (non-premultiplied) RGBA bands, and indexed samples keep their palette. Custom
    /// colour mappings can't be represented as a raster image.
    ///
    pub fn from_packed(width: usize, height: usize, pixels: &[u32], scansize: usize, color: &ColorInterpreter) -> Result<RasterImage> {
        if height > 0 && width > 0 {
            let needed = (height - 1).checked_mul(scansize).and_then(|rows| rows.checked_add(width));

            if needed.map(|needed| needed > pixels.len()).unwrap_or(true) {
                return Err(PixelStreamError::delivery(format!("{} samples are not enough for a {}x{} image with scansize {}", pixels.len(), width, height, scansize)));
            }
        }

        let sample = |x: usize, y: usize| pixels[y*scansize + x];

        match color {
            ColorInterpreter::Direct(direct) => {
                let image_color = if direct.has_alpha() { ImageColor::Rgba { premultiplied: false } } else { ImageColor::Rgb };
                let mut raster  = Raster::zeroed(width, height, image_color.bands(), SampleType::Byte)?;

                for y in 0..height {
                    for x in 0..width {
                        let [a, r, g, b] = argb_components(direct.argb(sample(x, y)));
                        raster.set_pixel(x, y, &[r as i32, g as i32, b as i32, a as i32]);
                    }
                }

                RasterImage::new(raster, image_color)
            }

            ColorInterpreter::Indexed(palette) => {
                let sample_type = if palette.len() <= 256 { SampleType::Byte } else { SampleType::UShort };
                let mut raster  = Raster::zeroed(width, height, 1, sample_type)?;

                for y in 0..height {
                    for x in 0..width {
                        raster.set_sample(x, y, 0, sample(x, y) as i32);
                    }
                }

                RasterImage::new(raster, ImageColor::Indexed(Arc::clone(palette)))
            }

            ColorInterpreter::Custom(mapping) => Err(PixelStreamError::unsupported(format!("{} cannot be converted to a raster image", mapping.name()))),
        }
    }

    #[inline] pub fn raster(&self) -> &Raster { &self.raster }
    #[inline] pub fn color(&self) -> &ImageColor { &self.color }
    #[inline] pub fn into_raster(self) -> Raster { self.raster }
    #[inline] pub fn width(&self) -> usize { self.raster.width() }
    #[inline] pub fn height(&self) -> usize { self.raster.height() }

    ///
    /// Reads the non-premultiplied ARGB colour of a pixel
    ///
    pub fn argb(&self, x: usize, y: usize) -> u32 {
        let pixel = self.raster.pixel(x, y);

        match &self.color {
            ImageColor::Rgb                     => argb_from_components([255, pixel[0] as u8, pixel[1] as u8, pixel[2] as u8]),
            ImageColor::Gray                    => argb_from_components([255, pixel[0] as u8, pixel[0] as u8, pixel[0] as u8]),
            ImageColor::Indexed(palette)        => palette.argb(pixel[0] as u32),
            ImageColor::Rgba { premultiplied }  => {
                let argb = argb_from_components([pixel[3] as u8, pixel[0] as u8, pixel[1] as u8, pixel[2] as u8]);
                if *premultiplied { unpremultiply_argb(argb) } else { argb }
            }
        }
    }

    ///
    /// Writes the colour of a pixel, as a non-premultiplied ARGB value, converting it to the format of this image
    ///
    pub fn set_argb(&mut self, x: usize, y: usize, argb: u32) {
        let components = argb_components(argb);

        match &self.color {
            ImageColor::Rgb                     => { let [_, r, g, b] = components; self.raster.set_pixel(x, y, &[r as i32, g as i32, b as i32]); }
            ImageColor::Gray                    => { self.raster.set_sample(x, y, 0, luma(components)); }
            ImageColor::Indexed(palette)        => { let index = palette.closest_index(argb); self.raster.set_sample(x, y, 0, index as i32); }
            ImageColor::Rgba { premultiplied }  => {
                let [a, r, g, b] = if *premultiplied { argb_components(premultiply_argb(argb)) } else { components };
                self.raster.set_pixel(x, y, &[r as i32, g as i32, b as i32, a as i32]);
            }
        }
    }

    ///
    /// Every pixel of this image as non-premultiplied ARGB values
    ///
    pub fn to_argb(&self) -> Vec<u32> {
        let mut argb = Vec::with_capacity(self.width() * self.height());

        for y in 0..self.height() {
            for x in 0..self.width() {
                argb.push(self.argb(x, y));
            }
        }

        argb
    }

    ///
    /// Converts this image to four RGBA bands
    ///
    pub fn expand_to_rgba(&self, premultiplied: bool) -> Result<RasterImage> {
        if self.color == (ImageColor::Rgba { premultiplied }) {
            return Ok(self.clone());
        }

        let raster      = Raster::zeroed(self.width(), self.height(), 4, SampleType::Byte)?;
        let mut rgba    = RasterImage { raster, color: ImageColor::Rgba { premultiplied } };

        for y in 0..self.height() {
            for x in 0..self.width() {
                rgba.set_argb(x, y, self.argb(x, y));
            }
        }

        Ok(rgba)
    }

    ///
    /// Copies the pixels of this image into another image, converting their format if necessary
    ///
    /// The target must have at least as many rows and columns as this image.
    ///
    pub fn copy_into(&self, target: &mut RasterImage) -> Result<()> {
        if !target.raster.covers(&self.raster) {
            return Err(PixelStreamError::delivery(format!("a {}x{} image cannot hold a {}x{} image", target.width(), target.height(), self.width(), self.height())));
        }

        let same_format = match (&self.color, &target.color) {
            (ImageColor::Indexed(a), ImageColor::Indexed(b))    => Arc::ptr_eq(a, b),
            (a, b)                                              => a == b && self.raster.sample_type() == target.raster.sample_type(),
        };

        for y in 0..self.height() {
            for x in 0..self.width() {
                if same_format {
                    target.raster.set_pixel(x, y, self.raster.pixel(x, y));
                } else {
                    target.set_argb(x, y, self.argb(x, y));
                }
            }
        }

        Ok(())
    }
}
