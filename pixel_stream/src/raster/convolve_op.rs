use super::kernel::*;
use super::raster::*;
use super::raster_image::*;
use super::raster_op_trait::*;
use super::rows::*;
use crate::error::*;

use smallvec::*;

use std::fmt;
use std::sync::*;

///
/// What a convolution does with pixels where the kernel extends past the edge of the source
///
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EdgeCondition {
    /// Kernel positions outside of the source contribute nothing to the result
    ZeroFill,

    /// Pixels whose kernel extends outside of the source are copied unchanged from the source
    NoOp,
}

///
/// Convolves the pixels of a raster with a kernel
///
/// Each destination sample is `Σ kernel[i, j] * src[x + i - x_origin, y + j - y_origin]`, calculated separately for each
/// band and then rounded and clamped to the range of the destination's sample type.
///
#[derive(Clone)]
pub struct ConvolveOp {
    kernel:         Kernel,
    edge:           EdgeCondition,
    accelerator:    Option<Arc<dyn RasterAccelerator>>,
}

impl ConvolveOp {
    pub fn new(kernel: Kernel, edge: EdgeCondition) -> ConvolveOp {
        ConvolveOp { kernel, edge, accelerator: None }
    }

    ///
    /// Uses an accelerator for this operation where it's able
    ///
    pub fn with_accelerator(mut self, accelerator: Arc<dyn RasterAccelerator>) -> ConvolveOp {
        self.accelerator = Some(accelerator);
        self
    }

    #[inline] pub fn kernel(&self) -> &Kernel { &self.kernel }
    #[inline] pub fn edge_condition(&self) -> EdgeCondition { self.edge }

    ///
    /// Convolves every band of the source, writing the results to the destination
    ///
    fn convolve_bands(&self, src: &Raster, dst: &mut Raster) -> Result<()> {
        let kernel          = &self.kernel;
        let edge            = self.edge;
        let bands           = src.bands();
        let sample_type     = dst.sample_type();

        let (width, height)         = (src.width() as isize, src.height() as isize);
        let (x_origin, y_origin)    = (kernel.x_origin() as isize, kernel.y_origin() as isize);
        let (kernel_w, kernel_h)    = (kernel.width() as isize, kernel.height() as isize);

        for_each_row(dst, |y, dst_row| {
            let y = y as isize;
            if y >= height { return Ok(()); }

            let mut sums: SmallVec<[f32; 4]> = smallvec![0.0; bands];

            for x in 0..width {
                let start = (x as usize) * bands;

                let footprint_outside = x < x_origin || y < y_origin || x + (kernel_w - 1 - x_origin) >= width || y + (kernel_h - 1 - y_origin) >= height;
                if edge == EdgeCondition::NoOp && footprint_outside {
                    dst_row[start..(start + bands)].copy_from_slice(src.pixel(x as usize, y as usize));
                    continue;
                }

                sums.iter_mut().for_each(|sum| *sum = 0.0);

                for j in 0..kernel_h {
                    let sy = y + j - y_origin;
                    if sy < 0 || sy >= height { continue; }

                    for i in 0..kernel_w {
                        let sx = x + i - x_origin;
                        if sx < 0 || sx >= width { continue; }

                        let weight  = kernel.weight(i as usize, j as usize);
                        let pixel   = src.pixel(sx as usize, sy as usize);

                        for (sum, sample) in sums.iter_mut().zip(pixel.iter()) {
                            *sum += weight * (*sample as f32);
                        }
                    }
                }

                for (target, sum) in dst_row[start..(start + bands)].iter_mut().zip(sums.iter()) {
                    *target = sample_type.clamp(*sum);
                }
            }

            Ok(())
        })
    }

    ///
    /// Convolves an image, using premultiplied colours for images with an alpha channel
    ///
    /// Indexed images are expanded to RGBA before they're convolved. The result has the same format as the source, except
    /// for indexed sources, which produce a non-premultiplied RGBA image.
    ///
    pub fn filter_image(&self, src: &RasterImage) -> Result<RasterImage> {
        let (convolved, result_color) = self.convolve_image(src)?;

        if &result_color == convolved.color() {
            Ok(convolved)
        } else {
            let mut result = RasterImage::new(Raster::zeroed(src.width(), src.height(), result_color.bands(), SampleType::Byte)?, result_color)?;
            convolved.copy_into(&mut result)?;
            Ok(result)
        }
    }

    ///
    /// Convolves an image into an existing image, converting the result to the format of the destination
    ///
    /// The destination is left unchanged if this returns an error.
    ///
    pub fn filter_image_into(&self, src: &RasterImage, dst: &mut RasterImage) -> Result<()> {
        let (convolved, _) = self.convolve_image(src)?;
        convolved.copy_into(dst)
    }

    ///
    /// Convolves an image in the format used for the arithmetic, returning the result and the colour it should be converted to
    ///
    fn convolve_image(&self, src: &RasterImage) -> Result<(RasterImage, ImageColor)> {
        let (working, result_color) = match src.color() {
            ImageColor::Rgb | ImageColor::Gray                  => (src.clone(), src.color().clone()),
            ImageColor::Rgba { premultiplied: true }            => (src.clone(), src.color().clone()),
            ImageColor::Rgba { premultiplied: false }           => (src.expand_to_rgba(true)?, src.color().clone()),
            ImageColor::Indexed(_)                              => (src.expand_to_rgba(true)?, ImageColor::Rgba { premultiplied: false }),
        };

        let convolved = self.filter_raster(working.raster())?;
        let convolved = RasterImage::new(convolved, working.color().clone())?;

        Ok((convolved, result_color))
    }
}

impl RasterOp for ConvolveOp {
    fn filter_into(&self, src: &Raster, dst: &mut Raster) -> Result<()> {
        if dst.bands() != src.bands() {
            return Err(PixelStreamError::delivery(format!("cannot convolve a raster with {} bands into one with {} bands", src.bands(), dst.bands())));
        }

        if !dst.covers(src) {
            return Err(PixelStreamError::delivery(format!("a {}x{} destination is too small for a {}x{} source", dst.width(), dst.height(), src.width(), src.height())));
        }

        if let Some(accelerator) = &self.accelerator {
            if accelerator.filter(AcceleratedOp::Convolve(self), src, dst) {
                return Ok(());
            }
        }

        self.convolve_bands(src, dst)
    }

    fn create_compatible_dest_raster(&self, src: &Raster) -> Result<Raster> {
        Ok(src.create_compatible())
    }
}

impl fmt::Debug for ConvolveOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ConvolveOp")
            .field("kernel", &self.kernel)
            .field("edge", &self.edge)
            .field("accelerated", &self.accelerator.is_some())
            .finish()
    }
}
