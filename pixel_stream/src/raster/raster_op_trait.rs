use super::raster::*;
use super::band_combine_op::*;
use super::convolve_op::*;
use super::lookup_op::*;
use crate::error::*;
use crate::geometry::*;

///
/// An operation that transforms every pixel of a raster
///
/// The source and destination of an operation are always different rasters.
///
pub trait RasterOp : Send + Sync {
    ///
    /// Applies this operation to a source raster, writing the results to an existing destination raster
    ///
    /// The destination is only written once the operation is known to succeed: it's left as it was if this returns an error.
    ///
    fn filter_into(&self, src: &Raster, dst: &mut Raster) -> Result<()>;

    ///
    /// Applies this operation to a source raster, writing the results to a new raster made by `create_compatible_dest_raster`
    ///
    fn filter_raster(&self, src: &Raster) -> Result<Raster> {
        let mut dst = self.create_compatible_dest_raster(src)?;
        self.filter_into(src, &mut dst)?;

        Ok(dst)
    }

    ///
    /// Creates a zeroed raster that can hold the result of applying this operation to a source raster
    ///
    fn create_compatible_dest_raster(&self, src: &Raster) -> Result<Raster>;

    ///
    /// The area of the destination that's written by this operation
    ///
    fn dest_bounds(&self, src: &Raster) -> Rectangle {
        src.bounds()
    }
}

///
/// The operations that can be handed to an accelerator
///
#[derive(Clone, Copy)]
pub enum AcceleratedOp<'a> {
    Convolve(&'a ConvolveOp),
    BandCombine(&'a BandCombineOp),
    ByteLookup(&'a LookupOp<u8>),
    ShortLookup(&'a LookupOp<u16>),
}

///
/// A faster implementation of some raster operations
///
/// Operations ask their accelerator to process a raster before using their own implementation. An accelerator
/// returns false for anything it doesn't support, and should leave the destination untouched when it does.
///
pub trait RasterAccelerator : Send + Sync {
    fn filter(&self, op: AcceleratedOp, src: &Raster, dst: &mut Raster) -> bool;
}
