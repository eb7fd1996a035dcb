mod raster;
mod raster_image;
mod kernel;
mod raster_op_trait;
mod rows;
mod band_combine_op;
mod convolve_op;
mod lookup_op;

pub use raster::*;
pub use raster_image::*;
pub use kernel::*;
pub use raster_op_trait::*;
pub use band_combine_op::*;
pub use convolve_op::*;
pub use lookup_op::*;
