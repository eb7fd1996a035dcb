//!
//! # flo_pixel_stream
//!
//! A streaming pipeline for 2D images. Producers push pixels through chains of stateful filters (cropping,
//! scaling and colour remapping) to consumers, and raster operations (convolution, band combination and lookup
//! tables) transform whole images once they have been collected.
//!
//! ```
//! # use flo_pixel_stream::stream::*;
//! # use flo_pixel_stream::filters::*;
//! # use std::sync::*;
//! let source          = Arc::new(MemoryProducer::from_argb(4, 4, vec![0xff336699; 16]).unwrap());
//! let scaled          = FilteredProducer::new(source, AreaAveragingScaleDescriptor::new(2, 2).unwrap());
//! let (image, sink)   = ImageCollector::shared();
//!
//! scaled.start_production(&sink).unwrap();
//! assert!(image.lock().unwrap().pixels() == &[0xff336699; 4]);
//! ```
//!

mod error;

/// Integer rectangles with overflow-safe intersection
pub mod geometry;

/// Colour interpreters: converting packed samples to ARGB colours and back again
pub mod color;

/// The producer/consumer protocol that moves pixels through a pipeline
pub mod stream;

/// Filters that transform a stream of pixels on its way from a producer to a consumer
pub mod filters;

/// Operations that work on a fully materialized raster rather than a stream of pixels
pub mod raster;

pub use error::*;
