mod delivery_hints;
mod pixel_block;
mod consumer_trait;
mod producer_trait;
mod memory_producer;
mod image_collector;

pub use delivery_hints::*;
pub use pixel_block::*;
pub use consumer_trait::*;
pub use producer_trait::*;
pub use memory_producer::*;
pub use image_collector::*;
