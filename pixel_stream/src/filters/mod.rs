mod image_filter_trait;
mod stream_state;
mod filtered_producer;
mod identity_filter;
mod crop_filter;
mod replicate_scale_filter;
mod area_averaging_scale_filter;
mod rgb_remap_filter;

pub use image_filter_trait::*;
pub use stream_state::*;
pub use filtered_producer::*;
pub use identity_filter::*;
pub use crop_filter::*;
pub use replicate_scale_filter::*;
pub use area_averaging_scale_filter::*;
pub use rgb_remap_filter::*;
