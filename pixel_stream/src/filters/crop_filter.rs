use super::image_filter_trait::*;
use super::stream_state::*;
use crate::color::*;
use crate::error::*;
use crate::geometry::*;
use crate::stream::*;

use log::{trace};

///
/// Describes a filter that extracts a rectangular region from an image
///
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CropDescriptor {
    region: Rectangle,
}

///
/// Filter that passes on the pixels from a region of an image, moved so that the top-left of the region is at (0, 0)
///
/// The region does not have to lie inside the source image: pixels outside of the source are never delivered, so
/// the consumer will see those as gaps.
///
pub struct CropFilter {
    region:     Rectangle,
    consumer:   ConsumerRef,
    state:      StreamState,
}

impl CropDescriptor {
    ///
    /// Creates a crop descriptor for a region of the source image
    ///
    pub fn new(region: Rectangle) -> Result<CropDescriptor> {
        if region.width < 0 || region.height < 0 {
            return Err(PixelStreamError::configuration(format!("cannot crop to a region with a negative size ({}x{})", region.width, region.height)));
        }

        Ok(CropDescriptor { region })
    }

    #[inline]
    pub fn region(&self) -> Rectangle {
        self.region
    }
}

impl FilterDescriptor for CropDescriptor {
    type Filter = CropFilter;

    fn create_instance(&self, consumer: ConsumerRef) -> CropFilter {
        CropFilter {
            region:     self.region,
            consumer:   consumer,
            state:      StreamState::new(),
        }
    }
}

impl ImageConsumer for CropFilter {
    fn set_dimensions(&mut self, width: i32, height: i32) {
        if !self.state.set_dimensions(width, height) {
            self.consumer.lock().image_complete(CompletionStatus::ImageDone);
        } else if self.region.is_empty() {
            // Nothing from the source can ever be delivered
            self.state.finish_downstream();
            self.consumer.lock().image_complete(CompletionStatus::ImageDone);
        } else {
            self.consumer.lock().set_dimensions(self.region.width, self.region.height);
        }
    }

    fn set_properties(&mut self, properties: &ImageProperties) {
        let mut properties  = with_filter_description(properties, &self.description());
        let region          = self.region;
        properties.insert("croprect".to_string(), format!("{}, {}, {}, {}", region.x, region.y, region.width, region.height));

        self.consumer.lock().set_properties(&properties);
    }

    fn set_color_interpreter(&mut self, color: &ColorInterpreter) {
        self.consumer.lock().set_color_interpreter(color);
    }

    fn set_hints(&mut self, hints: DeliveryHints) {
        // A region that extends past the source has rows and columns that are never delivered
        let inside_source = self.state.phase() != StreamPhase::Idle && self.state.bounds().contains_rectangle(&self.region);
        let hints = if inside_source {
            hints
        } else {
            let broken = DeliveryHints::TOP_DOWN_LEFT_RIGHT | DeliveryHints::COMPLETE_SCANLINES | DeliveryHints::SINGLE_PASS;
            trace!("Crop region {:?} is not inside the source: removing {:?} from the hints", self.region, hints & broken);

            hints.difference(broken)
        };

        self.consumer.lock().set_hints(hints);
    }

    fn set_pixels(&mut self, block: &PixelBlock) -> Result<()> {
        let block = match self.state.accept_block(block)? {
            Some(block) => block,
            None        => { return Ok(()); }
        };

        let block = match block.clipped_to(&self.region)? {
            Some(block) => block,
            None        => { return Ok(()); }
        };

        let block = block.translated(-self.region.x, -self.region.y);
        trace!("Crop forwarding {:?}", block.bounds());

        self.consumer.lock().set_pixels(&block)
    }

    fn image_complete(&mut self, status: CompletionStatus) {
        if self.state.complete(status) {
            self.consumer.lock().image_complete(status);
        }
    }
}

impl ImageFilter for CropFilter {
    fn description(&self) -> String {
        format!("crop to ({}, {}) {}x{}", self.region.x, self.region.y, self.region.width, self.region.height)
    }
}
