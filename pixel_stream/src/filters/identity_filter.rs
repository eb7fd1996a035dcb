use super::image_filter_trait::*;
use super::stream_state::*;
use crate::color::*;
use crate::error::*;
use crate::stream::*;

///
/// Describes a filter that passes its pixels on unchanged
///
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentityDescriptor;

///
/// A filter that checks the stream it receives, clips the pixels to the image and passes them on unchanged
///
pub struct IdentityFilter {
    consumer:   ConsumerRef,
    state:      StreamState,
}

impl IdentityFilter {
    pub fn new(consumer: ConsumerRef) -> IdentityFilter {
        IdentityFilter { consumer, state: StreamState::new() }
    }
}

impl FilterDescriptor for IdentityDescriptor {
    type Filter = IdentityFilter;

    fn create_instance(&self, consumer: ConsumerRef) -> IdentityFilter {
        IdentityFilter::new(consumer)
    }
}

impl ImageConsumer for IdentityFilter {
    fn set_dimensions(&mut self, width: i32, height: i32) {
        if self.state.set_dimensions(width, height) {
            self.consumer.lock().set_dimensions(width, height);
        } else {
            self.consumer.lock().image_complete(CompletionStatus::ImageDone);
        }
    }

    fn set_properties(&mut self, properties: &ImageProperties) {
        let properties = with_filter_description(properties, &self.description());
        self.consumer.lock().set_properties(&properties);
    }

    fn set_color_interpreter(&mut self, color: &ColorInterpreter) {
        self.consumer.lock().set_color_interpreter(color);
    }

    fn set_hints(&mut self, hints: DeliveryHints) {
        self.consumer.lock().set_hints(hints);
    }

    fn set_pixels(&mut self, block: &PixelBlock) -> Result<()> {
        if let Some(block) = self.state.accept_block(block)? {
            self.consumer.lock().set_pixels(&block)?;
        }

        Ok(())
    }

    fn image_complete(&mut self, status: CompletionStatus) {
        if self.state.complete(status) {
            self.consumer.lock().image_complete(status);
        }
    }
}

impl ImageFilter for IdentityFilter {
    fn description(&self) -> String {
        "identity".to_string()
    }
}
