use super::delivery_hints::*;
use super::pixel_block::*;
use crate::color::*;
use crate::error::*;

use std::collections::{BTreeMap};
use std::fmt;
use std::sync::*;

///
/// Descriptive properties that travel along with an image (these have no effect on the pixels)
///
pub type ImageProperties = BTreeMap<String, String>;

///
/// An image consumer receives the pixels for an image from a producer
///
/// Producers call `set_dimensions` before delivering any pixels, followed by the properties, colour interpreter and
/// delivery hints, then any number of calls to `set_pixels`, and finally `image_complete`. For multi-frame images,
/// `image_complete(FrameDone)` is followed by the pixels for the next frame.
///
pub trait ImageConsumer : Send {
    /// Sets the size of the image that will be delivered
    fn set_dimensions(&mut self, width: i32, height: i32);

    /// Supplies the properties of the image
    fn set_properties(&mut self, _properties: &ImageProperties) { }

    /// Supplies the colour interpreter that most of the pixels will be delivered with (each block carries its own too)
    fn set_color_interpreter(&mut self, _color: &ColorInterpreter) { }

    /// Supplies the guarantees the producer makes about the order the pixels will be delivered in
    fn set_hints(&mut self, _hints: DeliveryHints) { }

    /// Delivers a block of pixels
    fn set_pixels(&mut self, block: &PixelBlock) -> Result<()>;

    /// Indicates that the producer has finished sending a frame or the image
    fn image_complete(&mut self, status: CompletionStatus);
}

///
/// A shared reference to an image consumer
///
/// Producers hold on to consumers using these references, and the identity of the reference is what's used to
/// subscribe or unsubscribe a consumer.
///
#[derive(Clone)]
pub struct ConsumerRef(Arc<Mutex<dyn ImageConsumer>>);

impl ConsumerRef {
    ///
    /// Creates a reference to a new consumer
    ///
    pub fn new(consumer: impl 'static + ImageConsumer) -> ConsumerRef {
        ConsumerRef(Arc::new(Mutex::new(consumer)))
    }

    ///
    /// Creates a reference to a consumer that is also shared elsewhere
    ///
    pub fn from_shared<TConsumer>(consumer: Arc<Mutex<TConsumer>>) -> ConsumerRef
    where
        TConsumer: 'static + ImageConsumer,
    {
        ConsumerRef(consumer)
    }

    ///
    /// True if this refers to the same consumer as another reference
    ///
    #[inline]
    pub fn is_same(&self, other: &ConsumerRef) -> bool {
        Arc::as_ptr(&self.0) as *const () == Arc::as_ptr(&other.0) as *const ()
    }

    ///
    /// Locks the consumer so that a callback can be made
    ///
    /// The lock should only be held for a single callback, so that unsubscribing can take effect between callbacks.
    ///
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, dyn ImageConsumer + 'static> {
        self.0.lock().unwrap()
    }
}

impl fmt::Debug for ConsumerRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ConsumerRef({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}
