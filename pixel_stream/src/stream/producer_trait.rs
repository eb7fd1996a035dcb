use super::consumer_trait::*;
use crate::error::*;

///
/// An image producer delivers the pixels of an image to any number of consumers
///
/// Producers are shared between threads, so all of their methods take `&self`. Removing a consumer stops any further
/// callbacks from reaching it, though a callback that is already in progress will run to completion.
///
pub trait ImageProducer : Send + Sync {
    ///
    /// Registers a consumer that wants to receive the image the next time it's produced
    ///
    fn add_consumer(&self, consumer: &ConsumerRef);

    ///
    /// True if the consumer is currently registered with this producer
    ///
    fn is_consumer(&self, consumer: &ConsumerRef) -> bool;

    ///
    /// Stops sending data to a consumer
    ///
    fn remove_consumer(&self, consumer: &ConsumerRef);

    ///
    /// Registers a consumer and starts sending it the image
    ///
    fn start_production(&self, consumer: &ConsumerRef) -> Result<()>;

    ///
    /// Asks for the image to be sent to a consumer again, in top-down, left-right order
    ///
    /// Producers may ignore this request if they can't satisfy it.
    ///
    fn request_ordered_resend(&self, consumer: &ConsumerRef) -> Result<()>;
}
