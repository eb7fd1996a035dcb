use crate::stream::*;

///
/// How a filter answers a request to resend its pixels in top-down, left-to-right order
///
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResendResponse {
    /// The filter can't reorder pixels itself, so the request should be passed on to the upstream producer
    ForwardUpstream,

    /// The filter has already resent its pixels in order
    Handled,

    /// The filter is unable to resend its pixels, and the request should be dropped
    Ignored,
}

impl Default for ResendResponse {
    fn default() -> Self {
        ResendResponse::ForwardUpstream
    }
}

///
/// An image filter is a consumer that transforms the pixels it receives and sends them on to another consumer
///
/// Filters are stateful, so a separate instance is needed for every consumer of a filtered image: these are created from a
/// `FilterDescriptor`, usually by a `FilteredProducer`.
///
pub trait ImageFilter : ImageConsumer {
    ///
    /// A short description of what this filter does, which is added to the `filters` property of the images passing through it
    ///
    fn description(&self) -> String;

    ///
    /// Called when the downstream consumer asks for the pixels to be resent in order
    ///
    fn ordered_resend(&mut self) -> ResendResponse {
        ResendResponse::ForwardUpstream
    }
}

///
/// The configuration for a filter, which can create independent filter instances that send their output to a consumer
///
pub trait FilterDescriptor : Send + Sync {
    /// The type of filter created by this descriptor
    type Filter : 'static + ImageFilter;

    ///
    /// Creates a new filter, with no accumulated state, that sends its results to the specified consumer
    ///
    fn create_instance(&self, consumer: ConsumerRef) -> Self::Filter;
}

///
/// Returns a copy of a set of image properties with a filter description added to the `filters` entry
///
pub fn with_filter_description(properties: &ImageProperties, description: &str) -> ImageProperties {
    let mut properties  = properties.clone();
    let filters         = match properties.get("filters") {
        Some(existing) if !existing.is_empty()  => format!("{}; {}", existing, description),
        _                                       => description.to_string(),
    };

    properties.insert("filters".to_string(), filters);
    properties
}
