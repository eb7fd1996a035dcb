use super::image_filter_trait::*;
use crate::error::*;
use crate::stream::*;

use log::{debug};

use std::sync::*;

///
/// The filter instance that sits between the source producer and one consumer
///
struct FilterProxy<TFilter> {
    /// The consumer that receives the filtered image
    consumer:   ConsumerRef,

    /// The filter instance for this consumer
    filter:     Arc<Mutex<TFilter>>,

    /// The filter, as it's subscribed to the source producer
    filter_ref: ConsumerRef,
}

///
/// A producer that passes the image from another producer through a filter
///
/// Every consumer gets its own filter instance, created by the descriptor when the consumer is first added, so the
/// state of a filter is never shared between consumers. The instance is discarded when the consumer is removed.
///
pub struct FilteredProducer<TDescriptor: FilterDescriptor> {
    source:     Arc<dyn ImageProducer>,
    descriptor: TDescriptor,
    proxies:    Mutex<Vec<FilterProxy<TDescriptor::Filter>>>,
}

impl<TDescriptor: FilterDescriptor> FilteredProducer<TDescriptor> {
    ///
    /// Creates a producer that filters the image produced by a source producer
    ///
    pub fn new(source: Arc<dyn ImageProducer>, descriptor: TDescriptor) -> FilteredProducer<TDescriptor> {
        FilteredProducer {
            source,
            descriptor,
            proxies: Mutex::new(vec![]),
        }
    }

    #[inline]
    pub fn descriptor(&self) -> &TDescriptor {
        &self.descriptor
    }

    #[inline]
    pub fn source(&self) -> &Arc<dyn ImageProducer> {
        &self.source
    }

    ///
    /// Finds the proxy for a consumer, creating a new filter instance and subscribing it to the source if there isn't one
    ///
    /// The source registration happens while the proxy list is locked, so it's ordered with respect to other subscriptions.
    ///
    fn subscribe(&self, proxies: &mut Vec<FilterProxy<TDescriptor::Filter>>, consumer: &ConsumerRef) -> ConsumerRef {
        if let Some(proxy) = proxies.iter().find(|proxy| proxy.consumer.is_same(consumer)) {
            return proxy.filter_ref.clone();
        }

        let filter      = Arc::new(Mutex::new(self.descriptor.create_instance(consumer.clone())));
        let filter_ref  = ConsumerRef::from_shared(Arc::clone(&filter));

        debug!("Created filter {:?} for consumer {:?}", filter_ref, consumer);

        self.source.add_consumer(&filter_ref);
        proxies.push(FilterProxy { consumer: consumer.clone(), filter, filter_ref: filter_ref.clone() });

        filter_ref
    }
}

impl<TDescriptor: FilterDescriptor> ImageProducer for FilteredProducer<TDescriptor> {
    fn add_consumer(&self, consumer: &ConsumerRef) {
        let mut proxies = self.proxies.lock().unwrap();
        self.subscribe(&mut proxies, consumer);
    }

    fn is_consumer(&self, consumer: &ConsumerRef) -> bool {
        self.proxies.lock().unwrap().iter().any(|proxy| proxy.consumer.is_same(consumer))
    }

    fn remove_consumer(&self, consumer: &ConsumerRef) {
        let mut proxies = self.proxies.lock().unwrap();

        if let Some(index) = proxies.iter().position(|proxy| proxy.consumer.is_same(consumer)) {
            let proxy = proxies.remove(index);

            debug!("Removing filter {:?} for consumer {:?}", proxy.filter_ref, consumer);
            self.source.remove_consumer(&proxy.filter_ref);
        }
    }

    fn start_production(&self, consumer: &ConsumerRef) -> Result<()> {
        let filter_ref = {
            let mut proxies = self.proxies.lock().unwrap();
            self.subscribe(&mut proxies, consumer)
        };

        // Production callbacks run with the proxy list unlocked
        self.source.start_production(&filter_ref)
    }

    fn request_ordered_resend(&self, consumer: &ConsumerRef) -> Result<()> {
        let proxy = {
            let proxies = self.proxies.lock().unwrap();
            proxies.iter()
                .find(|proxy| proxy.consumer.is_same(consumer))
                .map(|proxy| (Arc::clone(&proxy.filter), proxy.filter_ref.clone()))
        };

        let (filter, filter_ref) = match proxy {
            Some(proxy) => proxy,
            None        => { return Ok(()); }
        };

        let response = filter.lock().unwrap().ordered_resend();
        debug!("Filter {:?} resend response: {:?}", filter_ref, response);

        match response {
            ResendResponse::ForwardUpstream                 => self.source.request_ordered_resend(&filter_ref),
            ResendResponse::Handled | ResendResponse::Ignored => Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::filters::*;

    #[test]
    fn same_consumer_shares_one_filter() {
        let source      = Arc::new(MemoryProducer::from_argb(2, 2, vec![0xff000000; 4]).unwrap());
        let filtered    = FilteredProducer::new(source, IdentityDescriptor);
        let (_, sink)   = ImageCollector::shared();

        filtered.add_consumer(&sink);
        filtered.add_consumer(&sink);

        assert!(filtered.proxies.lock().unwrap().len() == 1);
        assert!(filtered.is_consumer(&sink));

        filtered.remove_consumer(&sink);
        assert!(!filtered.is_consumer(&sink));
    }

    #[test]
    fn resend_of_unknown_consumer_is_ignored() {
        let source      = Arc::new(MemoryProducer::from_argb(2, 2, vec![0xff000000; 4]).unwrap());
        let filtered    = FilteredProducer::new(source, IdentityDescriptor);
        let (_, sink)   = ImageCollector::shared();

        assert!(filtered.request_ordered_resend(&sink).is_ok());
        assert!(!filtered.is_consumer(&sink));
    }
}
