use flo_pixel_stream::*;
use flo_pixel_stream::color::*;
use flo_pixel_stream::filters::*;
use flo_pixel_stream::stream::*;

use std::sync::*;
use std::thread;

///
/// Consumer that records the completion statuses it receives
///
struct CompletionRecorder {
    statuses: Arc<Mutex<Vec<CompletionStatus>>>,
}

impl ImageConsumer for CompletionRecorder {
    fn set_dimensions(&mut self, _width: i32, _height: i32) { }
    fn set_pixels(&mut self, _block: &PixelBlock) -> Result<()> { Ok(()) }

    fn image_complete(&mut self, status: CompletionStatus) {
        self.statuses.lock().unwrap().push(status);
    }
}

fn completion_recorder() -> (Arc<Mutex<Vec<CompletionStatus>>>, ConsumerRef) {
    let statuses = Arc::new(Mutex::new(vec![]));
    (Arc::clone(&statuses), ConsumerRef::new(CompletionRecorder { statuses }))
}

///
/// Identity filter that answers resend requests in a fixed way
///
struct ResendFilter {
    inner:      IdentityFilter,
    response:   ResendResponse,
    requests:   Arc<Mutex<usize>>,
}

struct ResendDescriptor {
    response: ResendResponse,
    requests: Arc<Mutex<usize>>,
}

impl FilterDescriptor for ResendDescriptor {
    type Filter = ResendFilter;

    fn create_instance(&self, consumer: ConsumerRef) -> ResendFilter {
        ResendFilter {
            inner:      IdentityDescriptor.create_instance(consumer),
            response:   self.response,
            requests:   Arc::clone(&self.requests),
        }
    }
}

impl ImageConsumer for ResendFilter {
    fn set_dimensions(&mut self, width: i32, height: i32)             { self.inner.set_dimensions(width, height) }
    fn set_properties(&mut self, properties: &ImageProperties)         { self.inner.set_properties(properties) }
    fn set_color_interpreter(&mut self, color: &ColorInterpreter)      { self.inner.set_color_interpreter(color) }
    fn set_hints(&mut self, hints: DeliveryHints)                      { self.inner.set_hints(hints) }
    fn set_pixels(&mut self, block: &PixelBlock) -> Result<()>         { self.inner.set_pixels(block) }
    fn image_complete(&mut self, status: CompletionStatus)             { self.inner.image_complete(status) }
}

impl ImageFilter for ResendFilter {
    fn description(&self) -> String { "resend".to_string() }

    fn ordered_resend(&mut self) -> ResendResponse {
        *self.requests.lock().unwrap() += 1;
        self.response
    }
}

fn resend_with(response: ResendResponse) -> (usize, usize) {
    let requests        = Arc::new(Mutex::new(0));
    let source          = Arc::new(MemoryProducer::from_argb(2, 2, vec![0xff000000; 4]).unwrap());
    let filtered        = FilteredProducer::new(source, ResendDescriptor { response, requests: Arc::clone(&requests) });
    let (statuses, sink) = completion_recorder();

    filtered.start_production(&sink).unwrap();
    filtered.request_ordered_resend(&sink).unwrap();

    let images_done = statuses.lock().unwrap().iter().filter(|status| **status == CompletionStatus::ImageDone).count();
    let requests    = *requests.lock().unwrap();

    (requests, images_done)
}

#[test]
pub fn forwarded_resend_reaches_the_source() {
    assert!(resend_with(ResendResponse::ForwardUpstream) == (1, 2));
}

#[test]
pub fn handled_resend_stops_at_the_filter() {
    assert!(resend_with(ResendResponse::Handled) == (1, 1));
}

#[test]
pub fn ignored_resend_does_nothing() {
    assert!(resend_with(ResendResponse::Ignored) == (1, 1));
}

#[test]
pub fn resend_for_unknown_consumer_is_ignored() {
    let source          = Arc::new(MemoryProducer::from_argb(2, 2, vec![0xff000000; 4]).unwrap());
    let filtered        = FilteredProducer::new(source, IdentityDescriptor);
    let (statuses, sink) = completion_recorder();

    assert!(filtered.request_ordered_resend(&sink).is_ok());
    assert!(statuses.lock().unwrap().is_empty());
}

#[test]
pub fn null_images_finish_once() {
    let source          = Arc::new(MemoryProducer::from_argb(0, 0, vec![]).unwrap());
    let filtered        = FilteredProducer::new(source, AreaAveragingScaleDescriptor::new(4, 4).unwrap());
    let (statuses, sink) = completion_recorder();

    filtered.start_production(&sink).unwrap();

    assert!(*statuses.lock().unwrap() == vec![CompletionStatus::ImageDone]);
}

#[test]
pub fn removed_consumers_stop_receiving_frames() {
    let source = Arc::new(MemoryProducer::from_argb(2, 2, vec![0xff000000; 4]).unwrap());
    source.set_animated(true);

    let filtered                = FilteredProducer::new(Arc::clone(&source) as Arc<dyn ImageProducer>, ReplicateScaleDescriptor::new(4, 4).unwrap());
    let (first, first_sink)     = ImageCollector::shared();
    let (second, second_sink)   = ImageCollector::shared();

    filtered.start_production(&first_sink).unwrap();
    filtered.start_production(&second_sink).unwrap();

    assert!(first.lock().unwrap().frames_completed() == 1);
    assert!(second.lock().unwrap().frames_completed() == 1);

    filtered.remove_consumer(&first_sink);
    assert!(!filtered.is_consumer(&first_sink));
    assert!(filtered.is_consumer(&second_sink));

    source.new_frame(Some(PixelStorage::Ints(vec![0xffffffff; 4]))).unwrap();

    let first   = first.lock().unwrap();
    let second  = second.lock().unwrap();

    assert!(first.frames_completed() == 1);
    assert!(first.pixels().iter().all(|pixel| *pixel == 0xff000000));
    assert!(second.frames_completed() == 2);
    assert!(second.pixels().iter().all(|pixel| *pixel == 0xffffffff));
}

#[test]
pub fn each_consumer_has_its_own_filter() {
    let source = Arc::new(MemoryProducer::from_argb(4, 2, (0..8).map(|idx| 0xff000000 | (idx * 0x10)).collect()).unwrap());
    source.set_animated(true);

    let filtered                = FilteredProducer::new(Arc::clone(&source) as Arc<dyn ImageProducer>, AreaAveragingScaleDescriptor::new(2, 1).unwrap());
    let (first, first_sink)     = ImageCollector::shared();
    let (second, second_sink)   = ImageCollector::shared();

    // The second consumer subscribes while the first is part way through an animation, and both see every frame in full
    filtered.start_production(&first_sink).unwrap();
    source.new_frame(None).unwrap();
    filtered.start_production(&second_sink).unwrap();
    source.new_frame(None).unwrap();

    let first   = first.lock().unwrap();
    let second  = second.lock().unwrap();

    assert!(first.frames_completed() == 3);
    assert!(second.frames_completed() == 2);
    assert!(first.pixels() == second.pixels());
    assert!(first.coverage(0, 0) == 3 && second.coverage(0, 0) == 2);
}

#[test]
pub fn consumers_on_separate_threads() {
    let pixels      = (0..64).map(|idx| 0xff000000 | ((idx % 8) * 0x20)).collect::<Vec<u32>>();
    let source      = Arc::new(MemoryProducer::from_argb(8, 8, pixels).unwrap());
    let filtered    = Arc::new(FilteredProducer::new(source, AreaAveragingScaleDescriptor::new(4, 4).unwrap()));

    let threads = (0..8).map(|_| {
        let filtered = Arc::clone(&filtered);

        thread::spawn(move || {
            let (image, sink) = ImageCollector::shared();
            filtered.start_production(&sink).unwrap();

            let image = image.lock().unwrap();
            image.pixels().to_vec()
        })
    }).collect::<Vec<_>>();

    let results = threads.into_iter().map(|thread| thread.join().unwrap()).collect::<Vec<_>>();

    assert!(results[0].len() == 16);
    assert!(results[0][0..4] == [0xff000010, 0xff000050, 0xff000090, 0xff0000d0], "{:x?}", &results[0][0..4]);
    assert!(results.iter().all(|result| result == &results[0]));
}
